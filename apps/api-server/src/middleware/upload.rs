//! Cover image upload extractor.
//!
//! Reads a multipart form, accepts at most one image in the `file` part and
//! forwards it to object storage. The stored object's public URL rides along
//! with the remaining text fields for the handler to persist.

use std::collections::HashMap;
use std::path::Path;

use actix_multipart::{Field, Multipart};
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures::TryStreamExt;
use futures::future::LocalBoxFuture;

use blog_core::ports::{ObjectStorage, StorageError};

use super::error::AppError;
use crate::state::AppState;

/// Largest accepted upload, in bytes.
pub const MAX_FILE_SIZE: usize = 1_000_000;

/// Largest accepted text field, in bytes.
pub const MAX_FIELD_SIZE: usize = 1_000_000;

/// Most text fields accepted in one form.
pub const MAX_FIELDS: usize = 16;

/// Form part that carries the image.
pub const FILE_FIELD: &str = "file";

const IMAGE_TYPES: [&str; 5] = ["jpeg", "jpg", "png", "gif", "webp"];

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Invalid multipart form: {0}")]
    Multipart(String),

    #[error("File too large (max {max} bytes)")]
    TooLarge { max: usize },

    #[error("Image files only (jpeg, jpg, png, gif, webp)")]
    NotAnImage,

    #[error("Unexpected file field '{0}'")]
    UnexpectedField(String),

    #[error("Only one file may be uploaded")]
    MultipleFiles,

    #[error("Too many form fields (max {max})")]
    TooManyFields { max: usize },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Storage(e) => e.into(),
            other => AppError::BadRequest(other.to_string()),
        }
    }
}

/// An image accepted and stored in object storage.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub key: String,
    pub url: String,
}

/// Parsed multipart form with the optional stored file.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl UploadForm {
    /// Remove a text field, yielding an empty string when it was not sent.
    pub fn take_field(&mut self, name: &str) -> String {
        self.fields.remove(name).unwrap_or_default()
    }
}

struct PendingFile {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Both the filename extension and the declared MIME type must name an image format.
pub fn is_allowed_image(filename: &str, content_type: &str) -> bool {
    let ext_ok = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_TYPES.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false);

    let mime_ok = content_type
        .to_lowercase()
        .strip_prefix("image/")
        .map(|sub| IMAGE_TYPES.contains(&sub))
        .unwrap_or(false);

    ext_ok && mime_ok
}

/// Storage key for an upload: `uploads/<unix millis>-<filename>`.
pub fn object_key(filename: &str, millis: i64) -> String {
    let safe: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("uploads/{}-{}", millis, safe)
}

async fn read_limited(field: &mut Field, max: usize) -> Result<Vec<u8>, UploadError> {
    let mut buf = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| UploadError::Multipart(e.to_string()))?
    {
        if buf.len() + chunk.len() > max {
            return Err(UploadError::TooLarge { max });
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}

async fn read_form(
    mut multipart: Multipart,
) -> Result<(HashMap<String, String>, Option<PendingFile>), UploadError> {
    let mut fields = HashMap::new();
    let mut file = None;

    while let Some(mut field) = multipart
        .try_next()
        .await
        .map_err(|e| UploadError::Multipart(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .map(String::from);

        match filename {
            // An unselected file input still sends a part, with an empty filename.
            Some(filename) if filename.is_empty() => {
                while field
                    .try_next()
                    .await
                    .map_err(|e| UploadError::Multipart(e.to_string()))?
                    .is_some()
                {}
            }
            Some(filename) => {
                if name != FILE_FIELD {
                    return Err(UploadError::UnexpectedField(name));
                }
                if file.is_some() {
                    return Err(UploadError::MultipleFiles);
                }

                let content_type = field
                    .content_type()
                    .map(|m| m.essence_str().to_string())
                    .unwrap_or_default();
                if !is_allowed_image(&filename, &content_type) {
                    return Err(UploadError::NotAnImage);
                }

                let bytes = read_limited(&mut field, MAX_FILE_SIZE).await?;
                file = Some(PendingFile {
                    filename,
                    content_type,
                    bytes,
                });
            }
            None => {
                if fields.len() >= MAX_FIELDS {
                    return Err(UploadError::TooManyFields { max: MAX_FIELDS });
                }
                let bytes = read_limited(&mut field, MAX_FIELD_SIZE).await?;
                let value = String::from_utf8(bytes)
                    .map_err(|_| UploadError::Multipart(format!("field '{}' is not UTF-8", name)))?;
                fields.insert(name, value);
            }
        }
    }

    Ok((fields, file))
}

async fn store(
    storage: &dyn ObjectStorage,
    pending: PendingFile,
) -> Result<UploadedFile, UploadError> {
    let key = object_key(&pending.filename, chrono::Utc::now().timestamp_millis());
    let size = pending.bytes.len();

    let url = storage
        .upload(&key, pending.bytes, &pending.content_type)
        .await?;

    tracing::info!(%key, size, "File uploaded successfully");

    Ok(UploadedFile { key, url })
}

impl FromRequest for UploadForm {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let storage = req
            .app_data::<web::Data<AppState>>()
            .map(|state| state.storage.clone());
        let multipart = Multipart::new(req.headers(), payload.take());

        Box::pin(async move {
            let storage = storage
                .ok_or_else(|| AppError::Internal("Server configuration error".to_string()))?;

            let (fields, pending) = read_form(multipart).await?;

            let file = match pending {
                Some(pending) => Some(store(storage.as_ref(), pending).await?),
                None => {
                    tracing::debug!("No file to upload");
                    None
                }
            };

            Ok(UploadForm { fields, file })
        })
    }
}
