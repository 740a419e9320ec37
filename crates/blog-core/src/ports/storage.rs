//! Object storage port - where uploaded cover images end up.

use async_trait::async_trait;

/// Object storage trait - abstraction over hosted buckets (Supabase) and in-memory.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under `key`.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str)
    -> Result<(), StorageError>;

    /// Public URL under which `key` is served.
    fn public_url(&self, key: &str) -> String;

    /// Store `bytes` and return the public URL for them.
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.put(key, bytes, content_type).await?;
        Ok(self.public_url(key))
    }
}

/// Object storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Storage backend rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },
}
