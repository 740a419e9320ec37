//! In-memory object storage - used when no bucket is configured, and in tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use blog_core::ports::{ObjectStorage, StorageError};

/// A stored blob and its declared MIME type.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Keeps uploads in a map and serves them under a fixed base URL.
pub struct InMemoryObjectStorage {
    base_url: String,
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl InMemoryObjectStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects.read().await.get(key).cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }
}

impl Default for InMemoryObjectStorage {
    fn default() -> Self {
        Self::new("memory://blog-files")
    }
}

#[async_trait]
impl ObjectStorage for InMemoryObjectStorage {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let mut objects = self.objects.write().await;
        if objects.contains_key(key) {
            return Err(StorageError::Rejected {
                status: 409,
                message: "The resource already exists".to_string(),
            });
        }
        objects.insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_returns_public_url() {
        let storage = InMemoryObjectStorage::new("http://localhost/files/");

        let url = storage
            .upload("uploads/1-cat.png", vec![1, 2, 3], "image/png")
            .await
            .unwrap();

        assert_eq!(url, "http://localhost/files/uploads/1-cat.png");
        let stored = storage.get("uploads/1-cat.png").await.unwrap();
        assert_eq!(stored.bytes, vec![1, 2, 3]);
        assert_eq!(stored.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_duplicate_key_is_rejected() {
        let storage = InMemoryObjectStorage::default();
        storage.put("k", vec![1], "image/png").await.unwrap();

        let result = storage.put("k", vec![2], "image/png").await;
        assert!(matches!(result, Err(StorageError::Rejected { status: 409, .. })));
        assert_eq!(storage.len().await, 1);
    }
}
