use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::types::encode_object_key;
use crate::{BlobError, BlobResult, BlobStore, ObjectHead, PutResult};

const DEFAULT_BASE_URL: &str = "memory://exam-artifacts";

#[derive(Debug, Clone)]
struct MemoryObject {
    bytes: Vec<u8>,
    content_type: Option<String>,
    public: bool,
}

/// In-memory object store for tests and development.
///
/// Clones share objects and failure switches.
#[derive(Clone)]
pub struct MemoryBlobStore {
    objects: Arc<RwLock<HashMap<String, MemoryObject>>>,
    base_url: String,
    fail_uploads: Arc<AtomicBool>,
    fail_visibility: Arc<AtomicBool>,
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url<S: Into<String>>(base_url: S) -> Self {
        Self {
            objects: Arc::new(RwLock::new(HashMap::new())),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            fail_uploads: Arc::new(AtomicBool::new(false)),
            fail_visibility: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Reject every upload with a transport error.
    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Reject every visibility change.
    pub fn set_fail_visibility(&self, fail: bool) {
        self.fail_visibility.store(fail, Ordering::SeqCst);
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    pub async fn bytes(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(key).map(|o| o.bytes.clone())
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload_from_path(
        &self,
        key: &str,
        path: &Path,
        content_type: Option<&str>,
    ) -> BlobResult<PutResult> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(BlobError::transport(format!("upload of {} rejected", key)));
        }
        let bytes = tokio::fs::read(path).await?;
        let size_bytes = bytes.len() as u64;
        self.objects.write().await.insert(
            key.to_string(),
            MemoryObject {
                bytes,
                content_type: content_type.map(str::to_string),
                public: false,
            },
        );
        Ok(PutResult {
            etag: None,
            size_bytes,
        })
    }

    async fn make_public(&self, key: &str) -> BlobResult<()> {
        if self.fail_visibility.load(Ordering::SeqCst) {
            return Err(BlobError::visibility_failed(key, "permission change rejected"));
        }
        let mut objects = self.objects.write().await;
        let object = objects.get_mut(key).ok_or_else(|| BlobError::not_found(key))?;
        object.public = true;
        Ok(())
    }

    async fn public_url(&self, key: &str) -> BlobResult<String> {
        let objects = self.objects.read().await;
        let object = objects.get(key).ok_or_else(|| BlobError::not_found(key))?;
        if !object.public {
            return Err(BlobError::invalid(format!("{} is not public", key)));
        }
        Ok(format!("{}/{}", self.base_url, encode_object_key(key)))
    }

    async fn head(&self, key: &str) -> BlobResult<ObjectHead> {
        let objects = self.objects.read().await;
        let object = objects.get(key).ok_or_else(|| BlobError::not_found(key))?;
        Ok(ObjectHead {
            size_bytes: object.bytes.len() as u64,
            content_type: object.content_type.clone(),
            etag: None,
            public: Some(object.public),
        })
    }

    async fn delete(&self, key: &str) -> BlobResult<()> {
        self.objects
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| BlobError::not_found(key))
    }
}
