use std::path::Path;

use async_trait::async_trait;

use crate::BlobResult;

/// Object storage operations the artifact lifecycle needs
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload the file at `path` to `key`, replacing any existing object.
    async fn upload_from_path(
        &self,
        key: &str,
        path: &Path,
        content_type: Option<&str>,
    ) -> BlobResult<PutResult>;

    /// Grant anonymous read access to an object.
    async fn make_public(&self, key: &str) -> BlobResult<()>;

    /// Durable URL of an object. Stores may refuse objects that are not
    /// public yet.
    async fn public_url(&self, key: &str) -> BlobResult<String>;

    /// Object metadata without content.
    async fn head(&self, key: &str) -> BlobResult<ObjectHead>;

    /// Delete an object. Fails with `NotFound` if it does not exist.
    async fn delete(&self, key: &str) -> BlobResult<()>;
}

/// Result of a successful upload
#[derive(Debug, Clone)]
pub struct PutResult {
    pub etag: Option<String>,
    pub size_bytes: u64,
}

/// Metadata about a stored object
#[derive(Debug, Clone)]
pub struct ObjectHead {
    pub size_bytes: u64,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    /// Whether anonymous reads are allowed; `None` if the store does not
    /// report it on a head request.
    pub public: Option<bool>,
}
