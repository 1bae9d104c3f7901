/// Configuration for artifact operations
#[derive(Debug, Clone)]
pub struct BlobConfig {
    /// Largest local file accepted for upload
    pub max_artifact_bytes: u64,

    /// Delete the local copy once the artifact is public
    pub remove_local_on_success: bool,

    /// Used when the extension does not identify a content type
    pub fallback_content_type: Option<String>,
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            max_artifact_bytes: 50 * 1024 * 1024, // 50MB
            remove_local_on_success: true,
            fallback_content_type: Some("application/octet-stream".to_string()),
        }
    }
}

impl BlobConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_artifact_bytes(mut self, bytes: u64) -> Self {
        self.max_artifact_bytes = bytes;
        self
    }

    /// Leave local files in place after upload.
    pub fn keep_local_files(mut self) -> Self {
        self.remove_local_on_success = false;
        self
    }

    pub fn with_fallback_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.fallback_content_type = Some(content_type.into());
        self
    }
}
