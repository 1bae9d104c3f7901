use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use exam_core::{Classify, ErrorKind};

use crate::types::content_type_for;
use crate::{ArtifactReceipt, BlobConfig, BlobError, BlobResult, BlobStore, Namespace};

/// Moves local artifacts into public object storage and removes them again.
///
/// An upload is only complete once the object is stored, public, and has a
/// URL; the local file is removed after that and never before.
#[derive(Clone)]
pub struct ArtifactAdapter {
    store: Arc<dyn BlobStore>,
    config: BlobConfig,
}

impl ArtifactAdapter {
    pub fn new<S: BlobStore + 'static>(store: S, config: BlobConfig) -> Self {
        Self::from_shared(Arc::new(store), config)
    }

    pub fn from_shared(store: Arc<dyn BlobStore>, config: BlobConfig) -> Self {
        Self { store, config }
    }

    /// Upload `local_path` to `{namespace}/{remote_name}`, make it public
    /// and return its URL. The local file is deleted on success and left
    /// untouched on any failure.
    pub async fn upload_artifact<P: AsRef<Path>>(
        &self,
        local_path: P,
        remote_name: &str,
        namespace: Namespace,
    ) -> BlobResult<ArtifactReceipt> {
        let local_path = local_path.as_ref();
        logged("upload_artifact", namespace, remote_name, async {
            let key = namespace.object_key(remote_name)?;

            let metadata = match tokio::fs::metadata(local_path).await {
                Ok(m) if m.is_file() => m,
                Ok(_) => {
                    return Err(BlobError::invalid(format!(
                        "{} is not a regular file",
                        local_path.display()
                    )))
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(BlobError::local_file_not_found(local_path.display().to_string()))
                }
                Err(e) => return Err(e.into()),
            };
            if metadata.len() > self.config.max_artifact_bytes {
                return Err(BlobError::invalid(format!(
                    "artifact size {} exceeds maximum {}",
                    metadata.len(),
                    self.config.max_artifact_bytes
                )));
            }

            let content_type = content_type_for(local_path)
                .map(str::to_string)
                .or_else(|| self.config.fallback_content_type.clone());

            let put = self
                .store
                .upload_from_path(&key, local_path, content_type.as_deref())
                .await?;
            tracing::info!(key = %key, size = put.size_bytes, "artifact uploaded");

            self.store.make_public(&key).await?;
            let url = self.store.public_url(&key).await?;

            let local_removed = if self.config.remove_local_on_success {
                remove_local(local_path).await
            } else {
                false
            };

            Ok(ArtifactReceipt {
                namespace,
                key,
                url,
                size_bytes: put.size_bytes,
                content_type,
                etag: put.etag,
                uploaded_at: chrono::Utc::now().timestamp(),
                local_removed,
            })
        })
        .await
    }

    /// Delete `{namespace}/{remote_name}`. A missing object is a logged
    /// `NotFound` error.
    pub async fn delete_artifact(&self, remote_name: &str, namespace: Namespace) -> BlobResult<()> {
        logged("delete_artifact", namespace, remote_name, async {
            let key = namespace.object_key(remote_name)?;
            self.store.delete(&key).await?;
            tracing::info!(key = %key, "artifact deleted");
            Ok(())
        })
        .await
    }

    pub async fn delete_screenshot(&self, remote_name: &str) -> BlobResult<()> {
        self.delete_artifact(remote_name, Namespace::Screenshots).await
    }

    pub fn config(&self) -> &BlobConfig {
        &self.config
    }
}

/// Remove the local copy of an uploaded artifact. The upload already
/// succeeded, so a failure here is reported on the receipt, not returned.
async fn remove_local(path: &Path) -> bool {
    match tokio::fs::remove_file(path).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "uploaded artifact left on disk");
            false
        }
    }
}

async fn logged<T, F>(
    op: &'static str,
    namespace: Namespace,
    remote_name: &str,
    operation: F,
) -> BlobResult<T>
where
    F: Future<Output = BlobResult<T>>,
{
    let result = operation.await;
    if let Err(err) = &result {
        let kind = err.kind();
        match kind {
            ErrorKind::Transport | ErrorKind::Fatal => tracing::error!(
                op,
                namespace = %namespace,
                remote_name,
                kind = kind.class_name(),
                error = %err,
                "artifact operation failed"
            ),
            _ => tracing::warn!(
                op,
                namespace = %namespace,
                remote_name,
                kind = kind.class_name(),
                error = %err,
                "artifact operation failed"
            ),
        }
    }
    result
}
