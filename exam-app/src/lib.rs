//! Process bootstrap: configuration in, ready adapters out.
//!
//! Store clients are built once here and shared by handle. Any failure is
//! fatal; callers are expected to abort rather than retry.
//!
//! ```rust
//! use exam_core::ExamConfig;
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = ExamConfig::new()
//!     .with("records.backend", "memory")
//!     .with("blob.backend", "memory");
//!
//! let services = exam_app::bootstrap(&config).await?;
//! assert_eq!(services.records.collection(), "users");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use anyhow::Context;
use exam_blob::{ArtifactAdapter, BlobConfig, BlobStore, MemoryBlobStore, S3CompatibleStore, S3Config};
use exam_core::{ErrorKind, ExamConfig, ExamConfigSnapshot, ExamError};
use exam_records::{DocumentStore, JsonFileDocumentStore, MemoryDocumentStore, RecordAdapter, USERS_COLLECTION};

/// The two adapters the rest of the application talks to.
#[derive(Clone)]
pub struct ExamServices {
    pub records: RecordAdapter,
    pub artifacts: ArtifactAdapter,
}

/// Build both adapters from configuration.
///
/// Keys read:
/// - `records.backend`: `memory` (default) or `json`
/// - `records.path`: file for the `json` backend
/// - `records.collection`: defaults to `users`
/// - `blob.backend`: `memory` (default) or `s3`
/// - `blob.bucket`, `blob.region`, `blob.endpoint`, `blob.public_base_url`,
///   `blob.access_key_id`, `blob.secret_access_key`: for `s3`
/// - `blob.max_bytes`, `blob.keep_local`
pub async fn bootstrap(config: &ExamConfig) -> anyhow::Result<ExamServices> {
    let snapshot = config.snapshot();

    let documents = document_store(&snapshot)
        .await
        .map_err(fatal)
        .context("initializing document store")?;
    let blobs = blob_store(&snapshot)
        .await
        .map_err(fatal)
        .context("initializing blob store")?;

    let collection = snapshot.get_or("records.collection", USERS_COLLECTION);
    let records = RecordAdapter::from_shared(documents).with_collection(collection.as_str());
    let artifacts = ArtifactAdapter::from_shared(blobs, blob_config(&snapshot)?);

    tracing::info!(collection = %collection, "exam services ready");
    Ok(ExamServices { records, artifacts })
}

/// Mark a bootstrap failure as fatal, keeping an existing classification
/// as context.
fn fatal(err: anyhow::Error) -> anyhow::Error {
    let normalized = ExamError::normalize(err);
    if normalized.kind == ErrorKind::Fatal {
        return normalized.into_anyhow();
    }
    let message = normalized.message.clone();
    ExamError::fatal(message)
        .with_source(normalized.into_anyhow())
        .into_anyhow()
}

async fn document_store(config: &ExamConfigSnapshot) -> anyhow::Result<Arc<dyn DocumentStore>> {
    match config.get("records.backend").unwrap_or("memory") {
        "memory" => Ok(Arc::new(MemoryDocumentStore::new())),
        "json" => {
            let Some(path) = config.get("records.path") else {
                exam_core::bail_exam!(fatal, "records.path is required for the json backend");
            };
            let store = JsonFileDocumentStore::open(path)
                .await
                .map_err(ExamError::from_classified)?;
            Ok(Arc::new(store))
        }
        other => {
            exam_core::bail_exam!(fatal, "unknown records.backend '{}'", other);
        }
    }
}

async fn blob_store(config: &ExamConfigSnapshot) -> anyhow::Result<Arc<dyn BlobStore>> {
    match config.get("blob.backend").unwrap_or("memory") {
        "memory" => {
            let store = match config.get("blob.public_base_url") {
                Some(base) => MemoryBlobStore::with_base_url(base),
                None => MemoryBlobStore::new(),
            };
            Ok(Arc::new(store))
        }
        "s3" => {
            let Some(bucket) = config.get("blob.bucket") else {
                exam_core::bail_exam!(fatal, "blob.bucket is required for the s3 backend");
            };
            let mut s3 = S3Config::new(bucket);
            if let Some(region) = config.get("blob.region") {
                s3 = s3.with_region(region);
            }
            if let Some(endpoint) = config.get("blob.endpoint") {
                s3 = s3.with_endpoint(endpoint);
            }
            if let Some(base) = config.get("blob.public_base_url") {
                s3 = s3.with_public_base_url(base);
            }
            if let (Some(key_id), Some(secret)) = (
                config.get("blob.access_key_id"),
                config.get("blob.secret_access_key"),
            ) {
                s3 = s3.with_credentials(key_id, secret);
            }
            let store = S3CompatibleStore::connect(s3)
                .await
                .map_err(ExamError::from_classified)?;
            Ok(Arc::new(store))
        }
        other => {
            exam_core::bail_exam!(fatal, "unknown blob.backend '{}'", other);
        }
    }
}

fn blob_config(config: &ExamConfigSnapshot) -> anyhow::Result<BlobConfig> {
    let mut blob = BlobConfig::default();
    if let Some(raw) = config.get("blob.max_bytes") {
        let Some(max) = config.get_usize("blob.max_bytes") else {
            exam_core::bail_exam!(fatal, "blob.max_bytes must be a byte count, got '{}'", raw);
        };
        blob = blob.with_max_artifact_bytes(max as u64);
    }
    if let Some(raw) = config.get("blob.keep_local") {
        let Some(keep) = config.get_bool("blob.keep_local") else {
            exam_core::bail_exam!(fatal, "blob.keep_local must be true or false, got '{}'", raw);
        };
        if keep {
            blob = blob.keep_local_files();
        }
    }
    Ok(blob)
}
