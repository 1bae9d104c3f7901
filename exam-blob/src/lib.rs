//! # exam-blob: artifact lifecycle on object storage
//!
//! Screenshots and calendar exports are produced as local files, published
//! to a bucket under `screenshots/` or `calendars/`, and referenced by URL
//! from then on.
//!
//! ```rust
//! use exam_blob::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> BlobResult<()> {
//! let dir = tempfile::tempdir()?;
//! let shot = dir.path().join("timetable.png");
//! std::fs::write(&shot, b"\x89PNG")?;
//!
//! let artifacts = ArtifactAdapter::new(MemoryBlobStore::new(), BlobConfig::default());
//! let receipt = artifacts.upload_artifact(&shot, "user-42.png", Namespace::Screenshots).await?;
//!
//! assert_eq!(receipt.key, "screenshots/user-42.png");
//! assert!(!shot.exists());
//! # Ok(())
//! # }
//! ```
//!
//! ```text
//! ┌─────────────────┐
//! │ ArtifactAdapter │  ← upload → public → url → remove local
//! ├─────────────────┤
//! │    BlobStore    │  ← storage primitives
//! └─────────────────┘
//! ```

pub mod adapter;
mod config;
mod error;
mod memory;
mod s3_store;
pub mod store;
mod types;

pub use adapter::ArtifactAdapter;
pub use config::BlobConfig;
pub use error::{BlobError, BlobResult};
pub use memory::MemoryBlobStore;
pub use s3_store::{S3CompatibleStore, S3Config};
pub use store::{BlobStore, ObjectHead, PutResult};
pub use types::{content_type_for, encode_object_key, ArtifactReceipt, Namespace};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        ArtifactAdapter, ArtifactReceipt, BlobConfig, BlobError, BlobResult, BlobStore,
        MemoryBlobStore, Namespace,
    };
}
