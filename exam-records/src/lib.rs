//! # exam-records: per-user exam record documents
//!
//! Each user owns one document in the `users` collection. Course entries
//! live under keys derived from free-text course labels; a few reserved
//! top-level fields (such as `All_Exams_Venue`) sit alongside them.
//!
//! ```rust
//! use exam_records::prelude::*;
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() -> RecordResult<()> {
//! let records = RecordAdapter::new(MemoryDocumentStore::new());
//!
//! records
//!     .upsert_course_entry(
//!         "user-42",
//!         "UGBS303 - COMPUTER APPLICATIONS IN MANAGEMENT",
//!         &json!({ "course_code": "UGBS303", "Exact_Exams_Venue": "JQB 23" }),
//!     )
//!     .await?;
//!
//! let venue = records
//!     .get_field("user-42", "UGBS303 - COMPUTER APPLICATIONS IN MANAGEMENT", "Exact_Exams_Venue")
//!     .await?;
//! assert_eq!(venue, Some(json!("JQB 23")));
//! # Ok(())
//! # }
//! ```
//!
//! ```text
//! ┌─────────────────┐
//! │  RecordAdapter  │  ← key derivation, create-vs-update, logging
//! ├─────────────────┤
//! │  DocumentStore  │  ← get / create / update(field paths) / delete
//! └─────────────────┘
//! ```

pub mod adapter;
pub mod document;
mod error;
mod json_file;
pub mod keys;
mod memory;
pub mod schema;
pub mod store;

pub use adapter::{RecordAdapter, USERS_COLLECTION};
pub use error::{RecordError, RecordResult};
pub use json_file::JsonFileDocumentStore;
pub use keys::{course_key, is_reserved_field, sanitize_course_key, ALL_EXAMS_VENUE, RESERVED_FIELDS};
pub use memory::MemoryDocumentStore;
pub use schema::CourseEntry;
pub use store::{Document, DocumentRef, DocumentStore, FieldPath, FieldUpdate, FieldUpdates};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        CourseEntry, Document, DocumentStore, MemoryDocumentStore, RecordAdapter, RecordError,
        RecordResult,
    };
}
