//! exam-core: shared error kinds, configuration and logging setup.

pub mod config;
pub mod errors;
pub mod logging;

pub use config::{ExamConfig, ExamConfigSnapshot, ENV_PREFIX};
pub use errors::{Classify, ErrorKind, ExamError, ExamResult};
pub use logging::{init_logging_default, init_logging_json};
