use exam_core::{Classify, ErrorKind};
use thiserror::Error;

/// Result type for record operations
pub type RecordResult<T> = Result<T, RecordError>;

/// Errors that can occur while reading or writing user records
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Document not found: {path}")]
    DocumentNotFound { path: String },

    #[error("Document already exists: {path}")]
    AlreadyExists { path: String },

    #[error("Invalid request: {message}")]
    Invalid { message: String },

    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    #[error("Storage backend error: {source}")]
    Backend {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl RecordError {
    pub fn backend<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend {
            source: Box::new(error),
        }
    }

    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(path: S) -> Self {
        Self::DocumentNotFound { path: path.into() }
    }

    pub fn already_exists<S: Into<String>>(path: S) -> Self {
        Self::AlreadyExists { path: path.into() }
    }

    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl Classify for RecordError {
    fn kind(&self) -> ErrorKind {
        match self {
            RecordError::DocumentNotFound { .. } => ErrorKind::NotFound,
            RecordError::AlreadyExists { .. } => ErrorKind::Conflict,
            RecordError::Invalid { .. } => ErrorKind::Invalid,
            RecordError::Unavailable { .. }
            | RecordError::Backend { .. }
            | RecordError::Io { .. } => ErrorKind::Transport,
        }
    }
}
