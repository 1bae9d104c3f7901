use exam_core::{Classify, ErrorKind};
use thiserror::Error;

/// Result type for blob operations
pub type BlobResult<T> = Result<T, BlobError>;

/// Errors that can occur during artifact operations
#[derive(Error, Debug)]
pub enum BlobError {
    #[error("Blob not found: {key}")]
    NotFound { key: String },

    #[error("Local file not found: {path}")]
    LocalFileNotFound { path: String },

    #[error("Invalid request: {message}")]
    Invalid { message: String },

    #[error("Upload failed: {reason}")]
    UploadFailed { reason: String },

    #[error("Could not make {key} public: {reason}")]
    VisibilityFailed { key: String, reason: String },

    #[error("Storage transport error: {message}")]
    Transport { message: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl BlobError {
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid {
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(key: S) -> Self {
        Self::NotFound { key: key.into() }
    }

    pub fn local_file_not_found<S: Into<String>>(path: S) -> Self {
        Self::LocalFileNotFound { path: path.into() }
    }

    pub fn upload_failed<S: Into<String>>(reason: S) -> Self {
        Self::UploadFailed {
            reason: reason.into(),
        }
    }

    pub fn visibility_failed<K: Into<String>, S: Into<String>>(key: K, reason: S) -> Self {
        Self::VisibilityFailed {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

impl Classify for BlobError {
    fn kind(&self) -> ErrorKind {
        match self {
            BlobError::NotFound { .. } | BlobError::LocalFileNotFound { .. } => ErrorKind::NotFound,
            BlobError::Invalid { .. } => ErrorKind::Invalid,
            BlobError::UploadFailed { .. }
            | BlobError::VisibilityFailed { .. }
            | BlobError::Transport { .. }
            | BlobError::Io { .. } => ErrorKind::Transport,
        }
    }
}
