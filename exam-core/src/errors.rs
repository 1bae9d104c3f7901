//! # Errors
//!
//! Every store operation in this workspace classifies its failure into one
//! of a handful of kinds. The kind is what callers branch on:
//! - `NotFound` means the record, field or object is absent
//! - `Transport` means the store could not be reached or refused the call
//! - `Invalid` means the input was rejected before reaching the store
//!
//! Crate-level error enums (`RecordError`, `BlobError`) expose `kind()` and
//! can be lifted into an [`ExamError`] at the application edge.

use std::fmt;

use anyhow::Error as AnyError;

/// A convenience result type for application-edge APIs.
pub type ExamResult<T> = std::result::Result<T, AnyError>;

/// Failure classes shared by every adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Invalid,
    Transport,
    Fatal,
}

impl ErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::Conflict => "Conflict",
            ErrorKind::Invalid => "Invalid",
            ErrorKind::Transport => "Transport",
            ErrorKind::Fatal => "Fatal",
        }
    }

    /// Kebab-cased name, used in structured log fields.
    pub fn class_name(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not-found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Invalid => "invalid",
            ErrorKind::Transport => "transport",
            ErrorKind::Fatal => "fatal",
        }
    }

    /// Whether repeating the same call could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Transport)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Anything that can report an [`ErrorKind`].
pub trait Classify {
    fn kind(&self) -> ErrorKind;
}

/// A structured error that can live inside `anyhow::Error`.
#[derive(Debug)]
pub struct ExamError {
    pub kind: ErrorKind,
    pub message: String,
    pub source: Option<AnyError>,
}

impl ExamError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: AnyError) -> Self {
        self.source = Some(source);
        self
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }

    /// Lift a classified crate error, keeping it as the source.
    pub fn from_classified<E>(err: E) -> Self
    where
        E: Classify + std::error::Error + Send + Sync + 'static,
    {
        let kind = err.kind();
        let message = err.to_string();
        Self::new(kind, message).with_source(AnyError::new(err))
    }

    pub fn into_anyhow(self) -> AnyError {
        AnyError::new(self)
    }

    /// Downcast an `anyhow::Error` to an `ExamError` if possible.
    pub fn from_anyhow(err: &AnyError) -> Option<&ExamError> {
        err.downcast_ref::<ExamError>()
    }

    /// Turn any error into an `ExamError`:
    /// - if it's already an `ExamError`, keep it
    /// - otherwise wrap as `Transport`
    pub fn normalize(err: AnyError) -> ExamError {
        match err.downcast::<ExamError>() {
            Ok(exam) => exam,
            Err(other) => ExamError::new(ErrorKind::Transport, other.to_string()).with_source(other),
        }
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, msg)
    }
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, msg)
    }
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Invalid, msg)
    }
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, msg)
    }
    pub fn fatal(msg: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fatal, msg)
    }
}

impl Classify for ExamError {
    fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for ExamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name(), self.message)
    }
}

impl std::error::Error for ExamError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Bail out of an `anyhow` function with an `ExamError`.
#[macro_export]
macro_rules! bail_exam {
    ($ctor:ident, $msg:expr) => {
        return Err($crate::errors::ExamError::$ctor($msg).into_anyhow());
    };
    ($ctor:ident, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::errors::ExamError::$ctor(format!($fmt, $($arg)*)).into_anyhow());
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fails_fatally() -> ExamResult<()> {
        bail_exam!(fatal, "credentials missing at {}", "/etc/creds.json");
    }

    #[test]
    fn normalize_keeps_exam_errors() {
        let err = ExamError::not_found("users/alice").into_anyhow();
        let normalized = ExamError::normalize(err);
        assert_eq!(normalized.kind, ErrorKind::NotFound);
        assert_eq!(normalized.message, "users/alice");
    }

    #[test]
    fn normalize_wraps_foreign_errors_as_transport() {
        let err = anyhow::anyhow!("connection reset");
        let normalized = ExamError::normalize(err);
        assert_eq!(normalized.kind, ErrorKind::Transport);
        assert!(normalized.kind.is_retryable());
        assert!(normalized.source.is_some());
    }

    #[test]
    fn bail_macro_produces_downcastable_error() {
        let err = fails_fatally().unwrap_err();
        let exam = ExamError::from_anyhow(&err).expect("exam error");
        assert_eq!(exam.kind, ErrorKind::Fatal);
        assert_eq!(exam.to_string(), "Fatal: credentials missing at /etc/creds.json");
    }

    #[derive(Debug)]
    struct Refused;

    impl fmt::Display for Refused {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("connection refused")
        }
    }

    impl std::error::Error for Refused {}

    impl Classify for Refused {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Transport
        }
    }

    #[test]
    fn from_classified_keeps_kind_and_source() {
        let exam = ExamError::from_classified(Refused);
        assert_eq!(exam.kind, ErrorKind::Transport);
        assert_eq!(exam.message, "connection refused");
        assert!(std::error::Error::source(&exam).is_some());
    }
}
