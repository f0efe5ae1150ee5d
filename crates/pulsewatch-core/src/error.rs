//! Shared error type across pulsewatch crates.

use thiserror::Error;

/// Stable error codes (used in logs and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Two collectors tried to claim the same family name.
    DuplicateMetric,
    /// Invalid metric/label name or bucket layout.
    InvalidMetric,
    /// Wrong number of label values for an instrument.
    LabelMismatch,
    /// Config failed to parse or validate.
    BadConfig,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Anything else.
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::DuplicateMetric => "DUPLICATE_METRIC",
            ErrorKind::InvalidMetric => "INVALID_METRIC",
            ErrorKind::LabelMismatch => "LABEL_MISMATCH",
            ErrorKind::BadConfig => "BAD_CONFIG",
            ErrorKind::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, PulseError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum PulseError {
    #[error("duplicate metric: {0}")]
    DuplicateMetric(String),
    #[error("invalid metric: {0}")]
    InvalidMetric(String),
    #[error("label mismatch on {metric}: expected {expected} values, got {got}")]
    LabelMismatch {
        metric: String,
        expected: usize,
        got: usize,
    },
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl PulseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PulseError::DuplicateMetric(_) => ErrorKind::DuplicateMetric,
            PulseError::InvalidMetric(_) => ErrorKind::InvalidMetric,
            PulseError::LabelMismatch { .. } => ErrorKind::LabelMismatch,
            PulseError::BadConfig(_) => ErrorKind::BadConfig,
            PulseError::UnsupportedVersion => ErrorKind::UnsupportedVersion,
            PulseError::Internal(_) => ErrorKind::Internal,
        }
    }
}
