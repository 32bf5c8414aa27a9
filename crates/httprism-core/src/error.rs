//! Shared error type across httprism crates.

use thiserror::Error;

/// Stable error codes (used by logs and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid metric schema or config file.
    Config,
    /// Metric name already registered.
    Duplicate,
    /// Wrong number of label values for an aggregate.
    LabelArity,
    /// Negative, NaN or infinite value where one is not allowed.
    InvalidValue,
    /// Internal error.
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Config => "CONFIG",
            ErrorKind::Duplicate => "DUPLICATE",
            ErrorKind::LabelArity => "LABEL_ARITY",
            ErrorKind::InvalidValue => "INVALID_VALUE",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, HttPrismError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum HttPrismError {
    #[error("invalid config: {0}")]
    Config(String),
    #[error("duplicate metric: {0}")]
    Duplicate(String),
    #[error("label arity mismatch: expected {expected} values, got {got}")]
    LabelArity { expected: usize, got: usize },
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl HttPrismError {
    /// Map to a stable code.
    pub fn kind(&self) -> ErrorKind {
        match self {
            HttPrismError::Config(_) => ErrorKind::Config,
            HttPrismError::Duplicate(_) => ErrorKind::Duplicate,
            HttPrismError::LabelArity { .. } => ErrorKind::LabelArity,
            HttPrismError::InvalidValue(_) => ErrorKind::InvalidValue,
            HttPrismError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Configuration errors are fatal at startup; everything else is a
    /// runtime defect.
    pub fn is_config(&self) -> bool {
        matches!(self, HttPrismError::Config(_) | HttPrismError::Duplicate(_))
    }
}
