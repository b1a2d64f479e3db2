//! Error taxonomy for catalog operations.
//!
//! Every engine operation fails with one of these variants. Transports map
//! them onto their own envelopes; the engine never produces wire-specific
//! errors.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// Malformed or missing input. Caused by the client; never retryable.
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// No record matches the requested name.
    #[error("no book named '{name}'")]
    NotFound { name: String },

    /// The backing document could not be read or written.
    ///
    /// After a failed save the outcome of the mutation is unknown to the
    /// caller and must not be reported as success.
    #[error("storage failure: {cause}")]
    Storage { cause: String },

    /// A transport gave up waiting for the engine. The operation itself may
    /// still complete; the outcome is unknown.
    #[error("operation timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },
}

impl CatalogError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CatalogError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        CatalogError::NotFound { name: name.into() }
    }

    pub fn storage(cause: impl Into<String>) -> Self {
        CatalogError::Storage {
            cause: cause.into(),
        }
    }

    /// Stable, lowercase name of the variant for wire bodies and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CatalogError::Validation { .. } => "validation",
            CatalogError::NotFound { .. } => "not_found",
            CatalogError::Storage { .. } => "storage",
            CatalogError::Timeout { .. } => "timeout",
        }
    }

    /// Whether retrying the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CatalogError::Storage { .. } | CatalogError::Timeout { .. }
        )
    }

    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            CatalogError::Validation { .. } => 400,
            CatalogError::NotFound { .. } => 404,
            CatalogError::Storage { .. } => 500,
            CatalogError::Timeout { .. } => 504,
        }
    }

    /// The offending field for validation failures.
    pub fn field(&self) -> Option<&str> {
        match self {
            CatalogError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::storage(err.to_string())
    }
}
