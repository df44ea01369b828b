//! Unified error types for the vendor ledger.
//!
//! Store errors travel through the service unchanged, except where a multi-step
//! mutation has already committed its first write. Those are wrapped in
//! [`Error::PartialFailure`] so the caller knows a reconciliation pass is needed.

use sea_orm::DbErr;
use thiserror::Error;

/// Every failure the ledger can report to its caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input, reported with the offending field.
    #[error("Invalid {field}: {message}")]
    Validation {
        /// Name of the rejected input field
        field: &'static str,
        /// Human-readable reason
        message: String,
    },

    /// The caller does not own the target record.
    #[error("Not authorized to access {entity} {id}")]
    NotAuthorized {
        /// Kind of record (`"vendor"`, `"payment"`)
        entity: &'static str,
        /// Primary key of the record
        id: i64,
    },

    /// The referenced record does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Kind of record (`"vendor"`, `"payment"`)
        entity: &'static str,
        /// Primary key of the record
        id: i64,
    },

    /// A versioned write lost against a concurrent writer.
    #[error("{entity} {id} was modified concurrently (expected version {expected_version})")]
    Conflict {
        /// Kind of record
        entity: &'static str,
        /// Primary key of the record
        id: i64,
        /// Version the writer read before computing its update
        expected_version: i32,
    },

    /// A multi-step mutation committed some of its steps but not all of them.
    #[error("{operation} partially applied ({detail}): {source}")]
    PartialFailure {
        /// Name of the service operation
        operation: &'static str,
        /// What was already committed
        detail: String,
        /// The step that failed
        #[source]
        source: Box<Error>,
    },

    /// The persistence collaborator could not be reached.
    #[error("Storage unavailable: {message}")]
    TransientIo {
        /// Underlying connection error
        message: String,
    },

    /// Any other storage failure.
    #[error("Database error: {0}")]
    Database(#[source] DbErr),

    /// Configuration could not be loaded or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable reason
        message: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub(crate) fn partial(operation: &'static str, detail: impl Into<String>, source: Self) -> Self {
        Self::PartialFailure {
            operation,
            detail: detail.into(),
            source: Box::new(source),
        }
    }

    /// Whether retrying the whole operation (or running a reconciliation pass) can succeed.
    ///
    /// Transient I/O failures are treated as possibly partial, since the store offers no
    /// way to tell whether a write landed before the connection dropped.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TransientIo { .. } | Self::Conflict { .. } | Self::PartialFailure { .. }
        )
    }
}

impl From<DbErr> for Error {
    fn from(value: DbErr) -> Self {
        match value {
            DbErr::ConnectionAcquire(e) => Self::TransientIo {
                message: e.to_string(),
            },
            DbErr::Conn(e) => Self::TransientIo {
                message: e.to_string(),
            },
            other => Self::Database(other),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
