use thiserror::Error;

use crate::renewal::expiry::ExpiryError;
use crate::renewal::validator::ValidationError;

/// Message returned to callers when a reminder could not be delivered.
/// The transport's own error is logged, never returned.
pub const DELIVERY_FAILURE_MESSAGE: &str = "Failed to send email, please try again later";

#[derive(Error, Debug)]
pub enum RenewalError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Expiry(#[from] ExpiryError),

    #[error("Persistence failure: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Record not found: {0}")]
    RecordNotFound(i64),

    #[error("No data rows to import")]
    NoRows,

    #[error("{0}")]
    DeliveryFailure(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failures of a persistence collaborator. A failed save never leaves a
/// partially written store behind.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage encoding error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("corrupt stored record {id}: {reason}")]
    Corrupt { id: i64, reason: String },
}

pub type Result<T> = std::result::Result<T, RenewalError>;
