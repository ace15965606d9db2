//! Application error types for storage, domain, and sync logic.
use thiserror::Error;

/// Top-level storage/domain error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] redb::Error),

    #[error("Storage error: {0}")]
    StorageMessage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("Not found")]
    NotFound,

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<redb::DatabaseError> for AppError {
    fn from(value: redb::DatabaseError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::TransactionError> for AppError {
    fn from(value: redb::TransactionError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::TableError> for AppError {
    fn from(value: redb::TableError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::StorageError> for AppError {
    fn from(value: redb::StorageError) -> Self {
        Self::Database(value.into())
    }
}

impl From<redb::CommitError> for AppError {
    fn from(value: redb::CommitError) -> Self {
        Self::Database(value.into())
    }
}

/// Failures surfaced by the client-side sync layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The request never produced a usable response (connect, timeout, decode).
    #[error("Network error: {0}")]
    Transport(String),

    /// The backend answered with `success: false`.
    #[error("{0}")]
    Backend(String),

    /// An operation that needs an authenticated user was called without one.
    #[error("No authenticated user")]
    MissingUser,

    /// A delete of the same page is already outstanding.
    #[error("Delete of '{id}' is already in progress")]
    InFlight { id: String },

    /// A response arrived after a newer request for the same data was issued.
    #[error("Result superseded by a newer request")]
    Superseded,
}
