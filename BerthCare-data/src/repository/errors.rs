use rusqlite::ErrorCode;
use thiserror::Error;

use crate::database::DatabaseError;

/// Error type for repository operations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Caller supplied an unusable value
    #[error("Validation error: {0}")]
    Validation(String),

    /// Record is missing or hidden by its deletion policy
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Relation, uniqueness or check constraint rejected the write
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),
}

impl RepositoryError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        RepositoryError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(error: rusqlite::Error) -> Self {
        match &error {
            rusqlite::Error::SqliteFailure(failure, message)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                RepositoryError::ConstraintViolation(
                    message.clone().unwrap_or_else(|| failure.to_string()),
                )
            }
            _ => RepositoryError::Sqlite(error),
        }
    }
}

impl From<r2d2::Error> for RepositoryError {
    fn from(error: r2d2::Error) -> Self {
        RepositoryError::Database(DatabaseError::Pool(error))
    }
}
