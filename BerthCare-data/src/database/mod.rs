use thiserror::Error;

// Database modules
pub mod connection;
pub mod migrations;

// Re-export database connection types
pub use connection::{Database, DatabaseConfig};

/// Database error enum
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLite error
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error
    #[error("SQLite connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Config(String),

    /// Filesystem error while preparing the database location
    #[error("Database I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Migration error
    #[error("Database migration error: {0}")]
    Migration(String),

    /// The file was written by a newer build
    #[error("Database schema version {db_version} is newer than supported version {latest_supported}")]
    UnsupportedSchemaVersion { db_version: u32, latest_supported: u32 },

    /// The handle was closed by its owner
    #[error("Database client is closed")]
    Closed,

    /// Blocking task failed to complete
    #[error("Database task failed: {0}")]
    Task(String),
}
