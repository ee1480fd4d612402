//! Database connection module for the BerthCare backend
//!
//! A [`Database`] is built once by the process entry point and a clone of it is
//! handed to every repository. All clones share one SQLite connection pool.
//! The owner calls [`Database::close`] on shutdown; any later call fails with
//! [`DatabaseError::Closed`].

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use tracing::{debug, error, info};

use super::migrations;
use super::DatabaseError;

/// Pool type shared by every clone of a [`Database`]
pub type SqlitePool = Pool<SqliteConnectionManager>;

const DEFAULT_SQLITE_PATH: &str = "./data/berthcare.db";
const MEMORY_LOCATION: &str = ":memory:";

/// Database configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file, `None` for a private in-memory database
    pub sqlite_path: Option<PathBuf>,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Connection checkout timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            sqlite_path: Some(PathBuf::from(DEFAULT_SQLITE_PATH)),
            max_connections: 10,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Configuration for a throwaway in-memory database.
    ///
    /// Every SQLite in-memory connection is its own database, so the pool is
    /// pinned to a single connection that never expires.
    pub fn in_memory() -> Self {
        Self {
            sqlite_path: None,
            max_connections: 1,
            timeout_seconds: 30,
        }
    }

    /// Create a new database configuration from environment variables
    pub fn from_env() -> Result<Self, DatabaseError> {
        let defaults = Self::default();

        let sqlite_path = match env::var("DB_SQLITE_PATH") {
            Ok(path) if path.trim() == MEMORY_LOCATION => None,
            Ok(path) if !path.trim().is_empty() => Some(PathBuf::from(path.trim())),
            _ => defaults.sqlite_path,
        };

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(defaults.max_connections);

        if max_connections == 0 {
            return Err(DatabaseError::Config(
                "DB_MAX_CONNECTIONS must be greater than zero".to_string(),
            ));
        }

        let timeout_seconds = env::var("DB_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(defaults.timeout_seconds);

        let config = match sqlite_path {
            Some(path) => DatabaseConfig {
                sqlite_path: Some(path),
                max_connections,
                timeout_seconds,
            },
            None => DatabaseConfig {
                timeout_seconds,
                ..DatabaseConfig::in_memory()
            },
        };

        info!(
            "Database configuration: path={}, max_connections={}, timeout={}s",
            config.location(),
            config.max_connections,
            config.timeout_seconds
        );

        Ok(config)
    }

    /// Human readable location of the database
    pub fn location(&self) -> String {
        match &self.sqlite_path {
            Some(path) => path.display().to_string(),
            None => MEMORY_LOCATION.to_string(),
        }
    }
}

struct DatabaseInner {
    pool: SqlitePool,
    location: String,
    closed: AtomicBool,
}

/// Explicitly constructed data client shared by all repositories
#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl fmt::Debug for Database {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("location", &self.inner.location)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Database {
    /// Open the connection pool described by `config`
    pub fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let timeout = Duration::from_secs(config.timeout_seconds);

        let pool = match &config.sqlite_path {
            Some(path) => {
                ensure_parent_dir(path)?;
                info!("Opening SQLite database at: {}", path.display());

                let manager = SqliteConnectionManager::file(path)
                    .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE)
                    .with_init(|conn| {
                        conn.execute_batch(
                            "PRAGMA foreign_keys = ON;
                             PRAGMA journal_mode = WAL;
                             PRAGMA busy_timeout = 5000;",
                        )
                    });

                Pool::builder()
                    .max_size(config.max_connections)
                    .connection_timeout(timeout)
                    .build(manager)?
            }
            None => {
                info!("Opening in-memory SQLite database");

                let manager = SqliteConnectionManager::memory()
                    .with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"));

                Pool::builder()
                    .max_size(1)
                    .min_idle(Some(1))
                    .max_lifetime(None)
                    .idle_timeout(None)
                    .connection_timeout(timeout)
                    .build(manager)?
            }
        };

        debug!("SQLite connection pool created");

        Ok(Self {
            inner: Arc::new(DatabaseInner {
                pool,
                location: config.location(),
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// Open a fresh in-memory database
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::connect(&DatabaseConfig::in_memory())
    }

    /// Location this client was opened against
    pub fn location(&self) -> &str {
        &self.inner.location
    }

    /// Whether [`Database::close`] has been called on any clone
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Stop serving new work. Pooled connections are released when the last
    /// clone is dropped.
    pub fn close(&self) {
        if !self.inner.closed.swap(true, Ordering::AcqRel) {
            info!("Database client closed: {}", self.inner.location);
        }
    }

    /// Run `f` against a pooled connection on the blocking thread pool
    pub async fn with_connection<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Connection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<DatabaseError> + Send + 'static,
    {
        if self.is_closed() {
            return Err(DatabaseError::Closed.into());
        }

        let pool = self.inner.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(DatabaseError::from)?;
            f(&mut conn)
        })
        .await
        .map_err(|e| DatabaseError::Task(e.to_string()))?
    }

    /// Apply pending schema migrations, returning the resulting schema version
    pub async fn migrate(&self) -> Result<u32, DatabaseError> {
        self.with_connection(|conn| {
            migrations::apply_migrations(conn)?;
            migrations::current_version(conn)
        })
        .await
    }

    /// Round-trip a trivial query
    pub async fn ping(&self) -> Result<(), DatabaseError> {
        self.with_connection(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await
    }

    /// Describe the pool for diagnostics
    pub fn connection_info(&self) -> String {
        let state = self.inner.pool.state();
        let location = if self.inner.location == MEMORY_LOCATION {
            "SQLite in-memory database".to_string()
        } else {
            format!("SQLite database at {}", self.inner.location)
        };

        format!(
            "{} (connections: active={}, idle={})",
            location, state.connections, state.idle_connections
        )
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), DatabaseError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            info!("Creating parent directory: {:?}", parent);
            fs::create_dir_all(parent).map_err(|e| {
                error!("Failed to create directory {:?}: {}", parent, e);
                DatabaseError::Io(e)
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.sqlite_path, Some(PathBuf::from("./data/berthcare.db")));
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_in_memory_config_uses_single_connection() {
        let config = DatabaseConfig::in_memory();
        assert!(config.sqlite_path.is_none());
        assert_eq!(config.max_connections, 1);
        assert_eq!(config.location(), ":memory:");
    }

    #[tokio::test]
    async fn test_in_memory_database_keeps_state_between_calls() {
        let db = Database::open_in_memory().unwrap();

        db.with_connection(|conn| {
            conn.execute_batch("CREATE TABLE probe (value INTEGER); INSERT INTO probe VALUES (7);")?;
            Ok::<_, DatabaseError>(())
        })
        .await
        .unwrap();

        let value = db
            .with_connection(|conn| {
                Ok::<_, DatabaseError>(conn.query_row("SELECT value FROM probe", [], |row| {
                    row.get::<_, i64>(0)
                })?)
            })
            .await
            .unwrap();

        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_foreign_keys_are_enforced() {
        let db = Database::open_in_memory().unwrap();
        let enabled = db
            .with_connection(|conn| {
                Ok::<_, DatabaseError>(conn.query_row("PRAGMA foreign_keys", [], |row| {
                    row.get::<_, i64>(0)
                })?)
            })
            .await
            .unwrap();

        assert_eq!(enabled, 1);
    }

    #[tokio::test]
    async fn test_closed_database_rejects_work() {
        let db = Database::open_in_memory().unwrap();
        let clone = db.clone();
        db.close();

        assert!(clone.is_closed());
        assert!(matches!(clone.ping().await, Err(DatabaseError::Closed)));
    }

    #[tokio::test]
    async fn test_file_database_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("berthcare.db");
        let config = DatabaseConfig {
            sqlite_path: Some(path.clone()),
            max_connections: 2,
            timeout_seconds: 5,
        };

        let db = Database::connect(&config).unwrap();
        db.ping().await.unwrap();

        assert!(path.parent().unwrap().exists());
        assert!(db.connection_info().contains("SQLite database at"));
    }
}
