// BerthCare Data
// SQLite data client, schema migrations, storage models and repositories

// Database connection management
pub mod database;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;

pub use database::{Database, DatabaseConfig, DatabaseError};
pub use repository::{EntityRepository, Repositories, RepositoryError};
