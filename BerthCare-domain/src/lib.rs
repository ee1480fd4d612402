// BerthCare Domain
// Process configuration, health reporting and device session tokens shared
// by the API binary

// Access and refresh tokens
pub mod auth;

// Configuration loaded from the environment
pub mod config;

// Health checks and system status
pub mod health;

// Re-export the database module from the data crate for convenience
pub use berthcare_data::database;
