pub mod auth;
pub mod care;
pub mod health;
pub mod observability;
pub mod records;

// Tests module
#[cfg(test)]
mod tests;

// Re-export handlers for easier imports
pub use auth::refresh_token;
pub use care::{caregiver_schedules, latest_client_visit, update_visit_documentation};
pub use health::{health_check, readiness_check};
pub use records::Resource;
