// BerthCare-api lib.rs
//
// HTTP shell for the BerthCare backend: router, handlers, request ids,
// redacted logging and API documentation.

pub mod api;
pub mod logging;
pub mod openapi;
pub mod request_id;
pub mod state;

pub use api::create_app;
pub use state::AppState;
