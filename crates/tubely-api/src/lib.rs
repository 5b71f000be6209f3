//! Tubely API Library
//!
//! HTTP handlers, bearer authentication, application setup and telemetry for
//! the video ingestion service.

mod api_doc;
pub mod constants;
mod handlers;
mod telemetry;
mod utils;

// Public modules
pub mod auth;
pub mod error;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
