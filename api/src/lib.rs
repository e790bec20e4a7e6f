//! HTTP surface of the CareerPilot session service.
//!
//! Exposed as a library so integration tests can build the full app over an
//! in-memory repository.

pub mod app;
pub mod cookies;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod telemetry;

pub use app::{create_app, AppState};
