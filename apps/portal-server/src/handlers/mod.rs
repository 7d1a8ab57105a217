//! Service endpoint handlers.

pub mod health;

pub use health::{health_handler, root_handler, HealthResponse, RootResponse};
