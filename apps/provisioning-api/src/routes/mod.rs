//! HTTP routes.

mod health;
mod provision;

pub use health::{health_handler, HealthResponse};
pub use provision::provision_handler;
