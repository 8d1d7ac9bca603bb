//! HTTP front end for self-service RabbitMQ user provisioning.

pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};

pub use state::AppState;

/// Build the service router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/provision", post(routes::provision_handler))
        .route("/health", get(routes::health_handler))
        .with_state(state)
}
