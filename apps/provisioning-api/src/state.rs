//! Application state shared across all request handlers.

use rmq_provisioner::Provisioner;
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across all handlers.
///
/// Cloned per request; the provisioner sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub provisioner: Arc<Provisioner>,

    /// Service startup time for uptime calculation
    pub startup_time: Instant,

    pub version: &'static str,
}

impl AppState {
    #[must_use]
    pub fn new(provisioner: Provisioner) -> Self {
        Self {
            provisioner: Arc::new(provisioner),
            startup_time: Instant::now(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}
