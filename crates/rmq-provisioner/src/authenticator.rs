//! Verification of the requester's own broker credentials.

use reqwest::{Client, StatusCode};
use tracing::{info, warn};

/// Checks a requester's username and password against `GET /api/whoami`.
///
/// Uses the caller-supplied credentials, never the administrative ones, and
/// makes exactly one attempt: wrong credentials and an unreachable broker both
/// yield `false`.
#[derive(Debug, Clone)]
pub struct RequesterAuthenticator {
    base_url: String,
    http_client: Client,
}

impl RequesterAuthenticator {
    #[must_use]
    pub fn new(base_url: impl Into<String>, http_client: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http_client,
        }
    }

    /// Whether the broker accepts `username`/`password`.
    pub async fn authenticate(&self, username: &str, password: &str) -> bool {
        let url = format!("{}/api/whoami", self.base_url);
        let response = match self
            .http_client
            .get(&url)
            .basic_auth(username, Some(password))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(requester = %username, error = %e, "Identity check could not reach the broker");
                return false;
            }
        };

        if response.status() == StatusCode::OK {
            info!(requester = %username, "Requester identity verified");
            true
        } else {
            warn!(
                requester = %username,
                status = response.status().as_u16(),
                "Requester identity rejected"
            );
            false
        }
    }
}
