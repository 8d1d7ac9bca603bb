//! RabbitMQ management API client (reqwest-based).
//!
//! Every call is authenticated with the administrative credentials and runs
//! under the configured [`RetryPolicy`].

use crate::config::{AdminCredentials, BrokerConfig};
use crate::error::{AdminApiError, AdminApiResult};
use crate::models::{PermissionSet, UserRecord, VhostPermission};
use crate::retry::{RetryPolicy, Sleeper, TokioSleeper};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::borrow::Cow;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Successful management API response.
#[derive(Debug, Clone)]
pub struct AdminResponse {
    pub status: u16,
    pub body: String,
}

impl AdminResponse {
    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> AdminApiResult<T> {
        serde_json::from_str(&self.body)
            .map_err(|e| AdminApiError::Parse(format!("Failed to parse response: {e}")))
    }
}

/// Client for privileged management API calls.
///
/// Cloning is cheap; clones share the connection pool and sleeper.
#[derive(Clone)]
pub struct AdminClient {
    /// Base URL of the management API, without trailing slash.
    base_url: String,
    admin: AdminCredentials,
    http_client: Client,
    retry_policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("base_url", &self.base_url)
            .field("admin", &self.admin)
            .field("retry_policy", &self.retry_policy)
            .finish_non_exhaustive()
    }
}

impl AdminClient {
    /// Create a client whose HTTP pool applies the configured per-attempt timeout.
    pub fn new(config: &BrokerConfig) -> AdminApiResult<Self> {
        let http_client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("rmq-provisioner/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_http_client(config, http_client))
    }

    /// Create a client with a pre-built `reqwest::Client` (for testing).
    #[must_use]
    pub fn with_http_client(config: &BrokerConfig, http_client: Client) -> Self {
        Self {
            base_url: config.management_url.trim_end_matches('/').to_string(),
            admin: config.admin.clone(),
            http_client,
            retry_policy: config.retry_policy.clone(),
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// Replace the sleeper used between retry attempts.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Underlying HTTP client, shared with the requester authenticator.
    #[must_use]
    pub fn http_client(&self) -> &Client {
        &self.http_client
    }

    // ── Generic call ──────────────────────────────────────────────────

    /// Issue `method path` with an optional JSON body, retrying per policy.
    ///
    /// `path` is appended verbatim to the base URL; callers encode name
    /// segments with [`encode_segment`].
    pub async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> AdminApiResult<AdminResponse> {
        let url = format!("{}{}", self.base_url, path);
        let operation = format!("{method} {path}");
        self.retry_policy
            .execute(self.sleeper.as_ref(), &operation, || {
                self.send_once(&method, &url, path, body.as_ref())
            })
            .await
    }

    // ── Broker operations ─────────────────────────────────────────────

    /// List every vhost permission held by `username` (GET /api/users/:user/permissions).
    pub async fn list_user_permissions(
        &self,
        username: &str,
    ) -> AdminApiResult<Vec<VhostPermission>> {
        let path = format!("/api/users/{}/permissions", encode_segment(username));
        self.call(Method::GET, &path, None).await?.json()
    }

    /// Create or overwrite a user (PUT /api/users/:user).
    pub async fn put_user(&self, username: &str, record: &UserRecord) -> AdminApiResult<()> {
        let path = format!("/api/users/{}", encode_segment(username));
        self.call(Method::PUT, &path, Some(to_json(record)?)).await?;
        Ok(())
    }

    /// Set a user's permissions on a vhost (PUT /api/permissions/:vhost/:user).
    pub async fn put_permissions(
        &self,
        vhost: &str,
        username: &str,
        permissions: &PermissionSet,
    ) -> AdminApiResult<()> {
        let path = format!(
            "/api/permissions/{}/{}",
            encode_segment(vhost),
            encode_segment(username)
        );
        self.call(Method::PUT, &path, Some(to_json(permissions)?))
            .await?;
        Ok(())
    }

    // ── Single attempt ────────────────────────────────────────────────

    async fn send_once(
        &self,
        method: &Method,
        url: &str,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> AdminApiResult<AdminResponse> {
        debug!("RabbitMQ {} {}", method, path);
        let mut builder = self
            .http_client
            .request(method.clone(), url)
            .basic_auth(&self.admin.username, Some(&self.admin.password));
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(method = %method, path, error = %e, "Connection error on management API call");
            AdminApiError::Transport(e)
        })?;

        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            return Ok(AdminResponse {
                status: status.as_u16(),
                body,
            });
        }

        let detail = response
            .text()
            .await
            .ok()
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| format!("HTTP {status}"));

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                error!(
                    method = %method,
                    path,
                    status = status.as_u16(),
                    "Management API rejected the administrative credentials; verify ADMIN_USERNAME and ADMIN_PASSWORD"
                );
                Err(AdminApiError::AdminCredentialsRejected {
                    status: status.as_u16(),
                })
            }
            _ => {
                warn!(
                    method = %method,
                    path,
                    status = status.as_u16(),
                    detail = %detail,
                    "HTTP error on management API call"
                );
                Err(AdminApiError::Http {
                    status: status.as_u16(),
                    detail,
                })
            }
        }
    }
}

/// Percent-encode a name for use as one URL path segment.
///
/// The default vhost `/` becomes `%2F`.
#[must_use]
pub fn encode_segment(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

fn to_json<T: Serialize>(value: &T) -> AdminApiResult<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| AdminApiError::Parse(format!("Failed to encode request body: {e}")))
}
