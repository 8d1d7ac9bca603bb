//! Mock RabbitMQ management API using wiremock.
//!
//! Provides canned management endpoints plus a sleeper that records retry
//! delays instead of waiting.

#![allow(dead_code)]

use async_trait::async_trait;
use rmq_provisioner::client::AdminClient;
use rmq_provisioner::retry::Sleeper;
use rmq_provisioner::{
    AdminCredentials, BrokerConfig, ConfigurePermissionPolicy, ProvisioningPayload, Provisioner,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{basic_auth, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const ADMIN_USER: &str = "svc-admin";
pub const ADMIN_PASS: &str = "svc-admin-pass";
pub const REQUESTER: &str = "dev-alice";
pub const REQUESTER_PASS: &str = "alice-pass";
pub const VHOST: &str = "orders";
pub const NEW_USER: &str = "orders-app";
pub const NEW_PASS: &str = "orders-app-pass";
pub const QUEUE: &str = "orders.events";

/// Sleeper that records requested delays and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

/// A mock management API with helpers for each endpoint the service uses.
pub struct MockRabbitMq {
    server: MockServer,
    sleeper: Arc<RecordingSleeper>,
}

impl MockRabbitMq {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
            sleeper: Arc::new(RecordingSleeper::default()),
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn server(&self) -> &MockServer {
        &self.server
    }

    pub fn sleeper(&self) -> &RecordingSleeper {
        &self.sleeper
    }

    pub fn config(&self) -> BrokerConfig {
        BrokerConfig::new(self.uri(), AdminCredentials::new(ADMIN_USER, ADMIN_PASS))
    }

    /// Admin client with the recording sleeper installed.
    pub fn client(&self) -> AdminClient {
        AdminClient::new(&self.config())
            .unwrap()
            .with_sleeper(self.sleeper.clone())
    }

    pub fn provisioner(&self) -> Provisioner {
        self.provisioner_with_policy(ConfigurePermissionPolicy::Passthrough)
    }

    pub fn provisioner_with_policy(&self, policy: ConfigurePermissionPolicy) -> Provisioner {
        Provisioner::new(self.client(), policy)
    }

    /// All requests received so far.
    pub async fn requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Number of received requests with the given method and path.
    pub async fn count(&self, http_method: &str, request_path: &str) -> usize {
        self.requests()
            .await
            .iter()
            .filter(|r| r.method.as_str() == http_method && r.url.path() == request_path)
            .count()
    }

    // =========================================================================
    // Identity check
    // =========================================================================

    /// `GET /api/whoami` succeeds for the requester's credentials only.
    pub async fn mock_whoami_ok(&self) {
        Mock::given(method("GET"))
            .and(path("/api/whoami"))
            .and(basic_auth(REQUESTER, REQUESTER_PASS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": REQUESTER,
                "tags": ["management"]
            })))
            .mount(&self.server)
            .await;
    }

    /// `GET /api/whoami` rejects every caller.
    pub async fn mock_whoami_rejected(&self) {
        Mock::given(method("GET"))
            .and(path("/api/whoami"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "not_authorised",
                "reason": "Login failed"
            })))
            .mount(&self.server)
            .await;
    }

    // =========================================================================
    // Permission lookup
    // =========================================================================

    /// `GET /api/users/{REQUESTER}/permissions` returns `entries` (admin auth required).
    pub async fn mock_requester_permissions(&self, entries: Value) {
        Mock::given(method("GET"))
            .and(path(format!("/api/users/{REQUESTER}/permissions")))
            .and(basic_auth(ADMIN_USER, ADMIN_PASS))
            .respond_with(ResponseTemplate::new(200).set_body_json(entries))
            .mount(&self.server)
            .await;
    }

    /// The requester holds `configure` on the default test vhost.
    pub async fn mock_requester_can_configure(&self) {
        self.mock_requester_permissions(json!([{
            "user": REQUESTER,
            "vhost": VHOST,
            "configure": ".*",
            "write": ".*",
            "read": ".*"
        }]))
        .await;
    }

    /// Passing identity and configure-rights checks.
    pub async fn mock_requester_authorized(&self) {
        self.mock_whoami_ok().await;
        self.mock_requester_can_configure().await;
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    pub async fn mock_put_user(&self, status: u16) {
        Mock::given(method("PUT"))
            .and(path(format!("/api/users/{NEW_USER}")))
            .and(basic_auth(ADMIN_USER, ADMIN_PASS))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    pub async fn mock_put_permissions(&self, status: u16) {
        Mock::given(method("PUT"))
            .and(path(format!("/api/permissions/{VHOST}/{NEW_USER}")))
            .and(basic_auth(ADMIN_USER, ADMIN_PASS))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Both mutations succeed the way RabbitMQ answers them (201 then 204).
    pub async fn mock_mutations_ok(&self) {
        self.mock_put_user(201).await;
        self.mock_put_permissions(204).await;
    }
}

/// A complete request body for the default test scenario.
pub fn payload_json() -> Value {
    json!({
        "requester_username": REQUESTER,
        "requester_password": REQUESTER_PASS,
        "target_vhost": VHOST,
        "new_username": NEW_USER,
        "new_password": NEW_PASS,
        "permissions": {
            "configure": "^orders\\.",
            "read": "^orders\\.",
            "write": "^orders\\."
        },
        "queue_name": QUEUE
    })
}

pub fn payload() -> ProvisioningPayload {
    serde_json::from_value(payload_json()).unwrap()
}

pub fn payload_from(value: Value) -> ProvisioningPayload {
    serde_json::from_value(value).unwrap()
}
