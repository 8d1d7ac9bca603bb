//! Request, outcome and management API payload types.

use crate::error::FailureKind;
use serde::{Deserialize, Serialize};

/// Tags assigned to a new user when the request does not name any.
pub const DEFAULT_USER_TAGS: &str = "management";

// ── Management API payloads ───────────────────────────────────────────

/// One entry of `GET /api/users/{user}/permissions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VhostPermission {
    pub vhost: String,
    #[serde(default)]
    pub configure: Option<String>,
    #[serde(default)]
    pub write: Option<String>,
    #[serde(default)]
    pub read: Option<String>,
}

impl VhostPermission {
    /// Whether the entry carries a non-blank configure pattern.
    #[must_use]
    pub fn grants_configure(&self) -> bool {
        self.configure
            .as_deref()
            .is_some_and(|pattern| !pattern.trim().is_empty())
    }
}

/// Body of `PUT /api/permissions/{vhost}/{user}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSet {
    pub configure: String,
    pub write: String,
    pub read: String,
}

/// Body of `PUT /api/users/{user}`.
#[derive(Clone, Serialize)]
pub struct UserRecord {
    pub password: String,
    pub tags: String,
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("password", &"[REDACTED]")
            .field("tags", &self.tags)
            .finish()
    }
}

// ── Provisioning request ──────────────────────────────────────────────

/// Permission patterns as submitted by the caller.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermissionsPayload {
    #[serde(default)]
    pub configure: Option<String>,
    #[serde(default)]
    pub read: Option<String>,
    #[serde(default)]
    pub write: Option<String>,
}

/// Unvalidated provisioning request as received on the wire.
///
/// Every field is optional here so that a missing field can be reported by
/// name; [`ProvisioningPayload::validate`] produces a [`ProvisioningRequest`].
#[derive(Clone, Default, Deserialize)]
pub struct ProvisioningPayload {
    #[serde(default)]
    pub requester_username: Option<String>,
    #[serde(default)]
    pub requester_password: Option<String>,
    #[serde(default, alias = "target_host")]
    pub target_vhost: Option<String>,
    #[serde(default, alias = "username")]
    pub new_username: Option<String>,
    #[serde(default, alias = "password")]
    pub new_password: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub permissions: Option<PermissionsPayload>,
    #[serde(default, alias = "new_queue_name")]
    pub queue_name: Option<String>,
}

impl std::fmt::Debug for ProvisioningPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisioningPayload")
            .field("requester_username", &self.requester_username)
            .field("requester_password", &"[REDACTED]")
            .field("target_vhost", &self.target_vhost)
            .field("new_username", &self.new_username)
            .field("new_password", &"[REDACTED]")
            .field("tags", &self.tags)
            .field("permissions", &self.permissions)
            .field("queue_name", &self.queue_name)
            .finish()
    }
}

/// A mandatory field was absent from the payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Missing mandatory field: {field}")]
pub struct MissingField {
    pub field: &'static str,
}

fn require(value: Option<String>, field: &'static str) -> Result<String, MissingField> {
    value.ok_or(MissingField { field })
}

impl ProvisioningPayload {
    /// Check that every mandatory field is present.
    ///
    /// Fields are checked in a fixed order and the first missing one is reported.
    pub fn validate(self) -> Result<ProvisioningRequest, MissingField> {
        let requester_username = require(self.requester_username, "requester_username")?;
        let requester_password = require(self.requester_password, "requester_password")?;
        let target_vhost = require(self.target_vhost, "target_vhost")?;
        let new_username = require(self.new_username, "new_username")?;
        let new_password = require(self.new_password, "new_password")?;
        let permissions = self.permissions.ok_or(MissingField {
            field: "permissions",
        })?;
        let permissions = PermissionSet {
            configure: require(permissions.configure, "permissions.configure")?,
            read: require(permissions.read, "permissions.read")?,
            write: require(permissions.write, "permissions.write")?,
        };
        let queue_name = require(self.queue_name, "queue_name")?;

        Ok(ProvisioningRequest {
            requester_username,
            requester_password,
            target_vhost,
            new_username,
            new_password,
            tags: self.tags.unwrap_or_else(|| DEFAULT_USER_TAGS.to_string()),
            permissions,
            queue_name,
        })
    }
}

/// A complete provisioning request. Lives for a single provisioning run.
#[derive(Clone)]
pub struct ProvisioningRequest {
    pub requester_username: String,
    pub requester_password: String,
    pub target_vhost: String,
    pub new_username: String,
    pub new_password: String,
    pub tags: String,
    pub permissions: PermissionSet,
    pub queue_name: String,
}

impl std::fmt::Debug for ProvisioningRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisioningRequest")
            .field("requester_username", &self.requester_username)
            .field("requester_password", &"[REDACTED]")
            .field("target_vhost", &self.target_vhost)
            .field("new_username", &self.new_username)
            .field("new_password", &"[REDACTED]")
            .field("tags", &self.tags)
            .field("permissions", &self.permissions)
            .field("queue_name", &self.queue_name)
            .finish()
    }
}

// ── Outcome ───────────────────────────────────────────────────────────

/// Result of one provisioning run, returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningOutcome {
    pub success: bool,
    pub message: String,
    /// Set exactly when `success` is false.
    pub kind: Option<FailureKind>,
}

impl ProvisioningOutcome {
    #[must_use]
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            kind: None,
        }
    }

    /// Failed outcome; the message is prefixed with the kind's marker.
    #[must_use]
    pub fn failed(kind: FailureKind, detail: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            message: format!("{}: {detail}", kind.marker()),
            kind: Some(kind),
        }
    }
}
