//! Error types for management API calls and provisioning failures.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by the RabbitMQ management API client.
#[derive(Debug, Error)]
pub enum AdminApiError {
    /// The management API rejected the administrative credentials (401/403).
    ///
    /// This is a misconfiguration, not a transient condition, and is never retried.
    #[error("administrative credentials rejected by management API (HTTP {status})")]
    AdminCredentialsRejected { status: u16 },

    /// The management API answered with a non-success status.
    #[error("management API returned HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    /// The request never produced a response (timeout, DNS, connection refused).
    #[error("management API unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success response could not be decoded.
    #[error("failed to parse management API response: {0}")]
    Parse(String),

    /// Every attempt allowed by the retry policy failed.
    #[error("{message}")]
    MaxRetriesExceeded { attempts: u32, message: String },
}

/// Result alias for management API operations.
pub type AdminApiResult<T> = Result<T, AdminApiError>;

impl AdminApiError {
    /// Whether another attempt may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::Transport(_))
    }

    /// Whether the error means the administrative credentials themselves are broken.
    #[must_use]
    pub fn is_admin_rejection(&self) -> bool {
        matches!(self, Self::AdminCredentialsRejected { .. })
    }

    /// HTTP status reported by the management API, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AdminCredentialsRejected { status } | Self::Http { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            Self::Parse(_) | Self::MaxRetriesExceeded { .. } => None,
        }
    }
}

/// Classification of a failed provisioning run.
///
/// The HTTP layer maps each kind to a transport status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A mandatory request field is missing. No remote call was made.
    MalformedRequest,
    /// The requester's own credentials were rejected by the broker.
    AuthenticationFailed,
    /// The requester holds no configure rights on the target vhost.
    AuthorizationFailed,
    /// The broker rejected the service's administrative credentials.
    AdminUnavailable,
    /// User creation or permission assignment failed after retries.
    ProvisioningError,
}

impl FailureKind {
    /// Marker prefix written at the start of outcome messages.
    ///
    /// Older consumers classify outcomes by these substrings.
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            Self::MalformedRequest => "MALFORMED REQUEST",
            Self::AuthenticationFailed => "AUTHENTICATION FAILED",
            Self::AuthorizationFailed => "AUTHORIZATION FAILED",
            Self::AdminUnavailable => "ADMIN UNAVAILABLE",
            Self::ProvisioningError => "PROVISIONING ERROR",
        }
    }

    /// Machine-readable code, identical to the serialized form.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::MalformedRequest => "malformed_request",
            Self::AuthenticationFailed => "authentication_failed",
            Self::AuthorizationFailed => "authorization_failed",
            Self::AdminUnavailable => "admin_unavailable",
            Self::ProvisioningError => "provisioning_error",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}
