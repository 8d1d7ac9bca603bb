//! API error types and HTTP response mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rmq_provisioner::{FailureKind, ProvisioningOutcome};
use serde::Serialize;
use thiserror::Error;

/// Failures returned by the provisioning endpoint.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request body was not a JSON object of the expected shape.
    #[error("MALFORMED REQUEST: {0}")]
    InvalidBody(String),

    /// The provisioning workflow ended in a failure outcome.
    #[error("{message}")]
    Provisioning { kind: FailureKind, message: String },
}

/// Body of every `/provision` response.
#[derive(Debug, Serialize)]
pub struct ProvisionResponse {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureKind>,
}

/// HTTP status for a failure kind.
#[must_use]
pub fn status_for(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::MalformedRequest => StatusCode::BAD_REQUEST,
        FailureKind::AuthenticationFailed => StatusCode::UNAUTHORIZED,
        FailureKind::AuthorizationFailed => StatusCode::FORBIDDEN,
        FailureKind::AdminUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        FailureKind::ProvisioningError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            ApiError::InvalidBody(_) => FailureKind::MalformedRequest,
            ApiError::Provisioning { kind, .. } => *kind,
        }
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        status_for(self.kind())
    }
}

impl From<ProvisioningOutcome> for ApiError {
    fn from(outcome: ProvisioningOutcome) -> Self {
        ApiError::Provisioning {
            kind: outcome.kind.unwrap_or(FailureKind::ProvisioningError),
            message: outcome.message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ProvisionResponse {
            status: "Failed",
            error: Some(self.kind()),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;
