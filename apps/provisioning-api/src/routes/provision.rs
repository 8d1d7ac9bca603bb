//! `POST /provision` handler.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use rmq_provisioner::ProvisioningPayload;
use tracing::{error, info};

use crate::error::{ApiError, ApiResult, ProvisionResponse};
use crate::state::AppState;

/// Provision a broker user for the requesting developer.
///
/// The payload itself is never logged since it carries two passwords.
pub async fn provision_handler(
    State(state): State<AppState>,
    payload: Result<Json<ProvisioningPayload>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ProvisionResponse>)> {
    let Json(payload) = payload.map_err(|rejection| {
        let reason = rejection_reason(&rejection);
        error!(status = rejection.status().as_u16(), reason, "Rejected provisioning request body");
        ApiError::InvalidBody(reason.to_string())
    })?;

    info!(
        requester = ?payload.requester_username,
        vhost = ?payload.target_vhost,
        new_user = ?payload.new_username,
        "Received provisioning request"
    );

    let outcome = state.provisioner.provision(payload).await;
    if !outcome.success {
        error!(kind = ?outcome.kind, "Provisioning FAILED: {}", outcome.message);
        return Err(ApiError::from(outcome));
    }

    info!("Provisioning SUCCESS: {}", outcome.message);
    Ok((
        StatusCode::CREATED,
        Json(ProvisionResponse {
            status: "Success",
            message: outcome.message,
            error: None,
        }),
    ))
}

/// Fixed description of a body rejection.
///
/// Never includes the rejection text: serde quotes the offending value.
fn rejection_reason(rejection: &JsonRejection) -> &'static str {
    match rejection {
        JsonRejection::JsonDataError(_) => "request body is not a valid provisioning payload",
        JsonRejection::JsonSyntaxError(_) => "request body is not valid JSON",
        JsonRejection::MissingJsonContentType(_) => {
            "request must carry a Content-Type of application/json"
        }
        _ => "request body could not be read",
    }
}
