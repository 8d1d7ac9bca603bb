//! Provisioning orchestrator.
//!
//! Runs one request through a fixed sequence of stages. Each stage either
//! passes or ends the run with a [`ProvisioningOutcome`]:
//!
//! 1. Validate the payload (no remote calls).
//! 2. Authenticate the requester with their own credentials.
//! 3. Check the requester's configure rights on the target vhost.
//! 4. Create (or overwrite) the application user.
//! 5. Assign the application user's permissions on the vhost.
//!
//! Stages are never retried here; only the individual management API calls
//! are retried by [`AdminClient`]. A failure in stage 5 leaves the user from
//! stage 4 in place.

use crate::authenticator::RequesterAuthenticator;
use crate::authorization::AuthorizationChecker;
use crate::client::AdminClient;
use crate::config::{BrokerConfig, ConfigurePermissionPolicy};
use crate::error::{AdminApiError, AdminApiResult, FailureKind};
use crate::models::{
    PermissionSet, ProvisioningOutcome, ProvisioningPayload, ProvisioningRequest, UserRecord,
};
use tracing::{error, info};

/// Orchestrates self-service provisioning of broker application users.
#[derive(Debug, Clone)]
pub struct Provisioner {
    client: AdminClient,
    authenticator: RequesterAuthenticator,
    authorization: AuthorizationChecker,
    configure_policy: ConfigurePermissionPolicy,
}

impl Provisioner {
    /// Create a provisioner around an administrative client.
    ///
    /// The requester authenticator shares the client's base URL and connection pool.
    #[must_use]
    pub fn new(client: AdminClient, configure_policy: ConfigurePermissionPolicy) -> Self {
        let authenticator =
            RequesterAuthenticator::new(client.base_url(), client.http_client().clone());
        Self {
            authorization: AuthorizationChecker::new(client.clone()),
            authenticator,
            client,
            configure_policy,
        }
    }

    /// Build a provisioner from startup configuration.
    pub fn from_config(config: &BrokerConfig) -> AdminApiResult<Self> {
        Ok(Self::new(AdminClient::new(config)?, config.configure_policy))
    }

    /// Run one provisioning request to a terminal outcome.
    pub async fn provision(&self, payload: ProvisioningPayload) -> ProvisioningOutcome {
        let request = match payload.validate() {
            Ok(request) => request,
            Err(missing) => {
                let outcome = ProvisioningOutcome::failed(FailureKind::MalformedRequest, &missing);
                error!(field = missing.field, "{}", outcome.message);
                return outcome;
            }
        };

        info!(
            requester = %request.requester_username,
            vhost = %request.target_vhost,
            new_user = %request.new_username,
            queue = %request.queue_name,
            "Provisioning request accepted"
        );

        if let Err(outcome) = self.check_access(&request).await {
            error!(requester = %request.requester_username, "{}", outcome.message);
            return outcome;
        }

        if let Err(outcome) = self.apply(&request).await {
            error!(new_user = %request.new_username, "{}", outcome.message);
            return outcome;
        }

        let outcome = ProvisioningOutcome::succeeded(format!(
            "SUCCESS: User {} created with permissions on vhost '{}' for queue '{}'.",
            request.new_username, request.target_vhost, request.queue_name
        ));
        info!(new_user = %request.new_username, vhost = %request.target_vhost, "{}", outcome.message);
        outcome
    }

    /// Stages 2 and 3.
    async fn check_access(&self, request: &ProvisioningRequest) -> Result<(), ProvisioningOutcome> {
        if !self
            .authenticator
            .authenticate(&request.requester_username, &request.requester_password)
            .await
        {
            return Err(ProvisioningOutcome::failed(
                FailureKind::AuthenticationFailed,
                format_args!(
                    "could not verify the identity of {}",
                    request.requester_username
                ),
            ));
        }

        if !self
            .authorization
            .has_configure_rights(&request.requester_username, &request.target_vhost)
            .await
        {
            return Err(ProvisioningOutcome::failed(
                FailureKind::AuthorizationFailed,
                format_args!(
                    "{} is not permitted to provision resources on vhost '{}'.",
                    request.requester_username, request.target_vhost
                ),
            ));
        }

        Ok(())
    }

    /// Stages 4 and 5.
    async fn apply(&self, request: &ProvisioningRequest) -> Result<(), ProvisioningOutcome> {
        info!(new_user = %request.new_username, tags = %request.tags, "Creating user");
        let record = UserRecord {
            password: request.new_password.clone(),
            tags: request.tags.clone(),
        };
        self.client
            .put_user(&request.new_username, &record)
            .await
            .map_err(|e| {
                stage_failure(
                    &e,
                    format_args!("Failed to create user {}", request.new_username),
                )
            })?;
        // The queue is not declared here; the application user declares it on first connection.
        info!(new_user = %request.new_username, "User created (or already existed)");

        let permissions = PermissionSet {
            configure: self
                .configure_policy
                .apply(&request.permissions.configure)
                .to_string(),
            write: request.permissions.write.clone(),
            read: request.permissions.read.clone(),
        };
        info!(
            new_user = %request.new_username,
            vhost = %request.target_vhost,
            configure = %permissions.configure,
            write = %permissions.write,
            read = %permissions.read,
            policy = ?self.configure_policy,
            "Setting permissions"
        );
        self.client
            .put_permissions(&request.target_vhost, &request.new_username, &permissions)
            .await
            .map_err(|e| {
                stage_failure(
                    &e,
                    format_args!(
                        "Failed to set permissions for {} on vhost '{}'. The user may now exist without correct permissions; cleanup needed",
                        request.new_username, request.target_vhost
                    ),
                )
            })?;

        Ok(())
    }
}

/// Outcome for a failed mutation stage.
fn stage_failure(error: &AdminApiError, context: std::fmt::Arguments<'_>) -> ProvisioningOutcome {
    if error.is_admin_rejection() {
        ProvisioningOutcome::failed(
            FailureKind::AdminUnavailable,
            format_args!("{context}: administrative credentials were rejected by the broker"),
        )
    } else {
        ProvisioningOutcome::failed(
            FailureKind::ProvisioningError,
            format_args!("{context}: {error}"),
        )
    }
}
