//! Self-service provisioning of RabbitMQ application users.
//!
//! A requester proves their identity with their own broker credentials and
//! must already hold configure rights on the target vhost. The service then
//! uses its administrative credentials to create the application user and
//! assign its permissions through the management HTTP API.

pub mod authenticator;
pub mod authorization;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod provisioner;
pub mod retry;

pub use config::{AdminCredentials, BrokerConfig, ConfigError, ConfigurePermissionPolicy};
pub use error::{AdminApiError, AdminApiResult, FailureKind};
pub use models::{ProvisioningOutcome, ProvisioningPayload, ProvisioningRequest};
pub use provisioner::Provisioner;
