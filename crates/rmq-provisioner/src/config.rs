//! Broker connection configuration.

use crate::retry::RetryPolicy;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Credentials the service uses for privileged management API calls.
///
/// The [`Debug`] impl redacts the password to prevent accidental credential
/// exposure in log output.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl AdminCredentials {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// What happens to the caller's requested configure pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigurePermissionPolicy {
    /// Forward the requested configure pattern unchanged.
    #[default]
    Passthrough,
    /// Replace the requested configure pattern with `""`, which matches no resource.
    Deny,
}

impl ConfigurePermissionPolicy {
    /// Configure pattern to send upstream for the requested one.
    #[must_use]
    pub fn apply<'a>(self, requested: &'a str) -> &'a str {
        match self {
            Self::Passthrough => requested,
            Self::Deny => "",
        }
    }
}

impl FromStr for ConfigurePermissionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "passthrough" => Ok(Self::Passthrough),
            "deny" => Ok(Self::Deny),
            other => Err(format!("expected 'passthrough' or 'deny', got '{other}'")),
        }
    }
}

/// Everything needed to talk to the RabbitMQ management API.
///
/// Built once at startup and shared read-only by every request.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Management API base URL without trailing slash (e.g. `http://rabbit:15672`).
    pub management_url: String,

    /// Administrative identity used for lookups and mutations.
    pub admin: AdminCredentials,

    /// Timeout applied to every individual HTTP attempt.
    pub request_timeout: Duration,

    /// Retry policy for administrative calls.
    pub retry_policy: RetryPolicy,

    /// Handling of the requested configure pattern for new users.
    pub configure_policy: ConfigurePermissionPolicy,
}

impl BrokerConfig {
    /// Config with defaults for everything except the URL and admin identity.
    #[must_use]
    pub fn new(management_url: impl Into<String>, admin: AdminCredentials) -> Self {
        Self {
            management_url: management_url.into().trim_end_matches('/').to_string(),
            admin,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            retry_policy: RetryPolicy::default(),
            configure_policy: ConfigurePermissionPolicy::default(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    ///
    /// This allows tests to supply variables without mutating process-global
    /// environment state.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let required = |key: &str| {
            reader(key)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingVar(key.into()))
        };

        let management_url = required("RABBITMQ_HOST")?;
        let parsed = reqwest::Url::parse(&management_url)
            .map_err(|e| ConfigError::InvalidValue("RABBITMQ_HOST".into(), e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue(
                "RABBITMQ_HOST".into(),
                format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }

        let admin = AdminCredentials::new(required("ADMIN_USERNAME")?, required("ADMIN_PASSWORD")?);

        let request_timeout_secs = reader("RABBITMQ_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_REQUEST_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidValue("RABBITMQ_REQUEST_TIMEOUT_SECS".into(), e.to_string())
            })?;

        let max_attempts = reader("RABBITMQ_MAX_ATTEMPTS")
            .unwrap_or_else(|_| DEFAULT_MAX_ATTEMPTS.to_string())
            .parse::<u32>()
            .map_err(|e| ConfigError::InvalidValue("RABBITMQ_MAX_ATTEMPTS".into(), e.to_string()))?;
        if max_attempts == 0 {
            return Err(ConfigError::InvalidValue(
                "RABBITMQ_MAX_ATTEMPTS".into(),
                "must be at least 1".into(),
            ));
        }

        let configure_policy = match reader("CONFIGURE_PERMISSION_POLICY") {
            Ok(raw) => raw
                .parse::<ConfigurePermissionPolicy>()
                .map_err(|e| ConfigError::InvalidValue("CONFIGURE_PERMISSION_POLICY".into(), e))?,
            Err(_) => ConfigurePermissionPolicy::default(),
        };

        let mut config = Self::new(management_url, admin);
        config.request_timeout = Duration::from_secs(request_timeout_secs);
        config.retry_policy = RetryPolicy::new(max_attempts, Duration::from_secs(1));
        config.configure_policy = configure_policy;
        Ok(config)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingVar(String),

    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}
