//! Service configuration loaded from the environment.

use rmq_provisioner::{BrokerConfig, ConfigError};
use std::net::{IpAddr, SocketAddr};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_LOG_FILTER: &str = "info,rmq_provisioner=debug,provisioning_api=debug";

/// Root service configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Address the HTTP server binds to.
    pub listen_addr: SocketAddr,

    /// Management API connection settings.
    pub broker: BrokerConfig,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_reader(|key| std::env::var(key))
    }

    /// Load configuration from a custom variable reader.
    pub fn from_reader<F>(reader: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let host = reader("SERVICE_HOST")
            .unwrap_or_else(|_| DEFAULT_HOST.to_string())
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidValue("SERVICE_HOST".into(), e.to_string()))?;

        let port = reader("SERVICE_PORT")
            .unwrap_or_else(|_| DEFAULT_PORT.to_string())
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidValue("SERVICE_PORT".into(), e.to_string()))?;

        let broker = BrokerConfig::from_reader(&reader)?;

        Ok(Self {
            listen_addr: SocketAddr::new(host, port),
            broker,
        })
    }
}
