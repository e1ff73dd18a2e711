//! Service configuration read from the environment (and `.env` via dotenv).

use crate::store::DEFAULT_BUSY_TIMEOUT;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATABASE: &str = "ip_database.db";
pub const DEFAULT_LOG_CONFIG: &str = "log4rs.yml";

pub const ENV_PORT: &str = "PORT";
pub const ENV_DATABASE: &str = "IPAM_DATABASE";
pub const ENV_LOG_CONFIG: &str = "IPAM_LOG_CONFIG";
pub const ENV_BUSY_TIMEOUT_MS: &str = "IPAM_BUSY_TIMEOUT_MS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {var}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// TCP port the API listens on (all interfaces).
    pub port: u16,
    /// SQLite database file.
    pub database: PathBuf,
    /// log4rs configuration file.
    pub log_config: PathBuf,
    pub busy_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: DEFAULT_PORT,
            database: PathBuf::from(DEFAULT_DATABASE),
            log_config: PathBuf::from(DEFAULT_LOG_CONFIG),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

impl Config {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Result<Config, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build the configuration from any variable lookup; unset or empty
    /// variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(port) = get(ENV_PORT) {
            config.port = parse_var(ENV_PORT, &port)?;
        }
        if let Some(database) = get(ENV_DATABASE) {
            config.database = PathBuf::from(database);
        }
        if let Some(log_config) = get(ENV_LOG_CONFIG) {
            config.log_config = PathBuf::from(log_config);
        }
        if let Some(timeout) = get(ENV_BUSY_TIMEOUT_MS) {
            config.busy_timeout = Duration::from_millis(parse_var(ENV_BUSY_TIMEOUT_MS, &timeout)?);
        }
        Ok(config)
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var,
        value: value.to_string(),
    })
}
