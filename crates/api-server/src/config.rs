//! Server configuration from the environment

use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::{Duration, Utc};
use thiserror::Error;

const DEFAULT_DATA_DIR: &str = ".taskflow-data";
const DEFAULT_BIND: &str = "0.0.0.0:8081";
const DEV_JWT_SECRET: &str = "dev-jwt-secret-change-me";
const DEFAULT_TOKEN_TTL_SECONDS: i64 = 8 * 60 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid TASKFLOW_BIND address {0:?}")]
    InvalidBind(String),

    #[error("Invalid TASKFLOW_TOKEN_TTL_SECONDS value {0:?}")]
    InvalidTokenTtl(String),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub data_dir: PathBuf,
    pub bind: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let data_dir = read("TASKFLOW_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let bind_raw = read("TASKFLOW_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw
            .parse()
            .map_err(|_| ConfigError::InvalidBind(bind_raw.clone()))?;

        let jwt_secret = read("TASKFLOW_JWT_SECRET").unwrap_or_else(|| {
            tracing::warn!("TASKFLOW_JWT_SECRET not set, using the development secret");
            DEV_JWT_SECRET.to_string()
        });

        let token_ttl = match read("TASKFLOW_TOKEN_TTL_SECONDS") {
            Some(raw) => parse_token_ttl(&raw).ok_or(ConfigError::InvalidTokenTtl(raw))?,
            None => Duration::seconds(DEFAULT_TOKEN_TTL_SECONDS),
        };

        Ok(Self {
            data_dir,
            bind,
            jwt_secret,
            token_ttl,
        })
    }

    /// A config for tests: everything under `data_dir`, ephemeral port
    pub fn for_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            bind: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECONDS),
        }
    }
}

/// A positive TTL whose expiry timestamps stay representable
fn parse_token_ttl(raw: &str) -> Option<Duration> {
    let seconds = raw.parse::<i64>().ok().filter(|seconds| *seconds > 0)?;
    let ttl = Duration::try_seconds(seconds)?;
    Utc::now().checked_add_signed(ttl)?;
    Some(ttl)
}
