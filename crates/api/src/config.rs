//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;

use thiserror::Error;
use tracing::warn;

use copydesk_infra::seed::DEFAULT_BOOTSTRAP_ADMIN_EMAIL;

pub const BIND_ENV: &str = "COPYDESK_BIND";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const BOOTSTRAP_ADMIN_EMAIL_ENV: &str = "COPYDESK_BOOTSTRAP_ADMIN_EMAIL";

const DEFAULT_BIND: &str = "0.0.0.0:8080";
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not a valid socket address: {value}")]
    InvalidBind { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind: SocketAddr,
    pub jwt_secret: String,
    /// Postgres connection string. Absent means an in-memory directory.
    pub database_url: Option<String>,
    pub bootstrap_admin_email: String,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_raw = get(BIND_ENV).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_raw.parse().map_err(|_| ConfigError::InvalidBind {
            var: BIND_ENV,
            value: bind_raw.clone(),
        })?;

        let jwt_secret = get(JWT_SECRET_ENV).unwrap_or_else(|| {
            warn!("JWT_SECRET not set; using insecure dev default");
            DEV_JWT_SECRET.to_string()
        });

        Ok(Self {
            bind,
            jwt_secret,
            database_url: get(DATABASE_URL_ENV),
            bootstrap_admin_email: get(BOOTSTRAP_ADMIN_EMAIL_ENV)
                .unwrap_or_else(|| DEFAULT_BOOTSTRAP_ADMIN_EMAIL.to_string()),
        })
    }
}
