//! Process configuration, read once at startup from the environment.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:4200";
pub const DEFAULT_JWKS_REFRESH_SECS: u64 = 300;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    /// `None` runs on the in-memory store.
    pub database: Option<DatabaseConfig>,
    pub auth: AuthConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone, PartialEq, Eq)]
pub enum TokenVerification {
    /// Verify against a remote JSON Web Key Set.
    Jwks { uri: String, refresh_after: Duration },
    /// HS256 with a shared secret (local development and tests).
    SharedSecret(String),
}

impl core::fmt::Debug for TokenVerification {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TokenVerification::Jwks { uri, refresh_after } => f
                .debug_struct("Jwks")
                .field("uri", uri)
                .field("refresh_after", refresh_after)
                .finish(),
            TokenVerification::SharedSecret(_) => f.write_str("SharedSecret(<redacted>)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub verification: TokenVerification,
    pub audience: Option<String>,
}

/// Exact origins allowed for CORS. The Gitpod workspace pattern is always
/// allowed in addition to these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![DEFAULT_ALLOWED_ORIGIN.to_string()],
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .context("BIND_ADDR must be a socket address (host:port)")?;

        let database = match var("DATABASE_URL") {
            Some(url) => {
                let max_connections = match var("DATABASE_MAX_CONNECTIONS") {
                    Some(v) => v
                        .parse::<u32>()
                        .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
                    None => DEFAULT_DB_MAX_CONNECTIONS,
                };
                Some(DatabaseConfig {
                    url,
                    max_connections,
                })
            }
            None => None,
        };

        let verification = match var("JWKS_URI") {
            Some(uri) => {
                let secs = match var("JWKS_REFRESH_SECS") {
                    Some(v) => v
                        .parse::<u64>()
                        .context("JWKS_REFRESH_SECS must be a number of seconds")?,
                    None => DEFAULT_JWKS_REFRESH_SECS,
                };
                TokenVerification::Jwks {
                    uri,
                    refresh_after: Duration::from_secs(secs),
                }
            }
            None => {
                let secret = var("JWT_SECRET").unwrap_or_else(|| {
                    tracing::warn!("JWKS_URI and JWT_SECRET not set; using insecure dev default");
                    DEV_JWT_SECRET.to_string()
                });
                TokenVerification::SharedSecret(secret)
            }
        };

        let cors = match var("CORS_ALLOWED_ORIGINS") {
            Some(list) => CorsConfig {
                allowed_origins: list
                    .split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect(),
            },
            None => CorsConfig::default(),
        };

        Ok(Self {
            bind_addr,
            database,
            auth: AuthConfig {
                verification,
                audience: var("JWT_AUDIENCE"),
            },
            cors,
        })
    }
}
