/**
 * Server Configuration
 *
 * Settings are read from environment variables (after `.env` is loaded by
 * the binary), with defaults suited to local development.
 *
 * | Variable                        | Default                 |
 * |---------------------------------|-------------------------|
 * | `CONDUIT_ADDR`                  | `0.0.0.0:5000`          |
 * | `DATABASE_URL`                  | unset: in-memory store  |
 * | `ACCESS_SECRET`                 | required                |
 * | `CONDUIT_ALLOW_INSECURE_SECRET` | unset                   |
 * | `CONDUIT_OUTBOUND_CAPACITY`     | `256`                   |
 * | `CONDUIT_MAX_FRAME_BYTES`       | `8192`                  |
 * | `CONDUIT_PONG_WAIT_SECS`        | `60`                    |
 * | `CONDUIT_WRITE_WAIT_SECS`       | `10`                    |
 * | `CONDUIT_BCRYPT_COST`           | bcrypt's default        |
 *
 * A variable that is set but does not parse is an error, never a silent
 * fallback to the default.
 */

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use crate::backend::auth::PasswordHasher;
use crate::backend::connection::ConnectionConfig;

pub const DEFAULT_ADDR: &str = "0.0.0.0:5000";

/// Secret used only when `CONDUIT_ALLOW_INSECURE_SECRET=1`
const DEVELOPMENT_SECRET: &str = "conduit-development-secret";

/// Configuration failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is required")]
    Missing { name: &'static str },

    #[error("{name}={value:?} is invalid: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the server needs to start
#[derive(Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
    pub database_url: Option<String>,
    pub access_secret: Vec<u8>,
    pub connection: ConnectionConfig,
    pub hasher: PasswordHasher,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("addr", &self.addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("connection", &self.connection)
            .field("hasher", &self.hasher)
            .finish_non_exhaustive()
    }
}

fn parse<T>(name: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
        value,
    })
}

fn parse_positive(name: &'static str, value: String) -> Result<u64, ConfigError> {
    let parsed: u64 = parse(name, value.clone())?;
    if parsed == 0 {
        return Err(ConfigError::Invalid {
            name,
            value,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(parsed)
}

impl ServerConfig {
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }

    /// Load from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        if let Some(addr) = lookup("CONDUIT_ADDR") {
            builder = builder.addr(parse("CONDUIT_ADDR", addr)?);
        }
        if let Some(url) = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            builder = builder.database_url(url);
        }

        match lookup("ACCESS_SECRET").filter(|secret| !secret.is_empty()) {
            Some(secret) => builder = builder.access_secret(secret),
            None if lookup("CONDUIT_ALLOW_INSECURE_SECRET").as_deref() == Some("1") => {
                warn!("ACCESS_SECRET not set, using the development secret");
                builder = builder.access_secret(DEVELOPMENT_SECRET);
            }
            None => return Err(ConfigError::Missing { name: "ACCESS_SECRET" }),
        }

        if let Some(value) = lookup("CONDUIT_OUTBOUND_CAPACITY") {
            builder = builder.outbound_capacity(parse_positive("CONDUIT_OUTBOUND_CAPACITY", value)? as usize);
        }
        if let Some(value) = lookup("CONDUIT_MAX_FRAME_BYTES") {
            builder = builder.max_frame_bytes(parse_positive("CONDUIT_MAX_FRAME_BYTES", value)? as usize);
        }
        if let Some(value) = lookup("CONDUIT_PONG_WAIT_SECS") {
            builder = builder.pong_wait(Duration::from_secs(parse_positive("CONDUIT_PONG_WAIT_SECS", value)?));
        }
        if let Some(value) = lookup("CONDUIT_WRITE_WAIT_SECS") {
            builder = builder.write_wait(Duration::from_secs(parse_positive("CONDUIT_WRITE_WAIT_SECS", value)?));
        }
        if let Some(value) = lookup("CONDUIT_BCRYPT_COST") {
            builder = builder.bcrypt_cost(parse("CONDUIT_BCRYPT_COST", value)?);
        }

        builder.build()
    }
}

/// Programmatic construction, mostly for tests
#[derive(Debug, Clone, Default)]
pub struct ServerConfigBuilder {
    addr: Option<SocketAddr>,
    database_url: Option<String>,
    access_secret: Option<Vec<u8>>,
    connection: ConnectionConfig,
    hasher: PasswordHasher,
}

impl ServerConfigBuilder {
    pub fn addr(mut self, addr: SocketAddr) -> Self {
        self.addr = Some(addr);
        self
    }

    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn access_secret(mut self, secret: impl AsRef<[u8]>) -> Self {
        self.access_secret = Some(secret.as_ref().to_vec());
        self
    }

    pub fn outbound_capacity(mut self, capacity: usize) -> Self {
        self.connection.outbound_capacity = capacity;
        self
    }

    pub fn max_frame_bytes(mut self, bytes: usize) -> Self {
        self.connection.max_frame_bytes = bytes;
        self
    }

    pub fn pong_wait(mut self, wait: Duration) -> Self {
        self.connection.pong_wait = wait;
        self
    }

    pub fn write_wait(mut self, wait: Duration) -> Self {
        self.connection.write_wait = wait;
        self
    }

    pub fn bcrypt_cost(mut self, cost: u32) -> Self {
        self.hasher = PasswordHasher::with_cost(cost);
        self
    }

    pub fn build(self) -> Result<ServerConfig, ConfigError> {
        let addr = match self.addr {
            Some(addr) => addr,
            None => parse("CONDUIT_ADDR", DEFAULT_ADDR.to_string())?,
        };
        let access_secret = self
            .access_secret
            .ok_or(ConfigError::Missing { name: "ACCESS_SECRET" })?;

        Ok(ServerConfig {
            addr,
            database_url: self.database_url,
            access_secret,
            connection: self.connection,
            hasher: self.hasher,
        })
    }
}
