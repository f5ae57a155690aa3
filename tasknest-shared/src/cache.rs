/// Redis cache connection
///
/// The cache is optional: when no URL is configured the API runs without
/// it and reports it as `disabled`. When configured, a [`RedisClient`] is
/// connected and pinged once at startup (warm-up) and pinged again by the
/// health endpoint. The underlying `ConnectionManager` reconnects on its own,
/// so a client stays usable across Redis restarts.
///
/// # Example
///
/// ```no_run
/// use tasknest_shared::cache::{CacheConfig, RedisClient};
///
/// # async fn example() -> Result<(), tasknest_shared::cache::CacheError> {
/// let client = RedisClient::connect(CacheConfig::new("redis://localhost:6379")).await?;
/// client.ping().await?;
/// # Ok(())
/// # }
/// ```

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::{Client, RedisError};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Cache client errors
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Invalid Redis URL: {0}")]
    InvalidUrl(String),

    #[error("Redis connection error: {0}")]
    Connection(String),

    #[error("Redis command error: {0}")]
    Command(String),

    #[error("Redis did not answer within {0:?}")]
    Timeout(Duration),
}

impl From<RedisError> for CacheError {
    fn from(err: RedisError) -> Self {
        if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
            CacheError::Connection(err.to_string())
        } else {
            CacheError::Command(err.to_string())
        }
    }
}

/// Cache connection settings
#[derive(Clone)]
pub struct CacheConfig {
    /// `redis://[user:password@]host:port[/db]`
    pub url: String,

    pub connect_timeout: Duration,

    pub command_timeout: Duration,
}

impl CacheConfig {
    /// Settings for `url` with 5s connect and 2s command timeouts
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: Duration::from_secs(5),
            command_timeout: Duration::from_secs(2),
        }
    }
}

impl fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("url", &sanitize_url(&self.url))
            .field("connect_timeout", &self.connect_timeout)
            .field("command_timeout", &self.command_timeout)
            .finish()
    }
}

/// Reported cache state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    Connected,
    Disconnected,
    Disabled,
}

/// Redis client backed by an auto-reconnecting `ConnectionManager`
#[derive(Clone)]
pub struct RedisClient {
    manager: ConnectionManager,
    config: Arc<CacheConfig>,
}

impl fmt::Debug for RedisClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RedisClient {
    /// Opens the connection and verifies it with a PING
    pub async fn connect(config: CacheConfig) -> Result<Self, CacheError> {
        let client =
            Client::open(config.url.as_str()).map_err(|e| CacheError::InvalidUrl(e.to_string()))?;

        let manager = tokio::time::timeout(config.connect_timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| CacheError::Timeout(config.connect_timeout))?
            .map_err(|e| CacheError::Connection(e.to_string()))?;

        let client = Self {
            manager,
            config: Arc::new(config),
        };
        client.ping().await?;

        info!(url = %sanitize_url(&client.config.url), "Connected to Redis");
        Ok(client)
    }

    /// Sends PING and expects PONG
    pub async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        let timeout = self.config.command_timeout;

        let reply: String = tokio::time::timeout(timeout, redis::cmd("PING").query_async(&mut conn))
            .await
            .map_err(|_| CacheError::Timeout(timeout))??;

        if reply != "PONG" {
            warn!(reply = %reply, "Unexpected PING reply");
            return Err(CacheError::Command(format!("unexpected PING reply: {reply}")));
        }

        debug!("Redis PING ok");
        Ok(())
    }

    /// Current reachability, for health reporting
    pub async fn status(&self) -> CacheStatus {
        match self.ping().await {
            Ok(()) => CacheStatus::Connected,
            Err(e) => {
                warn!(error = %e, "Redis health check failed");
                CacheStatus::Disconnected
            }
        }
    }
}

/// Connects to Redis if a URL is configured
///
/// A configured but unreachable cache is logged and treated as absent so
/// the API can still start.
pub async fn warm_up(url: Option<&str>) -> Option<RedisClient> {
    let url = match url {
        Some(url) => url,
        None => {
            info!("REDIS_URL not set, cache disabled");
            return None;
        }
    };

    match RedisClient::connect(CacheConfig::new(url)).await {
        Ok(client) => Some(client),
        Err(e) => {
            warn!(error = %e, url = %sanitize_url(url), "Cache warm-up failed, continuing without cache");
            None
        }
    }
}

/// Status of an optional client
pub async fn status_of(client: Option<&RedisClient>) -> CacheStatus {
    match client {
        Some(client) => client.status().await,
        None => CacheStatus::Disabled,
    }
}

/// Masks credentials in a Redis URL for logging
pub fn sanitize_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}***@{}", &url[..scheme_end + 3], &url[at + 1..])
        }
        _ => url.to_string(),
    }
}
