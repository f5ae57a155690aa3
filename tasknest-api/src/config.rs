/// Configuration management for the API server
///
/// Loaded once at startup from environment variables (a `.env` file is
/// honoured in development).
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 3000)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Token signing secret, at least 32 characters (required)
/// - `JWT_TTL_HOURS`: Access token lifetime (default: 24)
/// - `REDIS_URL`: Cache URL; the cache is disabled when unset
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: *)
/// - `LOG_FORMAT`: `json` for structured logs, anything else for text
///
/// # Example
///
/// ```no_run
/// use tasknest_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::collections::HashMap;
use std::env;

use anyhow::Context;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,

    pub database: DatabaseConfig,

    pub jwt: JwtConfig,

    /// Redis URL; `None` disables the cache
    pub redis_url: Option<String>,

    /// Emit JSON log lines instead of human-readable text
    pub log_json: bool,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,

    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// HMAC signing secret
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Lifetime of issued access tokens
    pub ttl_hours: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"***")
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

/// Minimum accepted length of `JWT_SECRET`
pub const MIN_JWT_SECRET_LEN: usize = 32;

impl Config {
    /// Loads configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or a value does
    /// not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(env::vars().collect())
    }

    /// Builds configuration from an explicit variable map
    pub fn from_vars(vars: HashMap<String, String>) -> anyhow::Result<Self> {
        let var = |name: &str| vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

        let host = var("API_HOST").unwrap_or("0.0.0.0").to_string();
        let port = var("API_PORT")
            .unwrap_or("3000")
            .parse::<u16>()
            .context("API_PORT must be a port number")?;

        let database_url = var("DATABASE_URL")
            .context("DATABASE_URL environment variable is required")?
            .to_string();
        let max_connections = var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or("10")
            .parse::<u32>()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;

        let jwt_secret = var("JWT_SECRET")
            .context("JWT_SECRET environment variable is required")?
            .to_string();
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {MIN_JWT_SECRET_LEN} characters long");
        }
        let ttl_hours = var("JWT_TTL_HOURS")
            .unwrap_or("24")
            .parse::<i64>()
            .context("JWT_TTL_HOURS must be an integer")?;
        if !(1..=24 * 365).contains(&ttl_hours) {
            anyhow::bail!("JWT_TTL_HOURS must be between 1 and 8760");
        }

        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or("*")
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                ttl_hours,
            },
            redis_url: var("REDIS_URL").map(String::from),
            log_json: var("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.jwt.ttl_hours)
    }
}
