use std::env;
use std::fmt;

use thiserror::Error;

/// Default issuer claim embedded in every session token.
pub const DEFAULT_JWT_ISSUER: &str = "desemprego-zero";

/// Upper bound for `JWT_EXPIRY_HOURS` (one year).
pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 365;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Empty means "no explicit origins"; development then falls back to a permissive policy.
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub jwt_issuer: String,
}

// Keep the signing secret out of logs.
impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_expiry_hours", &self.jwt_expiry_hours)
            .field("jwt_issuer", &self.jwt_issuer)
            .finish()
    }
}

impl AppConfig {
    /// Build configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. `from_env` delegates here so tests
    /// can supply variables without touching the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let database = DatabaseConfig::from_lookup(environment, &lookup)?;

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let mut config = Self {
            environment,
            server: ServerConfig {
                port: 8080,
                cors_origins: Vec::new(),
            },
            database,
            security: SecurityConfig {
                jwt_secret,
                jwt_expiry_hours: 24,
                jwt_issuer: DEFAULT_JWT_ISSUER.to_string(),
            },
        };

        if let Some(v) = lookup("PORT") {
            config.server.port = parse_var("PORT", &v)?;
        }
        if let Some(v) = lookup("CORS_ORIGINS") {
            config.server.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(v) = lookup("JWT_EXPIRY_HOURS") {
            let hours: u64 = parse_var("JWT_EXPIRY_HOURS", &v)?;
            if hours == 0 || hours > MAX_JWT_EXPIRY_HOURS {
                return Err(ConfigError::Invalid {
                    name: "JWT_EXPIRY_HOURS",
                    value: v,
                });
            }
            config.security.jwt_expiry_hours = hours;
        }
        if let Some(v) = lookup("JWT_ISSUER").filter(|s| !s.trim().is_empty()) {
            config.security.jwt_issuer = v;
        }

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

impl DatabaseConfig {
    /// Database settings only; used by tools that never sign tokens (e.g. `create-admin`).
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };
        Self::from_lookup(environment, &|key: &str| env::var(key).ok())
    }

    fn from_lookup<F>(environment: Environment, lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (max_connections, connection_timeout) = match environment {
            Environment::Development => (10, 30),
            Environment::Staging => (20, 10),
            Environment::Production => (50, 5),
        };

        let mut config = Self {
            url: database_url(lookup)?,
            max_connections,
            connection_timeout,
        };

        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            config.max_connections = parse_var("DATABASE_MAX_CONNECTIONS", &v)?;
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            config.connection_timeout = parse_var("DATABASE_CONNECTION_TIMEOUT", &v)?;
        }

        Ok(config)
    }
}

/// `DATABASE_URL` wins; otherwise the URL is assembled from the individual `DB_*` parts.
fn database_url<F>(lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("DATABASE_URL").filter(|s| !s.trim().is_empty()) {
        url::Url::parse(&url).map_err(|_| ConfigError::Invalid {
            name: "DATABASE_URL",
            value: "<unparseable url>".to_string(),
        })?;
        return Ok(url);
    }

    let host = lookup("DB_HOST").ok_or(ConfigError::Missing("DATABASE_URL or DB_HOST"))?;
    let port = lookup("DB_PORT").ok_or(ConfigError::Missing("DB_PORT"))?;
    let user = lookup("DB_USER").ok_or(ConfigError::Missing("DB_USER"))?;
    let password = lookup("DB_PASSWORD").ok_or(ConfigError::Missing("DB_PASSWORD"))?;
    let name = lookup("DB_NAME").ok_or(ConfigError::Missing("DB_NAME"))?;

    let port: u16 = parse_var("DB_PORT", &port)?;

    let mut url = url::Url::parse("postgres://localhost").map_err(|_| ConfigError::Invalid {
        name: "DB_HOST",
        value: host.clone(),
    })?;
    let invalid_host = || ConfigError::Invalid {
        name: "DB_HOST",
        value: host.clone(),
    };
    url.set_host(Some(&host)).map_err(|_| invalid_host())?;
    url.set_port(Some(port)).map_err(|_| invalid_host())?;
    url.set_username(&user).map_err(|_| invalid_host())?;
    url.set_password(Some(&password)).map_err(|_| invalid_host())?;
    url.set_path(&format!("/{}", name));
    url.set_query(Some("sslmode=disable"));

    Ok(url.into())
}

fn parse_var<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}
