use std::env;
use thiserror::Error;

/// Fallback signing secret for local development only.
pub const LOCAL_JWT_SECRET: &str = "super-secure-test-secret-value-local";

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at startup and
/// immutable afterwards; it is pulled into handlers and extractors via `FromRef`.
#[derive(Clone)]
pub struct AppConfig {
    // Runtime environment marker. Controls which variables are mandatory.
    pub env: Env,
    // TCP port the HTTP server binds on 0.0.0.0.
    pub port: u16,
    // Postgres connection string. `None` selects the in-memory credential store (local only).
    pub db_url: Option<String>,
    // Shared secret used to sign and verify session tokens.
    pub jwt_secret: String,
    // Credentials of the user seeded into the in-memory store.
    pub admin_username: String,
    pub admin_password: String,
}

/// Env
///
/// Defines the runtime context: local development (in-memory store allowed, fallback
/// secret) or production (every secret explicit).
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// ConfigError
///
/// Raised by `AppConfig::load` when the environment cannot produce a usable configuration.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set in production")]
    Missing(&'static str),

    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

impl Default for AppConfig {
    /// default
    ///
    /// Safe configuration for test scaffolding; never reads the environment.
    fn default() -> Self {
        Self {
            env: Env::Local,
            port: 3000,
            db_url: None,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            admin_username: "admin".to_string(),
            admin_password: "admin".to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from process environment variables.
    ///
    /// # Errors
    /// Fails fast when a variable required for the current environment is missing or
    /// malformed, so the server never starts with an incomplete or insecure configuration.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// from_lookup
    ///
    /// Same as `load`, reading variables through `lookup` instead of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = match lookup("APP_ENV").as_deref() {
            Some("production") => Env::Production,
            _ => Env::Local,
        };

        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value: raw,
            })?,
            None => 3000,
        };

        let defaults = Self::default();

        match env {
            Env::Local => Ok(Self {
                env,
                port,
                db_url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
                jwt_secret: lookup("JWT_SECRET")
                    .filter(|secret| !secret.is_empty())
                    .unwrap_or(defaults.jwt_secret),
                admin_username: lookup("ADMIN_USERNAME").unwrap_or(defaults.admin_username),
                admin_password: lookup("ADMIN_PASSWORD").unwrap_or(defaults.admin_password),
            }),
            Env::Production => {
                let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
                if jwt_secret.is_empty() {
                    return Err(ConfigError::Empty("JWT_SECRET"));
                }
                let db_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

                Ok(Self {
                    env,
                    port,
                    db_url: Some(db_url),
                    jwt_secret,
                    // Production never seeds an in-memory user.
                    admin_username: String::new(),
                    admin_password: String::new(),
                })
            }
        }
    }
}
