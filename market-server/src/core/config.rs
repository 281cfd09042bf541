use crate::auth::{JwtConfig, JwtError};

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Notes |
/// |----------|---------|-------|
/// | HTTP_PORT | 8000 | HTTP service port |
/// | DATABASE_PATH | market.db | SQLite database file |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | JWT_SECRET | (generated in debug) | signing secret, min 32 chars |
/// | JWT_EXPIRATION_MINUTES | 1440 | token lifetime |
/// | JWT_ISSUER | market-server | |
/// | JWT_AUDIENCE | market-web | |
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP API service port
    pub http_port: u16,
    /// Path to the SQLite database file
    pub database_path: String,
    /// JWT settings
    pub jwt: JwtConfig,
    /// Runtime environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables, with defaults for
    /// everything except a too-short JWT secret
    pub fn from_env() -> Result<Self, JwtError> {
        Ok(Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "market.db".into()),
            jwt: JwtConfig::from_env()?,
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
