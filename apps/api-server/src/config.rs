//! Server configuration.

use std::env;

use anyhow::Context;

/// Value of `DATABASE_URL` that selects the in-memory store.
pub const MEMORY_DATABASE_URL: &str = "memory";

/// Deployment environment. Controls how much error detail reaches clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => anyhow::bail!("LOC8R_ENV must be 'development' or 'production', got '{other}'"),
        }
    }
}

fn parse_expiration_hours(raw: &str) -> anyhow::Result<u64> {
    let hours: u64 = raw
        .trim()
        .parse()
        .with_context(|| format!("LOC8R_JWT_EXPIRATION_HOURS is not a number of hours: {raw}"))?;

    if !(1..=auth::MAX_JWT_EXPIRATION_HOURS).contains(&hours) {
        anyhow::bail!(
            "LOC8R_JWT_EXPIRATION_HOURS must be between 1 and {}, got {hours}",
            auth::MAX_JWT_EXPIRATION_HOURS
        );
    }
    Ok(hours)
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Database URL, or `memory` for the in-memory store.
    pub database_url: String,
    /// HMAC secret used to sign access tokens.
    pub jwt_secret: String,
    /// JWT expiration in hours.
    pub jwt_expiration_hours: u64,
    /// Deployment environment.
    pub environment: Environment,
    /// Whether a failed login tells the client which check failed.
    pub expose_login_failure_reason: bool,
    /// Log level.
    pub log_level: String,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.trim().is_empty())
            .context("JWT_SECRET is required")?;

        let port = match lookup("LOC8R_SERVER_PORT") {
            Some(port) => port
                .parse()
                .with_context(|| format!("LOC8R_SERVER_PORT is not a valid port: {port}"))?,
            None => 3000,
        };

        let jwt_expiration_hours = match lookup("LOC8R_JWT_EXPIRATION_HOURS") {
            Some(hours) => parse_expiration_hours(&hours)?,
            None => auth::DEFAULT_JWT_EXPIRATION_HOURS,
        };

        let environment = match lookup("LOC8R_ENV") {
            Some(value) => Environment::parse(&value)?,
            None => Environment::Development,
        };

        Ok(Self {
            host: lookup("LOC8R_SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite:loc8r.db?mode=rwc".to_string()),
            jwt_secret,
            jwt_expiration_hours,
            environment,
            expose_login_failure_reason: lookup("LOC8R_EXPOSE_LOGIN_FAILURE_REASON")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),
            log_level: lookup("LOC8R_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Returns the server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Returns true if internal error detail should be sent to clients.
    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    /// Returns true if the in-memory store was selected.
    pub fn uses_memory_store(&self) -> bool {
        self.database_url == MEMORY_DATABASE_URL
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("JWT_SECRET", "secret")]).unwrap();

        assert_eq!(config.server_addr(), "0.0.0.0:3000");
        assert_eq!(config.database_url, "sqlite:loc8r.db?mode=rwc");
        assert_eq!(config.jwt_expiration_hours, 168);
        assert!(config.is_development());
        assert!(!config.expose_login_failure_reason);
        assert!(!config.uses_memory_store());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_jwt_secret_required() {
        assert!(config_from(&[]).is_err());
        assert!(config_from(&[("JWT_SECRET", "  ")]).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("JWT_SECRET", "secret"),
            ("LOC8R_SERVER_HOST", "127.0.0.1"),
            ("LOC8R_SERVER_PORT", "8080"),
            ("DATABASE_URL", "memory"),
            ("LOC8R_JWT_EXPIRATION_HOURS", "2"),
            ("LOC8R_ENV", "production"),
            ("LOC8R_EXPOSE_LOGIN_FAILURE_REASON", "true"),
        ])
        .unwrap();

        assert_eq!(config.server_addr(), "127.0.0.1:8080");
        assert!(config.uses_memory_store());
        assert_eq!(config.jwt_expiration_hours, 2);
        assert_eq!(config.environment, Environment::Production);
        assert!(config.expose_login_failure_reason);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(config_from(&[("JWT_SECRET", "s"), ("LOC8R_SERVER_PORT", "http")]).is_err());
        assert!(config_from(&[("JWT_SECRET", "s"), ("LOC8R_ENV", "staging")]).is_err());
    }

    #[test]
    fn test_expiration_hours_bounded() {
        let with_hours = |hours: &str| {
            config_from(&[("JWT_SECRET", "s"), ("LOC8R_JWT_EXPIRATION_HOURS", hours)])
        };

        assert!(with_hours("0").is_err());
        assert!(with_hours("10000000000").is_err());
        assert!(with_hours("-1").is_err());
        assert_eq!(
            with_hours(&auth::MAX_JWT_EXPIRATION_HOURS.to_string())
                .unwrap()
                .jwt_expiration_hours,
            auth::MAX_JWT_EXPIRATION_HOURS
        );
    }
}
