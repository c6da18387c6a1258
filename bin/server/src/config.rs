//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables.
//!
//! See [`AuthConfig`](coffee_shop_access::AuthConfig) for token
//! verification settings (`AUTH__DOMAIN`, `AUTH__AUDIENCE`, ...).

use coffee_shop_access::AuthConfig;
use serde::Deserialize;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// PostgreSQL database connection URL.
    /// Without one, drinks are kept in memory and lost on restart.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Maximum number of pooled database connections.
    #[serde(default = "default_database_max_connections")]
    pub database_max_connections: u32,

    /// Drop all drinks and insert the seed drink on startup.
    #[serde(default)]
    pub reset_database: bool,

    /// Token verification configuration.
    pub auth: AuthConfig,

    /// Cross-origin configuration.
    #[serde(default)]
    pub cors: CorsConfig,
}

/// Cross-origin configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// The single origin allowed to make cross-origin requests.
    #[serde(default = "default_allowed_origin")]
    pub allowed_origin: String,
}

fn default_bind_address() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_database_max_connections() -> u32 {
    5
}

fn default_allowed_origin() -> String {
    "http://localhost:8100".to_string()
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: default_allowed_origin(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let source = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Self::from_config(source)
    }

    /// Deserializes configuration from an already-built source.
    pub fn from_config(source: config::Config) -> Result<Self, config::ConfigError> {
        source.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> config::ConfigBuilder<config::builder::DefaultState> {
        config::Config::builder()
            .set_override("auth.domain", "shop.auth0.com")
            .expect("override")
            .set_override("auth.audience", "drinks")
            .expect("override")
    }

    #[test]
    fn cors_config_has_correct_defaults() {
        let config = CorsConfig::default();
        assert_eq!(config.allowed_origin, "http://localhost:8100");
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config =
            ServerConfig::from_config(minimal().build().expect("build")).expect("deserialize");

        assert_eq!(config.bind_address, "127.0.0.1:5000");
        assert_eq!(config.database_url, None);
        assert_eq!(config.database_max_connections, 5);
        assert!(!config.reset_database);
        assert_eq!(config.auth.domain(), "shop.auth0.com");
        assert_eq!(config.auth.audience(), "drinks");
        assert_eq!(config.cors.allowed_origin, "http://localhost:8100");
    }

    #[test]
    fn overrides_are_applied() {
        let source = minimal()
            .set_override("database_url", "postgres://localhost/drinks")
            .expect("override")
            .set_override("reset_database", true)
            .expect("override")
            .set_override("cors.allowed_origin", "https://shop.example")
            .expect("override")
            .build()
            .expect("build");

        let config = ServerConfig::from_config(source).expect("deserialize");

        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/drinks")
        );
        assert!(config.reset_database);
        assert_eq!(config.cors.allowed_origin, "https://shop.example");
    }

    #[test]
    fn missing_auth_is_an_error() {
        let source = config::Config::builder().build().expect("build");
        assert!(ServerConfig::from_config(source).is_err());
    }
}
