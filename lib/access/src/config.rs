//! Configuration for verifying tokens from the identity provider.
//!
//! Tokens are issued by an external provider identified by its domain.
//! The issuer and the key set location are both derived from that domain.

use jsonwebtoken::Algorithm;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the token issuer.
///
/// Fields with defaults can be omitted when loading from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// The identity provider domain (e.g., "coffee-shop.us.auth0.com").
    /// A value with an explicit scheme is used as-is.
    domain: String,
    /// The API audience that tokens must be issued for.
    audience: String,
    /// Signing algorithm tokens must use.
    /// Default: RS256
    #[serde(default = "default_algorithm")]
    algorithm: Algorithm,
    /// The claim holding the caller's permission strings.
    /// Default: "permissions"
    #[serde(default = "default_permissions_claim")]
    permissions_claim: String,
    /// How long a fetched key set is trusted before it is refetched.
    /// Default: 3600
    #[serde(default = "default_jwks_ttl_seconds")]
    jwks_ttl_seconds: u64,
    /// Minimum time between refetches triggered by an unknown key id.
    /// Default: 30
    #[serde(default = "default_jwks_refetch_cooldown_seconds")]
    jwks_refetch_cooldown_seconds: u64,
    /// Timeout for the key set request.
    /// Default: 5
    #[serde(default = "default_jwks_timeout_seconds")]
    jwks_timeout_seconds: u64,
}

fn default_algorithm() -> Algorithm {
    Algorithm::RS256
}

fn default_permissions_claim() -> String {
    "permissions".to_string()
}

fn default_jwks_ttl_seconds() -> u64 {
    3600
}

fn default_jwks_refetch_cooldown_seconds() -> u64 {
    30
}

fn default_jwks_timeout_seconds() -> u64 {
    5
}

impl AuthConfig {
    /// Creates a new configuration with defaults for optional fields.
    #[must_use]
    pub fn new(domain: String, audience: String) -> Self {
        Self {
            domain,
            audience,
            algorithm: default_algorithm(),
            permissions_claim: default_permissions_claim(),
            jwks_ttl_seconds: default_jwks_ttl_seconds(),
            jwks_refetch_cooldown_seconds: default_jwks_refetch_cooldown_seconds(),
            jwks_timeout_seconds: default_jwks_timeout_seconds(),
        }
    }

    /// Creates a configuration builder for more customization.
    #[must_use]
    pub fn builder(domain: String, audience: String) -> AuthConfigBuilder {
        AuthConfigBuilder::new(domain, audience)
    }

    /// Returns the identity provider domain.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Returns the expected audience.
    #[must_use]
    pub fn audience(&self) -> &str {
        &self.audience
    }

    /// Returns the required signing algorithm.
    #[must_use]
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Returns the name of the claim containing permissions.
    #[must_use]
    pub fn permissions_claim(&self) -> &str {
        &self.permissions_claim
    }

    /// Returns the expected issuer, always with a trailing slash.
    #[must_use]
    pub fn issuer(&self) -> String {
        format!("{}/", self.base_url())
    }

    /// Returns the URL of the published key set.
    #[must_use]
    pub fn jwks_url(&self) -> String {
        format!("{}/.well-known/jwks.json", self.base_url())
    }

    #[must_use]
    pub fn jwks_ttl(&self) -> Duration {
        Duration::from_secs(self.jwks_ttl_seconds)
    }

    #[must_use]
    pub fn jwks_refetch_cooldown(&self) -> Duration {
        Duration::from_secs(self.jwks_refetch_cooldown_seconds)
    }

    #[must_use]
    pub fn jwks_timeout(&self) -> Duration {
        Duration::from_secs(self.jwks_timeout_seconds)
    }

    fn base_url(&self) -> String {
        let domain = self.domain.trim_end_matches('/');
        if domain.contains("://") {
            domain.to_string()
        } else {
            format!("https://{domain}")
        }
    }
}

/// Builder for `AuthConfig`.
#[derive(Debug)]
pub struct AuthConfigBuilder {
    config: AuthConfig,
}

impl AuthConfigBuilder {
    /// Creates a new builder with required fields.
    #[must_use]
    pub fn new(domain: String, audience: String) -> Self {
        Self {
            config: AuthConfig::new(domain, audience),
        }
    }

    #[must_use]
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.config.algorithm = algorithm;
        self
    }

    #[must_use]
    pub fn permissions_claim(mut self, claim: String) -> Self {
        self.config.permissions_claim = claim;
        self
    }

    #[must_use]
    pub fn jwks_ttl(mut self, ttl: Duration) -> Self {
        self.config.jwks_ttl_seconds = ttl.as_secs();
        self
    }

    #[must_use]
    pub fn jwks_refetch_cooldown(mut self, cooldown: Duration) -> Self {
        self.config.jwks_refetch_cooldown_seconds = cooldown.as_secs();
        self
    }

    #[must_use]
    pub fn jwks_timeout(mut self, timeout: Duration) -> Self {
        self.config.jwks_timeout_seconds = timeout.as_secs();
        self
    }

    /// Builds the `AuthConfig`.
    #[must_use]
    pub fn build(self) -> AuthConfig {
        self.config
    }
}
