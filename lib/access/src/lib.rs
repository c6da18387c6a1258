//! Bearer token verification and permission checks for the coffee shop API.
//!
//! This crate provides:
//! - Extraction of the bearer credential from an `Authorization` header
//! - A cached view of the identity provider's published signing keys
//! - Token verification (signature, expiry, audience, issuer)
//! - Permission checks against the verified claim set
//!
//! Tokens are issued and signed by a third party. This crate only verifies
//! and authorizes them.
//!
//! # Example
//!
//! ```no_run
//! use coffee_shop_access::{AccessGuard, AuthConfig, HttpKeySource, JwksCache};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AuthConfig::new(
//!     "coffee-shop.us.auth0.com".to_string(),
//!     "drinks".to_string(),
//! );
//! let source = HttpKeySource::from_config(&config).map_err(|e| e.to_string())?;
//! let keys = Arc::new(JwksCache::from_config(Arc::new(source), &config));
//! let guard = AccessGuard::new(config, keys);
//!
//! let claims = guard
//!     .authorize(Some("Bearer eyJhbGciOi..."), "get:drinks-detail")
//!     .await?;
//! assert!(claims.has_permission("get:drinks-detail"));
//! # Ok(())
//! # }
//! ```

pub mod bearer;
pub mod claims;
pub mod config;
pub mod error;
pub mod guard;
pub mod jwks;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use bearer::bearer_token;
pub use claims::ClaimSet;
pub use config::{AuthConfig, AuthConfigBuilder};
pub use error::{AuthError, AuthErrorCategory, KeySetError};
pub use guard::AccessGuard;
pub use jwks::{HttpKeySource, JwksCache, KeySource, StaticKeySource};
