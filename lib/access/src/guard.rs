//! The access guard: verifies a bearer token and checks a permission.

use crate::bearer::bearer_token;
use crate::claims::ClaimSet;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::jwks::JwksCache;
use jsonwebtoken::Validation;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Verifies tokens against the issuer's published keys and authorizes
/// callers by permission.
///
/// Holds no per-request state; one guard is shared by all requests.
pub struct AccessGuard {
    config: AuthConfig,
    keys: Arc<JwksCache>,
    validation: Validation,
}

impl AccessGuard {
    /// Creates a guard for the issuer in `config`, resolving keys via `keys`.
    pub fn new(config: AuthConfig, keys: Arc<JwksCache>) -> Self {
        let mut validation = Validation::new(config.algorithm());
        validation.set_audience(&[config.audience()]);
        validation.set_issuer(&[config.issuer()]);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);

        Self {
            config,
            keys,
            validation,
        }
    }

    /// Authorizes a request from its `Authorization` header value.
    ///
    /// Returns the caller's verified claims if the token is valid and
    /// carries `required_permission`.
    #[instrument(skip(self, authorization))]
    pub async fn authorize(
        &self,
        authorization: Option<&str>,
        required_permission: &str,
    ) -> Result<ClaimSet, AuthError> {
        let token = bearer_token(authorization)?;
        let claims = self.verify(token).await?;
        claims.require(required_permission)?;
        debug!(
            subject = claims.subject(),
            permissions = claims.permissions().count(),
            expires_at = ?claims.expires_at(),
            "request authorized"
        );
        Ok(claims)
    }

    /// Verifies `token` and returns its claims, without checking any
    /// particular permission.
    pub async fn verify(&self, token: &str) -> Result<ClaimSet, AuthError> {
        let header = jsonwebtoken::decode_header(token).map_err(|e| AuthError::MalformedToken {
            reason: e.to_string(),
        })?;

        if header.alg != self.config.algorithm() {
            return Err(AuthError::UnexpectedAlgorithm {
                found: format!("{:?}", header.alg),
            });
        }

        let kid = header.kid.as_deref().ok_or(AuthError::MissingKeyId)?;
        let key = self.keys.decoding_key(kid).await?;

        let data = jsonwebtoken::decode::<Map<String, Value>>(token, &key, &self.validation)
            .map_err(|e| AuthError::from_jwt(&e))?;

        ClaimSet::from_payload(data.claims, self.config.permissions_claim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthErrorCategory;
    use crate::jwks::StaticKeySource;
    use crate::testing::{self, TestKey, TokenBuilder};
    use jsonwebtoken::Algorithm;

    fn guard_with(keys: &[TestKey]) -> AccessGuard {
        let config = testing::config();
        let source = Arc::new(StaticKeySource::new(testing::jwks(keys)));
        let cache = Arc::new(JwksCache::from_config(source, &config));
        AccessGuard::new(config, cache)
    }

    fn guard() -> AccessGuard {
        guard_with(&[TestKey::Primary])
    }

    async fn authorize(token: &TokenBuilder, permission: &str) -> Result<ClaimSet, AuthError> {
        guard()
            .authorize(Some(token.bearer().as_str()), permission)
            .await
    }

    #[tokio::test]
    async fn valid_token_with_permission_is_authorized() {
        let token = TokenBuilder::new().permissions(&["get:drinks-detail", "post:drinks"]);

        let claims = authorize(&token, "post:drinks").await.expect("authorized");

        assert!(claims.has_permission("post:drinks"));
        assert_eq!(claims.subject(), Some("auth0|test-user"));
    }

    #[tokio::test]
    async fn valid_token_without_permission_is_denied() {
        let token = TokenBuilder::new().permissions(&["get:drinks-detail"]);

        let err = authorize(&token, "delete:drinks").await.unwrap_err();

        assert_eq!(
            err,
            AuthError::PermissionDenied {
                permission: "delete:drinks".to_string()
            }
        );
        assert_eq!(err.category(), AuthErrorCategory::Authorization);
    }

    #[tokio::test]
    async fn bad_signature_is_rejected_regardless_of_permissions() {
        let token = TokenBuilder::new()
            .permissions(&["post:drinks"])
            .forged_with(TestKey::Rotated, TestKey::Primary);

        let err = authorize(&token, "post:drinks").await.unwrap_err();

        assert_eq!(err, AuthError::InvalidSignature);
        assert_eq!(err.category(), AuthErrorCategory::TokenValidation);
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let token = TokenBuilder::new()
            .permissions(&["post:drinks"])
            .expires_in(-3600);

        let err = authorize(&token, "post:drinks").await.unwrap_err();

        assert_eq!(err, AuthError::TokenExpired);
        assert_eq!(err.status(), 401);
    }

    #[tokio::test]
    async fn wrong_audience_is_rejected() {
        let token = TokenBuilder::new()
            .permissions(&["post:drinks"])
            .audience("someone-else");

        let err = authorize(&token, "post:drinks").await.unwrap_err();

        assert_eq!(err, AuthError::InvalidClaims);
    }

    #[tokio::test]
    async fn wrong_issuer_is_rejected() {
        let token = TokenBuilder::new()
            .permissions(&["post:drinks"])
            .issuer("https://evil.example/");

        let err = authorize(&token, "post:drinks").await.unwrap_err();

        assert_eq!(err, AuthError::InvalidClaims);
    }

    #[tokio::test]
    async fn unknown_key_id_is_rejected() {
        let token = TokenBuilder::new()
            .permissions(&["post:drinks"])
            .signed_with(TestKey::Rotated);

        let err = authorize(&token, "post:drinks").await.unwrap_err();

        assert_eq!(err.code(), "invalid_key_id");
        assert_eq!(err.status(), 401);
    }

    #[tokio::test]
    async fn rotated_key_is_accepted_once_published() {
        let token = TokenBuilder::new()
            .permissions(&["post:drinks"])
            .signed_with(TestKey::Rotated);

        let claims = guard_with(&[TestKey::Primary, TestKey::Rotated])
            .authorize(Some(token.bearer().as_str()), "post:drinks")
            .await
            .expect("authorized");

        assert!(claims.has_permission("post:drinks"));
    }

    #[tokio::test]
    async fn missing_key_id_is_rejected() {
        let token = TokenBuilder::new().permissions(&["post:drinks"]).kid(None);

        let err = authorize(&token, "post:drinks").await.unwrap_err();

        assert_eq!(err, AuthError::MissingKeyId);
        assert_eq!(err.status(), 401);
    }

    #[tokio::test]
    async fn unexpected_algorithm_is_rejected() {
        let token = TokenBuilder::new()
            .permissions(&["post:drinks"])
            .algorithm(Algorithm::RS384);

        let err = authorize(&token, "post:drinks").await.unwrap_err();

        assert!(matches!(err, AuthError::UnexpectedAlgorithm { .. }));
    }

    #[tokio::test]
    async fn missing_permissions_claim_is_400() {
        let token = TokenBuilder::new().without_permissions_claim();

        let err = authorize(&token, "post:drinks").await.unwrap_err();

        assert_eq!(err, AuthError::MissingPermissions);
        assert_eq!(err.status(), 400);
    }

    #[tokio::test]
    async fn garbage_token_is_400() {
        let err = guard()
            .authorize(Some("Bearer not-a-jwt"), "post:drinks")
            .await
            .unwrap_err();

        assert_eq!(err.status(), 400);
        assert_eq!(err.code(), "invalid_header");
    }

    #[tokio::test]
    async fn header_problems_fail_before_verification() {
        let guard = guard();

        assert_eq!(
            guard.authorize(None, "post:drinks").await.unwrap_err(),
            AuthError::MissingHeader
        );
        assert_eq!(
            guard
                .authorize(Some("Token abc"), "post:drinks")
                .await
                .unwrap_err(),
            AuthError::InvalidScheme
        );
        assert_eq!(
            guard
                .authorize(Some("Bearer"), "post:drinks")
                .await
                .unwrap_err(),
            AuthError::TokenNotFound
        );
    }

    #[tokio::test]
    async fn verify_returns_claims_without_permission_check() {
        let token = TokenBuilder::new().sign();

        let claims = guard().verify(&token).await.expect("verified");

        assert_eq!(claims.permissions().count(), 0);
        assert!(claims.expires_at().is_some());
    }
}
