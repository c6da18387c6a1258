//! Fixture keys and token signing helpers.
//!
//! Available to this crate's tests and, through the `test-support`
//! feature, to dependent crates' tests. The keys are committed test
//! fixtures and must never be trusted outside tests.

use crate::config::AuthConfig;
use chrono::Utc;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde_json::{Map, Value, json};
use std::time::Duration;

/// Identity provider domain used by test tokens.
pub const TEST_DOMAIN: &str = "coffee-shop.test.example";

/// Audience used by test tokens.
pub const TEST_AUDIENCE: &str = "drinks";

const PRIMARY_PEM: &str = include_str!("primary.pem");
const ROTATED_PEM: &str = include_str!("rotated.pem");

const PRIMARY_MODULUS: &str = "8UhU79WDdgjWkMuNyOeQKcYCyJEmE5LQPTfojafcasrcL8SsJ-IF3ZabVLSIBPSVAZ4uLIGHNhMR0bBf89dzKKrPE4Xy4yR2D_zx6TyxCwdzbOxIYfNkrrBEUqGd3LX0jC_Tzhdmu3FvQNj_QvEg70dCFX01E-jMYotNEhq3GsKnV_4f_uB6cybwfukOwkx0F0qaFFHurMKnnYD8XQyLW0uvKu_KaLk31y6frtXOPJTXPlwHV1s-fbRwKBOquZSKnTKKFCDp87DlbDc2e7ft2zSg6cE5yxD7CrE7VbZJdFrLyO6M_ik87GkbT58J6UXJOt-QaiuF7RCkfC8RINBowQ";
const ROTATED_MODULUS: &str = "tb-e7gUGXDSyAu1rP68I1ojn2FR_-lAAX6hMwX7SY66NH8tj61ki4h9WBYRI2QcBkatOqB-JcF2w4kkOtfNUSuMrMMG-O5MBy3Os4pshRdZyo_eZUkciq1isUgFGELEYJc7YkmJqUTaLfp9ZfVxTWL4eNwvW0NhbdWgix-CEY19RXPbH9SUFtQMbiYKhi50KjK5zL9yg_0vp-M6tHkJw3tHGCzB9EosIkVOXdCp5P17uEoLCozyE4P7MF8g9_zVjQLD6e4oM6tq1BxtNHuHoBdLvPCZgELHFhiTLayvkVMmuavnZIKEkSHpqGoo8Ud8CLgz8cfV9BoR1yxSyorW8aw";

/// One of the fixture RSA key pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestKey {
    /// The key published from the start.
    Primary,
    /// A second key, used for rotation and forged-signature cases.
    Rotated,
}

impl TestKey {
    /// Key id published for this key.
    #[must_use]
    pub fn kid(&self) -> &'static str {
        match self {
            Self::Primary => "test-key-primary",
            Self::Rotated => "test-key-rotated",
        }
    }

    fn pem(&self) -> &'static str {
        match self {
            Self::Primary => PRIMARY_PEM,
            Self::Rotated => ROTATED_PEM,
        }
    }

    fn modulus(&self) -> &'static str {
        match self {
            Self::Primary => PRIMARY_MODULUS,
            Self::Rotated => ROTATED_MODULUS,
        }
    }

    fn jwk(&self) -> Value {
        json!({
            "kty": "RSA",
            "use": "sig",
            "alg": "RS256",
            "kid": self.kid(),
            "n": self.modulus(),
            "e": "AQAB"
        })
    }
}

/// Configuration matching the tokens built by [`TokenBuilder`].
#[must_use]
pub fn config() -> AuthConfig {
    AuthConfig::builder(TEST_DOMAIN.to_string(), TEST_AUDIENCE.to_string())
        .jwks_refetch_cooldown(Duration::ZERO)
        .build()
}

/// A key set publishing the given keys.
#[must_use]
pub fn jwks(keys: &[TestKey]) -> JwkSet {
    let keys: Vec<Value> = keys.iter().map(TestKey::jwk).collect();
    serde_json::from_value(json!({ "keys": keys })).expect("fixture key set is valid")
}

/// Builds signed test tokens. Defaults produce a valid token for
/// [`config`] that expires in one hour and carries no permissions.
#[derive(Debug, Clone)]
pub struct TokenBuilder {
    signing_key: TestKey,
    kid: Option<String>,
    algorithm: Algorithm,
    issuer: String,
    audience: String,
    subject: String,
    expires_in_secs: i64,
    permissions: Option<Vec<String>>,
}

impl Default for TokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenBuilder {
    #[must_use]
    pub fn new() -> Self {
        let config = config();
        Self {
            signing_key: TestKey::Primary,
            kid: Some(TestKey::Primary.kid().to_string()),
            algorithm: Algorithm::RS256,
            issuer: config.issuer(),
            audience: TEST_AUDIENCE.to_string(),
            subject: "auth0|test-user".to_string(),
            expires_in_secs: 3600,
            permissions: Some(Vec::new()),
        }
    }

    /// Adds permissions to the token.
    #[must_use]
    pub fn permissions(mut self, permissions: &[&str]) -> Self {
        self.permissions
            .get_or_insert_with(Vec::new)
            .extend(permissions.iter().map(|p| p.to_string()));
        self
    }

    /// Omits the permissions claim entirely.
    #[must_use]
    pub fn without_permissions_claim(mut self) -> Self {
        self.permissions = None;
        self
    }

    /// Signs with `key` and advertises its key id.
    #[must_use]
    pub fn signed_with(mut self, key: TestKey) -> Self {
        self.signing_key = key;
        self.kid = Some(key.kid().to_string());
        self
    }

    /// Signs with `key` while advertising a different key id.
    #[must_use]
    pub fn forged_with(mut self, key: TestKey, advertised: TestKey) -> Self {
        self.signing_key = key;
        self.kid = Some(advertised.kid().to_string());
        self
    }

    /// Overrides the advertised key id.
    #[must_use]
    pub fn kid(mut self, kid: Option<&str>) -> Self {
        self.kid = kid.map(str::to_string);
        self
    }

    #[must_use]
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    #[must_use]
    pub fn issuer(mut self, issuer: &str) -> Self {
        self.issuer = issuer.to_string();
        self
    }

    #[must_use]
    pub fn audience(mut self, audience: &str) -> Self {
        self.audience = audience.to_string();
        self
    }

    /// Sets expiry relative to now; negative values produce expired tokens.
    #[must_use]
    pub fn expires_in(mut self, secs: i64) -> Self {
        self.expires_in_secs = secs;
        self
    }

    /// Signs the token.
    #[must_use]
    pub fn sign(&self) -> String {
        let now = Utc::now().timestamp();
        let mut claims = Map::new();
        claims.insert("iss".to_string(), json!(self.issuer));
        claims.insert("sub".to_string(), json!(self.subject));
        claims.insert("aud".to_string(), json!(self.audience));
        claims.insert("iat".to_string(), json!(now));
        claims.insert("exp".to_string(), json!(now + self.expires_in_secs));
        if let Some(permissions) = &self.permissions {
            claims.insert("permissions".to_string(), json!(permissions));
        }

        let mut header = Header::new(self.algorithm);
        header.kid = self.kid.clone();

        let key = EncodingKey::from_rsa_pem(self.signing_key.pem().as_bytes())
            .expect("fixture key is valid");
        jsonwebtoken::encode(&header, &claims, &key).expect("token signs")
    }

    /// Signs the token and formats it as an `Authorization` header value.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.sign())
    }
}
