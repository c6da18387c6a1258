//! Error types for the access crate.
//!
//! - `AuthError`: every way a request can fail the access check. Each
//!   variant maps to an HTTP status and a machine-readable code.
//! - `KeySetError`: failures fetching the published key set. These are
//!   reported through rootcause and surface to callers as
//!   `AuthError::KeySetUnavailable`.

use std::fmt;

/// Broad class of an [`AuthError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCategory {
    /// The credential is missing or not a well-formed bearer header.
    Authentication,
    /// The caller is verified but lacks the required permission.
    Authorization,
    /// The token itself failed verification.
    TokenValidation,
}

/// Errors from authorizing a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization` header was sent.
    MissingHeader,
    /// The header does not start with the `Bearer` scheme.
    InvalidScheme,
    /// The header names the scheme but carries no token.
    TokenNotFound,
    /// The header has more parts than `Bearer <token>`.
    NotBearerToken,
    /// The token header has no key id.
    MissingKeyId,
    /// The token was signed with an algorithm other than the configured one.
    UnexpectedAlgorithm { found: String },
    /// No published key matches the token's key id.
    UnknownKeyId { kid: String },
    /// The published key set could not be loaded.
    KeySetUnavailable { reason: String },
    /// The token has expired.
    TokenExpired,
    /// Audience, issuer or another registered claim is wrong.
    InvalidClaims,
    /// The signature does not verify against the key.
    InvalidSignature,
    /// The token could not be parsed.
    MalformedToken { reason: String },
    /// The verified payload has no permission list.
    MissingPermissions,
    /// The caller lacks the required permission.
    PermissionDenied { permission: String },
}

impl AuthError {
    /// HTTP status code to answer with.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::MalformedToken { .. } | Self::MissingPermissions => 400,
            Self::KeySetUnavailable { .. } => 503,
            _ => 401,
        }
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingHeader => "authorization_header_missing",
            Self::InvalidScheme
            | Self::TokenNotFound
            | Self::NotBearerToken
            | Self::MissingKeyId
            | Self::UnexpectedAlgorithm { .. }
            | Self::MalformedToken { .. } => "invalid_header",
            Self::UnknownKeyId { .. } => "invalid_key_id",
            Self::KeySetUnavailable { .. } => "jwks_unavailable",
            Self::TokenExpired => "token_expired",
            Self::InvalidClaims | Self::MissingPermissions => "invalid_claims",
            Self::InvalidSignature => "invalid_signature",
            Self::PermissionDenied { .. } => "unauthorized",
        }
    }

    /// Human-readable description safe to return to the client.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::MissingHeader => "Authorization header is expected.",
            Self::InvalidScheme => "Authorization header must start with \"Bearer\".",
            Self::TokenNotFound => "Token not found.",
            Self::NotBearerToken => "Authorization header must be bearer token.",
            Self::MissingKeyId => "Authorization malformed.",
            Self::UnexpectedAlgorithm { .. } => "Token is signed with an unexpected algorithm.",
            Self::UnknownKeyId { .. } => "Unable to find the appropriate key.",
            Self::KeySetUnavailable { .. } => "Unable to load the signing keys.",
            Self::TokenExpired => "Token expired.",
            Self::InvalidClaims => "Incorrect claims. Please, check the audience and issuer.",
            Self::InvalidSignature => "Token signature is invalid.",
            Self::MalformedToken { .. } => "Unable to parse authentication token.",
            Self::MissingPermissions => "Permissions not included in JWT.",
            Self::PermissionDenied { .. } => "Permission not found.",
        }
    }

    /// Broad class of the failure.
    #[must_use]
    pub fn category(&self) -> AuthErrorCategory {
        match self {
            Self::MissingHeader | Self::InvalidScheme | Self::TokenNotFound | Self::NotBearerToken => {
                AuthErrorCategory::Authentication
            }
            Self::PermissionDenied { .. } => AuthErrorCategory::Authorization,
            _ => AuthErrorCategory::TokenValidation,
        }
    }

    pub(crate) fn from_jwt(err: &jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::TokenExpired,
            ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidSubject
            | ErrorKind::ImmatureSignature
            | ErrorKind::MissingRequiredClaim(_) => Self::InvalidClaims,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            _ => Self::MalformedToken {
                reason: err.to_string(),
            },
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedAlgorithm { found } => {
                write!(f, "{}: {found}", self.code())
            }
            Self::UnknownKeyId { kid } => write!(f, "{}: no key with id '{kid}'", self.code()),
            Self::KeySetUnavailable { reason } | Self::MalformedToken { reason } => {
                write!(f, "{}: {reason}", self.code())
            }
            Self::PermissionDenied { permission } => {
                write!(f, "{}: missing permission '{permission}'", self.code())
            }
            _ => write!(f, "{}: {}", self.code(), self.description()),
        }
    }
}

impl std::error::Error for AuthError {}

/// Errors from fetching the published key set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySetError {
    /// HTTP client could not be built.
    Client { reason: String },
    /// The request failed or timed out.
    Request { url: String, reason: String },
    /// The endpoint answered with a non-success status.
    Status { url: String, status: u16 },
    /// The body is not a valid JSON Web Key Set.
    Parse { url: String, reason: String },
}

impl fmt::Display for KeySetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client { reason } => write!(f, "failed to create HTTP client: {reason}"),
            Self::Request { url, reason } => {
                write!(f, "key set request to '{url}' failed: {reason}")
            }
            Self::Status { url, status } => {
                write!(f, "key set endpoint '{url}' returned status {status}")
            }
            Self::Parse { url, reason } => {
                write!(f, "key set from '{url}' is invalid: {reason}")
            }
        }
    }
}

impl std::error::Error for KeySetError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_errors_are_authentication_401() {
        for err in [
            AuthError::MissingHeader,
            AuthError::InvalidScheme,
            AuthError::TokenNotFound,
            AuthError::NotBearerToken,
        ] {
            assert_eq!(err.status(), 401);
            assert_eq!(err.category(), AuthErrorCategory::Authentication);
        }
    }

    #[test]
    fn header_errors_have_distinct_descriptions() {
        let descriptions = [
            AuthError::MissingHeader.description(),
            AuthError::InvalidScheme.description(),
            AuthError::TokenNotFound.description(),
            AuthError::NotBearerToken.description(),
        ];
        for (i, a) in descriptions.iter().enumerate() {
            for b in &descriptions[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn missing_header_code() {
        assert_eq!(
            AuthError::MissingHeader.code(),
            "authorization_header_missing"
        );
    }

    #[test]
    fn permission_denied_is_authorization_401() {
        let err = AuthError::PermissionDenied {
            permission: "post:drinks".to_string(),
        };
        assert_eq!(err.status(), 401);
        assert_eq!(err.code(), "unauthorized");
        assert_eq!(err.category(), AuthErrorCategory::Authorization);
        assert!(err.to_string().contains("post:drinks"));
    }

    #[test]
    fn missing_permissions_is_400() {
        assert_eq!(AuthError::MissingPermissions.status(), 400);
        assert_eq!(AuthError::MissingPermissions.code(), "invalid_claims");
    }

    #[test]
    fn unknown_key_id_is_token_validation_401() {
        let err = AuthError::UnknownKeyId {
            kid: "abc".to_string(),
        };
        assert_eq!(err.status(), 401);
        assert_eq!(err.code(), "invalid_key_id");
        assert_eq!(err.category(), AuthErrorCategory::TokenValidation);
    }

    #[test]
    fn malformed_token_is_400() {
        let err = AuthError::MalformedToken {
            reason: "bad base64".to_string(),
        };
        assert_eq!(err.status(), 400);
        assert_eq!(err.code(), "invalid_header");
    }

    #[test]
    fn jwt_expired_maps_to_token_expired() {
        let err = jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::ExpiredSignature,
        );
        assert_eq!(AuthError::from_jwt(&err), AuthError::TokenExpired);
    }

    #[test]
    fn jwt_audience_maps_to_invalid_claims() {
        let err =
            jsonwebtoken::errors::Error::from(jsonwebtoken::errors::ErrorKind::InvalidAudience);
        assert_eq!(AuthError::from_jwt(&err), AuthError::InvalidClaims);
    }

    #[test]
    fn key_set_error_display_names_url() {
        let err = KeySetError::Status {
            url: "https://issuer.example/.well-known/jwks.json".to_string(),
            status: 502,
        };
        assert!(err.to_string().contains("jwks.json"));
        assert!(err.to_string().contains("502"));
    }
}
