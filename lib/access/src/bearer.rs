//! Extraction of the bearer credential from an `Authorization` header.

use crate::error::AuthError;

const SCHEME: &str = "bearer";

/// Extracts the token from an `Authorization` header value.
///
/// The header must be exactly `Bearer <token>`; the scheme is matched
/// case-insensitively.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = header.ok_or(AuthError::MissingHeader)?;
    let mut parts = header.split_whitespace();

    let scheme = parts.next().ok_or(AuthError::InvalidScheme)?;
    if !scheme.eq_ignore_ascii_case(SCHEME) {
        return Err(AuthError::InvalidScheme);
    }

    let token = parts.next().ok_or(AuthError::TokenNotFound)?;
    if parts.next().is_some() {
        return Err(AuthError::NotBearerToken);
    }

    Ok(token)
}
