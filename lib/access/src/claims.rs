//! The verified claim set of a caller.

use crate::error::AuthError;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Verified token payload together with the caller's permissions.
///
/// Only built from a payload whose signature, expiry, audience and issuer
/// have already been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimSet {
    payload: Map<String, Value>,
    permissions: BTreeSet<String>,
}

impl ClaimSet {
    /// Builds a claim set, reading permissions from `permissions_claim`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingPermissions` if the claim is absent or is
    /// not a list of strings.
    pub fn from_payload(
        payload: Map<String, Value>,
        permissions_claim: &str,
    ) -> Result<Self, AuthError> {
        let permissions = payload
            .get(permissions_claim)
            .and_then(Value::as_array)
            .ok_or(AuthError::MissingPermissions)?
            .iter()
            .map(|v| v.as_str().map(str::to_string))
            .collect::<Option<BTreeSet<_>>>()
            .ok_or(AuthError::MissingPermissions)?;

        Ok(Self {
            payload,
            permissions,
        })
    }

    /// Returns true if the caller holds `permission`.
    #[must_use]
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    /// Fails unless the caller holds `permission`.
    pub fn require(&self, permission: &str) -> Result<(), AuthError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(AuthError::PermissionDenied {
                permission: permission.to_string(),
            })
        }
    }

    /// Returns the caller's permissions in sorted order.
    pub fn permissions(&self) -> impl Iterator<Item = &str> {
        self.permissions.iter().map(String::as_str)
    }

    /// Returns the `sub` claim.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.payload.get("sub").and_then(Value::as_str)
    }

    /// Returns the expiry time from the `exp` claim.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.payload
            .get("exp")
            .and_then(Value::as_i64)
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}
