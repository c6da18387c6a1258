//! Permission middleware for Axum.

use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use coffee_shop_access::{AccessGuard, AuthError, AuthErrorCategory};
use std::sync::Arc;
use tracing::{debug, warn};

/// The guard and the permission one route requires.
#[derive(Clone)]
pub struct PermissionGate {
    guard: Arc<AccessGuard>,
    permission: &'static str,
}

impl PermissionGate {
    /// Creates a gate requiring `permission`.
    pub fn new(guard: Arc<AccessGuard>, permission: &'static str) -> Self {
        Self { guard, permission }
    }
}

/// Rejects the request unless its bearer token carries the gate's
/// permission. On success the verified
/// [`ClaimSet`](coffee_shop_access::ClaimSet) is inserted into the request
/// extensions.
pub async fn require_permission(
    State(gate): State<PermissionGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = match request.headers().get(AUTHORIZATION) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| ApiError::Auth(AuthError::InvalidScheme))?
                .to_owned(),
        ),
        None => None,
    };

    let claims = gate
        .guard
        .authorize(authorization.as_deref(), gate.permission)
        .await
        .map_err(|err| {
            match err.category() {
                AuthErrorCategory::Authorization => {
                    warn!(permission = gate.permission, code = err.code(), "permission denied");
                }
                _ => debug!(permission = gate.permission, code = err.code(), error = %err, "request not authenticated"),
            }
            ApiError::Auth(err)
        })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}
