//! Router assembly.

use crate::auth::{PermissionGate, require_permission};
use crate::config::CorsConfig;
use crate::cors;
use crate::db::DrinkStore;
use crate::drinks::{self, DELETE_DRINKS, GET_DRINKS_DETAIL, PATCH_DRINKS, POST_DRINKS};
use crate::error::{ApiError, StartupError};
use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{MethodRouter, delete, get, patch, post},
};
use coffee_shop_access::AccessGuard;
use coffee_shop_core::Result;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state.
pub struct AppState {
    /// Drink persistence.
    pub store: Arc<dyn DrinkStore>,
    /// Token verification and permission checks.
    pub guard: Arc<AccessGuard>,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(store: Arc<dyn DrinkStore>, guard: Arc<AccessGuard>) -> Self {
        Self { store, guard }
    }

    fn protect(
        &self,
        permission: &'static str,
        route: MethodRouter<Arc<AppState>>,
    ) -> MethodRouter<Arc<AppState>> {
        route.route_layer(from_fn_with_state(
            PermissionGate::new(self.guard.clone(), permission),
            require_permission,
        ))
    }
}

/// Builds the application router.
///
/// # Errors
///
/// Returns `StartupError::InvalidOrigin` if the CORS origin is unusable.
pub fn router(state: Arc<AppState>, cors: &CorsConfig) -> Result<Router, StartupError> {
    let router = Router::new()
        .route(
            "/drinks",
            get(drinks::list_drinks)
                .merge(state.protect(POST_DRINKS, post(drinks::create_drink))),
        )
        .route(
            "/drinks-detail",
            state.protect(GET_DRINKS_DETAIL, get(drinks::list_drinks_detail)),
        )
        .route(
            "/drinks/{id}",
            state
                .protect(PATCH_DRINKS, patch(drinks::update_drink))
                .merge(state.protect(DELETE_DRINKS, delete(drinks::delete_drink))),
        )
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    cors::apply(router, cors)
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
