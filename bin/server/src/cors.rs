//! Cross-origin headers.
//!
//! Cross-origin requests are allowed from the single configured origin.
//! Every response also advertises the allowed headers, methods and
//! credentials, unless a handler already set them.

use crate::config::CorsConfig;
use crate::error::StartupError;
use axum::Router;
use axum::http::{HeaderValue, Method, header};
use coffee_shop_core::Result;
use tower_http::cors::CorsLayer;
use tower_http::set_header::SetResponseHeaderLayer;

const ALLOW_HEADERS: &str = "Content-Type, Authorization, true";
const ALLOW_METHODS: &str = "GET, POST, PATCH, DELETE, OPTIONS";

/// Wraps `router` with the CORS layers for `config`.
///
/// # Errors
///
/// Returns `StartupError::InvalidOrigin` if the origin is not a valid
/// header value.
pub fn apply<S>(router: Router<S>, config: &CorsConfig) -> Result<Router<S>, StartupError>
where
    S: Clone + Send + Sync + 'static,
{
    let origin = HeaderValue::from_str(&config.allowed_origin).map_err(|_| {
        StartupError::InvalidOrigin {
            origin: config.allowed_origin.clone(),
        }
    })?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    Ok(router
        .layer(cors)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        )))
}
