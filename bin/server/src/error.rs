//! Error types for the HTTP layer.
//!
//! Every failure leaving a handler is an [`ApiError`], rendered as the
//! uniform JSON envelope `{success: false, error: <status>, ...}`. Storage
//! details are logged and never sent to the client.

use crate::db::StoreError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use coffee_shop_access::AuthError;
use coffee_shop_core::{InvalidDrink, ParseIdError};
use rootcause::Report;
use serde::Serialize;
use std::fmt;

/// Errors returned by request handlers.
#[derive(Debug)]
pub enum ApiError {
    /// The access check failed.
    Auth(AuthError),
    /// The requested drink or route does not exist.
    NotFound,
    /// The route exists but not for this method.
    MethodNotAllowed,
    /// The request body could not be used.
    Unprocessable { details: String },
    /// Storage failed.
    Internal,
}

impl ApiError {
    /// Creates an unprocessable-entity error.
    pub fn unprocessable(details: impl Into<String>) -> Self {
        Self::Unprocessable {
            details: details.into(),
        }
    }

    /// HTTP status of this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Auth(err) => {
                StatusCode::from_u16(err.status()).unwrap_or(StatusCode::UNAUTHORIZED)
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Self::Auth(err) => err.description(),
            Self::NotFound => "resource not found",
            Self::MethodNotAllowed => "method not allowed",
            Self::Unprocessable { .. } => "unprocessable",
            Self::Internal => "internal server error",
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth(err) => write!(f, "{err}"),
            Self::Unprocessable { details } => write!(f, "unprocessable: {details}"),
            _ => write!(f, "{}", self.message()),
        }
    }
}

impl std::error::Error for ApiError {}

#[derive(Serialize)]
#[serde(untagged)]
enum ErrorBody {
    Auth {
        success: bool,
        error: u16,
        code: &'static str,
        description: &'static str,
    },
    Resource {
        success: bool,
        error: u16,
        message: &'static str,
    },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Auth(err) => ErrorBody::Auth {
                success: false,
                error: status.as_u16(),
                code: err.code(),
                description: err.description(),
            },
            _ => ErrorBody::Resource {
                success: false,
                error: status.as_u16(),
                message: self.message(),
            },
        };
        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::Auth(err)
    }
}

impl From<Report<StoreError>> for ApiError {
    fn from(report: Report<StoreError>) -> Self {
        tracing::error!(error = %report, "storage operation failed");
        Self::Internal
    }
}

impl From<InvalidDrink> for ApiError {
    fn from(err: InvalidDrink) -> Self {
        Self::unprocessable(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::unprocessable(rejection.body_text())
    }
}

impl From<ParseIdError> for ApiError {
    fn from(err: ParseIdError) -> Self {
        tracing::debug!(error = %err, "path does not name a drink");
        Self::NotFound
    }
}

/// Errors that stop the server from starting.
#[derive(Debug)]
pub enum StartupError {
    /// The configured CORS origin is not a valid header value.
    InvalidOrigin { origin: String },
    /// Connecting to or preparing the database failed.
    Database { details: String },
    /// The key set client could not be created.
    KeySource { details: String },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidOrigin { origin } => write!(f, "invalid CORS origin '{origin}'"),
            Self::Database { details } => write!(f, "database setup failed: {details}"),
            Self::KeySource { details } => write!(f, "key set client setup failed: {details}"),
        }
    }
}

impl std::error::Error for StartupError {}
