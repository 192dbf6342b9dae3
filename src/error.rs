// src/error.rs

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use std::fmt;

/// Global Application Error Enum.
/// Every layer (config, backend client, mutations, handlers) reports failures through it.
#[derive(Debug)]
pub enum AppError {
    // Missing or malformed environment configuration. Fatal at startup.
    Config(String),

    // 422 Unprocessable Entity (blank post, invalid form)
    BadRequest(String),

    // 401 Unauthorized (sign-in/sign-up rejected by the auth provider)
    AuthError(String),

    // 403 Forbidden (row-level rule rejected the write)
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict (foreign key failure, email already registered)
    Conflict(String),

    // 409 Conflict (unique key violation: the row already exists)
    Duplicate(String),

    // 502 Bad Gateway (the hosted backend failed or was unreachable)
    Backend(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::AuthError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::Duplicate(_) => StatusCode::CONFLICT,
            AppError::Backend(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The message a user may see. Internal failures are masked.
    pub fn user_message(&self) -> &str {
        match self {
            AppError::BadRequest(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::Duplicate(msg)
            | AppError::Backend(msg) => msg,
            AppError::Config(_) | AppError::InternalServerError(_) => "Internal Server Error",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "configuration error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "bad request: {}", msg),
            AppError::AuthError(msg) => write!(f, "authentication failed: {}", msg),
            AppError::Forbidden(msg) => write!(f, "forbidden: {}", msg),
            AppError::NotFound(msg) => write!(f, "not found: {}", msg),
            AppError::Conflict(msg) => write!(f, "conflict: {}", msg),
            AppError::Duplicate(msg) => write!(f, "duplicate: {}", msg),
            AppError::Backend(msg) => write!(f, "backend error: {}", msg),
            AppError::InternalServerError(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

/// Renders the error as a bare HTML page with the matching status code.
/// Screens that can recover (alert banner, inline message) handle errors
/// themselves; this is the fallback for everything else.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        let body = crate::views::error_page(status, self.user_message());
        (status, Html(body)).into_response()
    }
}

/// Transport-level failures talking to the hosted backend.
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Backend(format!("unexpected response shape: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::AuthError(err.to_string())
    }
}
