// src/handlers/mod.rs

pub mod auth;
pub mod home;
pub mod posts;
pub mod profile;

use axum::{http::StatusCode, response::Html};

use crate::views;

/// Fallback for unknown paths.
pub async fn not_found() -> (StatusCode, Html<String>) {
    (
        StatusCode::NOT_FOUND,
        Html(views::error_page(StatusCode::NOT_FOUND, "This page doesn't exist.")),
    )
}
