// src/session.rs

//! Session Resolver: turns the session cookie into the signed-in account, or
//! sends the browser back to the sign-in screen.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::{
    backend::Backend,
    models::account::Account,
    state::AppState,
    utils::cookie::{clear_session_cookie, session_token},
};

/// The signed-in account for the current request.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub account: Account,
    pub access_token: String,
}

/// Asks the auth provider who owns the session cookie.
///
/// A missing cookie, a token the provider rejects and a provider failure are
/// all reported as `None`: an expired session looks exactly like no session.
pub async fn resolve_viewer(backend: &dyn Backend, jar: &CookieJar) -> Option<Viewer> {
    let token = session_token(jar)?;

    match backend.get_user(token).await {
        Ok(Some(account)) => Some(Viewer {
            account,
            access_token: token.to_string(),
        }),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("session lookup failed, treating as signed out: {}", e);
            None
        }
    }
}

/// Redirect to the sign-in screen, dropping whatever cookie was presented.
pub fn redirect_to_sign_in(jar: CookieJar) -> Response {
    (clear_session_cookie(jar), Redirect::to("/")).into_response()
}

/// Axum Middleware: Session gate.
///
/// Runs before every protected screen. Without a live session the request
/// never reaches its handler, so no table is read. Otherwise injects
/// [`Viewer`] into the request extensions.
pub async fn require_viewer(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(req.headers());
    match resolve_viewer(state.backend.as_ref(), &jar).await {
        Some(viewer) => {
            req.extensions_mut().insert(viewer);
            next.run(req).await
        }
        None => redirect_to_sign_in(jar),
    }
}
