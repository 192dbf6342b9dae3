// src/handlers/auth.rs

use std::sync::Arc;

use axum::{
    Extension, Form,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use validator::Validate;

use crate::{
    backend::Backend,
    config::Config,
    error::AppError,
    models::account::{Session, SignInForm, SignUpForm},
    session::{Viewer, redirect_to_sign_in},
    state::AppState,
    utils::cookie::session_cookie,
    views::auth::{CONFIRM_EMAIL_NOTICE, SignUpValues, sign_in_page, sign_up_page},
};

#[derive(Debug, Default, Deserialize)]
pub struct SignInQuery {
    pub notice: Option<String>,
}

/// Stores the session token in the cookie and goes to the home feed.
fn enter_app(jar: CookieJar, session: Session, secure: bool) -> Response {
    let jar = jar.add(session_cookie(session.access_token, secure));
    (jar, Redirect::to("/home")).into_response()
}

/// Sign-in screen.
pub async fn sign_in_form(Query(query): Query<SignInQuery>) -> Html<String> {
    let notice = match query.notice.as_deref() {
        Some("confirm") => Some(CONFIRM_EMAIL_NOTICE),
        _ => None,
    };
    Html(sign_in_page("", None, notice))
}

/// Authenticates with email + password.
///
/// Failures are shown inline on the form; there is no retry.
pub async fn sign_in(
    State(backend): State<Arc<dyn Backend>>,
    State(config): State<Config>,
    jar: CookieJar,
    Form(form): Form<SignInForm>,
) -> Response {
    let result = match form.validate() {
        Ok(()) => backend.sign_in(&form.email, &form.password).await,
        Err(e) => Err(AppError::from(e)),
    };

    match result {
        Ok(session) => {
            tracing::info!(user_id = %session.user.id, "signed in");
            enter_app(jar, session, config.cookie_secure)
        }
        Err(e) => {
            tracing::info!("sign-in rejected: {}", e);
            let page = sign_in_page(&form.email, Some(e.user_message()), None);
            (e.status(), Html(page)).into_response()
        }
    }
}

/// Sign-up screen.
pub async fn sign_up_form() -> Html<String> {
    Html(sign_up_page(SignUpValues::default(), None))
}

/// Creates the account with `username` and `full_name` metadata.
pub async fn sign_up(
    State(backend): State<Arc<dyn Backend>>,
    State(config): State<Config>,
    jar: CookieJar,
    Form(form): Form<SignUpForm>,
) -> Response {
    let result = match form.validate() {
        Ok(()) => backend.sign_up(&form).await,
        Err(e) => Err(AppError::from(e)),
    };

    match result {
        Ok(Some(session)) => {
            tracing::info!(user_id = %session.user.id, "signed up");
            enter_app(jar, session, config.cookie_secure)
        }
        Ok(None) => Redirect::to("/?notice=confirm").into_response(),
        Err(e) => {
            tracing::info!("sign-up rejected: {}", e);
            let values = SignUpValues {
                username: &form.username,
                display_name: &form.display_name,
                email: &form.email,
            };
            let page = sign_up_page(values, Some(e.user_message()));
            (e.status(), Html(page)).into_response()
        }
    }
}

/// Ends the session at the provider and drops the cookie.
pub async fn sign_out(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    jar: CookieJar,
) -> Response {
    if let Err(e) = state.backend.sign_out(&viewer.access_token).await {
        tracing::warn!("provider sign-out failed, clearing cookie anyway: {}", e);
    }
    tracing::info!(user_id = %viewer.account.id, "signed out");
    redirect_to_sign_in(jar)
}
