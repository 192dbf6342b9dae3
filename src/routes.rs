// src/routes.rs

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    handlers::{self, auth, home, posts, profile},
    session::require_viewer,
    state::AppState,
};

const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Assembles the application router.
///
/// * Public screens: sign-in (`/`) and sign-up.
/// * Everything else sits behind the session gate, which redirects to `/`
///   before any data is read.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/home", get(home::home))
        .route("/profile", get(profile::profile))
        .route("/posts", post(posts::create_post))
        .route(
            "/posts/{id}/delete",
            get(posts::confirm_delete).post(posts::delete_post),
        )
        .route("/posts/{id}/like", post(posts::toggle_like))
        .route("/signout", post(auth::sign_out))
        .layer(middleware::from_fn_with_state(state.clone(), require_viewer));

    Router::new()
        .route("/", get(auth::sign_in_form).post(auth::sign_in))
        .route("/signup", get(auth::sign_up_form).post(auth::sign_up))
        .merge(protected)
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .fallback(handlers::not_found)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
