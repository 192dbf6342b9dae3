// src/handlers/posts.rs

//! Post and like actions. Success redirects back to the originating screen,
//! whose GET performs the full refetch. Failure re-renders that screen with
//! an alert.

use axum::{
    Extension, Form,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::{
    error::AppError,
    feed,
    models::post::{PostFilter, PostId},
    mutations,
    session::Viewer,
    state::AppState,
    views::{
        Screen,
        feed::{confirm_delete_page, home_page, profile_page},
    },
};

#[derive(Debug, Deserialize)]
pub struct ComposeForm {
    pub content: String,
    #[serde(default)]
    pub from: Screen,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReturnTo {
    #[serde(default)]
    pub from: Screen,
}

#[derive(Debug, Deserialize)]
pub struct LikeForm {
    /// Like state as rendered by the last fetch.
    pub liked: bool,
    #[serde(default)]
    pub from: Screen,
}

/// Refetches `screen` and renders it with `alert` above the feed.
async fn render_with_alert(
    state: &AppState,
    viewer: &Viewer,
    screen: Screen,
    compose: &str,
    alert: &str,
    err: &AppError,
) -> Response {
    let backend = state.backend.as_ref();
    let page = match screen {
        Screen::Home => {
            let posts = feed::list_posts(backend, viewer, &PostFilter::all()).await;
            home_page(&viewer.account, &posts, compose, Some(alert))
        }
        Screen::Profile => {
            let filter = PostFilter::by_author(viewer.account.id);
            let posts = feed::list_posts(backend, viewer, &filter).await;
            profile_page(&viewer.account, &posts, Some(alert))
        }
    };
    (err.status(), Html(page)).into_response()
}

/// Publishes a post. On failure the typed text is kept in the compose box.
pub async fn create_post(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Form(form): Form<ComposeForm>,
) -> Response {
    match mutations::create_post(state.backend.as_ref(), &viewer, &form.content).await {
        Ok(()) => Redirect::to(form.from.path()).into_response(),
        Err(e) => {
            let alert = match &e {
                AppError::BadRequest(msg) => msg.clone(),
                other => format!("Failed to post: {}", other.user_message()),
            };
            render_with_alert(&state, &viewer, form.from, &form.content, &alert, &e).await
        }
    }
}

/// Asks for confirmation before deleting.
pub async fn confirm_delete(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<String>,
    Query(query): Query<ReturnTo>,
) -> Html<String> {
    let post_id = PostId::new(id);
    let filter = PostFilter::by_author(viewer.account.id);
    let own_posts = feed::list_posts(state.backend.as_ref(), &viewer, &filter).await;
    let post = own_posts.iter().find(|item| item.post.id == post_id);
    Html(confirm_delete_page(post_id.as_str(), post, query.from))
}

pub async fn delete_post(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<String>,
    Form(form): Form<ReturnTo>,
) -> Response {
    let post_id = PostId::new(id);
    match mutations::delete_post(state.backend.as_ref(), &viewer, &post_id).await {
        Ok(()) => Redirect::to(form.from.path()).into_response(),
        Err(e) => {
            let alert = format!("Failed to delete: {}", e.user_message());
            render_with_alert(&state, &viewer, form.from, "", &alert, &e).await
        }
    }
}

/// Flips the viewer's like on a post, trusting the submitted `liked` flag.
pub async fn toggle_like(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
    Path(id): Path<String>,
    Form(form): Form<LikeForm>,
) -> Response {
    let post_id = PostId::new(id);
    let result = mutations::toggle_like(
        state.backend.as_ref(),
        &state.in_flight,
        &viewer,
        &post_id,
        form.liked,
    )
    .await;

    match result {
        Ok(_) => Redirect::to(form.from.path()).into_response(),
        Err(e) => {
            let alert = format!("Failed to update like: {}", e.user_message());
            render_with_alert(&state, &viewer, form.from, "", &alert, &e).await
        }
    }
}
