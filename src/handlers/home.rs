// src/handlers/home.rs

use axum::{Extension, extract::State, response::Html};

use crate::{
    feed, models::post::PostFilter, session::Viewer, state::AppState, views::feed::home_page,
};

/// Global feed, newest first, with the compose box.
pub async fn home(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
) -> Html<String> {
    let posts = feed::list_posts(state.backend.as_ref(), &viewer, &PostFilter::all()).await;
    Html(home_page(&viewer.account, &posts, "", None))
}
