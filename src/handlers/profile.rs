// src/handlers/profile.rs

use axum::{Extension, extract::State, response::Html};

use crate::{
    feed, models::post::PostFilter, session::Viewer, state::AppState,
    views::feed::profile_page,
};

/// The viewer's own posts.
pub async fn profile(
    State(state): State<AppState>,
    Extension(viewer): Extension<Viewer>,
) -> Html<String> {
    let filter = PostFilter::by_author(viewer.account.id);
    let posts = feed::list_posts(state.backend.as_ref(), &viewer, &filter).await;
    Html(profile_page(&viewer.account, &posts, None))
}
