// src/views/feed.rs

use super::{Screen, alert_banner, app_frame, layout, post_card, short_date};
use crate::{feed::FeedPost, models::account::Account, utils::html::escape};

pub fn home_page(
    viewer: &Account,
    feed: &[FeedPost],
    compose: &str,
    alert: Option<&str>,
) -> String {
    let posts: String = feed
        .iter()
        .map(|item| post_card(item, viewer, Screen::Home))
        .collect();

    let main = format!(
        r#"<div class="sticky-header"><h1>Home</h1></div>
{alert}
<form id="compose" method="post" action="/posts" class="compose">
  <div class="avatar"></div>
  <div class="grow">
    <textarea name="content" placeholder="What is happening?!">{compose}</textarea>
    <input type="hidden" name="from" value="home">
    <div class="right"><button type="submit" class="button primary">Post</button></div>
  </div>
</form>
<section class="posts">
{posts}
</section>"#,
        alert = alert_banner(alert),
        compose = escape(compose),
        posts = posts,
    );

    app_frame("Home / MiniTwitter", viewer, Screen::Home, &main)
}

pub fn profile_page(viewer: &Account, feed: &[FeedPost], alert: Option<&str>) -> String {
    let name = escape(viewer.full_name().unwrap_or("User"));
    let handle = escape(viewer.username().unwrap_or("username"));
    let initial = escape(&viewer.initial().to_string());

    let joined = viewer
        .created_at
        .map(|ts| {
            format!(
                r#"<p class="muted small">📅 Joined {}</p>"#,
                ts.format("%B %Y")
            )
        })
        .unwrap_or_default();

    let posts = if feed.is_empty() {
        r#"<div class="empty">
  <h2>No posts yet</h2>
  <p class="muted">Your posts will appear here once you make them.</p>
</div>"#
            .to_string()
    } else {
        feed.iter()
            .map(|item| post_card(item, viewer, Screen::Profile))
            .collect()
    };

    let main = format!(
        r#"<div class="sticky-header row">
  <a href="/home" class="back">←</a>
  <div>
    <h1>{name}</h1>
    <p class="muted small"><span class="post-count">{count}</span> posts</p>
  </div>
</div>
{alert}
<div class="banner"></div>
<div class="profile-info">
  <div class="avatar large">{initial}</div>
  <div class="right row">
    <form method="post" action="/signout" class="inline">
      <button type="submit" class="button outline danger">Sign Out</button>
    </form>
    <button type="button" class="button outline" disabled>Edit Profile</button>
  </div>
  <h2>{name}</h2>
  <p class="muted">@{handle}</p>
  {joined}
</div>
<nav class="tabs">
  <span class="tab active">Posts</span>
  <span class="tab">Replies</span>
  <span class="tab">Likes</span>
</nav>
<section class="posts">
{posts}
</section>"#,
        name = name,
        count = feed.len(),
        alert = alert_banner(alert),
        initial = initial,
        handle = handle,
        joined = joined,
        posts = posts,
    );

    app_frame("Profile / MiniTwitter", viewer, Screen::Profile, &main)
}

/// Confirmation step before a delete. `post` is `None` when the post is no
/// longer in the viewer's feed; the form is still offered.
pub fn confirm_delete_page(post_id: &str, post: Option<&FeedPost>, from: Screen) -> String {
    let preview = post
        .map(|item| {
            format!(
                r#"<blockquote class="card"><p class="muted small">{} · {}</p><p class="content">{}</p></blockquote>"#,
                escape(&item.post.display_name),
                short_date(&item.post.created_at),
                escape(&item.post.content),
            )
        })
        .unwrap_or_default();

    let body = format!(
        r#"<div class="centered">
  <h1>Delete post?</h1>
  <p class="muted">Are you sure you want to delete this post?</p>
  {preview}
  <form method="post" action="/posts/{id}/delete" class="row">
    <input type="hidden" name="from" value="{from}">
    <button type="submit" class="button danger">Delete</button>
    <a class="button outline" href="{back}">Cancel</a>
  </form>
</div>"#,
        preview = preview,
        id = escape(post_id),
        from = from.as_str(),
        back = from.path(),
    );
    layout("Delete post?", &body)
}
