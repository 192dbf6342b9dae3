// src/views/mod.rs

//! Server-rendered HTML for the screens. Every piece of user-supplied text
//! passes through [`escape`] before it is interpolated.

pub mod auth;
pub mod feed;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{feed::FeedPost, models::account::Account, utils::html::escape};

/// Screens a post action can be sent from, and returned to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    #[default]
    Home,
    Profile,
}

impl Screen {
    pub fn as_str(self) -> &'static str {
        match self {
            Screen::Home => "home",
            Screen::Profile => "profile",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Screen::Home => "/home",
            Screen::Profile => "/profile",
        }
    }
}

/// Decorative sidebar content. Not backed by any query.
const TRENDS: [(&str, &str, &str); 5] = [
    ("Technology · Trending", "#Rust", "154K posts"),
    ("Trending in Indonesia", "Nasi Goreng", "22.1K posts"),
    ("Entertainment · Trending", "CEOyangMenyamar", "98K posts"),
    ("Sports · Trending", "Timnas Indonesia", "50.5K posts"),
    ("Politics", "Owo", "1.2M posts"),
];

pub fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
{body}
</body>
</html>
"#,
        title = escape(title),
        body = body,
    )
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        r#"<div class="centered">
  <h1>{code}</h1>
  <p class="muted">{message}</p>
  <p><a href="/home">Back to Home</a></p>
</div>"#,
        code = status.as_u16(),
        message = escape(message),
    );
    layout("MiniTwitter", &body)
}

/// Blocking alert shown above the feed after a failed write.
pub fn alert_banner(alert: Option<&str>) -> String {
    match alert {
        Some(msg) => format!(r#"<div class="alert" role="alert">{}</div>"#, escape(msg)),
        None => String::new(),
    }
}

/// `M/D/YYYY`, the short numeric date shown on posts.
pub fn short_date(ts: &DateTime<Utc>) -> String {
    ts.format("%-m/%-d/%Y").to_string()
}

/// Avatar letter for a post: first letter of the stamped username.
pub fn post_initial(username: &str) -> char {
    username
        .trim()
        .chars()
        .next()
        .map(|c| c.to_uppercase().next().unwrap_or(c))
        .unwrap_or('?')
}

fn avatar(initial: char, class: &str) -> String {
    format!(
        r#"<div class="avatar {class}">{initial}</div>"#,
        class = class,
        initial = escape(&initial.to_string()),
    )
}

fn sidebar(viewer: &Account, active: Screen) -> String {
    let nav_class = |screen: Screen| if screen == active { "nav-link active" } else { "nav-link" };
    format!(
        r#"<aside class="sidebar">
  <div class="logo">MiniTwitter</div>
  <nav>
    <a class="{home_class}" href="/home">🏠 <span>Home</span></a>
    <a class="{profile_class}" href="/profile">👤 <span>Profile</span></a>
  </nav>
  <a class="button primary wide" href="/home#compose">Post</a>
  <div class="user-chip">
    {avatar}
    <div>
      <p class="bold">{name}</p>
      <p class="muted">@{handle}</p>
    </div>
  </div>
</aside>"#,
        home_class = nav_class(Screen::Home),
        profile_class = nav_class(Screen::Profile),
        avatar = avatar(viewer.initial(), "small"),
        name = escape(viewer.full_name().unwrap_or("User")),
        handle = escape(viewer.username().unwrap_or("username")),
    )
}

fn widgets() -> String {
    let trends: String = TRENDS
        .iter()
        .map(|(category, topic, posts)| {
            format!(
                r#"<div class="trend"><p class="muted small">{}</p><p class="bold">{}</p><p class="muted small">{}</p></div>"#,
                escape(category),
                escape(topic),
                escape(posts),
            )
        })
        .collect();

    format!(
        r#"<aside class="widgets">
  <div class="search"><span>🔍</span><input type="text" placeholder="Search" aria-label="Search"></div>
  <section class="card">
    <h2>Welcome to MiniTwitter</h2>
    <p class="muted small">A mini social media platform.</p>
  </section>
  <section class="card">
    <h2>Trends for you</h2>
    {trends}
    <p class="link small">Show more</p>
  </section>
</aside>"#,
        trends = trends,
    )
}

/// Three-column page frame shared by the feed screens.
pub fn app_frame(title: &str, viewer: &Account, active: Screen, main: &str) -> String {
    let body = format!(
        r#"<div class="frame">
{sidebar}
<main class="feed">
{main}
</main>
{widgets}
</div>"#,
        sidebar = sidebar(viewer, active),
        main = main,
        widgets = widgets(),
    );
    layout(title, &body)
}

/// One post with its like control. The delete link only appears for the author.
pub fn post_card(item: &FeedPost, viewer: &Account, from: Screen) -> String {
    let post = &item.post;
    let id = escape(post.id.as_str());

    let delete = if item.is_owned_by(&viewer.id) {
        format!(
            r#"<a class="delete" href="/posts/{id}/delete?from={from}" title="Delete post">🗑️</a>"#,
            id = id,
            from = from.as_str(),
        )
    } else {
        String::new()
    };

    format!(
        r#"<article class="post" id="post-{id}">
  {delete}
  {avatar}
  <div class="post-body">
    <header>
      <span class="bold">{display_name}</span>
      <span class="muted">@{username}</span>
      <span class="muted small">· {date}</span>
    </header>
    <p class="content">{content}</p>
    <footer class="actions">
      <span class="action">💬 <span>0</span></span>
      <span class="action">🔁 <span>0</span></span>
      <form method="post" action="/posts/{id}/like" class="inline">
        <input type="hidden" name="liked" value="{is_liked}">
        <input type="hidden" name="from" value="{from}">
        <button type="submit" class="action like{liked_class}">{heart} <span class="like-count">{like_count}</span></button>
      </form>
    </footer>
  </div>
</article>"#,
        id = id,
        delete = delete,
        avatar = avatar(post_initial(&post.username), ""),
        display_name = escape(&post.display_name),
        username = escape(&post.username),
        date = short_date(&post.created_at),
        content = escape(&post.content),
        is_liked = item.is_liked,
        from = from.as_str(),
        liked_class = if item.is_liked { " liked" } else { "" },
        heart = if item.is_liked { "❤️" } else { "🤍" },
        like_count = item.like_count,
    )
}
