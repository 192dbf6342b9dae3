// tests/supabase_tests.rs
//
// Drives `SupabaseBackend` against a fake provider spawned on a random port
// and checks the requests it sends.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use minitwitter::{
    backend::{Backend, SupabaseBackend},
    config::Config,
    error::AppError,
    feed,
    models::{
        account::{SignUpForm, UserId},
        like::Like,
        post::{NewPost, PostFilter, PostId},
    },
    mutations, routes,
    session::Viewer,
    state::AppState,
    utils::html::escape,
};
use serde_json::json;
use url::Url;

const USER_ID: &str = "6f1c2a2e-8a43-4a8e-9a35-3d6f8f1f6b11";
const ANON_KEY: &str = "anon-key";
const GOOD_TOKEN: &str = "good-token";

/// Post content the fake provider refuses under its row-level rules.
const FORBIDDEN_CONTENT: &str = "forbidden";
const RLS_MESSAGE: &str = "new row violates row-level security policy for table \"posts\"";
/// Post content that makes the fake provider fall over.
const OUTAGE_CONTENT: &str = "outage";
const OUTAGE_MESSAGE: &str = "upstream connect error";
/// A post id the fake provider has no row for.
const MISSING_POST: &str = "99";
const FK_MESSAGE: &str =
    "insert or update on table \"likes\" violates foreign key constraint \"likes_post_id_fkey\"";

#[derive(Debug, Clone)]
struct Seen {
    method: String,
    path: String,
    query: String,
    apikey: Option<String>,
    authorization: Option<String>,
    prefer: Option<String>,
}

type Log = Arc<Mutex<Vec<Seen>>>;

async fn record(State(log): State<Log>, req: Request<Body>, next: Next) -> Response {
    let seen = {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        Seen {
            method: req.method().to_string(),
            path: req.uri().path().to_string(),
            query: req.uri().query().unwrap_or_default().to_string(),
            apikey: header("apikey"),
            authorization: header("authorization"),
            prefer: header("prefer"),
        }
    };
    log.lock().unwrap().push(seen);
    next.run(req).await
}

fn user_json() -> serde_json::Value {
    json!({
        "id": USER_ID,
        "aud": "authenticated",
        "email": "john@example.com",
        "user_metadata": { "username": "johndoe", "full_name": "John Doe" },
        "created_at": "2026-01-05T10:00:00.123456Z"
    })
}

async fn token() -> Json<serde_json::Value> {
    Json(json!({
        "access_token": GOOD_TOKEN,
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "refresh",
        "user": user_json(),
    }))
}

async fn signup() -> Json<serde_json::Value> {
    // Email confirmation enabled: no session in the answer.
    Json(user_json())
}

async fn user(req: Request<Body>) -> Response {
    let authorized = req
        .headers()
        .get("authorization")
        .is_some_and(|v| v == format!("Bearer {}", GOOD_TOKEN).as_str());
    if authorized {
        Json(user_json()).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "code": 401, "msg": "invalid JWT" })),
        )
            .into_response()
    }
}

async fn posts() -> Json<serde_json::Value> {
    Json(json!([
        {
            "id": 8, "user_id": USER_ID, "username": "johndoe", "display_name": "John Doe",
            "content": "newer", "created_at": "2026-01-06T09:00:00.5+00:00"
        },
        {
            "id": 7, "user_id": USER_ID, "username": "johndoe", "display_name": "John Doe",
            "content": "older", "created_at": "2026-01-05T09:00:00+00:00"
        }
    ]))
}

async fn likes() -> Json<serde_json::Value> {
    Json(json!([
        { "post_id": 7, "user_id": USER_ID, "created_at": "2026-01-06T10:00:00+00:00" },
        { "post_id": 7, "user_id": "00000000-0000-0000-0000-000000000001" }
    ]))
}

async fn no_content() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn insert_post(Json(row): Json<serde_json::Value>) -> Response {
    match row["content"].as_str() {
        Some(FORBIDDEN_CONTENT) => (
            StatusCode::FORBIDDEN,
            Json(json!({ "code": "42501", "details": null, "hint": null, "message": RLS_MESSAGE })),
        )
            .into_response(),
        Some(OUTAGE_CONTENT) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": OUTAGE_MESSAGE })),
        )
            .into_response(),
        _ => StatusCode::CREATED.into_response(),
    }
}

async fn insert_like(Json(row): Json<serde_json::Value>) -> (StatusCode, Json<serde_json::Value>) {
    if row["post_id"].as_str() == Some(MISSING_POST) {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "code": "23503", "details": null, "hint": null, "message": FK_MESSAGE })),
        );
    }
    (
        StatusCode::CONFLICT,
        Json(json!({
            "code": "23505",
            "details": null,
            "hint": null,
            "message": "duplicate key value violates unique constraint \"likes_pkey\""
        })),
    )
}

async fn spawn_provider() -> (SupabaseBackend, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));

    let app = Router::new()
        .route("/auth/v1/token", post(token))
        .route("/auth/v1/signup", post(signup))
        .route("/auth/v1/logout", post(no_content))
        .route("/auth/v1/user", get(user))
        .route("/rest/v1/posts", get(posts).post(insert_post).delete(no_content))
        .route("/rest/v1/likes", get(likes).post(insert_like).delete(no_content))
        .layer(middleware::from_fn_with_state(log.clone(), record));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let backend = SupabaseBackend::new(
        Url::parse(&format!("http://127.0.0.1:{}", port)).unwrap(),
        ANON_KEY.to_string(),
        Duration::from_secs(5),
    )
    .unwrap();

    (backend, log)
}

fn last(log: &Log) -> Seen {
    log.lock().unwrap().last().cloned().expect("no request recorded")
}

fn user_id() -> UserId {
    UserId(USER_ID.parse().unwrap())
}

#[tokio::test]
async fn sign_in_uses_password_grant_with_anon_key() {
    let (backend, log) = spawn_provider().await;

    let session = backend
        .sign_in("john@example.com", "password123")
        .await
        .unwrap();

    assert_eq!(session.access_token, GOOD_TOKEN);
    assert_eq!(session.user.username(), Some("johndoe"));
    let seen = last(&log);
    assert_eq!(seen.path, "/auth/v1/token");
    assert_eq!(seen.query, "grant_type=password");
    assert_eq!(seen.apikey.as_deref(), Some(ANON_KEY));
    assert_eq!(
        seen.authorization.as_deref(),
        Some(format!("Bearer {}", ANON_KEY).as_str())
    );
}

#[tokio::test]
async fn sign_up_without_session_reports_pending_confirmation() {
    let (backend, _) = spawn_provider().await;

    let outcome = backend
        .sign_up(&SignUpForm {
            username: "johndoe".into(),
            display_name: "John Doe".into(),
            email: "john@example.com".into(),
            password: "password123".into(),
        })
        .await
        .unwrap();

    assert!(outcome.is_none());
}

#[tokio::test]
async fn get_user_maps_rejected_token_to_none() {
    let (backend, _) = spawn_provider().await;

    assert!(backend.get_user("expired").await.unwrap().is_none());
    let account = backend.get_user(GOOD_TOKEN).await.unwrap().unwrap();
    assert_eq!(account.id, user_id());
}

#[tokio::test]
async fn select_posts_filters_by_author_and_orders_by_recency() {
    let (backend, log) = spawn_provider().await;

    let posts = backend
        .select_posts(GOOD_TOKEN, &PostFilter::by_author(user_id()))
        .await
        .unwrap();

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].id, PostId::new("8"));
    let seen = last(&log);
    assert_eq!(seen.method, "GET");
    assert!(seen.query.contains("order=created_at.desc"));
    assert!(seen.query.contains(&format!("user_id=eq.{}", USER_ID)));
    assert_eq!(
        seen.authorization.as_deref(),
        Some(format!("Bearer {}", GOOD_TOKEN).as_str())
    );
}

#[tokio::test]
async fn global_feed_has_no_author_filter() {
    let (backend, log) = spawn_provider().await;

    backend
        .select_posts(GOOD_TOKEN, &PostFilter::all())
        .await
        .unwrap();

    assert!(!last(&log).query.contains("user_id"));
}

#[tokio::test]
async fn delete_post_sends_ownership_predicate() {
    let (backend, log) = spawn_provider().await;

    backend
        .delete_post(GOOD_TOKEN, &PostId::new("7"), &user_id())
        .await
        .unwrap();

    let seen = last(&log);
    assert_eq!(seen.method, "DELETE");
    assert_eq!(seen.path, "/rest/v1/posts");
    assert!(seen.query.contains("id=eq.7"));
    assert!(seen.query.contains(&format!("user_id=eq.{}", USER_ID)));
    assert_eq!(seen.prefer.as_deref(), Some("return=minimal"));
}

#[tokio::test]
async fn insert_post_posts_to_table() {
    let (backend, log) = spawn_provider().await;

    backend
        .insert_post(
            GOOD_TOKEN,
            &NewPost {
                content: "hello".into(),
                user_id: user_id(),
                username: "johndoe".into(),
                display_name: "John Doe".into(),
            },
        )
        .await
        .unwrap();

    let seen = last(&log);
    assert_eq!(seen.method, "POST");
    assert_eq!(seen.path, "/rest/v1/posts");
}

#[tokio::test]
async fn duplicate_like_is_conflict_but_like_post_succeeds() {
    let (backend, _) = spawn_provider().await;
    let like = Like {
        post_id: PostId::new("7"),
        user_id: user_id(),
    };

    let err = backend.insert_like(GOOD_TOKEN, &like).await.unwrap_err();
    assert!(matches!(err, AppError::Duplicate(_)));

    let viewer = Viewer {
        account: backend.get_user(GOOD_TOKEN).await.unwrap().unwrap(),
        access_token: GOOD_TOKEN.to_string(),
    };
    mutations::like_post(&backend, &viewer, &PostId::new("7"))
        .await
        .unwrap();
}

#[tokio::test]
async fn liking_a_missing_post_is_reported() {
    let (backend, _) = spawn_provider().await;
    let viewer = Viewer {
        account: backend.get_user(GOOD_TOKEN).await.unwrap().unwrap(),
        access_token: GOOD_TOKEN.to_string(),
    };

    let err = mutations::like_post(&backend, &viewer, &PostId::new(MISSING_POST))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(m) if m == FK_MESSAGE));
}

/// Serves the app on a random port in front of `backend`.
async fn spawn_app(backend: SupabaseBackend) -> String {
    let config = Config {
        supabase_url: Url::parse("http://127.0.0.1").unwrap(),
        supabase_anon_key: ANON_KEY.to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        cookie_secure: false,
        request_timeout: Duration::from_secs(5),
        rust_log: "error".to_string(),
    };
    let app = routes::create_router(AppState::new(Arc::new(backend), config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

async fn post_form(address: &str, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
        .post(format!("{}{}", address, path))
        .header(reqwest::header::COOKIE, format!("mt_session={}", GOOD_TOKEN))
        .form(form)
        .send()
        .await
        .unwrap()
}

fn alert(message: &str) -> String {
    format!(r#"<div class="alert" role="alert">{}</div>"#, escape(message))
}

#[tokio::test]
async fn rejected_post_shows_provider_message_and_keeps_text() {
    let (backend, _) = spawn_provider().await;
    let address = spawn_app(backend).await;

    let response = post_form(
        &address,
        "/posts",
        &[("content", FORBIDDEN_CONTENT), ("from", "home")],
    )
    .await;

    assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);
    let body = response.text().await.unwrap();
    assert!(body.contains(&alert(&format!("Failed to post: {}", RLS_MESSAGE))));
    assert!(body.contains(&format!(">{}</textarea>", FORBIDDEN_CONTENT)));
    // The refetched feed is still rendered under the alert.
    assert!(body.contains(">newer<"));
}

#[tokio::test]
async fn provider_outage_on_post_is_bad_gateway() {
    let (backend, _) = spawn_provider().await;
    let address = spawn_app(backend).await;

    let response = post_form(
        &address,
        "/posts",
        &[("content", OUTAGE_CONTENT), ("from", "home")],
    )
    .await;

    assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);
    let body = response.text().await.unwrap();
    assert!(body.contains(&alert(&format!("Failed to post: {}", OUTAGE_MESSAGE))));
    assert!(body.contains(&format!(">{}</textarea>", OUTAGE_CONTENT)));
}

#[tokio::test]
async fn failed_like_alerts_instead_of_redirecting() {
    let (backend, _) = spawn_provider().await;
    let address = spawn_app(backend).await;

    let response = post_form(
        &address,
        &format!("/posts/{}/like", MISSING_POST),
        &[("liked", "false"), ("from", "profile")],
    )
    .await;

    assert_eq!(response.status(), reqwest::StatusCode::CONFLICT);
    let body = response.text().await.unwrap();
    assert!(body.contains(&alert(&format!("Failed to update like: {}", FK_MESSAGE))));
}

#[tokio::test]
async fn duplicate_like_through_the_app_still_redirects() {
    let (backend, _) = spawn_provider().await;
    let address = spawn_app(backend).await;

    let response = post_form(
        &address,
        "/posts/7/like",
        &[("liked", "false"), ("from", "home")],
    )
    .await;

    assert_eq!(response.status(), reqwest::StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn feed_joins_remote_posts_and_likes() {
    let (backend, _) = spawn_provider().await;
    let viewer = Viewer {
        account: backend.get_user(GOOD_TOKEN).await.unwrap().unwrap(),
        access_token: GOOD_TOKEN.to_string(),
    };

    let items = feed::list_posts(&backend, &viewer, &PostFilter::all()).await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].post.content, "newer");
    assert_eq!(items[0].like_count, 0);
    assert_eq!(items[1].like_count, 2);
    assert!(items[1].is_liked);
}

#[tokio::test]
async fn unreachable_provider_yields_empty_feed() {
    // Bind then drop to get a port nobody listens on.
    let port = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let backend = SupabaseBackend::new(
        Url::parse(&format!("http://127.0.0.1:{}", port)).unwrap(),
        ANON_KEY.to_string(),
        Duration::from_secs(1),
    )
    .unwrap();
    let viewer = Viewer {
        account: serde_json::from_value(user_json()).unwrap(),
        access_token: GOOD_TOKEN.to_string(),
    };

    let items = feed::list_posts(&backend, &viewer, &PostFilter::all()).await;
    assert!(items.is_empty());
    assert!(matches!(
        backend.select_likes(GOOD_TOKEN).await,
        Err(AppError::Backend(_))
    ));
}
