// src/backend/supabase.rs

//! HTTP client for the hosted project: the auth API under `/auth/v1` and the
//! table API under `/rest/v1`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Response, StatusCode,
    header::{AUTHORIZATION, HeaderMap, HeaderValue},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use super::Backend;
use crate::{
    config::Config,
    error::AppError,
    models::{
        account::{Account, Session, SignUpForm, UserId},
        like::Like,
        post::{NewPost, Post, PostFilter, PostId},
    },
};

const AUTH_PREFIX: &str = "auth/v1/";
const REST_PREFIX: &str = "rest/v1/";
const POSTS_TABLE: &str = "posts";
const LIKES_TABLE: &str = "likes";

/// Postgres SQLSTATE for a unique key violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Which endpoint produced an error; the same status means different things on each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Api {
    /// Sign-up rejects input with 400/422, which is not a credentials failure.
    SignUp,
    Auth,
    Rest,
}

pub struct SupabaseBackend {
    base_url: Url,
    anon_key: String,
    http: reqwest::Client,
}

impl SupabaseBackend {
    pub fn new(base_url: Url, anon_key: String, timeout: Duration) -> Result<Self, AppError> {
        let mut base_url = base_url;
        // Url::join replaces the last segment unless the base ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url,
            anon_key,
            http,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Self::new(
            config.supabase_url.clone(),
            config.supabase_anon_key.clone(),
            config.request_timeout,
        )
    }

    fn auth_url(&self, path: &str) -> Result<Url, AppError> {
        self.base_url
            .join(AUTH_PREFIX)
            .and_then(|u| u.join(path))
            .map_err(|e| AppError::InternalServerError(e.to_string()))
    }

    fn table_url(&self, table: &str) -> Result<Url, AppError> {
        self.base_url
            .join(REST_PREFIX)
            .and_then(|u| u.join(table))
            .map_err(|e| AppError::InternalServerError(e.to_string()))
    }

    /// `apikey` plus a bearer: the user's access token, or the anon key when
    /// acting without a session.
    fn headers(&self, access_token: Option<&str>) -> Result<HeaderMap, AppError> {
        let bearer = access_token.unwrap_or(&self.anon_key);
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(&self.anon_key)
                .map_err(|_| AppError::Config("SUPABASE_ANON_KEY is not a valid header".into()))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", bearer))
                .map_err(|_| AppError::AuthError("Malformed access token".into()))?,
        );
        Ok(headers)
    }

    fn write_headers(&self, access_token: &str) -> Result<HeaderMap, AppError> {
        let mut headers = self.headers(Some(access_token))?;
        headers.insert("Prefer", HeaderValue::from_static("return=minimal"));
        Ok(headers)
    }
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

/// Sign-up answers with a session when the project auto-confirms emails,
/// otherwise with the bare user object.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(Session),
    Pending(Account),
}

/// Union of the error shapes both APIs return.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
    code: Option<serde_json::Value>,
    error_code: Option<String>,
}

impl ErrorBody {
    fn text(self) -> Option<String> {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
            .filter(|m| !m.trim().is_empty())
    }
}

/// Turns a non-success response body into an `AppError`.
fn error_from_body(api: Api, status: StatusCode, body: &str) -> AppError {
    let mut parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let pg_code = parsed
        .code
        .take()
        .and_then(|c| c.as_str().map(str::to_owned));
    let auth_code = parsed.error_code.take();
    let message = parsed.text().unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    });

    if status.is_server_error() {
        return AppError::Backend(message);
    }

    match api {
        Api::SignUp => match (auth_code.as_deref(), status) {
            (Some("user_already_exists" | "email_exists"), _) => AppError::Conflict(message),
            (_, StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY) => {
                AppError::BadRequest(message)
            }
            _ => AppError::AuthError(message),
        },
        Api::Auth => AppError::AuthError(message),
        Api::Rest => {
            if pg_code.as_deref() == Some(UNIQUE_VIOLATION) {
                return AppError::Duplicate(message);
            }
            match status {
                StatusCode::CONFLICT => AppError::Conflict(message),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Forbidden(message),
                StatusCode::NOT_FOUND => AppError::NotFound(message),
                _ => AppError::Backend(message),
            }
        }
    }
}

async fn check(api: Api, response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(error_from_body(api, status, &body))
}

#[async_trait]
impl Backend for SupabaseBackend {
    async fn sign_up(&self, form: &SignUpForm) -> Result<Option<Session>, AppError> {
        tracing::debug!(email = %form.email, "auth sign-up");
        let body = json!({
            "email": form.email,
            "password": form.password,
            "data": {
                "username": form.username,
                "full_name": form.display_name,
            },
        });

        let response = self
            .http
            .post(self.auth_url("signup")?)
            .headers(self.headers(None)?)
            .json(&body)
            .send()
            .await?;

        match check(Api::SignUp, response)
            .await?
            .json::<SignUpResponse>()
            .await?
        {
            SignUpResponse::Session(session) => Ok(Some(session)),
            SignUpResponse::Pending(account) => {
                tracing::info!(user_id = %account.id, "sign-up awaiting email confirmation");
                Ok(None)
            }
        }
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        tracing::debug!(%email, "auth sign-in");
        let response = self
            .http
            .post(self.auth_url("token")?)
            .query(&[("grant_type", "password")])
            .headers(self.headers(None)?)
            .json(&Credentials { email, password })
            .send()
            .await?;

        Ok(check(Api::Auth, response).await?.json().await?)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        let response = self
            .http
            .post(self.auth_url("logout")?)
            .headers(self.headers(Some(access_token))?)
            .send()
            .await?;

        // An already-dead token is as signed out as it gets.
        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(());
        }
        check(Api::Auth, response).await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<Account>, AppError> {
        let Ok(headers) = self.headers(Some(access_token)) else {
            return Ok(None);
        };
        let response = self
            .http
            .get(self.auth_url("user")?)
            .headers(headers)
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }
        Ok(Some(check(Api::Auth, response).await?.json().await?))
    }

    async fn select_posts(
        &self,
        access_token: &str,
        filter: &PostFilter,
    ) -> Result<Vec<Post>, AppError> {
        let mut query = vec![
            ("select", "*".to_string()),
            ("order", "created_at.desc".to_string()),
        ];
        if let Some(author) = filter.author {
            query.push(("user_id", format!("eq.{}", author)));
        }
        tracing::debug!(table = POSTS_TABLE, author = ?filter.author, "select");

        let response = self
            .http
            .get(self.table_url(POSTS_TABLE)?)
            .query(&query)
            .headers(self.headers(Some(access_token))?)
            .send()
            .await?;

        Ok(check(Api::Rest, response).await?.json().await?)
    }

    async fn select_likes(&self, access_token: &str) -> Result<Vec<Like>, AppError> {
        tracing::debug!(table = LIKES_TABLE, "select");
        let response = self
            .http
            .get(self.table_url(LIKES_TABLE)?)
            .query(&[("select", "*")])
            .headers(self.headers(Some(access_token))?)
            .send()
            .await?;

        Ok(check(Api::Rest, response).await?.json().await?)
    }

    async fn insert_post(&self, access_token: &str, post: &NewPost) -> Result<(), AppError> {
        tracing::debug!(table = POSTS_TABLE, user_id = %post.user_id, "insert");
        let response = self
            .http
            .post(self.table_url(POSTS_TABLE)?)
            .headers(self.write_headers(access_token)?)
            .json(post)
            .send()
            .await?;

        check(Api::Rest, response).await?;
        Ok(())
    }

    async fn delete_post(
        &self,
        access_token: &str,
        post_id: &PostId,
        user_id: &UserId,
    ) -> Result<(), AppError> {
        tracing::debug!(table = POSTS_TABLE, %post_id, %user_id, "delete");
        let response = self
            .http
            .delete(self.table_url(POSTS_TABLE)?)
            .query(&[
                ("id", format!("eq.{}", post_id)),
                ("user_id", format!("eq.{}", user_id)),
            ])
            .headers(self.write_headers(access_token)?)
            .send()
            .await?;

        check(Api::Rest, response).await?;
        Ok(())
    }

    async fn insert_like(&self, access_token: &str, like: &Like) -> Result<(), AppError> {
        tracing::debug!(table = LIKES_TABLE, post_id = %like.post_id, user_id = %like.user_id, "insert");
        let response = self
            .http
            .post(self.table_url(LIKES_TABLE)?)
            .headers(self.write_headers(access_token)?)
            .json(like)
            .send()
            .await?;

        check(Api::Rest, response).await?;
        Ok(())
    }

    async fn delete_like(&self, access_token: &str, like: &Like) -> Result<(), AppError> {
        tracing::debug!(table = LIKES_TABLE, post_id = %like.post_id, user_id = %like.user_id, "delete");
        let response = self
            .http
            .delete(self.table_url(LIKES_TABLE)?)
            .query(&[
                ("post_id", format!("eq.{}", like.post_id)),
                ("user_id", format!("eq.{}", like.user_id)),
            ])
            .headers(self.write_headers(access_token)?)
            .send()
            .await?;

        check(Api::Rest, response).await?;
        Ok(())
    }
}
