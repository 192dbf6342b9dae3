// src/backend/memory.rs

//! In-process stand-in for the hosted backend.
//!
//! It enforces the constraints the hosted project is configured with:
//! row-level ownership on writes, a unique `(post_id, user_id)` key on likes,
//! a cascading foreign key from likes to posts, and revocable sessions.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::Backend;
use crate::{
    error::AppError,
    models::{
        account::{Account, AccountMetadata, Session, SignUpForm, UserId},
        like::Like,
        post::{NewPost, Post, PostFilter, PostId},
    },
    utils::{
        hash::{hash_password, verify_password},
        jwt::{LEEWAY_SECONDS, decode_access_token, sign_access_token, verify_access_token},
    },
};

const TOKEN_TTL_SECONDS: u64 = 3600;

struct StoredAccount {
    account: Account,
    password_hash: String,
}

#[derive(Default)]
struct Tables {
    accounts: Vec<StoredAccount>,
    posts: Vec<Post>,
    likes: Vec<Like>,
    /// Revoked tokens and their `exp`. Entries go once the token would be
    /// refused as expired anyway.
    revoked: HashMap<String, usize>,
    next_post_id: u64,
    last_created_at: Option<DateTime<Utc>>,
}

impl Tables {
    /// Strictly increasing so feed order is total even within one clock tick.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_created_at {
            Some(last) if now <= last => last + TimeDelta::microseconds(1),
            _ => now,
        };
        self.last_created_at = Some(ts);
        ts
    }

    fn account(&self, id: &UserId) -> Option<&Account> {
        self.accounts
            .iter()
            .map(|stored| &stored.account)
            .find(|account| account.id == *id)
    }
}

pub struct MemoryBackend {
    jwt_secret: String,
    tables: RwLock<Tables>,
    table_reads: AtomicUsize,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            jwt_secret: Uuid::new_v4().to_string(),
            tables: RwLock::new(Tables::default()),
            table_reads: AtomicUsize::new(0),
        }
    }

    /// Number of `posts`/`likes` reads served so far.
    pub fn table_reads(&self) -> usize {
        self.table_reads.load(Ordering::SeqCst)
    }

    fn open_session(&self, account: &Account) -> Result<Session, AppError> {
        let email = account.email.as_deref().unwrap_or_default();
        let access_token =
            sign_access_token(&account.id, email, &self.jwt_secret, TOKEN_TTL_SECONDS)?;
        Ok(Session {
            access_token,
            refresh_token: None,
            expires_in: Some(TOKEN_TTL_SECONDS),
            user: account.clone(),
        })
    }

    /// Resolves the token to its subject, rejecting revoked tokens.
    fn subject(&self, tables: &Tables, access_token: &str) -> Result<UserId, AppError> {
        if tables.revoked.contains_key(access_token) {
            return Err(AppError::Forbidden("Session has been revoked".to_string()));
        }
        verify_access_token(access_token, &self.jwt_secret)
            .map_err(|_| AppError::Forbidden("Invalid or expired access token".to_string()))
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn sign_up(&self, form: &SignUpForm) -> Result<Option<Session>, AppError> {
        let email = form.email.trim().to_lowercase();
        let password_hash = hash_password(&form.password)?;

        let mut tables = self.tables.write().await;
        if tables
            .accounts
            .iter()
            .any(|stored| stored.account.email.as_deref() == Some(email.as_str()))
        {
            return Err(AppError::Conflict("User already registered".to_string()));
        }

        let account = Account {
            id: UserId(Uuid::new_v4()),
            email: Some(email),
            metadata: AccountMetadata {
                username: Some(form.username.clone()),
                full_name: Some(form.display_name.clone()),
            },
            created_at: Some(Utc::now()),
        };
        tables.accounts.push(StoredAccount {
            account: account.clone(),
            password_hash,
        });
        tracing::info!(user_id = %account.id, "account created");

        self.open_session(&account).map(Some)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError> {
        let email = email.trim().to_lowercase();
        let tables = self.tables.read().await;
        let stored = tables
            .accounts
            .iter()
            .find(|stored| stored.account.email.as_deref() == Some(email.as_str()))
            .ok_or_else(|| AppError::AuthError("Invalid login credentials".to_string()))?;

        if !verify_password(password, &stored.password_hash)? {
            return Err(AppError::AuthError("Invalid login credentials".to_string()));
        }

        self.open_session(&stored.account)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AppError> {
        // A token that no longer verifies has nothing left to revoke.
        let Ok(claims) = decode_access_token(access_token, &self.jwt_secret) else {
            return Ok(());
        };

        let now = Utc::now().timestamp().max(0) as usize;
        let leeway = LEEWAY_SECONDS as usize;
        let mut tables = self.tables.write().await;
        tables.revoked.retain(|_, exp| *exp + leeway >= now);
        tables.revoked.insert(access_token.to_string(), claims.exp);
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<Option<Account>, AppError> {
        let tables = self.tables.read().await;
        let Ok(user_id) = self.subject(&tables, access_token) else {
            return Ok(None);
        };
        Ok(tables.account(&user_id).cloned())
    }

    async fn select_posts(
        &self,
        _access_token: &str,
        filter: &PostFilter,
    ) -> Result<Vec<Post>, AppError> {
        self.table_reads.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .iter()
            .filter(|post| filter.matches(post))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn select_likes(&self, _access_token: &str) -> Result<Vec<Like>, AppError> {
        self.table_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.tables.read().await.likes.clone())
    }

    async fn insert_post(&self, access_token: &str, post: &NewPost) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let subject = self.subject(&tables, access_token)?;
        if subject != post.user_id {
            return Err(AppError::Forbidden(
                "new row violates row-level security policy for table \"posts\"".to_string(),
            ));
        }

        tables.next_post_id += 1;
        let id = PostId::new(tables.next_post_id.to_string());
        let created_at = tables.next_timestamp();
        tables.posts.push(Post {
            id,
            user_id: post.user_id,
            username: post.username.clone(),
            display_name: post.display_name.clone(),
            content: post.content.clone(),
            created_at,
        });
        Ok(())
    }

    async fn delete_post(
        &self,
        access_token: &str,
        post_id: &PostId,
        user_id: &UserId,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let subject = self.subject(&tables, access_token)?;

        // Row-level rule: only the caller's own rows are visible to the delete.
        let before = tables.posts.len();
        tables
            .posts
            .retain(|p| !(p.id == *post_id && p.user_id == *user_id && p.user_id == subject));
        if tables.posts.len() < before {
            tables.likes.retain(|like| like.post_id != *post_id);
        }
        Ok(())
    }

    async fn insert_like(&self, access_token: &str, like: &Like) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let subject = self.subject(&tables, access_token)?;
        if subject != like.user_id {
            return Err(AppError::Forbidden(
                "new row violates row-level security policy for table \"likes\"".to_string(),
            ));
        }
        if !tables.posts.iter().any(|p| p.id == like.post_id) {
            return Err(AppError::Conflict(
                "insert or update on table \"likes\" violates foreign key constraint \"likes_post_id_fkey\""
                    .to_string(),
            ));
        }
        if tables.likes.contains(like) {
            return Err(AppError::Duplicate(
                "duplicate key value violates unique constraint \"likes_pkey\"".to_string(),
            ));
        }
        tables.likes.push(like.clone());
        Ok(())
    }

    async fn delete_like(&self, access_token: &str, like: &Like) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        let subject = self.subject(&tables, access_token)?;
        tables
            .likes
            .retain(|l| !(l == like && l.user_id == subject));
        Ok(())
    }
}
