// src/backend/mod.rs

//! The hosted backend-as-a-service boundary.
//!
//! Every durable read and write goes through [`Backend`]. Each method is a
//! single request/response round trip; nothing is cached or retried here.

pub mod memory;
pub mod supabase;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        account::{Account, Session, SignUpForm, UserId},
        like::Like,
        post::{NewPost, Post, PostFilter, PostId},
    },
};

pub use memory::MemoryBackend;
pub use supabase::SupabaseBackend;

#[async_trait]
pub trait Backend: Send + Sync {
    /// Creates an account. `Ok(None)` means the account exists but the
    /// provider did not open a session (email confirmation pending).
    async fn sign_up(&self, form: &SignUpForm) -> Result<Option<Session>, AppError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AppError>;

    async fn sign_out(&self, access_token: &str) -> Result<(), AppError>;

    /// `Ok(None)` for an unknown, expired or revoked token.
    async fn get_user(&self, access_token: &str) -> Result<Option<Account>, AppError>;

    /// Posts ordered by `created_at` descending.
    async fn select_posts(
        &self,
        access_token: &str,
        filter: &PostFilter,
    ) -> Result<Vec<Post>, AppError>;

    /// The whole likes table.
    async fn select_likes(&self, access_token: &str) -> Result<Vec<Like>, AppError>;

    async fn insert_post(&self, access_token: &str, post: &NewPost) -> Result<(), AppError>;

    /// Deletes where `id = post_id AND user_id = user_id`. Zero matches is not an error.
    async fn delete_post(
        &self,
        access_token: &str,
        post_id: &PostId,
        user_id: &UserId,
    ) -> Result<(), AppError>;

    async fn insert_like(&self, access_token: &str, like: &Like) -> Result<(), AppError>;

    async fn delete_like(&self, access_token: &str, like: &Like) -> Result<(), AppError>;
}
