// src/models/account.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Fallbacks stamped onto posts when the account metadata lacks a value.
pub const ANONYMOUS_USERNAME: &str = "Anonymous";
pub const DEFAULT_DISPLAY_NAME: &str = "User";

/// Provider-assigned identity id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Profile metadata captured at sign-up.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountMetadata {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
}

/// An authenticated identity as returned by the auth provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "user_metadata")]
    pub metadata: AccountMetadata,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Author fields denormalized onto a post when it is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorStamp {
    pub username: String,
    pub display_name: String,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Account {
    pub fn username(&self) -> Option<&str> {
        non_blank(&self.metadata.username)
    }

    pub fn full_name(&self) -> Option<&str> {
        non_blank(&self.metadata.full_name)
    }

    /// The author fields a new post receives. Copied, never re-synced.
    pub fn author_stamp(&self) -> AuthorStamp {
        AuthorStamp {
            username: self.username().unwrap_or(ANONYMOUS_USERNAME).to_string(),
            display_name: self.full_name().unwrap_or(DEFAULT_DISPLAY_NAME).to_string(),
        }
    }

    /// Avatar letter: full name, then username, then email.
    pub fn initial(&self) -> char {
        self.full_name()
            .or_else(|| self.username())
            .or_else(|| non_blank(&self.email))
            .and_then(|s| s.chars().next())
            .map(|c| c.to_uppercase().next().unwrap_or(c))
            .unwrap_or('?')
    }
}

/// An open session returned by sign-in or sign-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: Account,
}

/// DTO for the sign-up form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignUpForm {
    #[validate(length(min = 1, max = 50, message = "Username must be between 1 and 50 characters."))]
    pub username: String,

    #[validate(length(
        min = 1,
        max = 100,
        message = "Display name must be between 1 and 100 characters."
    ))]
    pub display_name: String,

    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,

    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters."))]
    pub password: String,
}

/// DTO for the sign-in form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignInForm {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}
