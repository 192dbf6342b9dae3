// src/models/post.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::account::UserId;

/// Post identifier. The hosted table may use an integer or a uuid key,
/// so both are accepted and kept in their textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PostId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => PostId(n.to_string()),
            RawId::Text(s) => PostId(s),
        })
    }
}

/// Represents the 'posts' table in the hosted backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub user_id: UserId,

    /// Author fields copied from the account when the post was written.
    pub username: String,
    pub display_name: String,

    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Row sent on insert. `id` and `created_at` are assigned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPost {
    pub content: String,
    pub user_id: UserId,
    pub username: String,
    pub display_name: String,
}

/// Optional author filter for feed reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub author: Option<UserId>,
}

impl PostFilter {
    pub fn all() -> Self {
        Self { author: None }
    }

    pub fn by_author(author: UserId) -> Self {
        Self {
            author: Some(author),
        }
    }

    pub fn matches(&self, post: &Post) -> bool {
        self.author.is_none_or(|author| post.user_id == author)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_id_accepts_integer_and_text_keys() {
        let a: PostId = serde_json::from_value(serde_json::json!(42)).unwrap();
        let b: PostId = serde_json::from_value(serde_json::json!("9b2e")).unwrap();
        assert_eq!(a.as_str(), "42");
        assert_eq!(b.as_str(), "9b2e");
        assert_eq!(serde_json::to_value(&a).unwrap(), serde_json::json!("42"));
    }
}
