// src/models/like.rs

use serde::{Deserialize, Serialize};

use super::{account::UserId, post::PostId};

/// Represents a row of the 'likes' table. Presence means "liked".
/// Identity is the `(post_id, user_id)` pair; extra columns are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Like {
    pub post_id: PostId,
    pub user_id: UserId,
}
