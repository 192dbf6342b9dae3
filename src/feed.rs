// src/feed.rs

//! Feed Data Accessor: reads posts and likes and joins them for one viewer.

use crate::{
    backend::Backend,
    models::{
        account::UserId,
        like::Like,
        post::{Post, PostFilter},
    },
    session::Viewer,
};

/// A post plus the like state derived for the viewing account.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedPost {
    pub post: Post,
    pub like_count: usize,
    pub is_liked: bool,
}

impl FeedPost {
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.post.user_id == *user_id
    }
}

/// Loads the feed for `viewer`, newest first.
///
/// Read failures are logged and swallowed: the caller gets an empty feed.
pub async fn list_posts(
    backend: &dyn Backend,
    viewer: &Viewer,
    filter: &PostFilter,
) -> Vec<FeedPost> {
    let token = &viewer.access_token;

    let posts = match backend.select_posts(token, filter).await {
        Ok(posts) => posts,
        Err(e) => {
            tracing::warn!("failed to load posts: {}", e);
            return Vec::new();
        }
    };

    let likes = match backend.select_likes(token).await {
        Ok(likes) => likes,
        Err(e) => {
            tracing::warn!("failed to load likes: {}", e);
            return Vec::new();
        }
    };

    join_likes(posts, &likes, &viewer.account.id)
}

/// Derives `like_count` and `is_liked` for each post by scanning every like.
///
/// Output is stable-sorted by `created_at` descending whatever order the
/// backend returned.
pub fn join_likes(posts: Vec<Post>, likes: &[Like], viewer_id: &UserId) -> Vec<FeedPost> {
    let mut feed: Vec<FeedPost> = posts
        .into_iter()
        .map(|post| {
            let mut like_count = 0;
            let mut is_liked = false;
            for like in likes.iter().filter(|like| like.post_id == post.id) {
                like_count += 1;
                is_liked |= like.user_id == *viewer_id;
            }
            FeedPost {
                post,
                like_count,
                is_liked,
            }
        })
        .collect();

    feed.sort_by(|a, b| b.post.created_at.cmp(&a.post.created_at));
    feed
}
