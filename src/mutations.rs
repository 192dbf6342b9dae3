// src/mutations.rs

//! Write operations. Each one is a single backend call; callers refetch the
//! feed afterwards instead of patching what they already rendered.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, PoisonError},
};

use crate::{
    backend::Backend,
    error::AppError,
    models::{
        account::UserId,
        like::Like,
        post::{NewPost, PostId},
    },
    session::Viewer,
};

/// Publishes a post stamped with the viewer's current author fields.
///
/// Blank content is rejected before anything is sent.
pub async fn create_post(
    backend: &dyn Backend,
    viewer: &Viewer,
    content: &str,
) -> Result<(), AppError> {
    if content.trim().is_empty() {
        return Err(AppError::BadRequest("Post content cannot be empty".to_string()));
    }

    let stamp = viewer.account.author_stamp();
    let new_post = NewPost {
        content: content.to_string(),
        user_id: viewer.account.id,
        username: stamp.username,
        display_name: stamp.display_name,
    };

    backend
        .insert_post(&viewer.access_token, &new_post)
        .await
        .inspect_err(|e| tracing::error!("Failed to create post: {}", e))?;

    tracing::info!(user_id = %viewer.account.id, "post created");
    Ok(())
}

/// Deletes `post_id` if the viewer wrote it.
///
/// Ownership is part of the delete predicate; deleting someone else's post
/// matches nothing and still reports success.
pub async fn delete_post(
    backend: &dyn Backend,
    viewer: &Viewer,
    post_id: &PostId,
) -> Result<(), AppError> {
    backend
        .delete_post(&viewer.access_token, post_id, &viewer.account.id)
        .await
        .inspect_err(|e| tracing::error!("Failed to delete post {}: {}", post_id, e))?;

    tracing::info!(%post_id, user_id = %viewer.account.id, "post delete requested");
    Ok(())
}

/// Inserts the viewer's like. An existing row counts as success.
pub async fn like_post(
    backend: &dyn Backend,
    viewer: &Viewer,
    post_id: &PostId,
) -> Result<(), AppError> {
    let like = Like {
        post_id: post_id.clone(),
        user_id: viewer.account.id,
    };

    match backend.insert_like(&viewer.access_token, &like).await {
        Ok(()) => Ok(()),
        Err(AppError::Duplicate(_)) => {
            tracing::debug!(%post_id, "like already present");
            Ok(())
        }
        Err(e) => {
            tracing::error!("Failed to like post {}: {}", post_id, e);
            Err(e)
        }
    }
}

pub async fn unlike_post(
    backend: &dyn Backend,
    viewer: &Viewer,
    post_id: &PostId,
) -> Result<(), AppError> {
    let like = Like {
        post_id: post_id.clone(),
        user_id: viewer.account.id,
    };

    backend
        .delete_like(&viewer.access_token, &like)
        .await
        .inspect_err(|e| tracing::error!("Failed to unlike post {}: {}", post_id, e))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Liked,
    Unliked,
    /// Another toggle for the same post and viewer was still running.
    Skipped,
}

/// Likes or unlikes depending on `currently_liked`, the flag from the last
/// fetch. The flag is trusted as-is; backend state is not re-read.
pub async fn toggle_like(
    backend: &dyn Backend,
    in_flight: &InFlight,
    viewer: &Viewer,
    post_id: &PostId,
    currently_liked: bool,
) -> Result<ToggleOutcome, AppError> {
    let Some(_guard) = in_flight.try_claim(viewer.account.id, post_id.clone()) else {
        tracing::debug!(%post_id, "like toggle already in flight, dropping");
        return Ok(ToggleOutcome::Skipped);
    };

    if currently_liked {
        unlike_post(backend, viewer, post_id).await?;
        Ok(ToggleOutcome::Unliked)
    } else {
        like_post(backend, viewer, post_id).await?;
        Ok(ToggleOutcome::Liked)
    }
}

type PendingSet = Arc<Mutex<HashSet<(UserId, PostId)>>>;

/// Like toggles currently being sent, keyed by viewer and post.
#[derive(Clone, Default)]
pub struct InFlight {
    pending: PendingSet,
}

impl InFlight {
    /// Claims the pair, or `None` if it is already claimed.
    /// The claim is released when the guard drops.
    pub fn try_claim(&self, user_id: UserId, post_id: PostId) -> Option<InFlightGuard> {
        let key = (user_id, post_id);
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if !pending.insert(key.clone()) {
            return None;
        }
        Some(InFlightGuard {
            pending: Arc::clone(&self.pending),
            key,
        })
    }
}

pub struct InFlightGuard {
    pending: PendingSet,
    key: (UserId, PostId),
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
