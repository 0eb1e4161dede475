/// Comment store: threaded comments per task, author-only mutation
///
/// Every operation verifies task access first (which cascades to project
/// access through the task store). Content is trimmed before storage; the
/// route layer rejects empty-after-trim and over-long content before it
/// gets here. Author enrichment is non-fatal: a comment whose author record
/// cannot be resolved is returned without author info, with a warning.
use serde::Serialize;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::comment::TaskComment;
use crate::models::user::User;
use crate::stores::tasks;

/// Comment enriched with author display info
#[derive(Debug, Clone, Serialize)]
pub struct CommentInfo {
    /// The comment record
    #[serde(flatten)]
    pub comment: TaskComment,

    /// Author display name, when resolvable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,

    /// Author email, when resolvable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_email: Option<String>,
}

/// A truncated comment listing with a has-more indicator
#[derive(Debug, Clone, Serialize)]
pub struct TruncatedComments {
    /// Up to `limit` newest comments
    pub comments: Vec<CommentInfo>,

    /// True if more comments exist beyond the returned page
    pub has_more: bool,
}

/// Lists a task's comments, newest first
pub async fn list(
    pool: &PgPool,
    task_id: Uuid,
    requester_id: Uuid,
    limit: i64,
) -> StoreResult<Vec<CommentInfo>> {
    tasks::get(pool, task_id, requester_id).await?;

    let comments = TaskComment::list_by_task(pool, task_id, limit).await?;

    Ok(enrich(pool, comments).await)
}

/// Lists up to `limit` comments plus a flag for whether more exist
///
/// Fetches `limit + 1` rows and returns the first `limit`.
pub async fn list_truncated(
    pool: &PgPool,
    task_id: Uuid,
    requester_id: Uuid,
    limit: i64,
) -> StoreResult<TruncatedComments> {
    tasks::get(pool, task_id, requester_id).await?;

    let mut comments = TaskComment::list_by_task(pool, task_id, limit + 1).await?;
    let has_more = comments.len() as i64 > limit;
    comments.truncate(limit as usize);

    Ok(TruncatedComments {
        comments: enrich(pool, comments).await,
        has_more,
    })
}

/// Creates a comment on a task the requester can see
///
/// Content is trimmed before storage.
pub async fn create(
    pool: &PgPool,
    task_id: Uuid,
    content: &str,
    requester_id: Uuid,
) -> StoreResult<TaskComment> {
    tasks::get(pool, task_id, requester_id).await?;

    Ok(TaskComment::create(pool, task_id, requester_id, content.trim()).await?)
}

/// Gets a single comment
pub async fn get(pool: &PgPool, id: Uuid, requester_id: Uuid) -> StoreResult<TaskComment> {
    let comment = TaskComment::find_by_id(pool, id)
        .await?
        .ok_or(StoreError::NotFound("Comment"))?;

    tasks::get(pool, comment.task_id, requester_id).await?;

    Ok(comment)
}

/// Edits a comment; author only
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    content: &str,
    requester_id: Uuid,
) -> StoreResult<TaskComment> {
    let comment = get(pool, id, requester_id).await?;

    if comment.user_id != requester_id {
        return Err(StoreError::PermissionDenied(
            "You can only update your own comments".to_string(),
        ));
    }

    TaskComment::update_content(pool, id, content.trim())
        .await?
        .ok_or(StoreError::NotFound("Comment"))
}

/// Deletes a comment; author only
pub async fn delete(pool: &PgPool, id: Uuid, requester_id: Uuid) -> StoreResult<()> {
    let comment = get(pool, id, requester_id).await?;

    if comment.user_id != requester_id {
        return Err(StoreError::PermissionDenied(
            "You can only delete your own comments".to_string(),
        ));
    }

    TaskComment::delete(pool, id).await?;

    Ok(())
}

/// Attaches author display info; misses are logged, never fatal
async fn enrich(pool: &PgPool, comments: Vec<TaskComment>) -> Vec<CommentInfo> {
    let mut enriched = Vec::with_capacity(comments.len());

    for comment in comments {
        let (author_name, author_email) = match User::find_by_id(pool, comment.user_id).await {
            Ok(Some(user)) => (Some(user.name), Some(user.email)),
            Ok(None) => {
                warn!(user_id = %comment.user_id, "Comment author record missing");
                (None, None)
            }
            Err(e) => {
                warn!(user_id = %comment.user_id, error = %e, "Failed to resolve comment author");
                (None, None)
            }
        };

        enriched.push(CommentInfo {
            comment,
            author_name,
            author_email,
        });
    }

    enriched
}
