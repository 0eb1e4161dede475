/// Task comment endpoints
///
/// # Endpoints
///
/// - `GET /v1/tasks/:id/comments?limit=&truncated=` - List (newest first)
/// - `POST /v1/tasks/:id/comments` - Create
/// - `GET /v1/comments/:id` - Get
/// - `PUT /v1/comments/:id` - Edit (author only)
/// - `DELETE /v1/comments/:id` - Delete (author only)
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::identity::RequesterContext;
use taskgrid_core::models::comment::TaskComment;
use taskgrid_core::stores::comments;

const DEFAULT_LIMIT: i64 = 50;

/// List query parameters
#[derive(Debug, Deserialize, Validate)]
pub struct ListCommentsQuery {
    /// Page size (default 50)
    #[validate(range(min = 1, max = 200, message = "Limit must be 1-200"))]
    pub limit: Option<i64>,

    /// Return a has_more flag by fetching one extra row
    #[serde(default)]
    pub truncated: bool,
}

/// Create/update comment request
#[derive(Debug, Deserialize, Validate)]
pub struct CommentRequest {
    /// Comment body; trimmed before storage
    #[validate(length(max = 1000, message = "Comment must be at most 1000 characters"))]
    pub content: String,
}

impl CommentRequest {
    /// Rejects content that is empty once trimmed
    fn validated_content(&self) -> Result<&str, ApiError> {
        self.validate().map_err(ApiError::from)?;

        let trimmed = self.content.trim();
        if trimmed.is_empty() {
            return Err(ApiError::BadRequest(
                "Comment content cannot be empty".to_string(),
            ));
        }

        Ok(&self.content)
    }
}

/// Lists a task's comments
///
/// With `truncated=true` the response carries a `has_more` flag alongside
/// the first `limit` comments.
pub async fn list_comments(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path(task_id): Path<Uuid>,
    Query(query): Query<ListCommentsQuery>,
) -> ApiResult<Response> {
    query.validate().map_err(ApiError::from)?;

    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    if query.truncated {
        let page = comments::list_truncated(&state.db, task_id, ctx.user.id, limit).await?;
        Ok(Json(page).into_response())
    } else {
        let list = comments::list(&state.db, task_id, ctx.user.id, limit).await?;
        Ok(Json(list).into_response())
    }
}

/// Creates a comment on a task
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<CommentRequest>,
) -> ApiResult<Json<TaskComment>> {
    let content = req.validated_content()?;

    let comment = comments::create(&state.db, task_id, content, ctx.user.id).await?;

    Ok(Json(comment))
}

/// Gets a single comment
pub async fn get_comment(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskComment>> {
    Ok(Json(comments::get(&state.db, id, ctx.user.id).await?))
}

/// Edits a comment; author only
pub async fn update_comment(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<CommentRequest>,
) -> ApiResult<Json<TaskComment>> {
    let content = req.validated_content()?;

    Ok(Json(
        comments::update(&state.db, id, content, ctx.user.id).await?,
    ))
}

/// Deletes a comment; author only
pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    comments::delete(&state.db, id, ctx.user.id).await?;

    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_request_rejects_empty_after_trim() {
        let blank = CommentRequest {
            content: "   ".to_string(),
        };
        assert!(blank.validated_content().is_err());

        let fine = CommentRequest {
            content: "  hello  ".to_string(),
        };
        assert_eq!(fine.validated_content().unwrap(), "  hello  ");
    }

    #[test]
    fn test_comment_request_rejects_over_long() {
        let long = CommentRequest {
            content: "a".repeat(1001),
        };
        assert!(long.validated_content().is_err());

        let max = CommentRequest {
            content: "a".repeat(1000),
        };
        assert!(max.validated_content().is_ok());
    }

    #[test]
    fn test_list_query_defaults() {
        let query: ListCommentsQuery = serde_json::from_str(r#"{}"#).unwrap();
        assert!(query.limit.is_none());
        assert!(!query.truncated);
    }
}
