/// Task comment model and database operations
///
/// Comments hang off a task, newest first. Content length (≤1000 chars) is
/// enforced by the route layer; the store only trims. Mutation is
/// author-only, enforced by the comment store.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task comment record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskComment {
    /// Unique comment ID
    pub id: Uuid,

    /// Commented task
    pub task_id: Uuid,

    /// Author
    pub user_id: Uuid,

    /// Comment body, trimmed before storage
    pub content: String,

    /// When the comment was created
    pub created_at: DateTime<Utc>,

    /// When the comment was last edited
    pub updated_at: DateTime<Utc>,
}

impl TaskComment {
    /// Creates a new comment
    pub async fn create(
        pool: &PgPool,
        task_id: Uuid,
        user_id: Uuid,
        content: &str,
    ) -> Result<Self, sqlx::Error> {
        let comment = sqlx::query_as::<_, TaskComment>(
            r#"
            INSERT INTO task_comments (task_id, user_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, task_id, user_id, content, created_at, updated_at
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .bind(content)
        .fetch_one(pool)
        .await?;

        Ok(comment)
    }

    /// Finds a comment by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, TaskComment>(
            r#"
            SELECT id, task_id, user_id, content, created_at, updated_at
            FROM task_comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Replaces a comment's content
    pub async fn update_content(
        pool: &PgPool,
        id: Uuid,
        content: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let comment = sqlx::query_as::<_, TaskComment>(
            r#"
            UPDATE task_comments
            SET content = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, task_id, user_id, content, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(content)
        .fetch_optional(pool)
        .await?;

        Ok(comment)
    }

    /// Deletes a comment
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_comments WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists a task's comments, newest first, up to `limit`
    pub async fn list_by_task(
        pool: &PgPool,
        task_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let comments = sqlx::query_as::<_, TaskComment>(
            r#"
            SELECT id, task_id, user_id, content, created_at, updated_at
            FROM task_comments
            WHERE task_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(task_id)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }
}
