/// Task model and database operations
///
/// A task belongs to exactly one project; access to a task is always the
/// access of its owning project (delegated by the task store, never
/// duplicated here). `dependencies` is an ordered list of task ids whose
/// timing constrains this task's schedule. Ids may point at tasks in other
/// projects and are not checked for cycles at write time.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM (
///     'todo', 'in_progress', 'in_review', 'done', 'blocked'
/// );
///
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high', 'urgent');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT,
///     project_id UUID NOT NULL,
///     assignee_id UUID REFERENCES users(id),
///     status task_status NOT NULL DEFAULT 'todo',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     start_date DATE,
///     end_date DATE,
///     estimated_hours DOUBLE PRECISION,
///     actual_hours DOUBLE PRECISION,
///     dependencies UUID[] NOT NULL DEFAULT '{}',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Task workflow status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on
    InProgress,

    /// Awaiting review
    InReview,

    /// Finished
    Done,

    /// Stuck on something external
    Blocked,
}

impl TaskStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::InReview => "in_review",
            TaskStatus::Done => "done",
            TaskStatus::Blocked => "blocked",
        }
    }

    /// Timeline progress for Gantt display, in percent
    pub fn progress_percent(&self) -> u8 {
        match self {
            TaskStatus::Todo => 0,
            TaskStatus::InProgress => 50,
            TaskStatus::InReview => 80,
            TaskStatus::Done => 100,
            TaskStatus::Blocked => 25,
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    /// Converts priority to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }
}

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Task title
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Owning project
    pub project_id: Uuid,

    /// Assigned user (None = unassigned)
    pub assignee_id: Option<Uuid>,

    /// Workflow status
    pub status: TaskStatus,

    /// Priority
    pub priority: TaskPriority,

    /// Scheduled start (day granularity)
    pub start_date: Option<NaiveDate>,

    /// Scheduled end (day granularity, inclusive)
    pub end_date: Option<NaiveDate>,

    /// Estimated effort in hours
    pub estimated_hours: Option<f64>,

    /// Actual effort in hours
    pub actual_hours: Option<f64>,

    /// Ordered list of task ids this task's schedule depends on
    pub dependencies: Vec<Uuid>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new task
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    /// Task title
    pub title: String,

    /// Optional description
    pub description: Option<String>,

    /// Owning project
    pub project_id: Uuid,

    /// Assigned user
    pub assignee_id: Option<Uuid>,

    /// Status (defaults to Todo)
    #[serde(default = "default_status")]
    pub status: TaskStatus,

    /// Priority (defaults to Medium)
    #[serde(default = "default_priority")]
    pub priority: TaskPriority,

    /// Scheduled start
    pub start_date: Option<NaiveDate>,

    /// Scheduled end
    pub end_date: Option<NaiveDate>,

    /// Estimated effort in hours
    pub estimated_hours: Option<f64>,

    /// Dependency task ids (defaults to empty)
    #[serde(default)]
    pub dependencies: Vec<Uuid>,
}

fn default_status() -> TaskStatus {
    TaskStatus::Todo
}

fn default_priority() -> TaskPriority {
    TaskPriority::Medium
}

/// Input for updating a task
///
/// Only non-None fields are applied; clearable fields use a nested Option
/// so `Some(None)` clears while `None` leaves the column untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTask {
    /// New title
    pub title: Option<String>,

    /// New description (Some(None) clears)
    pub description: Option<Option<String>>,

    /// New assignee (Some(None) unassigns)
    pub assignee_id: Option<Option<Uuid>>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New start date (Some(None) clears)
    pub start_date: Option<Option<NaiveDate>>,

    /// New end date (Some(None) clears)
    pub end_date: Option<Option<NaiveDate>>,

    /// New estimate (Some(None) clears)
    pub estimated_hours: Option<Option<f64>>,

    /// New actuals (Some(None) clears)
    pub actual_hours: Option<Option<f64>>,

    /// Replacement dependency list
    pub dependencies: Option<Vec<Uuid>>,
}

impl Task {
    /// Creates a new task
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, project_id, assignee_id, status,
                               priority, start_date, end_date, estimated_hours, dependencies)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, title, description, project_id, assignee_id, status, priority,
                      start_date, end_date, estimated_hours, actual_hours, dependencies,
                      created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.project_id)
        .bind(data.assignee_id)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.estimated_hours)
        .bind(data.dependencies)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, project_id, assignee_id, status, priority,
                   start_date, end_date, estimated_hours, actual_hours, dependencies,
                   created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Applies a partial update
    pub async fn update(pool: &PgPool, id: Uuid, data: UpdateTask) -> Result<Option<Self>, sqlx::Error> {
        let set_description = data.description.is_some();
        let description = data.description.flatten();
        let set_assignee = data.assignee_id.is_some();
        let assignee_id = data.assignee_id.flatten();
        let set_start = data.start_date.is_some();
        let start_date = data.start_date.flatten();
        let set_end = data.end_date.is_some();
        let end_date = data.end_date.flatten();
        let set_estimated = data.estimated_hours.is_some();
        let estimated_hours = data.estimated_hours.flatten();
        let set_actual = data.actual_hours.is_some();
        let actual_hours = data.actual_hours.flatten();

        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                assignee_id = CASE WHEN $5 THEN $6 ELSE assignee_id END,
                status = COALESCE($7, status),
                priority = COALESCE($8, priority),
                start_date = CASE WHEN $9 THEN $10 ELSE start_date END,
                end_date = CASE WHEN $11 THEN $12 ELSE end_date END,
                estimated_hours = CASE WHEN $13 THEN $14 ELSE estimated_hours END,
                actual_hours = CASE WHEN $15 THEN $16 ELSE actual_hours END,
                dependencies = COALESCE($17, dependencies),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, project_id, assignee_id, status, priority,
                      start_date, end_date, estimated_hours, actual_hours, dependencies,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(set_description)
        .bind(description)
        .bind(set_assignee)
        .bind(assignee_id)
        .bind(data.status)
        .bind(data.priority)
        .bind(set_start)
        .bind(start_date)
        .bind(set_end)
        .bind(end_date)
        .bind(set_estimated)
        .bind(estimated_hours)
        .bind(set_actual)
        .bind(actual_hours)
        .bind(data.dependencies)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Reassigns a task
    pub async fn update_assignee(
        pool: &PgPool,
        id: Uuid,
        assignee_id: Option<Uuid>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET assignee_id = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, project_id, assignee_id, status, priority,
                      start_date, end_date, estimated_hours, actual_hours, dependencies,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(assignee_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Moves a task's schedule window
    pub async fn update_schedule(
        pool: &PgPool,
        id: Uuid,
        start_date: NaiveDate,
        end_date: Option<NaiveDate>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET start_date = $2,
                end_date = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, project_id, assignee_id, status, priority,
                      start_date, end_date, estimated_hours, actual_hours, dependencies,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(start_date)
        .bind(end_date)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists tasks in a project, newest first
    pub async fn list_by_project(pool: &PgPool, project_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, project_id, assignee_id, status, priority,
                   start_date, end_date, estimated_hours, actual_hours, dependencies,
                   created_at, updated_at
            FROM tasks
            WHERE project_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(project_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Lists tasks assigned to a user across all projects
    pub async fn list_by_assignee(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, project_id, assignee_id, status, priority,
                   start_date, end_date, estimated_hours, actual_hours, dependencies,
                   created_at, updated_at
            FROM tasks
            WHERE assignee_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_status_as_str() {
        assert_eq!(TaskStatus::Todo.as_str(), "todo");
        assert_eq!(TaskStatus::InProgress.as_str(), "in_progress");
        assert_eq!(TaskStatus::InReview.as_str(), "in_review");
        assert_eq!(TaskStatus::Done.as_str(), "done");
        assert_eq!(TaskStatus::Blocked.as_str(), "blocked");
    }

    #[test]
    fn test_status_progress_mapping() {
        assert_eq!(TaskStatus::Todo.progress_percent(), 0);
        assert_eq!(TaskStatus::InProgress.progress_percent(), 50);
        assert_eq!(TaskStatus::InReview.progress_percent(), 80);
        assert_eq!(TaskStatus::Done.progress_percent(), 100);
        assert_eq!(TaskStatus::Blocked.progress_percent(), 25);
    }

    #[test]
    fn test_task_priority_as_str() {
        assert_eq!(TaskPriority::Low.as_str(), "low");
        assert_eq!(TaskPriority::Medium.as_str(), "medium");
        assert_eq!(TaskPriority::High.as_str(), "high");
        assert_eq!(TaskPriority::Urgent.as_str(), "urgent");
    }

    #[test]
    fn test_create_task_defaults() {
        assert_eq!(default_status(), TaskStatus::Todo);
        assert_eq!(default_priority(), TaskPriority::Medium);
    }

    #[test]
    fn test_update_task_unassign() {
        let patch = UpdateTask {
            assignee_id: Some(None),
            ..Default::default()
        };
        assert!(patch.assignee_id.is_some());
        assert!(patch.assignee_id.flatten().is_none());
    }
}
