/// Project model and database operations
///
/// Projects are owned by a single user; visibility extends to direct
/// members and to members of teams associated with the project (see the
/// access predicate in `access.rs`). Deleting a project deletes only the
/// project row; tasks, comments, and workload entries keep their
/// `project_id` and remain queryable.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE project_status AS ENUM (
///     'planning', 'active', 'on_hold', 'completed', 'cancelled'
/// );
///
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     owner_id UUID NOT NULL REFERENCES users(id),
///     start_date DATE NOT NULL,
///     end_date DATE,
///     status project_status NOT NULL DEFAULT 'planning',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "project_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// Being scoped, no work started
    Planning,

    /// Work in progress
    Active,

    /// Paused
    OnHold,

    /// Finished
    Completed,

    /// Abandoned
    Cancelled,
}

impl ProjectStatus {
    /// Converts status to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planning => "planning",
            ProjectStatus::Active => "active",
            ProjectStatus::OnHold => "on_hold",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Cancelled => "cancelled",
        }
    }
}

/// Project model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    /// Unique project ID
    pub id: Uuid,

    /// Project name
    pub name: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Owning user; implicitly a member with OWNER role
    pub owner_id: Uuid,

    /// Planned start
    pub start_date: NaiveDate,

    /// Planned end (open-ended if None)
    pub end_date: Option<NaiveDate>,

    /// Current lifecycle status
    pub status: ProjectStatus,

    /// When the project was created
    pub created_at: DateTime<Utc>,

    /// When the project was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateProject {
    /// Project name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Owning user
    pub owner_id: Uuid,

    /// Planned start
    pub start_date: NaiveDate,

    /// Planned end
    pub end_date: Option<NaiveDate>,

    /// Initial status (defaults to Planning)
    #[serde(default = "default_status")]
    pub status: ProjectStatus,
}

fn default_status() -> ProjectStatus {
    ProjectStatus::Planning
}

/// Input for updating a project
///
/// Only non-None fields are applied. `end_date` uses a nested Option so the
/// caller can distinguish "leave untouched" from "clear".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProject {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<Option<String>>,

    /// New start date
    pub start_date: Option<NaiveDate>,

    /// New end date (Some(None) clears)
    pub end_date: Option<Option<NaiveDate>>,

    /// New status
    pub status: Option<ProjectStatus>,
}

impl Project {
    /// Creates a new project
    ///
    /// The owner-membership record is NOT created here; the project store
    /// adds it best-effort after this insert succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (name, description, owner_id, start_date, end_date, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, description, owner_id, start_date, end_date, status,
                      created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.owner_id)
        .bind(data.start_date)
        .bind(data.end_date)
        .bind(data.status)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, owner_id, start_date, end_date, status,
                   created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Applies a partial update
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProject,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Nested options flatten to (apply?, value) pairs so COALESCE keeps
        // untouched columns while an explicit Some(None) clears them.
        let set_description = data.description.is_some();
        let description = data.description.flatten();
        let set_end_date = data.end_date.is_some();
        let end_date = data.end_date.flatten();

        let project = sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects
            SET name = COALESCE($2, name),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                start_date = COALESCE($5, start_date),
                end_date = CASE WHEN $6 THEN $7 ELSE end_date END,
                status = COALESCE($8, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, owner_id, start_date, end_date, status,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(set_description)
        .bind(description)
        .bind(data.start_date)
        .bind(set_end_date)
        .bind(end_date)
        .bind(data.status)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Deletes a project row
    ///
    /// Tasks, comments, and workload entries under the project are left in
    /// place.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists projects the user owns or is a direct member of
    ///
    /// The UNION deduplicates by row, so an owner who is also a member
    /// appears once.
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT p.id, p.name, p.description, p.owner_id, p.start_date, p.end_date,
                   p.status, p.created_at, p.updated_at
            FROM projects p
            WHERE p.owner_id = $1
            UNION
            SELECT p.id, p.name, p.description, p.owner_id, p.start_date, p.end_date,
                   p.status, p.created_at, p.updated_at
            FROM projects p
            JOIN project_members pm ON pm.project_id = p.id
            WHERE pm.user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Lists projects reachable by ownership, direct membership, or team association
    pub async fn list_for_user_with_teams(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT p.id, p.name, p.description, p.owner_id, p.start_date, p.end_date,
                   p.status, p.created_at, p.updated_at
            FROM projects p
            WHERE p.owner_id = $1
            UNION
            SELECT p.id, p.name, p.description, p.owner_id, p.start_date, p.end_date,
                   p.status, p.created_at, p.updated_at
            FROM projects p
            JOIN project_members pm ON pm.project_id = p.id
            WHERE pm.user_id = $1
            UNION
            SELECT p.id, p.name, p.description, p.owner_id, p.start_date, p.end_date,
                   p.status, p.created_at, p.updated_at
            FROM projects p
            JOIN project_teams pt ON pt.project_id = p.id
            JOIN team_members tm ON tm.team_id = pt.team_id
            WHERE tm.user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_status_as_str() {
        assert_eq!(ProjectStatus::Planning.as_str(), "planning");
        assert_eq!(ProjectStatus::Active.as_str(), "active");
        assert_eq!(ProjectStatus::OnHold.as_str(), "on_hold");
        assert_eq!(ProjectStatus::Completed.as_str(), "completed");
        assert_eq!(ProjectStatus::Cancelled.as_str(), "cancelled");
    }

    #[test]
    fn test_default_status() {
        assert_eq!(default_status(), ProjectStatus::Planning);
    }

    #[test]
    fn test_update_project_clear_end_date() {
        let patch = UpdateProject {
            end_date: Some(None),
            ..Default::default()
        };
        assert!(patch.end_date.is_some());
        assert!(patch.end_date.flatten().is_none());
    }
}
