/// Workload entry model and aggregation queries
///
/// One row is one user's planned (and optionally actual) effort on one task
/// on one calendar day. Entries are upserted on (user, task, date), so
/// re-allocating a task's span overwrites earlier plans instead of stacking
/// them. No cap is enforced at write time; over-allocation is surfaced by
/// the engine's utilization math, never blocked here.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE workload_entries (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id),
///     project_id UUID NOT NULL,
///     task_id UUID NOT NULL,
///     entry_date DATE NOT NULL,
///     allocated_hours DOUBLE PRECISION NOT NULL,
///     actual_hours DOUBLE PRECISION,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (user_id, task_id, entry_date)
/// );
/// ```
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Workload entry record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkloadEntry {
    /// Unique entry ID
    pub id: Uuid,

    /// User the effort belongs to
    pub user_id: Uuid,

    /// Project the task belongs to (denormalized for range queries)
    pub project_id: Uuid,

    /// Task the effort is planned against
    pub task_id: Uuid,

    /// Calendar day
    pub entry_date: NaiveDate,

    /// Planned hours for the day
    pub allocated_hours: f64,

    /// Hours actually spent (None until reported)
    pub actual_hours: Option<f64>,

    /// When the entry was created
    pub created_at: DateTime<Utc>,

    /// When the entry was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for upserting a workload entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocateWorkload {
    /// User
    pub user_id: Uuid,

    /// Project
    pub project_id: Uuid,

    /// Task
    pub task_id: Uuid,

    /// Calendar day
    pub entry_date: NaiveDate,

    /// Planned hours; the engine defaults this to a full 8-hour day when
    /// the caller leaves it unset
    pub allocated_hours: Option<f64>,

    /// Actual hours
    pub actual_hours: Option<f64>,
}

/// Per-project aggregation row for a user's date range
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectHours {
    /// Project
    pub project_id: Uuid,

    /// Sum of allocated hours in range
    pub allocated_hours: f64,

    /// Sum of reported actual hours in range
    pub actual_hours: f64,
}

/// Per-user aggregation row for a project's date range
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserHours {
    /// User
    pub user_id: Uuid,

    /// Sum of allocated hours in range
    pub allocated_hours: f64,

    /// Sum of reported actual hours in range
    pub actual_hours: f64,
}

impl WorkloadEntry {
    /// Upserts an entry on (user, task, date)
    pub async fn upsert(pool: &PgPool, data: AllocateWorkload, allocated_hours: f64) -> Result<Self, sqlx::Error> {
        let entry = sqlx::query_as::<_, WorkloadEntry>(
            r#"
            INSERT INTO workload_entries (user_id, project_id, task_id, entry_date,
                                          allocated_hours, actual_hours)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, task_id, entry_date) DO UPDATE
            SET project_id = EXCLUDED.project_id,
                allocated_hours = EXCLUDED.allocated_hours,
                actual_hours = COALESCE(EXCLUDED.actual_hours, workload_entries.actual_hours),
                updated_at = NOW()
            RETURNING id, user_id, project_id, task_id, entry_date, allocated_hours,
                      actual_hours, created_at, updated_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.project_id)
        .bind(data.task_id)
        .bind(data.entry_date)
        .bind(allocated_hours)
        .bind(data.actual_hours)
        .fetch_one(pool)
        .await?;

        Ok(entry)
    }

    /// Sums a user's hours per project over an inclusive date range
    pub async fn sum_by_project(
        pool: &PgPool,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<ProjectHours>, sqlx::Error> {
        let rows = sqlx::query_as::<_, ProjectHours>(
            r#"
            SELECT project_id,
                   SUM(allocated_hours) AS allocated_hours,
                   COALESCE(SUM(actual_hours), 0) AS actual_hours
            FROM workload_entries
            WHERE user_id = $1 AND entry_date BETWEEN $2 AND $3
            GROUP BY project_id
            ORDER BY allocated_hours DESC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Sums a project's hours per user over an inclusive date range
    pub async fn sum_by_user(
        pool: &PgPool,
        project_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<UserHours>, sqlx::Error> {
        let rows = sqlx::query_as::<_, UserHours>(
            r#"
            SELECT user_id,
                   SUM(allocated_hours) AS allocated_hours,
                   COALESCE(SUM(actual_hours), 0) AS actual_hours
            FROM workload_entries
            WHERE project_id = $1 AND entry_date BETWEEN $2 AND $3
            GROUP BY user_id
            ORDER BY allocated_hours DESC
            "#,
        )
        .bind(project_id)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Total allocated hours for a user over an inclusive date range
    pub async fn total_allocated(
        pool: &PgPool,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<f64, sqlx::Error> {
        let total: f64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(allocated_hours), 0)
            FROM workload_entries
            WHERE user_id = $1 AND entry_date BETWEEN $2 AND $3
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_one(pool)
        .await?;

        Ok(total)
    }
}
