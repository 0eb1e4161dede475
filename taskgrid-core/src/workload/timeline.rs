/// Dependency-aware timeline validation and Gantt projection
///
/// Validation is one level deep and fails closed: before a task's start
/// date moves, each id in its dependency list is fetched, and a dependency
/// ending strictly after the new start rejects the move. A dependency that
/// no longer exists is treated as satisfied; any fetch error (including the
/// task itself) is treated as a violation.
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::task::Task;
use crate::stores::tasks;

/// Error message for a rejected move
const DEPENDENCY_VIOLATION: &str = "Moving this task would violate task dependencies";

/// One task projected onto the timeline
#[derive(Debug, Clone, Serialize)]
pub struct TimelineTask {
    /// Task id
    pub id: Uuid,

    /// Task title
    pub title: String,

    /// Scheduled start
    pub start_date: Option<NaiveDate>,

    /// Scheduled end
    pub end_date: Option<NaiveDate>,

    /// Progress percent derived from status
    pub progress: u8,

    /// Assigned user
    pub assignee_id: Option<Uuid>,

    /// Dependency task ids
    pub dependencies: Vec<Uuid>,
}

impl From<Task> for TimelineTask {
    fn from(task: Task) -> Self {
        TimelineTask {
            id: task.id,
            title: task.title,
            start_date: task.start_date,
            end_date: task.end_date,
            progress: task.status.progress_percent(),
            assignee_id: task.assignee_id,
            dependencies: task.dependencies,
        }
    }
}

/// A project's tasks projected onto the timeline
#[derive(Debug, Clone, Serialize)]
pub struct ProjectTimeline {
    /// Project id
    pub project_id: Uuid,

    /// Timeline rows
    pub tasks: Vec<TimelineTask>,
}

/// Validates a start-date move against the task's dependencies
///
/// # Errors
///
/// Returns `Validation` when any dependency ends strictly after
/// `new_start`, and on ANY fetch error: validation fails closed.
pub async fn validate_task_move(
    pool: &PgPool,
    task_id: Uuid,
    new_start: NaiveDate,
) -> StoreResult<()> {
    let violation = || StoreError::Validation(DEPENDENCY_VIOLATION.to_string());

    let task = match Task::find_by_id(pool, task_id).await {
        Ok(Some(task)) => task,
        Ok(None) => return Err(violation()),
        Err(e) => {
            warn!(task_id = %task_id, error = %e, "Dependency validation failed to load task");
            return Err(violation());
        }
    };

    for dep_id in &task.dependencies {
        match Task::find_by_id(pool, *dep_id).await {
            Ok(Some(dep)) => {
                if let Some(dep_end) = dep.end_date {
                    if dep_end > new_start {
                        return Err(violation());
                    }
                }
            }
            // A deleted dependency no longer constrains the schedule.
            Ok(None) => {
                debug!(task_id = %task_id, dep_id = %dep_id, "Skipping unresolvable dependency");
            }
            Err(e) => {
                warn!(task_id = %task_id, dep_id = %dep_id, error = %e,
                      "Dependency validation failed; treating as violation");
                return Err(violation());
            }
        }
    }

    Ok(())
}

/// Moves a task's start date, preserving its duration
///
/// Access-checked, then dependency-validated (fail-closed), then updated.
pub async fn reschedule(
    pool: &PgPool,
    task_id: Uuid,
    new_start: NaiveDate,
    requester_id: Uuid,
) -> StoreResult<Task> {
    let task = tasks::get(pool, task_id, requester_id).await?;

    validate_task_move(pool, task_id, new_start).await?;

    let new_end = match (task.start_date, task.end_date) {
        (Some(start), Some(end)) => Some(new_start + (end - start)),
        (_, end) => end,
    };

    Task::update_schedule(pool, task_id, new_start, new_end)
        .await?
        .ok_or(StoreError::NotFound("Task"))
}

/// Projects a project's tasks onto the timeline
pub async fn project_timeline(
    pool: &PgPool,
    project_id: Uuid,
    requester_id: Uuid,
) -> StoreResult<Vec<TimelineTask>> {
    let rows = tasks::list_for_project(pool, project_id, requester_id).await?;

    Ok(rows.into_iter().map(TimelineTask::from).collect())
}

/// Projects several projects onto the timeline
///
/// Per-project failures (missing project, denied access, store errors) are
/// logged and skipped; the batch never aborts.
pub async fn timeline_for_projects(
    pool: &PgPool,
    project_ids: &[Uuid],
    requester_id: Uuid,
) -> Vec<ProjectTimeline> {
    let mut timelines = Vec::with_capacity(project_ids.len());

    for &project_id in project_ids {
        match project_timeline(pool, project_id, requester_id).await {
            Ok(tasks) => timelines.push(ProjectTimeline { project_id, tasks }),
            Err(e) => {
                warn!(project_id = %project_id, error = %e,
                      "Skipping project in timeline aggregation");
            }
        }
    }

    timelines
}
