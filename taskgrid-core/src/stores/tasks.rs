/// Task store: CRUD scoped to project access
///
/// Every project-scoped operation re-validates access through the project
/// store rather than duplicating the predicate. Direct id lookups report
/// `NotFound` before the access check runs, so an id probe cannot
/// distinguish "absent" from "forbidden project", but a task that exists
/// in a forbidden project yields `AccessDenied`.
use sqlx::PgPool;
use uuid::Uuid;

use crate::access::require_project_access;
use crate::error::{StoreError, StoreResult};
use crate::models::task::{CreateTask, Task, UpdateTask};
use crate::stores::projects;

/// Lists tasks in a project the requester can see
pub async fn list_for_project(
    pool: &PgPool,
    project_id: Uuid,
    requester_id: Uuid,
) -> StoreResult<Vec<Task>> {
    // Delegated: NotFound/AccessDenied for the project propagate as-is.
    projects::get(pool, project_id, requester_id).await?;

    Ok(Task::list_by_project(pool, project_id).await?)
}

/// Creates a task in a project the requester can see
///
/// Defaults (status=todo, priority=medium, dependencies=[]) are applied by
/// the input type and the schema; nothing is defaulted here.
pub async fn create(pool: &PgPool, data: CreateTask, requester_id: Uuid) -> StoreResult<Task> {
    projects::get(pool, data.project_id, requester_id).await?;

    Ok(Task::create(pool, data).await?)
}

/// Gets a task by id, delegating access to the owning project
///
/// # Errors
///
/// `NotFound` if the task does not exist; `AccessDenied` from the owning
/// project otherwise.
pub async fn get(pool: &PgPool, id: Uuid, requester_id: Uuid) -> StoreResult<Task> {
    let task = Task::find_by_id(pool, id)
        .await?
        .ok_or(StoreError::NotFound("Task"))?;

    require_project_access(pool, task.project_id, requester_id).await?;

    Ok(task)
}

/// Applies a partial update to a task
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    patch: UpdateTask,
    requester_id: Uuid,
) -> StoreResult<Task> {
    get(pool, id, requester_id).await?;

    Task::update(pool, id, patch)
        .await?
        .ok_or(StoreError::NotFound("Task"))
}

/// Deletes a task
pub async fn delete(pool: &PgPool, id: Uuid, requester_id: Uuid) -> StoreResult<()> {
    get(pool, id, requester_id).await?;

    Task::delete(pool, id).await?;

    Ok(())
}

/// Lists tasks assigned to a user across all projects
pub async fn list_for_assignee(pool: &PgPool, user_id: Uuid) -> StoreResult<Vec<Task>> {
    Ok(Task::list_by_assignee(pool, user_id).await?)
}
