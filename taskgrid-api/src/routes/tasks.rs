/// Task endpoints
///
/// # Endpoints
///
/// - `POST /v1/tasks` - Create
/// - `GET /v1/tasks/assigned` - Tasks assigned to the caller
/// - `GET /v1/tasks/:id` - Get
/// - `PUT /v1/tasks/:id` - Partial update
/// - `DELETE /v1/tasks/:id` - Delete
/// - `GET /v1/projects/:id/tasks` - List a project's tasks
/// - `POST /v1/tasks/:id/assign` - Reassign with optional auto-allocation
/// - `POST /v1/tasks/:id/suggestions` - Rank candidate assignees
/// - `GET /v1/tasks/:id/impact/:user_id` - Preview assignment impact
/// - `POST /v1/tasks/:id/reschedule` - Dependency-validated start move
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::identity::RequesterContext;
use crate::routes::double_option;
use taskgrid_core::models::task::{CreateTask, Task, TaskPriority, TaskStatus, UpdateTask};
use taskgrid_core::stores::tasks;
use taskgrid_core::workload::distribution::DistributionStrategy;
use taskgrid_core::workload::engine::{
    AssigneeSuggestion, AssignmentImpact, AssignmentOptions, AssignmentResult,
};
use taskgrid_core::workload::timeline;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Task title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Optional description
    #[validate(length(max = 4000, message = "Description must be at most 4000 characters"))]
    pub description: Option<String>,

    /// Owning project
    pub project_id: Uuid,

    /// Assigned user
    pub assignee_id: Option<Uuid>,

    /// Status (defaults to todo)
    pub status: Option<TaskStatus>,

    /// Priority (defaults to medium)
    pub priority: Option<TaskPriority>,

    /// Scheduled start
    pub start_date: Option<NaiveDate>,

    /// Scheduled end
    pub end_date: Option<NaiveDate>,

    /// Estimated effort in hours
    #[validate(range(min = 0.0, max = 10000.0, message = "Estimate must be 0-10000 hours"))]
    pub estimated_hours: Option<f64>,

    /// Dependency task ids
    #[serde(default)]
    pub dependencies: Vec<Uuid>,
}

/// Update task request (absent = untouched, null = clear)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,

    /// New description
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    /// New assignee (null unassigns)
    #[serde(default, deserialize_with = "double_option")]
    pub assignee_id: Option<Option<Uuid>>,

    /// New status
    pub status: Option<TaskStatus>,

    /// New priority
    pub priority: Option<TaskPriority>,

    /// New start date
    #[serde(default, deserialize_with = "double_option")]
    pub start_date: Option<Option<NaiveDate>>,

    /// New end date
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<NaiveDate>>,

    /// New estimate
    #[serde(default, deserialize_with = "double_option")]
    pub estimated_hours: Option<Option<f64>>,

    /// New actuals
    #[serde(default, deserialize_with = "double_option")]
    pub actual_hours: Option<Option<f64>>,

    /// Replacement dependency list
    pub dependencies: Option<Vec<Uuid>>,
}

/// Assignment request
#[derive(Debug, Deserialize)]
pub struct AssignTaskRequest {
    /// New assignee
    pub assignee_id: Uuid,

    /// Distribution strategy for auto-allocation
    pub strategy: Option<DistributionStrategy>,

    /// Per-day hours for the custom strategy
    pub custom_distribution: Option<Vec<f64>>,

    /// Spread the estimate over the task's span as workload entries
    #[serde(default)]
    pub auto_allocate: bool,
}

/// Suggestion request
#[derive(Debug, Deserialize, Validate)]
pub struct SuggestAssigneesRequest {
    /// Candidate user ids to rank
    #[validate(length(min = 1, message = "At least one candidate is required"))]
    pub candidate_ids: Vec<Uuid>,
}

/// Reschedule request
#[derive(Debug, Deserialize)]
pub struct RescheduleRequest {
    /// New start date; the end shifts to preserve duration
    pub start_date: NaiveDate,
}

/// Creates a task in a project the caller can see
pub async fn create_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate().map_err(ApiError::from)?;

    let data = CreateTask {
        title: req.title,
        description: req.description,
        project_id: req.project_id,
        assignee_id: req.assignee_id,
        status: req.status.unwrap_or(TaskStatus::Todo),
        priority: req.priority.unwrap_or(TaskPriority::Medium),
        start_date: req.start_date,
        end_date: req.end_date,
        estimated_hours: req.estimated_hours,
        dependencies: req.dependencies,
    };

    let task = tasks::create(&state.db, data, ctx.user.id).await?;

    tracing::info!(task_id = %task.id, project_id = %task.project_id, "Task created");

    Ok(Json(task))
}

/// Lists a project's tasks
pub async fn list_project_tasks(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(
        tasks::list_for_project(&state.db, project_id, ctx.user.id).await?,
    ))
}

/// Lists tasks assigned to the caller
pub async fn list_assigned_tasks(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(
        tasks::list_for_assignee(&state.db, ctx.user.id).await?,
    ))
}

/// Gets a task
pub async fn get_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    Ok(Json(tasks::get(&state.db, id, ctx.user.id).await?))
}

/// Applies a partial update
pub async fn update_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    req.validate().map_err(ApiError::from)?;

    let patch = UpdateTask {
        title: req.title,
        description: req.description,
        assignee_id: req.assignee_id,
        status: req.status,
        priority: req.priority,
        start_date: req.start_date,
        end_date: req.end_date,
        estimated_hours: req.estimated_hours,
        actual_hours: req.actual_hours,
        dependencies: req.dependencies,
    };

    Ok(Json(tasks::update(&state.db, id, patch, ctx.user.id).await?))
}

/// Deletes a task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    tasks::delete(&state.db, id, ctx.user.id).await?;

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Reassigns a task, optionally auto-allocating its estimate
pub async fn assign_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignTaskRequest>,
) -> ApiResult<Json<AssignmentResult>> {
    let result = state
        .workload
        .assign_with_allocation(
            id,
            req.assignee_id,
            ctx.user.id,
            AssignmentOptions {
                strategy: req.strategy,
                custom_distribution: req.custom_distribution,
                auto_allocate: req.auto_allocate,
            },
        )
        .await?;

    Ok(Json(result))
}

/// Ranks candidate assignees for a task
pub async fn suggest_assignees(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<SuggestAssigneesRequest>,
) -> ApiResult<Json<Vec<AssigneeSuggestion>>> {
    req.validate().map_err(ApiError::from)?;

    Ok(Json(
        state
            .workload
            .suggest_assignees(id, ctx.user.id, &req.candidate_ids)
            .await?,
    ))
}

/// Previews the workload impact of an assignment
pub async fn preview_impact(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<AssignmentImpact>> {
    Ok(Json(
        state.workload.preview_impact(id, user_id, ctx.user.id).await?,
    ))
}

/// Moves a task's start date, validating dependencies first
pub async fn reschedule_task(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<RescheduleRequest>,
) -> ApiResult<Json<Task>> {
    Ok(Json(
        timeline::reschedule(&state.db, id, req.start_date, ctx.user.id).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_task_request_validation() {
        let valid = CreateTaskRequest {
            title: "Build it".to_string(),
            description: None,
            project_id: Uuid::new_v4(),
            assignee_id: None,
            status: None,
            priority: None,
            start_date: None,
            end_date: None,
            estimated_hours: Some(16.0),
            dependencies: vec![],
        };
        assert!(valid.validate().is_ok());

        let negative_estimate = CreateTaskRequest {
            estimated_hours: Some(-1.0),
            title: "Bad".to_string(),
            ..valid
        };
        assert!(negative_estimate.validate().is_err());
    }

    #[test]
    fn test_update_task_null_unassigns() {
        let req: UpdateTaskRequest = serde_json::from_str(r#"{"assignee_id": null}"#).unwrap();
        assert_eq!(req.assignee_id, Some(None));

        let req: UpdateTaskRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert!(req.assignee_id.is_none());
    }

    #[test]
    fn test_suggest_request_requires_candidates() {
        let empty = SuggestAssigneesRequest { candidate_ids: vec![] };
        assert!(empty.validate().is_err());

        let one = SuggestAssigneesRequest {
            candidate_ids: vec![Uuid::new_v4()],
        };
        assert!(one.validate().is_ok());
    }

    #[test]
    fn test_assign_request_defaults() {
        let req: AssignTaskRequest = serde_json::from_str(
            r#"{"assignee_id": "550e8400-e29b-41d4-a716-446655440000"}"#,
        )
        .unwrap();
        assert!(!req.auto_allocate);
        assert!(req.strategy.is_none());
    }

    #[test]
    fn test_strategy_deserializes_snake_case() {
        let req: AssignTaskRequest = serde_json::from_str(
            r#"{"assignee_id": "550e8400-e29b-41d4-a716-446655440000",
                "strategy": "front_loaded", "auto_allocate": true}"#,
        )
        .unwrap();
        assert_eq!(req.strategy, Some(DistributionStrategy::FrontLoaded));
        assert!(req.auto_allocate);
    }
}
