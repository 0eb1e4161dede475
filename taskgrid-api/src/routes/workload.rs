/// Workload and timeline endpoints
///
/// # Endpoints
///
/// - `GET /v1/workload/users/:id/summary?start_date=&end_date=` - Per-project summary
/// - `GET /v1/workload/users/:id/capacity?start_date=&end_date=` - Capacity info
/// - `GET /v1/workload/users/:id/distribution` - Rolling 30-day distribution
/// - `POST /v1/workload/entries` - Upsert an allocation entry
/// - `POST /v1/workload/timeline` - Multi-project timeline batch
/// - `GET /v1/projects/:id/workload?start_date=&end_date=` - Per-member summary
/// - `GET /v1/projects/:id/timeline` - Single-project timeline
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::identity::RequesterContext;
use taskgrid_core::models::workload::{AllocateWorkload, WorkloadEntry};
use taskgrid_core::stores::projects;
use taskgrid_core::workload::engine::{
    CapacityInfo, ProjectDistribution, TeamWorkloadSummary, UserWorkloadSummary,
};
use taskgrid_core::workload::timeline::{self, ProjectTimeline as ProjectTimelineRows, TimelineTask};

/// Inclusive date range query parameters
#[derive(Debug, Deserialize)]
pub struct DateRangeQuery {
    /// Range start
    pub start_date: NaiveDate,

    /// Range end
    pub end_date: NaiveDate,
}

impl DateRangeQuery {
    fn check(&self) -> Result<(), ApiError> {
        if self.end_date < self.start_date {
            return Err(ApiError::BadRequest(
                "end_date must not be before start_date".to_string(),
            ));
        }
        Ok(())
    }
}

/// Allocation entry request
#[derive(Debug, Deserialize, Validate)]
pub struct AllocateRequest {
    /// User the effort belongs to
    pub user_id: Uuid,

    /// Project
    pub project_id: Uuid,

    /// Task
    pub task_id: Uuid,

    /// Calendar day
    pub entry_date: NaiveDate,

    /// Planned hours (defaults to a full 8-hour day)
    #[validate(range(min = 0.0, max = 24.0, message = "Allocated hours must be 0-24"))]
    pub allocated_hours: Option<f64>,

    /// Actual hours
    #[validate(range(min = 0.0, max = 24.0, message = "Actual hours must be 0-24"))]
    pub actual_hours: Option<f64>,
}

/// Batch timeline request
#[derive(Debug, Deserialize, Validate)]
pub struct BatchTimelineRequest {
    /// Projects to project onto the timeline
    #[validate(length(min = 1, message = "At least one project id is required"))]
    pub project_ids: Vec<Uuid>,
}

/// Per-project workload summary for a user
pub async fn user_summary(
    State(state): State<AppState>,
    Extension(_ctx): Extension<RequesterContext>,
    Path(user_id): Path<Uuid>,
    Query(range): Query<DateRangeQuery>,
) -> ApiResult<Json<UserWorkloadSummary>> {
    range.check()?;

    Ok(Json(
        state
            .workload
            .summarize_user(user_id, range.start_date, range.end_date)
            .await?,
    ))
}

/// Capacity and utilization for a user
pub async fn user_capacity(
    State(state): State<AppState>,
    Extension(_ctx): Extension<RequesterContext>,
    Path(user_id): Path<Uuid>,
    Query(range): Query<DateRangeQuery>,
) -> ApiResult<Json<CapacityInfo>> {
    range.check()?;

    Ok(Json(
        state
            .workload
            .capacity_info(user_id, range.start_date, range.end_date)
            .await?,
    ))
}

/// Rolling 30-day per-project distribution for a user
pub async fn user_distribution(
    State(state): State<AppState>,
    Extension(_ctx): Extension<RequesterContext>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<ProjectDistribution>>> {
    Ok(Json(state.workload.distribution(user_id).await?))
}

/// Per-member workload summary for a project the caller can see
pub async fn team_summary(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path(project_id): Path<Uuid>,
    Query(range): Query<DateRangeQuery>,
) -> ApiResult<Json<TeamWorkloadSummary>> {
    range.check()?;

    // The engine aggregates without a requester; visibility is checked here.
    projects::get(&state.db, project_id, ctx.user.id).await?;

    Ok(Json(
        state
            .workload
            .summarize_team(project_id, range.start_date, range.end_date)
            .await?,
    ))
}

/// Upserts a workload entry
pub async fn allocate_entry(
    State(state): State<AppState>,
    Extension(_ctx): Extension<RequesterContext>,
    Json(req): Json<AllocateRequest>,
) -> ApiResult<Json<WorkloadEntry>> {
    req.validate().map_err(ApiError::from)?;

    let entry = state
        .workload
        .allocate(AllocateWorkload {
            user_id: req.user_id,
            project_id: req.project_id,
            task_id: req.task_id,
            entry_date: req.entry_date,
            allocated_hours: req.allocated_hours,
            actual_hours: req.actual_hours,
        })
        .await?;

    Ok(Json(entry))
}

/// Single-project timeline
pub async fn project_timeline(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path(project_id): Path<Uuid>,
) -> ApiResult<Json<Vec<TimelineTask>>> {
    Ok(Json(
        timeline::project_timeline(&state.db, project_id, ctx.user.id).await?,
    ))
}

/// Multi-project timeline; failed projects are skipped, not fatal
pub async fn batch_timeline(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Json(req): Json<BatchTimelineRequest>,
) -> ApiResult<Json<Vec<ProjectTimelineRows>>> {
    req.validate().map_err(ApiError::from)?;

    Ok(Json(
        timeline::timeline_for_projects(&state.db, &req.project_ids, ctx.user.id).await,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_range_rejects_inverted() {
        let range = DateRangeQuery {
            start_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        };
        assert!(range.check().is_err());

        let single_day = DateRangeQuery {
            start_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
        };
        assert!(single_day.check().is_ok());
    }

    #[test]
    fn test_allocate_request_bounds_hours() {
        let too_long = AllocateRequest {
            user_id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            task_id: Uuid::new_v4(),
            entry_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            allocated_hours: Some(25.0),
            actual_hours: None,
        };
        assert!(too_long.validate().is_err());

        let fine = AllocateRequest {
            allocated_hours: Some(8.0),
            ..too_long
        };
        assert!(fine.validate().is_ok());
    }
}
