/// Project endpoints
///
/// # Endpoints
///
/// - `POST /v1/projects` - Create (optionally with initial members)
/// - `GET /v1/projects?include_teams=` - List projects for the caller
/// - `GET /v1/projects/:id` - Get
/// - `PUT /v1/projects/:id` - Partial update
/// - `DELETE /v1/projects/:id` - Delete (owner only)
/// - `GET /v1/projects/:id/members` - Members with display info
/// - `POST /v1/projects/:id/members` - Add a member
/// - `DELETE /v1/projects/:id/members/:user_id` - Remove a member
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
use crate::routes::double_option;
use taskgrid_core::models::membership::{ProjectMember, ProjectRole};
use taskgrid_core::models::project::{CreateProject, Project, ProjectStatus, UpdateProject};
use taskgrid_core::stores::projects;
use taskgrid_core::stores::projects::ProjectMemberInfo;

/// Create project request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Optional description
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,

    /// Planned start
    pub start_date: NaiveDate,

    /// Planned end
    pub end_date: Option<NaiveDate>,

    /// Initial status (defaults to planning)
    pub status: Option<ProjectStatus>,

    /// Users to add as members right away
    #[serde(default)]
    pub member_ids: Vec<Uuid>,
}

/// List query parameters
#[derive(Debug, Deserialize)]
pub struct ListProjectsQuery {
    /// Include projects reachable only through team associations
    #[serde(default)]
    pub include_teams: bool,
}

/// Update project request (absent = untouched, null = clear)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    /// New name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    /// New description
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    /// New start date
    pub start_date: Option<NaiveDate>,

    /// New end date
    #[serde(default, deserialize_with = "double_option")]
    pub end_date: Option<Option<NaiveDate>>,

    /// New status
    pub status: Option<ProjectStatus>,
}

/// Add member request
#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    /// User to add
    pub user_id: Uuid,

    /// Role (defaults to member)
    pub role: Option<ProjectRole>,
}

/// Creates a project owned by the caller
pub async fn create_project(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Json(req): Json<CreateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate().map_err(ApiError::from)?;

    let data = CreateProject {
        name: req.name,
        description: req.description,
        owner_id: ctx.user.id,
        start_date: req.start_date,
        end_date: req.end_date,
        status: req.status.unwrap_or(ProjectStatus::Planning),
    };

    let project = if req.member_ids.is_empty() {
        projects::create(&state.db, data).await?
    } else {
        projects::create_with_initial_team(&state.db, data, &req.member_ids).await?
    };

    tracing::info!(project_id = %project.id, owner_id = %ctx.user.id, "Project created");

    Ok(Json(project))
}

/// Lists projects visible to the caller
pub async fn list_projects(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Query(query): Query<ListProjectsQuery>,
) -> ApiResult<Json<Vec<Project>>> {
    let projects = if query.include_teams {
        projects::list_for_user_including_teams(&state.db, ctx.user.id).await?
    } else {
        projects::list_for_user(&state.db, ctx.user.id).await?
    };

    Ok(Json(projects))
}

/// Gets a project
pub async fn get_project(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Project>> {
    Ok(Json(projects::get(&state.db, id, ctx.user.id).await?))
}

/// Applies a partial update
pub async fn update_project(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Project>> {
    req.validate().map_err(ApiError::from)?;

    let patch = UpdateProject {
        name: req.name,
        description: req.description,
        start_date: req.start_date,
        end_date: req.end_date,
        status: req.status,
    };

    Ok(Json(
        projects::update(&state.db, id, patch, ctx.user.id).await?,
    ))
}

/// Deletes a project; owner only
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    projects::delete(&state.db, id, ctx.user.id).await?;

    tracing::info!(project_id = %id, "Project deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Lists members with display info
pub async fn list_members(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<ProjectMemberInfo>>> {
    Ok(Json(
        projects::list_members(&state.db, id, ctx.user.id).await?,
    ))
}

/// Adds a member; requires a managing role
pub async fn add_member(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> ApiResult<Json<ProjectMember>> {
    let member = projects::add_member(
        &state.db,
        id,
        req.user_id,
        req.role.unwrap_or(ProjectRole::Member),
        ctx.user.id,
    )
    .await?;

    Ok(Json(member))
}

/// Removes a member
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<serde_json::Value>> {
    projects::remove_member(&state.db, id, user_id, ctx.user.id).await?;

    Ok(Json(serde_json::json!({ "removed": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_project_request_validation() {
        let valid = CreateProjectRequest {
            name: "Launch".to_string(),
            description: None,
            start_date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            end_date: None,
            status: None,
            member_ids: vec![],
        };
        assert!(valid.validate().is_ok());

        let empty_name = CreateProjectRequest {
            name: "".to_string(),
            ..valid
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_update_request_distinguishes_missing_from_null() {
        let missing: UpdateProjectRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert!(missing.end_date.is_none());

        let cleared: UpdateProjectRequest =
            serde_json::from_str(r#"{"end_date": null}"#).unwrap();
        assert_eq!(cleared.end_date, Some(None));

        let set: UpdateProjectRequest =
            serde_json::from_str(r#"{"end_date": "2024-12-31"}"#).unwrap();
        assert_eq!(
            set.end_date,
            Some(Some(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()))
        );
    }
}
