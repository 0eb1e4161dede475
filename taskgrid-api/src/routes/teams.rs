/// Team endpoints
///
/// # Endpoints
///
/// - `POST /v1/teams` - Create (caller becomes OWNER)
/// - `GET /v1/teams/mine` - Teams the caller belongs to
/// - `GET /v1/teams/search?q=` - Name search
/// - `GET /v1/teams/:id` / `PUT` / `DELETE` - CRUD
/// - `GET /v1/teams/:id/members` - Members with display info
/// - `POST /v1/teams/:id/members` - Add a member
/// - `PUT /v1/teams/:id/members/:user_id` - Change a member's role
/// - `DELETE /v1/teams/:id/members/:user_id` - Remove a member
/// - `POST /v1/projects/:id/teams/:team_id` - Associate with a project
/// - `DELETE /v1/projects/:id/teams/:team_id` - Remove the association
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::identity::RequesterContext;
use crate::routes::double_option;
use taskgrid_core::models::team::{CreateTeam, ProjectTeam, Team, TeamMember, TeamRole, UpdateTeam};
use taskgrid_core::stores::teams;
use taskgrid_core::stores::teams::TeamMemberInfo;

/// Create team request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeamRequest {
    /// Team name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    /// Optional description
    #[validate(length(max = 2000, message = "Description must be at most 2000 characters"))]
    pub description: Option<String>,
}

/// Update team request (absent = untouched, null = clear)
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTeamRequest {
    /// New name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    /// New description
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

/// Search query parameters
#[derive(Debug, Deserialize, Validate)]
pub struct SearchTeamsQuery {
    /// Substring to match against team names
    #[validate(length(min = 1, max = 255, message = "Query must be 1-255 characters"))]
    pub q: String,
}

/// Add member request
#[derive(Debug, Deserialize)]
pub struct AddTeamMemberRequest {
    /// User to add
    pub user_id: Uuid,

    /// Role (defaults to member)
    pub role: Option<TeamRole>,
}

/// Role change request
#[derive(Debug, Deserialize)]
pub struct UpdateTeamMemberRequest {
    /// New role
    pub role: TeamRole,
}

/// Creates a team with the caller as OWNER
pub async fn create_team(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Json(req): Json<CreateTeamRequest>,
) -> ApiResult<Json<Team>> {
    req.validate().map_err(ApiError::from)?;

    let team = teams::create(
        &state.db,
        CreateTeam {
            name: req.name,
            description: req.description,
            created_by: ctx.user.id,
        },
    )
    .await?;

    tracing::info!(team_id = %team.id, created_by = %ctx.user.id, "Team created");

    Ok(Json(team))
}

/// Lists teams the caller belongs to
pub async fn list_my_teams(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
) -> ApiResult<Json<Vec<Team>>> {
    Ok(Json(teams::list_for_user(&state.db, ctx.user.id).await?))
}

/// Searches teams by name substring
pub async fn search_teams(
    State(state): State<AppState>,
    Extension(_ctx): Extension<RequesterContext>,
    Query(query): Query<SearchTeamsQuery>,
) -> ApiResult<Json<Vec<Team>>> {
    query.validate().map_err(ApiError::from)?;

    Ok(Json(teams::search(&state.db, &query.q).await?))
}

/// Gets a team
pub async fn get_team(
    State(state): State<AppState>,
    Extension(_ctx): Extension<RequesterContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Team>> {
    Ok(Json(teams::get(&state.db, id).await?))
}

/// Applies a partial update; managing role required
pub async fn update_team(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTeamRequest>,
) -> ApiResult<Json<Team>> {
    req.validate().map_err(ApiError::from)?;

    let patch = UpdateTeam {
        name: req.name,
        description: req.description,
    };

    Ok(Json(teams::update(&state.db, id, patch, ctx.user.id).await?))
}

/// Deletes a team; managing role required
pub async fn delete_team(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    teams::delete(&state.db, id, ctx.user.id).await?;

    tracing::info!(team_id = %id, "Team deleted");

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Lists members with display info
pub async fn list_members(
    State(state): State<AppState>,
    Extension(_ctx): Extension<RequesterContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<TeamMemberInfo>>> {
    Ok(Json(teams::list_members(&state.db, id).await?))
}

/// Adds a member; managing role required
pub async fn add_member(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddTeamMemberRequest>,
) -> ApiResult<Json<TeamMember>> {
    let member = teams::add_member(
        &state.db,
        id,
        req.user_id,
        req.role.unwrap_or(TeamRole::Member),
        ctx.user.id,
    )
    .await?;

    Ok(Json(member))
}

/// Removes a member; self-removal is always allowed
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<serde_json::Value>> {
    teams::remove_member(&state.db, id, user_id, ctx.user.id).await?;

    Ok(Json(serde_json::json!({ "removed": true })))
}

/// Changes a member's role; managing role required
pub async fn update_member_role(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<UpdateTeamMemberRequest>,
) -> ApiResult<Json<TeamMember>> {
    Ok(Json(
        teams::update_member_role(&state.db, id, user_id, req.role, ctx.user.id).await?,
    ))
}

/// Associates a team with a project; project managing role required
pub async fn add_team_to_project(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path((project_id, team_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ProjectTeam>> {
    Ok(Json(
        teams::add_to_project(&state.db, team_id, project_id, ctx.user.id).await?,
    ))
}

/// Removes a team-project association; project managing role required
pub async fn remove_team_from_project(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Path((project_id, team_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<serde_json::Value>> {
    teams::remove_from_project(&state.db, team_id, project_id, ctx.user.id).await?;

    Ok(Json(serde_json::json!({ "removed": true })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_team_request_validation() {
        let valid = CreateTeamRequest {
            name: "Platform".to_string(),
            description: None,
        };
        assert!(valid.validate().is_ok());

        let empty = CreateTeamRequest {
            name: "".to_string(),
            description: None,
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_team_role_deserializes_lowercase() {
        let req: UpdateTeamMemberRequest = serde_json::from_str(r#"{"role": "admin"}"#).unwrap();
        assert_eq!(req.role, TeamRole::Admin);
    }
}
