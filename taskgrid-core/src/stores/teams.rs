/// Team store: CRUD, member roles, and project associations
///
/// Management operations (member add/remove, role change, team update,
/// team delete) require an OWNER or ADMIN role on the team, with two
/// exemptions: a member may always remove themself, and the creator's
/// OWNER membership is bootstrapped during creation without a check.
///
/// Deleting a team is a best-effort sequence: memberships and project
/// associations are removed first, each step attempted independently, and
/// a step failure is logged without stopping the deletion.
use serde::Serialize;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use crate::access::{require_project_manage, require_team_manage};
use crate::error::{StoreError, StoreResult};
use crate::models::project::Project;
use crate::models::team::{CreateTeam, ProjectTeam, Team, TeamMember, TeamRole, UpdateTeam};
use crate::models::user::User;

/// Team member enriched with display info
#[derive(Debug, Clone, Serialize)]
pub struct TeamMemberInfo {
    /// The membership record
    #[serde(flatten)]
    pub member: TeamMember,

    /// Display name of the member
    pub user_name: String,

    /// Email of the member, if resolvable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
}

/// Creates a team and bootstraps the creator as OWNER
pub async fn create(pool: &PgPool, data: CreateTeam) -> StoreResult<Team> {
    let creator = data.created_by;
    let team = Team::create(pool, data).await?;

    // Self-bootstrap: no role check for the creator's own OWNER membership.
    TeamMember::create(pool, team.id, creator, TeamRole::Owner).await?;

    Ok(team)
}

/// Gets a team by id
pub async fn get(pool: &PgPool, id: Uuid) -> StoreResult<Team> {
    Team::find_by_id(pool, id)
        .await?
        .ok_or(StoreError::NotFound("Team"))
}

/// Applies a partial update; requires a managing role
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    patch: UpdateTeam,
    actor_id: Uuid,
) -> StoreResult<Team> {
    get(pool, id).await?;
    require_team_manage(pool, id, actor_id).await?;

    Team::update(pool, id, patch)
        .await?
        .ok_or(StoreError::NotFound("Team"))
}

/// Deletes a team after best-effort cleanup of memberships and associations
pub async fn delete(pool: &PgPool, id: Uuid, actor_id: Uuid) -> StoreResult<()> {
    get(pool, id).await?;
    require_team_manage(pool, id, actor_id).await?;

    if let Err(e) = TeamMember::delete_by_team(pool, id).await {
        warn!(team_id = %id, error = %e, "Failed to remove team memberships during deletion");
    }

    if let Err(e) = ProjectTeam::delete_by_team(pool, id).await {
        warn!(team_id = %id, error = %e, "Failed to remove project associations during deletion");
    }

    Team::delete(pool, id).await?;

    Ok(())
}

/// Adds a member; requires a managing role
pub async fn add_member(
    pool: &PgPool,
    team_id: Uuid,
    user_id: Uuid,
    role: TeamRole,
    actor_id: Uuid,
) -> StoreResult<TeamMember> {
    get(pool, team_id).await?;
    require_team_manage(pool, team_id, actor_id).await?;

    Ok(TeamMember::create(pool, team_id, user_id, role).await?)
}

/// Removes a member
///
/// Managing role required unless the member removes themself. The last
/// remaining OWNER can never be removed.
pub async fn remove_member(
    pool: &PgPool,
    team_id: Uuid,
    user_id: Uuid,
    actor_id: Uuid,
) -> StoreResult<()> {
    get(pool, team_id).await?;

    if actor_id != user_id {
        require_team_manage(pool, team_id, actor_id).await?;
    }

    let member = TeamMember::find(pool, team_id, user_id)
        .await?
        .ok_or(StoreError::NotFound("Team member"))?;

    if member.role == TeamRole::Owner && TeamMember::count_owners(pool, team_id).await? <= 1 {
        return Err(StoreError::PermissionDenied(
            "Cannot remove the last owner of a team".to_string(),
        ));
    }

    TeamMember::delete(pool, team_id, user_id).await?;

    Ok(())
}

/// Changes a member's role; requires a managing role
///
/// Demoting the last remaining OWNER is rejected.
pub async fn update_member_role(
    pool: &PgPool,
    team_id: Uuid,
    user_id: Uuid,
    new_role: TeamRole,
    actor_id: Uuid,
) -> StoreResult<TeamMember> {
    get(pool, team_id).await?;
    require_team_manage(pool, team_id, actor_id).await?;

    let member = TeamMember::find(pool, team_id, user_id)
        .await?
        .ok_or(StoreError::NotFound("Team member"))?;

    if member.role == TeamRole::Owner
        && new_role != TeamRole::Owner
        && TeamMember::count_owners(pool, team_id).await? <= 1
    {
        return Err(StoreError::PermissionDenied(
            "Cannot remove the last owner of a team".to_string(),
        ));
    }

    TeamMember::update_role(pool, team_id, user_id, new_role)
        .await?
        .ok_or(StoreError::NotFound("Team member"))
}

/// Lists team members with display info
///
/// Directory misses degrade to the "Unknown User" sentinel with a warning.
pub async fn list_members(pool: &PgPool, team_id: Uuid) -> StoreResult<Vec<TeamMemberInfo>> {
    get(pool, team_id).await?;

    let members = TeamMember::list_by_team(pool, team_id).await?;
    let mut enriched = Vec::with_capacity(members.len());

    for member in members {
        let (user_name, user_email) = match User::find_by_id(pool, member.user_id).await {
            Ok(Some(user)) => (user.name, Some(user.email)),
            Ok(None) => {
                warn!(user_id = %member.user_id, "Team member user record missing");
                ("Unknown User".to_string(), None)
            }
            Err(e) => {
                warn!(user_id = %member.user_id, error = %e, "Failed to resolve team member");
                ("Unknown User".to_string(), None)
            }
        };

        enriched.push(TeamMemberInfo {
            member,
            user_name,
            user_email,
        });
    }

    Ok(enriched)
}

/// Lists teams a user belongs to
pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> StoreResult<Vec<Team>> {
    Ok(Team::list_for_user(pool, user_id).await?)
}

/// Associates a team with a project, granting its members project access
///
/// Requires a managing role on the project (teams can be associated by
/// people who run the project, not by people who run the team).
pub async fn add_to_project(
    pool: &PgPool,
    team_id: Uuid,
    project_id: Uuid,
    requester_id: Uuid,
) -> StoreResult<ProjectTeam> {
    get(pool, team_id).await?;

    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or(StoreError::NotFound("Project"))?;

    require_project_manage(pool, &project, requester_id).await?;

    Ok(ProjectTeam::create(pool, project_id, team_id).await?)
}

/// Removes a team-project association
pub async fn remove_from_project(
    pool: &PgPool,
    team_id: Uuid,
    project_id: Uuid,
    requester_id: Uuid,
) -> StoreResult<()> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or(StoreError::NotFound("Project"))?;

    require_project_manage(pool, &project, requester_id).await?;

    if !ProjectTeam::delete(pool, project_id, team_id).await? {
        return Err(StoreError::NotFound("Team association"));
    }

    Ok(())
}

/// Case-insensitive substring search over team names
pub async fn search(pool: &PgPool, query: &str) -> StoreResult<Vec<Team>> {
    Ok(Team::search(pool, query).await?)
}
