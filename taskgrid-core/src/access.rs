/// Access checks shared by the stores
///
/// # Access Model
///
/// A user can access a project iff they are:
///
/// 1. the project owner, or
/// 2. a direct member (any role), or
/// 3. a member of a team associated with the project.
///
/// Task and comment access delegate to the owning project; they never carry
/// their own predicate. Role-gated operations (member management, team
/// management, project deletion) layer a role requirement on top of the
/// visibility predicate and fail with `PermissionDenied` instead of
/// `AccessDenied`.
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::membership::ProjectMember;
use crate::models::project::Project;
use crate::models::team::{TeamMember, TeamRole};

/// Checks the project visibility predicate
///
/// A single EXISTS over the owner column, direct memberships, and
/// team-association paths.
pub async fn can_access_project(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<bool, sqlx::Error> {
    let exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM projects
            WHERE id = $1 AND owner_id = $2
            UNION ALL
            SELECT 1 FROM project_members
            WHERE project_id = $1 AND user_id = $2
            UNION ALL
            SELECT 1 FROM project_teams pt
            JOIN team_members tm ON tm.team_id = pt.team_id
            WHERE pt.project_id = $1 AND tm.user_id = $2
        )
        "#,
    )
    .bind(project_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// Requires the project visibility predicate
///
/// # Errors
///
/// Returns `AccessDenied` if the user cannot see the project.
pub async fn require_project_access(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
) -> StoreResult<()> {
    if !can_access_project(pool, project_id, user_id).await? {
        return Err(StoreError::project_access_denied());
    }

    Ok(())
}

/// Requires owner or an owner/admin membership on the project
///
/// Used for member management and team association changes.
///
/// # Errors
///
/// Returns `PermissionDenied` if the user holds no managing role.
pub async fn require_project_manage(
    pool: &PgPool,
    project: &Project,
    user_id: Uuid,
) -> StoreResult<()> {
    if project.owner_id == user_id {
        return Ok(());
    }

    let role = ProjectMember::get_role(pool, project.id, user_id).await?;

    match role {
        Some(role) if role.can_manage() => Ok(()),
        _ => Err(StoreError::PermissionDenied(
            "You do not have permission to manage this project".to_string(),
        )),
    }
}

/// Requires an owner/admin role on a team
///
/// # Errors
///
/// Returns `PermissionDenied` if the user is not a managing member.
pub async fn require_team_manage(pool: &PgPool, team_id: Uuid, user_id: Uuid) -> StoreResult<TeamRole> {
    let role = TeamMember::get_role(pool, team_id, user_id)
        .await?
        .ok_or_else(|| {
            StoreError::PermissionDenied("You are not a member of this team".to_string())
        })?;

    if !role.can_manage() {
        return Err(StoreError::PermissionDenied(
            "You do not have permission to manage this team".to_string(),
        ));
    }

    Ok(role)
}
