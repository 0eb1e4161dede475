/// Project store: CRUD with access control and owner membership
///
/// Creation is a best-effort two-step sequence: the project row is
/// persisted first, then the owner's OWNER membership is added. A failure
/// in the membership step is logged and swallowed: the project is returned
/// to the caller either way, and the owner keeps access through the
/// `owner_id` column. There is no compensating rollback anywhere in this
/// module.
use sqlx::PgPool;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::access::{require_project_access, require_project_manage};
use crate::error::{StoreError, StoreResult};
use crate::models::membership::{ProjectMember, ProjectRole};
use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::models::user::User;

/// Project member enriched with author display info
///
/// `user_name` degrades to "Unknown User" when the directory lookup fails;
/// the membership itself is always returned.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectMemberInfo {
    /// The membership record
    #[serde(flatten)]
    pub member: ProjectMember,

    /// Display name of the member
    pub user_name: String,

    /// Email of the member, if resolvable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
}

/// Creates a project and best-effort adds the owner as an OWNER member
pub async fn create(pool: &PgPool, data: CreateProject) -> StoreResult<Project> {
    let owner_id = data.owner_id;
    let project = Project::create(pool, data).await?;

    if let Err(e) = ProjectMember::create(pool, project.id, owner_id, ProjectRole::Owner).await {
        warn!(
            project_id = %project.id,
            owner_id = %owner_id,
            error = %e,
            "Failed to add owner membership after project creation"
        );
    }

    Ok(project)
}

/// Creates a project and best-effort adds an initial member list
///
/// The owner membership comes first; each additional member is attempted
/// independently, so one failure does not stop the rest.
pub async fn create_with_initial_team(
    pool: &PgPool,
    data: CreateProject,
    member_ids: &[Uuid],
) -> StoreResult<Project> {
    let owner_id = data.owner_id;
    let project = create(pool, data).await?;

    for &user_id in member_ids {
        if user_id == owner_id {
            continue;
        }

        if let Err(e) = ProjectMember::create(pool, project.id, user_id, ProjectRole::Member).await
        {
            warn!(
                project_id = %project.id,
                user_id = %user_id,
                error = %e,
                "Failed to add initial project member"
            );
        }
    }

    Ok(project)
}

/// Gets a project the requester can see
///
/// # Errors
///
/// `NotFound` if the project does not exist, `AccessDenied` if the
/// requester fails the visibility predicate.
pub async fn get(pool: &PgPool, id: Uuid, requester_id: Uuid) -> StoreResult<Project> {
    let project = Project::find_by_id(pool, id)
        .await?
        .ok_or(StoreError::NotFound("Project"))?;

    require_project_access(pool, id, requester_id).await?;

    Ok(project)
}

/// Applies a partial update to a project the requester can see
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    patch: UpdateProject,
    requester_id: Uuid,
) -> StoreResult<Project> {
    // Existence and access first, so a forbidden requester learns nothing
    // beyond the 403.
    get(pool, id, requester_id).await?;

    Project::update(pool, id, patch)
        .await?
        .ok_or(StoreError::NotFound("Project"))
}

/// Deletes a project; owner only
///
/// Tasks, comments, and workload entries under the project are NOT
/// removed.
pub async fn delete(pool: &PgPool, id: Uuid, requester_id: Uuid) -> StoreResult<()> {
    let project = Project::find_by_id(pool, id)
        .await?
        .ok_or(StoreError::NotFound("Project"))?;

    if project.owner_id != requester_id {
        return Err(StoreError::PermissionDenied(
            "Only the project owner can delete a project".to_string(),
        ));
    }

    Project::delete(pool, id).await?;

    Ok(())
}

/// Lists projects the user owns or is a direct member of
pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> StoreResult<Vec<Project>> {
    Ok(Project::list_for_user(pool, user_id).await?)
}

/// Lists projects reachable by ownership, membership, or team association
pub async fn list_for_user_including_teams(
    pool: &PgPool,
    user_id: Uuid,
) -> StoreResult<Vec<Project>> {
    Ok(Project::list_for_user_with_teams(pool, user_id).await?)
}

/// Adds a member to a project; requires a managing role
pub async fn add_member(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
    role: ProjectRole,
    requester_id: Uuid,
) -> StoreResult<ProjectMember> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or(StoreError::NotFound("Project"))?;

    require_project_manage(pool, &project, requester_id).await?;

    Ok(ProjectMember::create(pool, project_id, user_id, role).await?)
}

/// Removes a member from a project
///
/// Managing role required, except a member removing themself.
pub async fn remove_member(
    pool: &PgPool,
    project_id: Uuid,
    user_id: Uuid,
    requester_id: Uuid,
) -> StoreResult<()> {
    let project = Project::find_by_id(pool, project_id)
        .await?
        .ok_or(StoreError::NotFound("Project"))?;

    if requester_id != user_id {
        require_project_manage(pool, &project, requester_id).await?;
    }

    if !ProjectMember::delete(pool, project_id, user_id).await? {
        return Err(StoreError::NotFound("Project member"));
    }

    Ok(())
}

/// Lists project members with display info
///
/// Directory misses are non-fatal: the member row is returned with the
/// "Unknown User" sentinel and a warning is logged.
pub async fn list_members(
    pool: &PgPool,
    project_id: Uuid,
    requester_id: Uuid,
) -> StoreResult<Vec<ProjectMemberInfo>> {
    get(pool, project_id, requester_id).await?;

    let members = ProjectMember::list_by_project(pool, project_id).await?;
    let mut enriched = Vec::with_capacity(members.len());

    for member in members {
        let (user_name, user_email) = match User::find_by_id(pool, member.user_id).await {
            Ok(Some(user)) => (user.name, Some(user.email)),
            Ok(None) => {
                warn!(user_id = %member.user_id, "Project member user record missing");
                ("Unknown User".to_string(), None)
            }
            Err(e) => {
                warn!(user_id = %member.user_id, error = %e, "Failed to resolve project member");
                ("Unknown User".to_string(), None)
            }
        };

        enriched.push(ProjectMemberInfo {
            member,
            user_name,
            user_email,
        });
    }

    Ok(enriched)
}
