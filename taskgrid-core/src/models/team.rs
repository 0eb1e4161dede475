/// Team, team membership, and project association models
///
/// Teams group users and grant project access transitively: associating a
/// team with a project makes every team member able to see the project.
/// Cleanup on team deletion (memberships, associations) is driven by the
/// team store, not the schema.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE team_role AS ENUM ('owner', 'admin', 'member');
///
/// CREATE TABLE teams (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     created_by UUID NOT NULL REFERENCES users(id),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE team_members (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     team_id UUID NOT NULL,
///     user_id UUID NOT NULL REFERENCES users(id),
///     role team_role NOT NULL DEFAULT 'member',
///     joined_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (team_id, user_id)
/// );
///
/// CREATE TABLE project_teams (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL,
///     team_id UUID NOT NULL,
///     added_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     UNIQUE (project_id, team_id)
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Roles for team memberships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "team_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    /// Full control; the last owner cannot be removed or demoted
    Owner,

    /// Can manage members and team settings
    Admin,

    /// Regular member
    Member,
}

impl TeamRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            TeamRole::Owner => "owner",
            TeamRole::Admin => "admin",
            TeamRole::Member => "member",
        }
    }

    /// Can perform team management operations
    pub fn can_manage(&self) -> bool {
        matches!(self, TeamRole::Owner | TeamRole::Admin)
    }
}

/// Team model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Team {
    /// Unique team ID
    pub id: Uuid,

    /// Team name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// User who created the team (bootstrapped as OWNER member)
    pub created_by: Uuid,

    /// When the team was created
    pub created_at: DateTime<Utc>,

    /// When the team was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new team
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTeam {
    /// Team name
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Creating user
    pub created_by: Uuid,
}

/// Input for updating a team
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTeam {
    /// New name
    pub name: Option<String>,

    /// New description (Some(None) clears)
    pub description: Option<Option<String>>,
}

/// Team membership record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TeamMember {
    /// Unique membership ID
    pub id: Uuid,

    /// Team
    pub team_id: Uuid,

    /// Member
    pub user_id: Uuid,

    /// Role within the team
    pub role: TeamRole,

    /// When the membership was created
    pub joined_at: DateTime<Utc>,
}

/// Team-to-project association record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProjectTeam {
    /// Unique association ID
    pub id: Uuid,

    /// Project
    pub project_id: Uuid,

    /// Team
    pub team_id: Uuid,

    /// When the association was created
    pub added_at: DateTime<Utc>,
}

impl Team {
    /// Creates a new team
    ///
    /// The creator's OWNER membership is added by the team store after this
    /// insert succeeds.
    pub async fn create(pool: &PgPool, data: CreateTeam) -> Result<Self, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (name, description, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, created_by, created_at, updated_at
            "#,
        )
        .bind(data.name)
        .bind(data.description)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(team)
    }

    /// Finds a team by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            SELECT id, name, description, created_by, created_at, updated_at
            FROM teams
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(team)
    }

    /// Applies a partial update
    pub async fn update(pool: &PgPool, id: Uuid, data: UpdateTeam) -> Result<Option<Self>, sqlx::Error> {
        let set_description = data.description.is_some();
        let description = data.description.flatten();

        let team = sqlx::query_as::<_, Team>(
            r#"
            UPDATE teams
            SET name = COALESCE($2, name),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, description, created_by, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(set_description)
        .bind(description)
        .fetch_optional(pool)
        .await?;

        Ok(team)
    }

    /// Deletes a team row
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists teams a user belongs to
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let teams = sqlx::query_as::<_, Team>(
            r#"
            SELECT t.id, t.name, t.description, t.created_by, t.created_at, t.updated_at
            FROM teams t
            JOIN team_members tm ON tm.team_id = t.id
            WHERE tm.user_id = $1
            ORDER BY t.name ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(teams)
    }

    /// Case-insensitive substring search over team names
    pub async fn search(pool: &PgPool, query: &str) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = format!("%{}%", query);

        let teams = sqlx::query_as::<_, Team>(
            r#"
            SELECT id, name, description, created_by, created_at, updated_at
            FROM teams
            WHERE name ILIKE $1
            ORDER BY name ASC
            "#,
        )
        .bind(pattern)
        .fetch_all(pool)
        .await?;

        Ok(teams)
    }
}

impl TeamMember {
    /// Adds a user to a team
    pub async fn create(
        pool: &PgPool,
        team_id: Uuid,
        user_id: Uuid,
        role: TeamRole,
    ) -> Result<Self, sqlx::Error> {
        let member = sqlx::query_as::<_, TeamMember>(
            r#"
            INSERT INTO team_members (team_id, user_id, role)
            VALUES ($1, $2, $3)
            RETURNING id, team_id, user_id, role, joined_at
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .bind(role)
        .fetch_one(pool)
        .await?;

        Ok(member)
    }

    /// Finds a specific membership
    pub async fn find(
        pool: &PgPool,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let member = sqlx::query_as::<_, TeamMember>(
            r#"
            SELECT id, team_id, user_id, role, joined_at
            FROM team_members
            WHERE team_id = $1 AND user_id = $2
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(member)
    }

    /// Gets a user's role in a team
    pub async fn get_role(
        pool: &PgPool,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<TeamRole>, sqlx::Error> {
        let role: Option<TeamRole> = sqlx::query_scalar(
            r#"
            SELECT role FROM team_members
            WHERE team_id = $1 AND user_id = $2
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(role)
    }

    /// Changes a member's role
    pub async fn update_role(
        pool: &PgPool,
        team_id: Uuid,
        user_id: Uuid,
        role: TeamRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        let member = sqlx::query_as::<_, TeamMember>(
            r#"
            UPDATE team_members
            SET role = $3
            WHERE team_id = $1 AND user_id = $2
            RETURNING id, team_id, user_id, role, joined_at
            "#,
        )
        .bind(team_id)
        .bind(user_id)
        .bind(role)
        .fetch_optional(pool)
        .await?;

        Ok(member)
    }

    /// Removes a user from a team
    pub async fn delete(pool: &PgPool, team_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM team_members WHERE team_id = $1 AND user_id = $2",
        )
        .bind(team_id)
        .bind(user_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every membership of a team
    pub async fn delete_by_team(pool: &PgPool, team_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM team_members WHERE team_id = $1")
            .bind(team_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Lists all members of a team
    pub async fn list_by_team(pool: &PgPool, team_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let members = sqlx::query_as::<_, TeamMember>(
            r#"
            SELECT id, team_id, user_id, role, joined_at
            FROM team_members
            WHERE team_id = $1
            ORDER BY joined_at ASC
            "#,
        )
        .bind(team_id)
        .fetch_all(pool)
        .await?;

        Ok(members)
    }

    /// Counts members holding OWNER in a team
    ///
    /// Drives the last-owner-removal guard in the team store.
    pub async fn count_owners(pool: &PgPool, team_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM team_members WHERE team_id = $1 AND role = 'owner'",
        )
        .bind(team_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }
}

impl ProjectTeam {
    /// Associates a team with a project
    pub async fn create(pool: &PgPool, project_id: Uuid, team_id: Uuid) -> Result<Self, sqlx::Error> {
        let association = sqlx::query_as::<_, ProjectTeam>(
            r#"
            INSERT INTO project_teams (project_id, team_id)
            VALUES ($1, $2)
            RETURNING id, project_id, team_id, added_at
            "#,
        )
        .bind(project_id)
        .bind(team_id)
        .fetch_one(pool)
        .await?;

        Ok(association)
    }

    /// Removes a team-project association
    pub async fn delete(pool: &PgPool, project_id: Uuid, team_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM project_teams WHERE project_id = $1 AND team_id = $2",
        )
        .bind(project_id)
        .bind(team_id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes every project association of a team
    pub async fn delete_by_team(pool: &PgPool, team_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_teams WHERE team_id = $1")
            .bind(team_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_role_as_str() {
        assert_eq!(TeamRole::Owner.as_str(), "owner");
        assert_eq!(TeamRole::Admin.as_str(), "admin");
        assert_eq!(TeamRole::Member.as_str(), "member");
    }

    #[test]
    fn test_team_role_can_manage() {
        assert!(TeamRole::Owner.can_manage());
        assert!(TeamRole::Admin.can_manage());
        assert!(!TeamRole::Member.can_manage());
    }
}
