/// User model and database operations
///
/// Users are provisioned from a verified identity-provider subject; the
/// internal `id` is generated here and never leaves the system boundary as
/// an identity. One row per external subject, enforced by a unique index
/// and a conditional insert (see [`User::create_if_absent`]).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email CITEXT NOT NULL,
///     name VARCHAR(255) NOT NULL,
///     external_subject VARCHAR(255) NOT NULL UNIQUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User model representing one directory record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address claimed by the identity provider (case-insensitive via CITEXT)
    pub email: String,

    /// Display name
    pub name: String,

    /// Stable identifier issued by the identity provider
    ///
    /// Distinct from the internal id; unique across all users.
    pub external_subject: String,

    /// When the user record was created
    pub created_at: DateTime<Utc>,

    /// When the user record was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address claimed by the identity provider
    pub email: String,

    /// Display name (falls back to the email at the caller when absent)
    pub name: String,

    /// Verified external identity subject
    pub external_subject: String,
}

/// Input for updating an existing user
///
/// Only non-None fields are updated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New display name
    pub name: Option<String>,

    /// New email address
    pub email: Option<String>,
}

impl User {
    /// Inserts a user record unless one already exists for the subject
    ///
    /// This is the race-safe half of idempotent provisioning: the insert is
    /// guarded by the unique index on `external_subject`, and a conflict
    /// returns `None` so the caller can re-resolve the existing record
    /// instead of failing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create_if_absent(pool: &PgPool, data: CreateUser) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, external_subject)
            VALUES ($1, $2, $3)
            ON CONFLICT (external_subject) DO NOTHING
            RETURNING id, email, name, external_subject, created_at, updated_at
            "#,
        )
        .bind(data.email)
        .bind(data.name)
        .bind(data.external_subject)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by internal ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, external_subject, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by external identity subject
    ///
    /// Absence is an expected outcome here (the caller provisions on miss),
    /// so this returns `None` rather than an error.
    pub async fn find_by_subject(pool: &PgPool, subject: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, external_subject, created_at, updated_at
            FROM users
            WHERE external_subject = $1
            "#,
        )
        .bind(subject)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Updates name and/or email
    ///
    /// Fields left as `None` are untouched.
    pub async fn update(pool: &PgPool, id: Uuid, data: UpdateUser) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, name, external_subject, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Case-insensitive substring search over name and email
    pub async fn search(pool: &PgPool, query: &str) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = format!("%{}%", query);

        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, external_subject, created_at, updated_at
            FROM users
            WHERE name ILIKE $1 OR email ILIKE $1
            ORDER BY name ASC
            "#,
        )
        .bind(pattern)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Lists all users ordered by name
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, external_subject, created_at, updated_at
            FROM users
            ORDER BY name ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }
}
