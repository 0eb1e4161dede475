/// User directory endpoints
///
/// # Endpoints
///
/// - `GET /v1/users` - List all users
/// - `GET /v1/users/search?q=` - Substring search over name and email
/// - `GET /v1/users/me` - The caller's own record
/// - `PUT /v1/users/me` - Update the caller's name/email
/// - `GET /v1/users/:id` - Lookup by internal id
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use crate::identity::RequesterContext;
use taskgrid_core::models::user::{UpdateUser, User};

/// User representation exposed over the API
///
/// The external identity subject stays internal.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    /// Internal user id
    pub id: Uuid,

    /// Email address
    pub email: String,

    /// Display name
    pub name: String,

    /// When the record was created
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: user.created_at,
        }
    }
}

/// Search query parameters
#[derive(Debug, Deserialize, Validate)]
pub struct SearchQuery {
    /// Substring to match against name and email
    #[validate(length(min = 1, max = 255, message = "Query must be 1-255 characters"))]
    pub q: String,
}

/// Update-self request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateMeRequest {
    /// New display name
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    /// New email address
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

/// Lists all users
pub async fn list_users(
    State(state): State<AppState>,
    Extension(_ctx): Extension<RequesterContext>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state.directory.list_all().await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Searches users by name or email substring
pub async fn search_users(
    State(state): State<AppState>,
    Extension(_ctx): Extension<RequesterContext>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    query.validate().map_err(ApiError::from)?;

    let users = state.directory.search(&query.q).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Returns the caller's own record
pub async fn get_me(
    Extension(ctx): Extension<RequesterContext>,
) -> ApiResult<Json<UserResponse>> {
    Ok(Json(UserResponse::from(ctx.user)))
}

/// Updates the caller's name and/or email
pub async fn update_me(
    State(state): State<AppState>,
    Extension(ctx): Extension<RequesterContext>,
    Json(req): Json<UpdateMeRequest>,
) -> ApiResult<Json<UserResponse>> {
    req.validate().map_err(ApiError::from)?;

    let user = state
        .directory
        .update(
            ctx.user.id,
            UpdateUser {
                name: req.name,
                email: req.email,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(user)))
}

/// Looks up a user by internal id
pub async fn get_user(
    State(state): State<AppState>,
    Extension(_ctx): Extension<RequesterContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.directory.get_by_id(id).await?;

    Ok(Json(UserResponse::from(user)))
}
