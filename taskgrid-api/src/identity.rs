/// Identity resolution middleware
///
/// Token verification happens upstream (API gateway / identity provider
/// integration); by the time a request reaches this server, the verified
/// subject and the claimed email/name arrive as headers:
///
/// - `X-Identity-Subject` (required)
/// - `X-Identity-Email` (required)
/// - `X-Identity-Name` (optional)
///
/// The middleware resolves the subject to a directory record (provisioning
/// one on first sight) and injects a [`RequesterContext`] into request
/// extensions for handlers to extract.
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::error::ApiError;
use taskgrid_core::directory::VerifiedIdentity;
use taskgrid_core::models::user::User;

/// The resolved directory identity of the current request
#[derive(Debug, Clone)]
pub struct RequesterContext {
    /// Directory record of the caller
    pub user: User,
}

fn header<'a>(req: &'a Request, name: &str) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Resolves identity headers into a `RequesterContext`
///
/// # Errors
///
/// - 401 when the subject or email header is missing
/// - 500 when directory provisioning fails
pub async fn identity_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let subject = header(&req, "x-identity-subject")
        .ok_or_else(|| ApiError::Unauthorized("Missing identity subject".to_string()))?
        .to_string();

    let email = header(&req, "x-identity-email")
        .ok_or_else(|| ApiError::Unauthorized("Missing identity email".to_string()))?
        .to_string();

    let name = header(&req, "x-identity-name").map(|v| v.to_string());

    let user = state
        .directory
        .get_or_create(VerifiedIdentity {
            subject,
            email,
            name,
        })
        .await?;

    req.extensions_mut().insert(RequesterContext { user });

    Ok(next.run(req).await)
}
