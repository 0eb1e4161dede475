/// Core error taxonomy shared by every store and the workload engine
///
/// Store operations return `Result<T, StoreError>`. The API layer maps each
/// variant to an HTTP status code; inside the core the variants carry the
/// distinction that matters for callers:
///
/// - `NotFound`: the entity does not exist
/// - `AccessDenied`: the requester cannot see the project/task/team at all
/// - `PermissionDenied`: visible, but the requester's role is insufficient
///   (non-owner project delete, non-author comment edit, non-admin team ops)
/// - `Validation`: malformed input that slipped past the route layer
/// - `Conflict`: a uniqueness race; identity-creation conflicts are recovered
///   internally and never reach callers
/// - `Database`: upstream store failure, propagated as-is
use std::sync::Arc;

/// Result alias used across the core crate
pub type StoreResult<T> = Result<T, StoreError>;

/// Unified error type for core store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Entity absent ("Project", "Task", ...)
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Requester has no visibility of the containing project/task/team
    #[error("{0}")]
    AccessDenied(String),

    /// Requester is visible but lacks the required role
    #[error("{0}")]
    PermissionDenied(String),

    /// Malformed or missing required input
    #[error("{0}")]
    Validation(String),

    /// Uniqueness race lost; recovered internally where possible
    #[error("{0}")]
    Conflict(String),

    /// Identity provisioning failed behind the shared in-flight future
    #[error("identity provisioning failed: {0}")]
    Provision(Arc<StoreError>),

    /// Data-store failure, propagated to the caller
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Standard access-denied error for project-scoped operations
    pub fn project_access_denied() -> Self {
        StoreError::AccessDenied("You do not have access to this project".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = StoreError::NotFound("Project");
        assert_eq!(err.to_string(), "Project not found");
    }

    #[test]
    fn test_access_denied_display() {
        let err = StoreError::project_access_denied();
        assert_eq!(err.to_string(), "You do not have access to this project");
    }

    #[test]
    fn test_provision_wraps_inner() {
        let inner = Arc::new(StoreError::NotFound("User"));
        let err = StoreError::Provision(inner);
        assert!(err.to_string().contains("User not found"));
    }
}
