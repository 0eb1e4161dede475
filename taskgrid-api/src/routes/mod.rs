/// API route handlers
///
/// One module per resource:
///
/// - `health`: Health check endpoint
/// - `users`: Directory lookup, search, self profile
/// - `projects`: Project CRUD and membership
/// - `tasks`: Task CRUD, assignment, scheduling
/// - `comments`: Task comments
/// - `teams`: Teams, memberships, project associations
/// - `workload`: Summaries, capacity, allocation, timeline
use serde::{Deserialize, Deserializer};

pub mod comments;
pub mod health;
pub mod projects;
pub mod tasks;
pub mod teams;
pub mod users;
pub mod workload;

/// Distinguishes an absent JSON field from an explicit null
///
/// With `#[serde(default, deserialize_with = "double_option")]`, a missing
/// field deserializes to `None` (leave untouched) and `null` to
/// `Some(None)` (clear the column), the patch semantics the stores expect.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}
