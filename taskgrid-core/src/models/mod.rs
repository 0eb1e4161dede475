/// Database models for taskgrid
///
/// This module contains all database models and their low-level CRUD
/// operations. Access control and multi-step workflows live one layer up
/// in `stores`; nothing here checks who is asking.
///
/// # Models
///
/// - `user`: directory records keyed by external identity subject
/// - `project`: projects with owner and lifecycle status
/// - `membership`: per-project membership roles
/// - `task`: tasks with schedule, estimate, and dependency list
/// - `team`: teams, team memberships, and team-project associations
/// - `comment`: threaded task comments
/// - `workload`: per-user/day allocation entries and aggregations
pub mod comment;
pub mod membership;
pub mod project;
pub mod task;
pub mod team;
pub mod user;
pub mod workload;
