/// Store layer: access-checked operations over the models
///
/// Stores own the business rules the models deliberately don't: access
/// control, role requirements, best-effort multi-step sequences, and
/// display enrichment. Every project-scoped operation takes the requester's
/// user id as its final parameter.
pub mod comments;
pub mod projects;
pub mod tasks;
pub mod teams;
