//! # taskgrid Core Library
//!
//! Shared models, stores, and the workload engine behind the taskgrid API
//! server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and low-level CRUD
//! - `stores`: Access-checked store operations
//! - `access`: Project/team visibility and role checks
//! - `directory`: User directory with race-safe provisioning
//! - `workload`: Allocation engine, capacity math, timeline validation
//! - `db`: Connection pool and migrations
//! - `error`: Common error taxonomy

pub mod access;
pub mod db;
pub mod directory;
pub mod error;
pub mod models;
pub mod stores;
pub mod workload;

/// Current version of the taskgrid core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
