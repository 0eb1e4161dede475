/// User directory with race-safe identity provisioning
///
/// The directory is the only writer of user records. Records are keyed by
/// the external identity subject the upstream verifier supplies; the first
/// request that carries an unknown subject provisions a record.
///
/// # Provisioning under races
///
/// Two layers keep concurrent first-sight requests from creating duplicate
/// records:
///
/// 1. An in-process map from subject to the in-flight provisioning future
///    (`futures::Shared`), so concurrent requests in one process converge
///    on a single insert. Entries are evicted when the future completes,
///    success or failure.
/// 2. A conditional insert guarded by the unique index on
///    `external_subject`, with a read-back on conflict. This is the layer
///    that holds across processes; the map is an optimization on top.
use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use sqlx::PgPool;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::models::user::{CreateUser, UpdateUser, User};

/// Verified identity supplied by the upstream token verifier
#[derive(Debug, Clone)]
pub struct VerifiedIdentity {
    /// Stable identifier issued by the identity provider
    pub subject: String,

    /// Claimed email address
    pub email: String,

    /// Claimed display name (falls back to the email)
    pub name: Option<String>,
}

impl VerifiedIdentity {
    fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.email.clone())
    }
}

type SharedProvision = Shared<BoxFuture<'static, Result<User, Arc<StoreError>>>>;

/// User directory service
///
/// Holds the pool and the in-flight provisioning map; one instance lives in
/// the application state for the process lifetime.
pub struct Directory {
    db: PgPool,
    in_flight: Mutex<HashMap<String, SharedProvision>>,
}

impl Directory {
    /// Creates a new directory service
    pub fn new(db: PgPool) -> Self {
        Directory {
            db,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Gets a user by internal ID
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no record exists.
    pub async fn get_by_id(&self, id: Uuid) -> StoreResult<User> {
        User::find_by_id(&self.db, id)
            .await?
            .ok_or(StoreError::NotFound("User"))
    }

    /// Gets a user by external identity subject
    ///
    /// Absence is not an error here; callers provision on miss.
    pub async fn get_by_subject(&self, subject: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_subject(&self.db, subject).await?)
    }

    /// Creates a user record, idempotently
    ///
    /// The insert is guarded by the unique subject index; losing the race
    /// re-resolves and returns the existing record instead of failing.
    pub async fn create(&self, data: CreateUser) -> StoreResult<User> {
        Self::provision(self.db.clone(), data).await
    }

    /// Updates a user's name and/or email
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no record exists.
    pub async fn update(&self, id: Uuid, data: UpdateUser) -> StoreResult<User> {
        User::update(&self.db, id, data)
            .await?
            .ok_or(StoreError::NotFound("User"))
    }

    /// Case-insensitive substring search over name and email
    pub async fn search(&self, query: &str) -> StoreResult<Vec<User>> {
        Ok(User::search(&self.db, query).await?)
    }

    /// Lists all users
    pub async fn list_all(&self) -> StoreResult<Vec<User>> {
        Ok(User::list_all(&self.db).await?)
    }

    /// Resolves a verified identity to a user record, provisioning on miss
    ///
    /// Concurrent calls for the same new subject share one provisioning
    /// future; the map entry is evicted once it completes either way.
    pub async fn get_or_create(&self, identity: VerifiedIdentity) -> StoreResult<User> {
        // Fast path: already provisioned.
        if let Some(user) = User::find_by_subject(&self.db, &identity.subject).await? {
            return Ok(user);
        }

        let subject = identity.subject.clone();

        let provision = {
            let mut in_flight = self.in_flight.lock().await;

            if let Some(existing) = in_flight.get(&subject) {
                debug!(subject = %subject, "Joining in-flight provisioning");
                existing.clone()
            } else {
                let db = self.db.clone();
                let data = CreateUser {
                    email: identity.email.clone(),
                    name: identity.display_name(),
                    external_subject: subject.clone(),
                };

                let future: SharedProvision = async move {
                    Self::provision(db, data).await.map_err(Arc::new)
                }
                .boxed()
                .shared();

                in_flight.insert(subject.clone(), future.clone());
                future
            }
        };

        let result = provision.await;

        // Evict on completion or failure so a failed attempt can be retried.
        self.in_flight.lock().await.remove(&subject);

        result.map_err(StoreError::Provision)
    }

    /// Conditional insert with read-back on conflict
    async fn provision(db: PgPool, data: CreateUser) -> StoreResult<User> {
        let subject = data.external_subject.clone();

        if let Some(user) = User::create_if_absent(&db, data).await? {
            info!(user_id = %user.id, subject = %subject, "Provisioned new user");
            return Ok(user);
        }

        // Lost the insert race; the winner's record must be visible now.
        User::find_by_subject(&db, &subject)
            .await?
            .ok_or_else(|| {
                StoreError::Conflict(format!(
                    "User record for subject {} conflicted but could not be re-resolved",
                    subject
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_email() {
        let identity = VerifiedIdentity {
            subject: "sub-1".to_string(),
            email: "user@example.com".to_string(),
            name: None,
        };
        assert_eq!(identity.display_name(), "user@example.com");

        let named = VerifiedIdentity {
            name: Some("Jo Doe".to_string()),
            ..identity
        };
        assert_eq!(named.display_name(), "Jo Doe");
    }

    // Concurrent provisioning against a live database is covered in tests/.
}
