//! User directory contract
//!
//! This module defines the abstract contract over the user/role row-store
//! and an in-memory implementation suitable for single-process use and
//! testing. The persistent backend itself is an external collaborator;
//! writes are last-write-wins at the store layer and this core adds no
//! locking of its own.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{EntitlementError, EntitlementResult};
use crate::roles::{PrimaryRole, RoleGrant};
use crate::tiers::SubscriptionTier;
use crate::user::UserRecord;

/// Field set written through the profile write path.
///
/// The backing row-store persists role and tier through a single write
/// path, so an update always carries both together with the subscription
/// window. Callers that only intend to change one of the two must supply
/// the current value of the other.
#[derive(Debug, Clone)]
pub struct UserUpdate {
    /// Primary role to write
    pub role: PrimaryRole,

    /// Subscription tier to write
    pub subscription_tier: SubscriptionTier,

    /// Start of the premium window
    pub subscription_start: Option<DateTime<Utc>>,

    /// End of the premium window
    pub subscription_end: Option<DateTime<Utc>>,
}

/// Abstract contract over the user/role store.
///
/// Implementations are expected to be cheap to clone behind an `Arc` and
/// shared across coordinators. All operations are request-bounded; there
/// are no persistent connections or background threads behind this trait.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Fetch a user record by id.
    ///
    /// # Errors
    ///
    /// `NotFound` if no user with this id exists.
    async fn get_user(&self, id: Uuid) -> EntitlementResult<UserRecord>;

    /// Write role, tier, and subscription window through the shared
    /// profile write path.
    ///
    /// # Errors
    ///
    /// `NotFound` if no user with this id exists; `Store` on backend
    /// failure.
    async fn update_user(&self, id: Uuid, update: UserUpdate) -> EntitlementResult<UserRecord>;

    /// Attach an additional role grant to a user.
    async fn grant_role(&self, user_id: Uuid, grant: RoleGrant) -> EntitlementResult<()>;

    /// Remove all grants of the named role from a user.
    ///
    /// # Errors
    ///
    /// `NotFound` if the user has no grant of that name (active or not).
    async fn revoke_role(&self, user_id: Uuid, role_name: &str) -> EntitlementResult<()>;

    /// List grants that are active at the given instant.
    async fn list_active_grants(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> EntitlementResult<Vec<RoleGrant>>;
}

#[cfg(feature = "memory")]
pub use memory::MemoryUserDirectory;

#[cfg(feature = "memory")]
mod memory {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory user directory.
    ///
    /// Suitable for single-process applications and testing. Supports
    /// per-user failure injection so coordinator error paths can be
    /// exercised deterministically.
    pub struct MemoryUserDirectory {
        users: Arc<RwLock<HashMap<Uuid, UserRecord>>>,
        failing: Arc<RwLock<HashSet<Uuid>>>,
    }

    impl std::fmt::Debug for MemoryUserDirectory {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("MemoryUserDirectory").finish()
        }
    }

    impl MemoryUserDirectory {
        /// Create an empty in-memory directory.
        pub fn new() -> Self {
            Self {
                users: Arc::new(RwLock::new(HashMap::new())),
                failing: Arc::new(RwLock::new(HashSet::new())),
            }
        }

        /// Insert or replace a user record.
        pub async fn insert(&self, user: UserRecord) {
            self.users.write().await.insert(user.id, user);
        }

        /// Make every subsequent operation touching this user fail with a
        /// `Store` error.
        pub async fn fail_for(&self, user_id: Uuid) {
            self.failing.write().await.insert(user_id);
        }

        async fn check_failure(&self, user_id: Uuid) -> EntitlementResult<()> {
            if self.failing.read().await.contains(&user_id) {
                return Err(EntitlementError::Store(format!(
                    "injected failure for user {user_id}"
                )));
            }
            Ok(())
        }
    }

    impl Default for MemoryUserDirectory {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl UserDirectory for MemoryUserDirectory {
        async fn get_user(&self, id: Uuid) -> EntitlementResult<UserRecord> {
            self.check_failure(id).await?;
            self.users
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| EntitlementError::NotFound(format!("user {id}")))
        }

        async fn update_user(&self, id: Uuid, update: UserUpdate) -> EntitlementResult<UserRecord> {
            self.check_failure(id).await?;
            let mut users = self.users.write().await;
            let user = users
                .get_mut(&id)
                .ok_or_else(|| EntitlementError::NotFound(format!("user {id}")))?;

            user.primary_role = update.role;
            user.subscription_tier = update.subscription_tier;
            user.subscription_start = update.subscription_start;
            user.subscription_end = update.subscription_end;
            user.updated_at = Utc::now();
            Ok(user.clone())
        }

        async fn grant_role(&self, user_id: Uuid, grant: RoleGrant) -> EntitlementResult<()> {
            self.check_failure(user_id).await?;
            let mut users = self.users.write().await;
            let user = users
                .get_mut(&user_id)
                .ok_or_else(|| EntitlementError::NotFound(format!("user {user_id}")))?;

            user.additional_roles.push(grant);
            user.updated_at = Utc::now();
            Ok(())
        }

        async fn revoke_role(&self, user_id: Uuid, role_name: &str) -> EntitlementResult<()> {
            self.check_failure(user_id).await?;
            let mut users = self.users.write().await;
            let user = users
                .get_mut(&user_id)
                .ok_or_else(|| EntitlementError::NotFound(format!("user {user_id}")))?;

            let before = user.additional_roles.len();
            user.additional_roles.retain(|g| g.role_name != role_name);
            if user.additional_roles.len() == before {
                return Err(EntitlementError::NotFound(format!(
                    "grant {role_name} on user {user_id}"
                )));
            }
            user.updated_at = Utc::now();
            Ok(())
        }

        async fn list_active_grants(
            &self,
            user_id: Uuid,
            now: DateTime<Utc>,
        ) -> EntitlementResult<Vec<RoleGrant>> {
            self.check_failure(user_id).await?;
            let users = self.users.read().await;
            let user = users
                .get(&user_id)
                .ok_or_else(|| EntitlementError::NotFound(format!("user {user_id}")))?;

            Ok(user
                .additional_roles
                .iter()
                .filter(|g| g.is_active(now))
                .cloned()
                .collect())
        }
    }
}
