//! Bulk administrative operations
//!
//! The admin console can apply one operation to many selected users.
//! Processing is strictly sequential with per-item isolation: each user's
//! success or failure is recorded independently, one failure never aborts
//! the batch, and there is no cross-item transaction or rollback. The
//! outcome is an accumulator of two lists with a derived tally, not an
//! exception.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::cell_update::{CellUpdate, CellUpdateCoordinator, UpdateContext};
use crate::error::{EntitlementError, EntitlementResult};
use crate::roles::ADMIN_ROLE;
use crate::store::UserDirectory;
use crate::tiers::SubscriptionTier;

/// Operation applied to every user in a bulk call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum BulkOperation {
    /// Grant the admin additional role
    GrantAdmin,

    /// Revoke the admin additional role
    RemoveAdmin,

    /// Replace the subscription tier
    UpdateSubscriptionTier {
        /// New subscription tier
        tier: SubscriptionTier,
    },
}

impl BulkOperation {
    /// Get string representation of the operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GrantAdmin => "grant_admin",
            Self::RemoveAdmin => "remove_admin",
            Self::UpdateSubscriptionTier { .. } => "update_subscription_tier",
        }
    }
}

/// One user's failure within a bulk call.
///
/// Carries enough detail for the caller to retry exactly the failed
/// subset: the user id, the error message, its code, and whether retrying
/// can help at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkFailure {
    /// User the operation failed for
    pub user_id: Uuid,

    /// Error message
    pub error: String,

    /// Stable error code
    pub code: String,

    /// Whether the failure is safe to retry
    pub retryable: bool,
}

impl BulkFailure {
    fn from_error(user_id: Uuid, error: &EntitlementError) -> Self {
        Self {
            user_id,
            error: error.to_string(),
            code: error.error_code().to_string(),
            retryable: error.is_retryable(),
        }
    }
}

/// Outcome of a bulk call.
///
/// The tally is always derived from the two lists via [`summary`], never
/// stored separately, so `total == successful.len() + failed.len()` holds
/// by construction.
///
/// [`summary`]: BulkOperationResult::summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkOperationResult {
    /// Users the operation applied to
    pub successful: Vec<Uuid>,

    /// Users the operation failed for, in input order
    pub failed: Vec<BulkFailure>,
}

impl BulkOperationResult {
    /// Derive the tally from the two lists.
    pub fn summary(&self) -> BulkSummary {
        BulkSummary {
            total: self.successful.len() + self.failed.len(),
            successful: self.successful.len(),
            failed: self.failed.len(),
        }
    }

    /// Ids of the failed subset, for targeted retry.
    pub fn failed_ids(&self) -> Vec<Uuid> {
        self.failed.iter().map(|f| f.user_id).collect()
    }
}

/// Derived tally of a bulk call.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkSummary {
    /// Items processed
    pub total: usize,

    /// Items applied
    pub successful: usize,

    /// Items failed
    pub failed: usize,
}

/// Pacing configuration for bulk processing.
///
/// An inter-item pause keeps a large batch from overwhelming the backing
/// store. It is not semantically required; the default applies none.
#[derive(Debug, Clone, Default)]
pub struct BulkConfig {
    /// Pause between consecutive items (skipped after the last one)
    pub inter_item_delay: Option<Duration>,
}

impl BulkConfig {
    /// Configuration with no inter-item pause.
    pub fn unpaced() -> Self {
        Self::default()
    }

    /// Configuration with a short pause between items.
    pub fn paced() -> Self {
        Self {
            inter_item_delay: Some(Duration::from_millis(50)),
        }
    }
}

/// Applies one operation to many users sequentially.
///
/// Cancellation follows future-drop semantics: each store call completes
/// before the next item starts, so dropping the in-flight call between
/// items stops issuing further per-item calls while items already applied
/// remain applied.
pub struct BulkOperationCoordinator {
    directory: Arc<dyn UserDirectory>,
    cells: CellUpdateCoordinator,
    config: BulkConfig,
}

impl BulkOperationCoordinator {
    /// Create a coordinator over the given directory with default pacing.
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        let cells = CellUpdateCoordinator::new(directory.clone());
        Self {
            directory,
            cells,
            config: BulkConfig::default(),
        }
    }

    /// Replace the pacing configuration.
    pub fn with_config(mut self, config: BulkConfig) -> Self {
        self.config = config;
        self
    }

    /// Apply one operation to every listed user.
    ///
    /// Users are processed in input order. A per-user failure is recorded
    /// and processing continues; already-applied changes are never rolled
    /// back.
    ///
    /// # Arguments
    ///
    /// * `user_ids` - Users to process, in order
    /// * `operation` - The operation to apply to each
    /// * `ctx` - Admin identity context
    ///
    /// # Errors
    ///
    /// `Validation` if `user_ids` is empty — the only whole-call error;
    /// it is returned before any store call is made.
    #[instrument(
        skip(self, user_ids, operation, ctx),
        fields(operation = operation.as_str(), users = user_ids.len())
    )]
    pub async fn apply_bulk(
        &self,
        user_ids: &[Uuid],
        operation: BulkOperation,
        ctx: &UpdateContext,
    ) -> EntitlementResult<BulkOperationResult> {
        if user_ids.is_empty() {
            return Err(EntitlementError::Validation(
                "bulk operation requires at least one user id".into(),
            ));
        }

        let mut result = BulkOperationResult::default();

        for (index, &user_id) in user_ids.iter().enumerate() {
            match self.apply_one(user_id, &operation, ctx).await {
                Ok(()) => result.successful.push(user_id),
                Err(error) => {
                    warn!(
                        user_id = %user_id,
                        code = error.error_code(),
                        error = %error,
                        "Bulk item failed"
                    );
                    result.failed.push(BulkFailure::from_error(user_id, &error));
                }
            }

            if index + 1 < user_ids.len() {
                if let Some(delay) = self.config.inter_item_delay {
                    tokio::time::sleep(delay).await;
                }
            }
        }

        let summary = result.summary();
        info!(
            total = summary.total,
            successful = summary.successful,
            failed = summary.failed,
            "Bulk operation completed"
        );
        Ok(result)
    }

    async fn apply_one(
        &self,
        user_id: Uuid,
        operation: &BulkOperation,
        ctx: &UpdateContext,
    ) -> EntitlementResult<()> {
        match operation {
            BulkOperation::GrantAdmin => {
                self.cells
                    .apply(
                        user_id,
                        CellUpdate::GrantRole {
                            role_name: ADMIN_ROLE.into(),
                            expires_at: None,
                        },
                        ctx,
                    )
                    .await?;
            }
            BulkOperation::RemoveAdmin => {
                self.cells
                    .apply(
                        user_id,
                        CellUpdate::RevokeRole {
                            role_name: ADMIN_ROLE.into(),
                        },
                        ctx,
                    )
                    .await?;
            }
            BulkOperation::UpdateSubscriptionTier { tier } => {
                // The tier cell shares its write path with the role, so
                // read each user first and carry their current role through.
                let user = self.directory.get_user(user_id).await?;
                let ctx = ctx.clone().with_current_role(user.primary_role);
                self.cells
                    .apply(
                        user_id,
                        CellUpdate::SubscriptionTier {
                            tier: *tier,
                            subscription_end: None,
                        },
                        &ctx,
                    )
                    .await?;
            }
        }
        Ok(())
    }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use crate::resolver::EntitlementResolver;
    use crate::roles::PrimaryRole;
    use crate::store::MemoryUserDirectory;
    use crate::user::UserRecord;
    use chrono::Utc;

    async fn seed_users(directory: &MemoryUserDirectory, count: usize) -> Vec<Uuid> {
        let mut ids = Vec::new();
        for i in 0..count {
            let user = UserRecord::new(format!("user{i}@example.com"), PrimaryRole::Practitioner);
            ids.push(user.id);
            directory.insert(user).await;
        }
        ids
    }

    fn ctx() -> UpdateContext {
        UpdateContext::new(Uuid::now_v7())
    }

    #[tokio::test]
    async fn test_empty_id_list_rejected_whole_call() {
        let directory = Arc::new(MemoryUserDirectory::new());
        let coordinator = BulkOperationCoordinator::new(directory);

        let err = coordinator
            .apply_bulk(&[], BulkOperation::GrantAdmin, &ctx())
            .await
            .unwrap_err();
        assert!(matches!(err, EntitlementError::Validation(_)));
    }

    #[tokio::test]
    async fn test_single_item_summary() {
        let directory = Arc::new(MemoryUserDirectory::new());
        let ids = seed_users(&directory, 1).await;
        let coordinator = BulkOperationCoordinator::new(directory);

        let result = coordinator
            .apply_bulk(&ids, BulkOperation::GrantAdmin, &ctx())
            .await
            .unwrap();

        let summary = result.summary();
        assert_eq!(summary.total, 1);
        assert_eq!(summary.successful, 1);
        assert_eq!(summary.failed, 0);
        assert_eq!(
            summary.total,
            result.successful.len() + result.failed.len()
        );
    }

    #[tokio::test]
    async fn test_partial_failure_isolated() {
        let directory = Arc::new(MemoryUserDirectory::new());
        let ids = seed_users(&directory, 3).await;
        directory.fail_for(ids[1]).await;
        let coordinator = BulkOperationCoordinator::new(directory.clone());

        let result = coordinator
            .apply_bulk(&ids, BulkOperation::GrantAdmin, &ctx())
            .await
            .unwrap();

        let summary = result.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(result.failed[0].user_id, ids[1]);
        assert!(result.failed[0].retryable);

        // The users around the failed one were applied and stay applied
        let now = Utc::now();
        for &id in [ids[0], ids[2]].iter() {
            let user = directory.get_user(id).await.unwrap();
            assert_eq!(
                EntitlementResolver::resolve(&user, now).role,
                PrimaryRole::Admin
            );
        }
    }

    #[tokio::test]
    async fn test_remove_admin_without_grant_fails_per_item() {
        let directory = Arc::new(MemoryUserDirectory::new());
        let ids = seed_users(&directory, 2).await;
        let coordinator = BulkOperationCoordinator::new(directory.clone());

        // Only the first user holds the grant
        coordinator
            .apply_bulk(&ids[..1], BulkOperation::GrantAdmin, &ctx())
            .await
            .unwrap();

        let result = coordinator
            .apply_bulk(&ids, BulkOperation::RemoveAdmin, &ctx())
            .await
            .unwrap();

        assert_eq!(result.successful, vec![ids[0]]);
        assert_eq!(result.failed.len(), 1);
        assert_eq!(result.failed[0].code, "NOT_FOUND");
        assert!(!result.failed[0].retryable);
        assert_eq!(result.failed_ids(), vec![ids[1]]);
    }

    #[tokio::test]
    async fn test_tier_update_carries_each_users_role() {
        let directory = Arc::new(MemoryUserDirectory::new());
        let ids = seed_users(&directory, 2).await;

        // Make the second user an admin; the bulk tier change must not
        // downgrade them through the shared write path
        let mut admin = directory.get_user(ids[1]).await.unwrap();
        admin.primary_role = PrimaryRole::Admin;
        directory.insert(admin).await;

        let coordinator = BulkOperationCoordinator::new(directory.clone());
        let result = coordinator
            .apply_bulk(
                &ids,
                BulkOperation::UpdateSubscriptionTier {
                    tier: SubscriptionTier::Premium,
                },
                &ctx(),
            )
            .await
            .unwrap();

        assert_eq!(result.summary().failed, 0);
        let user = directory.get_user(ids[1]).await.unwrap();
        assert_eq!(user.primary_role, PrimaryRole::Admin);
        assert_eq!(user.subscription_tier, SubscriptionTier::Premium);
    }

    #[tokio::test]
    async fn test_paced_batch_completes() {
        let directory = Arc::new(MemoryUserDirectory::new());
        let ids = seed_users(&directory, 3).await;
        let coordinator =
            BulkOperationCoordinator::new(directory).with_config(BulkConfig::paced());

        let result = coordinator
            .apply_bulk(&ids, BulkOperation::GrantAdmin, &ctx())
            .await
            .unwrap();
        assert_eq!(result.summary().successful, 3);
    }
}
