//! Single-cell administrative edits
//!
//! The admin console edits one user attribute at a time: the primary
//! role, the subscription tier, or an additional role grant. Each edit
//! maps to exactly one mutation against the user directory, so a failed
//! edit never leaves a user half-updated.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::error::{EntitlementError, EntitlementResult};
use crate::resolver::{EffectiveEntitlement, EntitlementResolver};
use crate::roles::{PrimaryRole, RoleGrant};
use crate::store::{UserDirectory, UserUpdate};
use crate::tiers::SubscriptionTier;

/// A single administrative edit to one user attribute.
///
/// The serialized form carries a `data_source` tag naming the edited
/// attribute, matching the admin console's cell identifiers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "data_source", rename_all = "snake_case")]
pub enum CellUpdate {
    /// Replace the primary role.
    ///
    /// Setting a non-admin primary role does NOT revoke additional admin
    /// grants; revocation is an explicit separate action.
    PrimaryRole {
        /// New primary role
        role: PrimaryRole,
    },

    /// Replace the subscription tier.
    SubscriptionTier {
        /// New subscription tier
        tier: SubscriptionTier,

        /// New end of the premium window (None = keep the current one)
        #[serde(skip_serializing_if = "Option::is_none")]
        subscription_end: Option<DateTime<Utc>>,
    },

    /// Attach an additional role grant.
    #[serde(rename = "additional_role_grant")]
    GrantRole {
        /// Name of the role to grant
        role_name: String,

        /// When the grant stops being active (None = no expiry)
        #[serde(skip_serializing_if = "Option::is_none")]
        expires_at: Option<DateTime<Utc>>,
    },

    /// Revoke an additional role grant.
    #[serde(rename = "additional_role_revoke")]
    RevokeRole {
        /// Name of the role to revoke
        role_name: String,
    },
}

/// Context accompanying a cell update.
#[derive(Debug, Clone)]
pub struct UpdateContext {
    /// Admin performing the edit
    pub acted_by: Uuid,

    /// The user's current primary role as shown in the console.
    ///
    /// Required for tier edits: the directory writes role and tier
    /// through one shared path, so a tier edit that did not carry the
    /// current role would silently downgrade it.
    pub current_role: Option<PrimaryRole>,
}

impl UpdateContext {
    /// Create a context for the given admin.
    pub fn new(acted_by: Uuid) -> Self {
        Self {
            acted_by,
            current_role: None,
        }
    }

    /// Attach the user's current primary role.
    pub fn with_current_role(mut self, role: PrimaryRole) -> Self {
        self.current_role = Some(role);
        self
    }
}

/// Applies a single administrative edit to one user.
///
/// Every successful edit returns the freshly resolved entitlement so
/// consumers holding a cached effective view can recompute immediately,
/// and re-checks the claims mirror so divergence is reported at the edit
/// that produced it.
pub struct CellUpdateCoordinator {
    directory: Arc<dyn UserDirectory>,
}

impl CellUpdateCoordinator {
    /// Create a coordinator over the given directory.
    pub fn new(directory: Arc<dyn UserDirectory>) -> Self {
        Self { directory }
    }

    /// Apply one edit to one user.
    ///
    /// The edit either fully applies or fails without touching the user.
    ///
    /// # Arguments
    ///
    /// * `user_id` - The user being edited
    /// * `update` - The attribute edit to apply
    /// * `ctx` - Admin identity and console context
    ///
    /// # Errors
    ///
    /// `Validation` for bad input (past grant expiry, tier edit without
    /// the current role), `NotFound` for unknown users or missing active
    /// grants, `Store` for directory failures, surfaced unchanged.
    #[instrument(skip(self, update, ctx), fields(user_id = %user_id))]
    pub async fn apply(
        &self,
        user_id: Uuid,
        update: CellUpdate,
        ctx: &UpdateContext,
    ) -> EntitlementResult<EffectiveEntitlement> {
        let now = Utc::now();

        match update {
            CellUpdate::PrimaryRole { role } => {
                let user = self.directory.get_user(user_id).await?;
                // Demotion leaves additional admin grants in place.
                self.directory
                    .update_user(
                        user_id,
                        UserUpdate {
                            role,
                            subscription_tier: user.subscription_tier,
                            subscription_start: user.subscription_start,
                            subscription_end: user.subscription_end,
                        },
                    )
                    .await?;
                debug!(role = role.as_str(), "Primary role updated");
            }

            CellUpdate::SubscriptionTier {
                tier,
                subscription_end,
            } => {
                let current_role = ctx.current_role.ok_or_else(|| {
                    EntitlementError::Validation(
                        "subscription tier update requires the current role".into(),
                    )
                })?;
                let user = self.directory.get_user(user_id).await?;
                let subscription_start = if tier.is_paid() {
                    user.subscription_start.or(Some(now))
                } else {
                    user.subscription_start
                };
                self.directory
                    .update_user(
                        user_id,
                        UserUpdate {
                            role: current_role,
                            subscription_tier: tier,
                            subscription_start,
                            subscription_end: subscription_end.or(user.subscription_end),
                        },
                    )
                    .await?;
                debug!(tier = tier.as_str(), "Subscription tier updated");
            }

            CellUpdate::GrantRole {
                role_name,
                expires_at,
            } => {
                if role_name.trim().is_empty() {
                    return Err(EntitlementError::Validation("role name is required".into()));
                }
                if let Some(expires_at) = expires_at {
                    if expires_at <= now {
                        return Err(EntitlementError::Validation(format!(
                            "grant expiry {expires_at} is in the past"
                        )));
                    }
                }
                let mut grant = RoleGrant::new(role_name.clone(), ctx.acted_by);
                if let Some(expires_at) = expires_at {
                    grant = grant.with_expiry(expires_at);
                }
                self.directory.grant_role(user_id, grant).await?;
                debug!(role_name = %role_name, "Additional role granted");
            }

            CellUpdate::RevokeRole { role_name } => {
                let active = self.directory.list_active_grants(user_id, now).await?;
                if !active.iter().any(|g| g.role_name == role_name) {
                    return Err(EntitlementError::NotFound(format!(
                        "no active grant {role_name} on user {user_id}"
                    )));
                }
                self.directory.revoke_role(user_id, &role_name).await?;
                debug!(role_name = %role_name, "Additional role revoked");
            }
        }

        let user = self.directory.get_user(user_id).await?;
        // Reported only; divergence never blocks the edit that exposed it.
        EntitlementResolver::check_claims_mirror(&user, now);
        Ok(EntitlementResolver::resolve(&user, now))
    }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use crate::roles::ADMIN_ROLE;
    use crate::store::MemoryUserDirectory;
    use crate::user::UserRecord;
    use chrono::Duration;

    async fn setup() -> (Arc<MemoryUserDirectory>, CellUpdateCoordinator, Uuid) {
        let directory = Arc::new(MemoryUserDirectory::new());
        let user = UserRecord::new("jo@example.com", PrimaryRole::Practitioner);
        let id = user.id;
        directory.insert(user).await;
        let coordinator = CellUpdateCoordinator::new(directory.clone());
        (directory, coordinator, id)
    }

    fn admin_ctx() -> UpdateContext {
        UpdateContext::new(Uuid::now_v7())
    }

    #[tokio::test]
    async fn test_primary_role_update() {
        let (_, coordinator, id) = setup().await;

        let entitlement = coordinator
            .apply(
                id,
                CellUpdate::PrimaryRole {
                    role: PrimaryRole::Admin,
                },
                &admin_ctx(),
            )
            .await
            .unwrap();

        assert_eq!(entitlement.role, PrimaryRole::Admin);
    }

    #[tokio::test]
    async fn test_demotion_keeps_admin_grant() {
        let (directory, coordinator, id) = setup().await;
        let ctx = admin_ctx();

        coordinator
            .apply(
                id,
                CellUpdate::GrantRole {
                    role_name: ADMIN_ROLE.into(),
                    expires_at: None,
                },
                &ctx,
            )
            .await
            .unwrap();

        // Demoting the primary role must not touch the grant, so the
        // effective role stays admin until the grant is revoked.
        let entitlement = coordinator
            .apply(
                id,
                CellUpdate::PrimaryRole {
                    role: PrimaryRole::Practitioner,
                },
                &ctx,
            )
            .await
            .unwrap();

        assert_eq!(entitlement.role, PrimaryRole::Admin);
        let user = directory.get_user(id).await.unwrap();
        assert_eq!(user.primary_role, PrimaryRole::Practitioner);
        assert_eq!(user.additional_roles.len(), 1);
    }

    #[tokio::test]
    async fn test_tier_update_requires_current_role() {
        let (_, coordinator, id) = setup().await;

        let err = coordinator
            .apply(
                id,
                CellUpdate::SubscriptionTier {
                    tier: SubscriptionTier::Premium,
                    subscription_end: None,
                },
                &admin_ctx(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, EntitlementError::Validation(_)));
    }

    #[tokio::test]
    async fn test_tier_update_preserves_role() {
        let (directory, coordinator, id) = setup().await;
        let ctx = admin_ctx().with_current_role(PrimaryRole::Practitioner);

        let entitlement = coordinator
            .apply(
                id,
                CellUpdate::SubscriptionTier {
                    tier: SubscriptionTier::Premium,
                    subscription_end: Some(Utc::now() + Duration::days(30)),
                },
                &ctx,
            )
            .await
            .unwrap();

        assert_eq!(entitlement.tier, SubscriptionTier::Premium);
        let user = directory.get_user(id).await.unwrap();
        assert_eq!(user.primary_role, PrimaryRole::Practitioner);
        assert!(user.subscription_start.is_some());
    }

    #[tokio::test]
    async fn test_grant_with_past_expiry_rejected() {
        let (_, coordinator, id) = setup().await;

        let err = coordinator
            .apply(
                id,
                CellUpdate::GrantRole {
                    role_name: "moderator".into(),
                    expires_at: Some(Utc::now() - Duration::days(1)),
                },
                &admin_ctx(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, EntitlementError::Validation(_)));
    }

    #[tokio::test]
    async fn test_revoke_without_active_grant_is_not_found() {
        let (directory, coordinator, id) = setup().await;

        // No grant at all
        let err = coordinator
            .apply(
                id,
                CellUpdate::RevokeRole {
                    role_name: "moderator".into(),
                },
                &admin_ctx(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EntitlementError::NotFound(_)));

        // An expired grant is present but not active, so revoking it
        // through the console is still a not-found
        let mut user = directory.get_user(id).await.unwrap();
        user.additional_roles.push(
            RoleGrant::new("moderator", Uuid::now_v7()).with_expiry(Utc::now() - Duration::days(1)),
        );
        directory.insert(user).await;

        let err = coordinator
            .apply(
                id,
                CellUpdate::RevokeRole {
                    role_name: "moderator".into(),
                },
                &admin_ctx(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EntitlementError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_grant_and_revoke_round_trip() {
        let (_, coordinator, id) = setup().await;
        let ctx = admin_ctx();

        let entitlement = coordinator
            .apply(
                id,
                CellUpdate::GrantRole {
                    role_name: "moderator".into(),
                    expires_at: None,
                },
                &ctx,
            )
            .await
            .unwrap();
        assert_eq!(entitlement.active_additional_roles.len(), 1);

        let entitlement = coordinator
            .apply(
                id,
                CellUpdate::RevokeRole {
                    role_name: "moderator".into(),
                },
                &ctx,
            )
            .await
            .unwrap();
        assert!(entitlement.active_additional_roles.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_user_is_not_found() {
        let (_, coordinator, _) = setup().await;

        let err = coordinator
            .apply(
                Uuid::now_v7(),
                CellUpdate::PrimaryRole {
                    role: PrimaryRole::Admin,
                },
                &admin_ctx(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, EntitlementError::NotFound(_)));
    }
}
