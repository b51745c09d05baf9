//! Effective entitlement resolution
//!
//! A user's entitlement is written through several independently-mutable
//! sources: the primary role field, the subscription tier and window, and
//! the additional role grants. This module is the single authoritative
//! computation over those explicit inputs. The claims mirror carried in
//! session tokens is deliberately *not* an input; it is compared against
//! the resolved result and any divergence is reported, never acted on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::roles::{PrimaryRole, RoleGrant};
use crate::tiers::{AccessLevel, SubscriptionTier};
use crate::user::UserRecord;

/// The resolved role and tier pair that gates feature and content access.
///
/// # Examples
///
/// ```
/// use chrono::Utc;
/// use meridian_entitlement::{EntitlementResolver, PrimaryRole, UserRecord};
///
/// let user = UserRecord::new("jo@example.com", PrimaryRole::Practitioner);
/// let entitlement = EntitlementResolver::resolve(&user, Utc::now());
/// assert_eq!(entitlement.role, PrimaryRole::Practitioner);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectiveEntitlement {
    /// Role actually held after combining primary role and active grants
    pub role: PrimaryRole,

    /// Tier actually held after applying the subscription window
    pub tier: SubscriptionTier,

    /// Additional role grants active at resolution time
    pub active_additional_roles: Vec<RoleGrant>,
}

impl EffectiveEntitlement {
    /// Check whether this entitlement satisfies a content access level.
    ///
    /// Admins see everything; premium members see premium and below;
    /// free members see free and public content.
    ///
    /// # Arguments
    ///
    /// * `level` - The minimum entitlement the content requires
    pub fn can_view(&self, level: AccessLevel) -> bool {
        match level {
            AccessLevel::Public | AccessLevel::Free => true,
            AccessLevel::Premium => self.tier.is_paid() || self.role.is_admin(),
            AccessLevel::Admin => self.role.is_admin(),
        }
    }
}

/// Computes effective entitlement from the authoritative user fields.
///
/// Resolution is a pure function of the user record and the evaluation
/// instant; it performs no I/O and has no side effects.
pub struct EntitlementResolver;

impl EntitlementResolver {
    /// Resolve a user's effective entitlement.
    ///
    /// - The effective role is admin if the primary role is admin OR any
    ///   active additional grant names the admin role; otherwise it is the
    ///   primary role.
    /// - The effective tier is premium if the stored tier is premium AND
    ///   the subscription window has not ended; otherwise free.
    /// - Grants whose expiry has passed never appear in
    ///   `active_additional_roles`.
    ///
    /// # Arguments
    ///
    /// * `user` - The user record to resolve
    /// * `now` - The instant to evaluate expiries against
    pub fn resolve(user: &UserRecord, now: DateTime<Utc>) -> EffectiveEntitlement {
        let active_additional_roles: Vec<RoleGrant> = user
            .additional_roles
            .iter()
            .filter(|g| g.is_active(now))
            .cloned()
            .collect();

        let role = if user.primary_role.is_admin()
            || active_additional_roles.iter().any(|g| g.is_admin_grant())
        {
            PrimaryRole::Admin
        } else {
            user.primary_role
        };

        let window_open = match user.subscription_end {
            None => true,
            Some(end) => end > now,
        };
        let tier = if user.subscription_tier.is_paid() && window_open {
            SubscriptionTier::Premium
        } else {
            SubscriptionTier::Free
        };

        EffectiveEntitlement {
            role,
            tier,
            active_additional_roles,
        }
    }

    /// Compare the claims mirror against the resolved entitlement.
    ///
    /// Returns a warning when the mirror diverges from the authoritative
    /// computation. The warning is reported, never acted on: it does not
    /// block the operation that produced it, and the claims issuer is
    /// expected to converge on the next session refresh.
    ///
    /// # Arguments
    ///
    /// * `user` - The user record to check
    /// * `now` - The instant to resolve against
    pub fn check_claims_mirror(user: &UserRecord, now: DateTime<Utc>) -> Option<ConsistencyWarning> {
        let mirror = user.claims_mirror.as_ref()?;
        let resolved = Self::resolve(user, now);

        if mirror.role == resolved.role && mirror.subscription_tier == resolved.tier {
            return None;
        }

        let warning = ConsistencyWarning {
            user_id: user.id,
            claims_role: mirror.role,
            claims_tier: mirror.subscription_tier,
            resolved_role: resolved.role,
            resolved_tier: resolved.tier,
            detected_at: now,
        };
        warning.report();
        Some(warning)
    }
}

/// Divergence between the session-claims mirror and the resolved entitlement.
///
/// This is a report, not an error: the authoritative fields win, and the
/// issuer is expected to re-mirror them on the next session refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsistencyWarning {
    /// User whose claims diverge
    pub user_id: Uuid,

    /// Role as carried in the session claims
    pub claims_role: PrimaryRole,

    /// Tier as carried in the session claims
    pub claims_tier: SubscriptionTier,

    /// Role per the authoritative computation
    pub resolved_role: PrimaryRole,

    /// Tier per the authoritative computation
    pub resolved_tier: SubscriptionTier,

    /// When the divergence was detected
    pub detected_at: DateTime<Utc>,
}

impl ConsistencyWarning {
    /// Emit this warning through structured logging.
    pub fn report(&self) {
        warn!(
            user_id = %self.user_id,
            claims_role = self.claims_role.as_str(),
            claims_tier = self.claims_tier.as_str(),
            resolved_role = self.resolved_role.as_str(),
            resolved_tier = self.resolved_tier.as_str(),
            "Session claims diverge from resolved entitlement"
        );
    }
}
