//! User domain model
//!
//! This module provides the user record as seen by the administrative
//! core: the authoritative role and subscription fields, the additional
//! role grants, and the advisory claims mirror carried in session tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::roles::{PrimaryRole, RoleGrant};
use crate::tiers::SubscriptionTier;

/// A user record managed through the admin console.
///
/// The authoritative entitlement inputs are `primary_role`,
/// `subscription_tier` with its window, and `additional_roles`. The
/// `claims_mirror` is the last-known copy of role and tier embedded in the
/// user's signed session claims; it is advisory only and must eventually
/// match the authoritative fields, but is never consulted when resolving
/// effective entitlement.
///
/// Users are never hard-deleted by this subsystem; deactivation flips
/// `is_active`.
///
/// # Examples
///
/// ```
/// use meridian_entitlement::{UserRecord, PrimaryRole};
///
/// let user = UserRecord::new("jo@example.com", PrimaryRole::Practitioner);
/// assert!(user.is_active);
/// assert!(user.additional_roles.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique identifier for the user
    pub id: Uuid,

    /// User email
    pub email: String,

    /// Single authoritative primary role
    pub primary_role: PrimaryRole,

    /// Single authoritative subscription tier
    pub subscription_tier: SubscriptionTier,

    /// Start of the premium window (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_start: Option<DateTime<Utc>>,

    /// End of the premium window (None = open-ended)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_end: Option<DateTime<Utc>>,

    /// Roles granted beyond the primary role, each independently expirable
    #[serde(default)]
    pub additional_roles: Vec<RoleGrant>,

    /// Last-known role/tier copy from the user's signed session claims.
    ///
    /// Advisory only. Divergence from the authoritative fields is a
    /// reportable inconsistency, not a resolution input.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims_mirror: Option<ClaimsMirror>,

    /// Whether the account is active (deactivation, not deletion)
    pub is_active: bool,

    /// Custom metadata for extensibility
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,

    /// When the record was created
    pub created_at: DateTime<Utc>,

    /// When the record was last updated
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Creates a new user record.
    ///
    /// The record is created with:
    /// - A newly generated UUID v7 ID
    /// - Free subscription tier with no window
    /// - No additional roles and no claims mirror
    /// - Active status
    ///
    /// # Arguments
    ///
    /// * `email` - The user's email address
    /// * `primary_role` - The primary role assigned at registration
    pub fn new(email: impl Into<String>, primary_role: PrimaryRole) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            email: email.into(),
            primary_role,
            subscription_tier: SubscriptionTier::Free,
            subscription_start: None,
            subscription_end: None,
            additional_roles: Vec::new(),
            claims_mirror: None,
            is_active: true,
            metadata: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the subscription tier and window on this record.
    ///
    /// # Arguments
    ///
    /// * `tier` - The subscription tier
    /// * `start` - Start of the premium window
    /// * `end` - End of the premium window (None = open-ended)
    pub fn with_subscription(
        mut self,
        tier: SubscriptionTier,
        start: DateTime<Utc>,
        end: Option<DateTime<Utc>>,
    ) -> Self {
        self.subscription_tier = tier;
        self.subscription_start = Some(start);
        self.subscription_end = end;
        self
    }

    /// Attach an additional role grant.
    ///
    /// # Arguments
    ///
    /// * `grant` - The grant to attach
    pub fn with_grant(mut self, grant: RoleGrant) -> Self {
        self.additional_roles.push(grant);
        self
    }

    /// Set the claims mirror on this record.
    pub fn with_claims_mirror(mut self, mirror: ClaimsMirror) -> Self {
        self.claims_mirror = Some(mirror);
        self
    }

    /// Find an additional role grant by name that is active at `now`.
    ///
    /// # Arguments
    ///
    /// * `role_name` - The role name to look for
    /// * `now` - The instant to evaluate grant expiry against
    pub fn active_grant(&self, role_name: &str, now: DateTime<Utc>) -> Option<&RoleGrant> {
        self.additional_roles
            .iter()
            .find(|g| g.role_name == role_name && g.is_active(now))
    }
}

/// Role and tier as last embedded in the user's signed session claims.
///
/// The claims issuer mirrors the authoritative fields into session tokens
/// on the next refresh; this core never writes claims, it only compares
/// this copy against the resolved entitlement and reports divergence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClaimsMirror {
    /// Role as embedded in the session claims
    pub role: PrimaryRole,

    /// Subscription tier as embedded in the session claims
    pub subscription_tier: SubscriptionTier,

    /// When the mirror was captured
    pub mirrored_at: DateTime<Utc>,
}

impl ClaimsMirror {
    /// Creates a claims mirror captured now.
    ///
    /// # Arguments
    ///
    /// * `role` - Role as embedded in the claims
    /// * `subscription_tier` - Tier as embedded in the claims
    pub fn new(role: PrimaryRole, subscription_tier: SubscriptionTier) -> Self {
        Self {
            role,
            subscription_tier,
            mirrored_at: Utc::now(),
        }
    }
}
