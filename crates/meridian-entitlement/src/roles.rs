//! Roles and time-bounded role grants
//!
//! This module defines the primary role held by every user along with
//! additional role grants, which extend a user's primary role for a
//! bounded period and are independently revocable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role name that confers administrative access when granted in addition
/// to a non-admin primary role.
pub const ADMIN_ROLE: &str = "admin";

/// A user's primary role on the platform.
///
/// Exactly one primary role is held at a time and it is the single
/// authoritative role field on the user record. Additional capabilities
/// are layered on through [`RoleGrant`]s rather than by changing the
/// primary role.
///
/// # Examples
///
/// ```
/// use meridian_entitlement::PrimaryRole;
///
/// let role = PrimaryRole::Practitioner;
/// assert!(!role.is_admin());
/// assert_eq!(role.as_str(), "practitioner");
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryRole {
    /// Practicing clinician consuming and discussing published content
    Practitioner = 0,

    /// Platform administrator with full management access
    Admin = 1,
}

impl PrimaryRole {
    /// Check if this role has admin privileges.
    ///
    /// # Returns
    ///
    /// `true` only for the Admin role
    pub fn is_admin(&self) -> bool {
        matches!(self, PrimaryRole::Admin)
    }

    /// Parse role from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    ///
    /// # Returns
    ///
    /// `Some(PrimaryRole)` if valid, `None` otherwise
    ///
    /// # Examples
    ///
    /// ```
    /// use meridian_entitlement::PrimaryRole;
    ///
    /// assert_eq!(PrimaryRole::parse("admin"), Some(PrimaryRole::Admin));
    /// assert_eq!(PrimaryRole::parse("PRACTITIONER"), Some(PrimaryRole::Practitioner));
    /// assert_eq!(PrimaryRole::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "practitioner" => Some(Self::Practitioner),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Get string representation of the role.
    ///
    /// # Returns
    ///
    /// Lowercase string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Practitioner => "practitioner",
            Self::Admin => "admin",
        }
    }

    /// Get a human-readable display name for the role.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Practitioner => "Practitioner",
            Self::Admin => "Admin",
        }
    }
}

impl Default for PrimaryRole {
    fn default() -> Self {
        Self::Practitioner
    }
}

/// A time-bounded role granted in addition to a user's primary role.
///
/// Grants are independently revocable and may carry an expiry. An expired
/// grant is *inactive* but stays on the user record until it is explicitly
/// revoked, so the audit trail of who granted what survives expiry.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use chrono::Utc;
/// use meridian_entitlement::RoleGrant;
///
/// let granted_by = Uuid::now_v7();
/// let grant = RoleGrant::new("moderator", granted_by);
/// assert!(grant.is_active(Utc::now()));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleGrant {
    /// Name of the granted role
    pub role_name: String,

    /// When the grant was issued
    pub granted_at: DateTime<Utc>,

    /// When the grant stops being active (None = no expiry)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Admin who issued the grant
    pub granted_by: Uuid,
}

impl RoleGrant {
    /// Creates a new grant with no expiry.
    ///
    /// # Arguments
    ///
    /// * `role_name` - Name of the role being granted
    /// * `granted_by` - Admin issuing the grant
    pub fn new(role_name: impl Into<String>, granted_by: Uuid) -> Self {
        Self {
            role_name: role_name.into(),
            granted_at: Utc::now(),
            expires_at: None,
            granted_by,
        }
    }

    /// Set an expiry on this grant.
    ///
    /// # Arguments
    ///
    /// * `expires_at` - When the grant stops being active
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Check whether the grant is active at the given instant.
    ///
    /// A grant with no expiry is always active; otherwise it is active
    /// strictly before its expiry.
    ///
    /// # Arguments
    ///
    /// * `now` - The instant to evaluate against
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            None => true,
            Some(expires_at) => expires_at > now,
        }
    }

    /// Check whether this grant confers admin access.
    pub fn is_admin_grant(&self) -> bool {
        self.role_name == ADMIN_ROLE
    }
}
