//! Subscription tiers and content access levels
//!
//! This module defines the subscription tiers users can hold and the
//! access levels content can require. An access level names the minimum
//! entitlement a piece of content needs to be visible.

use serde::{Deserialize, Serialize};

/// Subscription tier for a user.
///
/// The tier on the user record is authoritative only together with the
/// subscription window; an expired premium window resolves to free access.
/// See `EntitlementResolver` for the effective-tier computation.
///
/// # Examples
///
/// ```
/// use meridian_entitlement::SubscriptionTier;
///
/// let tier = SubscriptionTier::Premium;
/// assert!(tier.is_paid());
/// assert_eq!(tier.as_str(), "premium");
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    /// Free tier with access to free and public content
    Free = 0,

    /// Paid tier with access to premium content
    Premium = 1,
}

impl SubscriptionTier {
    /// Check if this is a paid tier.
    pub fn is_paid(&self) -> bool {
        matches!(self, SubscriptionTier::Premium)
    }

    /// Parse tier from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    ///
    /// # Returns
    ///
    /// `Some(SubscriptionTier)` if valid, `None` otherwise
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "free" => Some(Self::Free),
            "premium" => Some(Self::Premium),
            _ => None,
        }
    }

    /// Get string representation of the tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Premium => "premium",
        }
    }

    /// Get a human-readable display name for the tier.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Premium => "Premium",
        }
    }
}

impl Default for SubscriptionTier {
    fn default() -> Self {
        Self::Free
    }
}

/// Minimum entitlement a piece of content requires to be visible.
///
/// Levels are ordered by how much entitlement they demand:
/// Public < Free < Premium < Admin.
///
/// - **Public**: visible without an account
/// - **Free**: visible to any signed-in user
/// - **Premium**: requires an active premium subscription
/// - **Admin**: visible to administrators only
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// Visible without an account
    Public = 0,

    /// Visible to any signed-in user
    Free = 1,

    /// Requires an active premium subscription
    Premium = 2,

    /// Visible to administrators only
    Admin = 3,
}

impl AccessLevel {
    /// Parse access level from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "public" => Some(Self::Public),
            "free" => Some(Self::Free),
            "premium" => Some(Self::Premium),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Get string representation of the access level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Free => "free",
            Self::Premium => "premium",
            Self::Admin => "admin",
        }
    }
}

impl Default for AccessLevel {
    fn default() -> Self {
        Self::Public
    }
}
