//! # Admin actions
//!
//! Defines the operation identifiers the admin console submits. Each
//! identifier maps 1:1 onto a coordinator or state-machine contract; the
//! mapping itself lives in the `surface` module.

use serde::{Deserialize, Serialize};

/// Operations the admin console can request.
///
/// Entitlement actions target a user; publication actions target a
/// review or community post.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AdminAction {
    /// Set a user's primary role to admin.
    Promote,

    /// Set a user's primary role back to practitioner.
    ///
    /// Leaves additional admin grants in place; revoking those is a
    /// separate `revoke_role` action.
    Demote,

    /// Attach an additional role grant to a user.
    AssignRole,

    /// Revoke an additional role grant from a user.
    RevokeRole,

    /// Publish a review or post immediately.
    Publish,

    /// Schedule a review or post to publish later.
    Schedule,

    /// Hide a community post.
    Hide,

    /// Restore a hidden community post.
    Unhide,
}

impl AdminAction {
    /// Parse an action from its console identifier.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use meridian_admin::AdminAction;
    ///
    /// assert_eq!(AdminAction::parse("promote"), Some(AdminAction::Promote));
    /// assert_eq!(AdminAction::parse("assign_role"), Some(AdminAction::AssignRole));
    /// assert_eq!(AdminAction::parse("invalid"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "promote" => Some(Self::Promote),
            "demote" => Some(Self::Demote),
            "assign_role" => Some(Self::AssignRole),
            "revoke_role" => Some(Self::RevokeRole),
            "publish" => Some(Self::Publish),
            "schedule" => Some(Self::Schedule),
            "hide" => Some(Self::Hide),
            "unhide" => Some(Self::Unhide),
            _ => None,
        }
    }

    /// Get the console identifier for this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Promote => "promote",
            Self::Demote => "demote",
            Self::AssignRole => "assign_role",
            Self::RevokeRole => "revoke_role",
            Self::Publish => "publish",
            Self::Schedule => "schedule",
            Self::Hide => "hide",
            Self::Unhide => "unhide",
        }
    }

    /// Check whether this action targets a user's entitlement.
    pub fn is_entitlement_action(&self) -> bool {
        matches!(
            self,
            Self::Promote | Self::Demote | Self::AssignRole | Self::RevokeRole
        )
    }

    /// Check whether this action targets publication state.
    pub fn is_publication_action(&self) -> bool {
        !self.is_entitlement_action()
    }
}
