//! Review domain models
//!
//! This module provides the Review entity, the unit of published clinical
//! content. Reviews move through an admin-controlled lifecycle and are
//! archived (never deleted) at end of life.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use meridian_entitlement::AccessLevel;

/// Admin-controlled lifecycle stage of a review.
///
/// The canonical path is draft → scheduled → published → archived, with
/// immediate publication (draft → published) and early override
/// (scheduled → published) also allowed. Archived is terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    /// Being edited, not visible to members
    Draft,

    /// Queued to publish at a set instant
    Scheduled,

    /// Live and visible per its access level
    Published,

    /// Retired; terminal
    Archived,
}

impl ReviewStatus {
    /// Parse status from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "scheduled" => Some(Self::Scheduled),
            "published" => Some(Self::Published),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }

    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Scheduled => "scheduled",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

impl Default for ReviewStatus {
    fn default() -> Self {
        Self::Draft
    }
}

/// A clinical review managed through the admin editor.
///
/// The linked community post is a weak back-reference: its existence is
/// looked up through the content store, never owned by the review.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use meridian_entitlement::AccessLevel;
/// use meridian_publication::{Review, ReviewStatus};
///
/// let author = Uuid::now_v7();
/// let review = Review::new("Beta-blockers in heart failure", AccessLevel::Premium, author);
/// assert_eq!(review.status, ReviewStatus::Draft);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// Unique identifier for the review
    pub id: Uuid,

    /// Review title
    pub title: String,

    /// Minimum entitlement required to view the published review
    pub access_level: AccessLevel,

    /// Lifecycle stage
    pub status: ReviewStatus,

    /// When the review should auto-publish; required iff scheduled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_publish_at: Option<DateTime<Utc>>,

    /// Linked community post, if the editor created one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community_post_id: Option<Uuid>,

    /// When the review first went live
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,

    /// Admin who created the review
    pub created_by: Uuid,

    /// Custom metadata for extensibility
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,

    /// When the review was created
    pub created_at: DateTime<Utc>,

    /// When the review was last updated
    pub updated_at: DateTime<Utc>,
}

impl Review {
    /// Creates a new draft review.
    ///
    /// # Arguments
    ///
    /// * `title` - Review title
    /// * `access_level` - Minimum entitlement to view once published
    /// * `created_by` - Admin creating the review
    pub fn new(title: impl Into<String>, access_level: AccessLevel, created_by: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title: title.into(),
            access_level,
            status: ReviewStatus::Draft,
            scheduled_publish_at: None,
            community_post_id: None,
            published_at: None,
            created_by,
            metadata: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Link a community post to this review.
    pub fn with_community_post(mut self, post_id: Uuid) -> Self {
        self.community_post_id = Some(post_id);
        self
    }

    /// Check whether this review is live.
    pub fn is_published(&self) -> bool {
        self.status == ReviewStatus::Published
    }

    /// Check whether this review has reached its terminal state.
    pub fn is_archived(&self) -> bool {
        self.status == ReviewStatus::Archived
    }
}
