//! Community post domain models
//!
//! A community post is the discussion thread the admin editor can attach
//! to a review. Its stored status and its externally observable
//! visibility are two different things: see the `visibility` module for
//! the derived rule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stored lifecycle stage of a community post.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    /// Being edited
    Draft,

    /// Live per its visibility level
    Published,

    /// Queued to publish at a set instant
    Scheduled,

    /// Taken down by an admin; the review link survives
    Hidden,
}

impl PostStatus {
    /// Parse status from string representation.
    ///
    /// # Arguments
    ///
    /// * `s` - String to parse (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "scheduled" => Some(Self::Scheduled),
            "hidden" => Some(Self::Hidden),
            _ => None,
        }
    }

    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Scheduled => "scheduled",
            Self::Hidden => "hidden",
        }
    }
}

impl Default for PostStatus {
    fn default() -> Self {
        Self::Draft
    }
}

/// Whether a post is discoverable by ordinary members.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityLevel {
    /// Discoverable by members
    Public,

    /// Not discoverable
    Hidden,
}

impl VisibilityLevel {
    /// Get string representation of the visibility level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Hidden => "hidden",
        }
    }
}

impl Default for VisibilityLevel {
    fn default() -> Self {
        Self::Hidden
    }
}

/// A community discussion post owned by exactly one review.
///
/// Invariants:
/// - `post_status == Hidden` implies `visibility_level == Hidden`
/// - `visibility_level == Public` implies `post_status` is Published or
///   Scheduled
///
/// When `publish_with_review` is set, the stored status may say published
/// while the post stays invisible to members until the owning review is
/// itself published.
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use meridian_publication::{CommunityPost, PostStatus, VisibilityLevel};
///
/// let review_id = Uuid::now_v7();
/// let post = CommunityPost::new(review_id, "Discussion: beta-blockers");
/// assert_eq!(post.post_status, PostStatus::Draft);
/// assert_eq!(post.visibility_level, VisibilityLevel::Hidden);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityPost {
    /// Unique identifier for the post
    pub id: Uuid,

    /// Owning review
    pub review_id: Uuid,

    /// Post title
    pub title: String,

    /// Stored lifecycle stage
    pub post_status: PostStatus,

    /// Stored discoverability
    pub visibility_level: VisibilityLevel,

    /// Gate emitted visibility on the owning review's publication
    pub publish_with_review: bool,

    /// When the post should auto-publish; required iff scheduled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_publish_at: Option<DateTime<Utc>>,

    /// When the post was created
    pub created_at: DateTime<Utc>,

    /// When the post was last updated
    pub updated_at: DateTime<Utc>,
}

impl CommunityPost {
    /// Creates a new draft post owned by a review.
    ///
    /// # Arguments
    ///
    /// * `review_id` - The owning review
    /// * `title` - Post title
    pub fn new(review_id: Uuid, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            review_id,
            title: title.into(),
            post_status: PostStatus::Draft,
            visibility_level: VisibilityLevel::Hidden,
            publish_with_review: false,
            scheduled_publish_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Gate this post's emitted visibility on the owning review.
    pub fn with_publish_with_review(mut self) -> Self {
        self.publish_with_review = true;
        self
    }

    /// Check the stored-state invariants.
    ///
    /// # Returns
    ///
    /// `true` when the status/visibility pair is consistent
    pub fn invariants_hold(&self) -> bool {
        if self.post_status == PostStatus::Hidden && self.visibility_level != VisibilityLevel::Hidden
        {
            return false;
        }
        if self.visibility_level == VisibilityLevel::Public
            && !matches!(self.post_status, PostStatus::Published | PostStatus::Scheduled)
        {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_creation() {
        let review_id = Uuid::now_v7();
        let post = CommunityPost::new(review_id, "Discussion");

        assert_eq!(post.review_id, review_id);
        assert_eq!(post.post_status, PostStatus::Draft);
        assert_eq!(post.visibility_level, VisibilityLevel::Hidden);
        assert!(!post.publish_with_review);
        assert!(post.invariants_hold());
    }

    #[test]
    fn test_invariant_hidden_status_forces_hidden_visibility() {
        let mut post = CommunityPost::new(Uuid::now_v7(), "Discussion");
        post.post_status = PostStatus::Hidden;
        post.visibility_level = VisibilityLevel::Public;
        assert!(!post.invariants_hold());

        post.visibility_level = VisibilityLevel::Hidden;
        assert!(post.invariants_hold());
    }

    #[test]
    fn test_invariant_public_requires_published_or_scheduled() {
        let mut post = CommunityPost::new(Uuid::now_v7(), "Discussion");
        post.visibility_level = VisibilityLevel::Public;

        post.post_status = PostStatus::Draft;
        assert!(!post.invariants_hold());

        post.post_status = PostStatus::Published;
        assert!(post.invariants_hold());

        post.post_status = PostStatus::Scheduled;
        assert!(post.invariants_hold());
    }
}
