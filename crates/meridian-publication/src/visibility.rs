//! Derived post visibility
//!
//! A community post's stored status and its externally observable
//! visibility are two different things. What members actually see is a
//! pure function of the post AND its owning review, computed at read
//! time; the review's state is never copied into the post record.

use crate::post::{CommunityPost, PostStatus, VisibilityLevel};
use crate::review::Review;

/// Compute whether members can see a post right now.
///
/// A post is emitted as visible iff its own stored state says so
/// (`Published` + `Public`) AND its owning review is published. A post
/// persisted as published under the "publish with review" policy stays
/// invisible until the review goes live, and archiving the review takes
/// the discussion down without touching the post record.
///
/// # Arguments
///
/// * `review` - The owning review
/// * `post` - The post whose emitted visibility is wanted
///
/// # Examples
///
/// ```
/// use uuid::Uuid;
/// use meridian_entitlement::AccessLevel;
/// use meridian_publication::{post_visible_to_members, CommunityPost, Review};
///
/// let review = Review::new("Statins revisited", AccessLevel::Free, Uuid::now_v7());
/// let post = CommunityPost::new(review.id, "Discussion");
/// // Draft review, draft post: nothing to see
/// assert!(!post_visible_to_members(&review, &post));
/// ```
pub fn post_visible_to_members(review: &Review, post: &CommunityPost) -> bool {
    let stored_visible = post.post_status == PostStatus::Published
        && post.visibility_level == VisibilityLevel::Public;
    stored_visible && review.is_published()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::ReviewStatus;
    use meridian_entitlement::AccessLevel;
    use uuid::Uuid;

    fn pair() -> (Review, CommunityPost) {
        let review = Review::new("Statins revisited", AccessLevel::Free, Uuid::now_v7());
        let post = CommunityPost::new(review.id, "Discussion");
        (review, post)
    }

    #[test]
    fn test_published_pair_is_visible() {
        let (mut review, mut post) = pair();
        review.status = ReviewStatus::Published;
        post.post_status = PostStatus::Published;
        post.visibility_level = VisibilityLevel::Public;

        assert!(post_visible_to_members(&review, &post));
    }

    #[test]
    fn test_unpublished_review_gates_published_post() {
        let (mut review, mut post) = pair();
        post.post_status = PostStatus::Published;
        post.visibility_level = VisibilityLevel::Public;

        for status in [
            ReviewStatus::Draft,
            ReviewStatus::Scheduled,
            ReviewStatus::Archived,
        ] {
            review.status = status;
            assert!(
                !post_visible_to_members(&review, &post),
                "post should be invisible while review is {}",
                status.as_str()
            );
        }
        // The stored post state never changed
        assert_eq!(post.post_status, PostStatus::Published);
    }

    #[test]
    fn test_hidden_post_invisible_under_published_review() {
        let (mut review, mut post) = pair();
        review.status = ReviewStatus::Published;
        post.post_status = PostStatus::Hidden;
        post.visibility_level = VisibilityLevel::Hidden;

        assert!(!post_visible_to_members(&review, &post));
    }
}
