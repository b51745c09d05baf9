//! Publication state machine
//!
//! This module validates and applies lifecycle transitions for reviews
//! and their linked community posts. Every transition is validated
//! against the current persisted state, applied as a whole-record write,
//! and never partially applied: the first rule violation surfaces as an
//! error and nothing is written.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::{PublicationError, PublicationResult};
use crate::post::{CommunityPost, PostStatus, VisibilityLevel};
use crate::review::{Review, ReviewStatus};
use crate::store::ContentStore;
use crate::visibility::post_visible_to_members;

/// Governs review and community-post status transitions.
///
/// Review lifecycle: draft → scheduled → published → archived, with
/// immediate publication and early override of a schedule also allowed.
/// Archived is terminal. Post lifecycle: draft → published/scheduled/
/// hidden, with hidden ↔ published-visible as the only reverse edge.
///
/// Publishing a review triggers the post sync rule: a linked post whose
/// `publish_with_review` policy is set and which is still draft or
/// scheduled is flipped to published at the same time.
pub struct PublicationStateMachine {
    store: Arc<dyn ContentStore>,
}

impl PublicationStateMachine {
    /// Create a state machine over the given content store.
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Publish a review immediately.
    ///
    /// Allowed from draft, scheduled (early override of the schedule),
    /// and published (idempotent); never from archived.
    ///
    /// # Errors
    ///
    /// `Precondition` when the review is archived, `Validation` when the
    /// title is empty.
    #[instrument(skip(self), fields(review_id = %id))]
    pub async fn publish_review(&self, id: Uuid) -> PublicationResult<Review> {
        let mut review = self.store.get_review(id).await?;
        Self::reject_archived(&review)?;
        if review.title.trim().is_empty() {
            return Err(PublicationError::Validation(
                "a review needs a title before it can be published".into(),
            ));
        }

        review.status = ReviewStatus::Published;
        review.scheduled_publish_at = None;
        review.published_at = review.published_at.or_else(|| Some(Utc::now()));
        let review = self.store.update_review(review).await?;
        info!(title = %review.title, "Review published");

        self.sync_post_on_publish(&review).await?;
        Ok(review)
    }

    /// Schedule a review to publish at a future instant.
    ///
    /// # Arguments
    ///
    /// * `id` - The review to schedule
    /// * `publish_at` - When the review should go live; must be in the
    ///   future
    ///
    /// # Errors
    ///
    /// `Precondition` when the review is archived or `publish_at` is not
    /// in the future.
    #[instrument(skip(self), fields(review_id = %id))]
    pub async fn schedule_review(
        &self,
        id: Uuid,
        publish_at: DateTime<Utc>,
    ) -> PublicationResult<Review> {
        let mut review = self.store.get_review(id).await?;
        Self::reject_archived(&review)?;
        Self::require_future(publish_at)?;

        review.status = ReviewStatus::Scheduled;
        review.scheduled_publish_at = Some(publish_at);
        let review = self.store.update_review(review).await?;
        debug!(publish_at = %publish_at, "Review scheduled");
        Ok(review)
    }

    /// Archive a review.
    ///
    /// Archived is terminal: nothing transitions out of it, and
    /// re-archiving is rejected like any other transition from archived.
    /// The linked post record is left untouched; derived visibility takes
    /// the discussion down.
    #[instrument(skip(self), fields(review_id = %id))]
    pub async fn archive_review(&self, id: Uuid) -> PublicationResult<Review> {
        let mut review = self.store.get_review(id).await?;
        Self::reject_archived(&review)?;

        review.status = ReviewStatus::Archived;
        review.scheduled_publish_at = None;
        let review = self.store.update_review(review).await?;
        info!(title = %review.title, "Review archived");
        Ok(review)
    }

    /// Publish a community post immediately.
    ///
    /// Allowed from any stored state; this is also the forward half of
    /// the hidden ↔ published-visible toggle. Whether members actually
    /// see the post still depends on the owning review, see
    /// [`post_visible_to_members`].
    ///
    /// # Errors
    ///
    /// `Validation` when the title is empty.
    #[instrument(skip(self), fields(post_id = %id))]
    pub async fn publish_post(&self, id: Uuid) -> PublicationResult<CommunityPost> {
        let mut post = self.store.get_post(id).await?;
        if post.title.trim().is_empty() {
            return Err(PublicationError::Validation(
                "a post needs a title before it can be published".into(),
            ));
        }

        post.post_status = PostStatus::Published;
        post.visibility_level = VisibilityLevel::Public;
        post.scheduled_publish_at = None;
        let post = self.store.update_post(post).await?;
        debug!(title = %post.title, "Post published");
        Ok(post)
    }

    /// Schedule a community post to publish at a future instant.
    ///
    /// # Errors
    ///
    /// `Precondition` when `publish_at` is not in the future.
    #[instrument(skip(self), fields(post_id = %id))]
    pub async fn schedule_post(
        &self,
        id: Uuid,
        publish_at: DateTime<Utc>,
    ) -> PublicationResult<CommunityPost> {
        Self::require_future(publish_at)?;
        let mut post = self.store.get_post(id).await?;

        post.post_status = PostStatus::Scheduled;
        post.visibility_level = VisibilityLevel::Hidden;
        post.scheduled_publish_at = Some(publish_at);
        let post = self.store.update_post(post).await?;
        debug!(publish_at = %publish_at, "Post scheduled");
        Ok(post)
    }

    /// Hide a community post.
    ///
    /// Allowed from any state. The review link survives hiding; only the
    /// stored status and visibility change.
    #[instrument(skip(self), fields(post_id = %id))]
    pub async fn hide_post(&self, id: Uuid) -> PublicationResult<CommunityPost> {
        let mut post = self.store.get_post(id).await?;

        post.post_status = PostStatus::Hidden;
        post.visibility_level = VisibilityLevel::Hidden;
        let post = self.store.update_post(post).await?;
        info!(title = %post.title, "Post hidden");
        Ok(post)
    }

    /// Restore a hidden post to published and publicly visible.
    ///
    /// # Errors
    ///
    /// `Precondition` when the post is not currently hidden.
    #[instrument(skip(self), fields(post_id = %id))]
    pub async fn unhide_post(&self, id: Uuid) -> PublicationResult<CommunityPost> {
        let mut post = self.store.get_post(id).await?;
        if post.post_status != PostStatus::Hidden {
            return Err(PublicationError::Precondition(format!(
                "post is {}, only hidden posts can be unhidden",
                post.post_status.as_str()
            )));
        }

        post.post_status = PostStatus::Published;
        post.visibility_level = VisibilityLevel::Public;
        let post = self.store.update_post(post).await?;
        info!(title = %post.title, "Post unhidden");
        Ok(post)
    }

    /// Compute a post's externally observable visibility right now.
    ///
    /// Convenience lookup combining the post with its owning review.
    pub async fn emitted_post_visibility(&self, post_id: Uuid) -> PublicationResult<bool> {
        let post = self.store.get_post(post_id).await?;
        let review = self.store.get_review(post.review_id).await?;
        Ok(post_visible_to_members(&review, &post))
    }

    /// Flip the linked policy post when its review goes live.
    async fn sync_post_on_publish(&self, review: &Review) -> PublicationResult<()> {
        let Some(mut post) = self.store.get_post_by_review(review.id).await? else {
            return Ok(());
        };
        if !post.publish_with_review {
            return Ok(());
        }
        if !matches!(post.post_status, PostStatus::Draft | PostStatus::Scheduled) {
            return Ok(());
        }

        post.post_status = PostStatus::Published;
        post.visibility_level = VisibilityLevel::Public;
        post.scheduled_publish_at = None;
        self.store.update_post(post).await?;
        debug!(review_id = %review.id, "Linked post published with review");
        Ok(())
    }

    fn reject_archived(review: &Review) -> PublicationResult<()> {
        if review.is_archived() {
            return Err(PublicationError::Precondition(
                "archived reviews accept no further transitions".into(),
            ));
        }
        Ok(())
    }

    fn require_future(publish_at: DateTime<Utc>) -> PublicationResult<()> {
        if publish_at <= Utc::now() {
            return Err(PublicationError::Precondition(format!(
                "scheduled publish time {publish_at} is not in the future"
            )));
        }
        Ok(())
    }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use crate::store::{MemoryContentStore, NewPost};
    use chrono::Duration;
    use meridian_entitlement::AccessLevel;

    async fn setup() -> (Arc<MemoryContentStore>, PublicationStateMachine, Uuid) {
        let store = Arc::new(MemoryContentStore::new());
        let review = Review::new("Statins revisited", AccessLevel::Free, Uuid::now_v7());
        let id = review.id;
        store.insert_review(review).await;
        let machine = PublicationStateMachine::new(store.clone());
        (store, machine, id)
    }

    #[tokio::test]
    async fn test_publish_from_draft() {
        let (_, machine, id) = setup().await;
        let review = machine.publish_review(id).await.unwrap();
        assert_eq!(review.status, ReviewStatus::Published);
        assert!(review.published_at.is_some());
    }

    #[tokio::test]
    async fn test_publish_overrides_schedule() {
        let (_, machine, id) = setup().await;
        machine
            .schedule_review(id, Utc::now() + Duration::hours(2))
            .await
            .unwrap();

        // Publish-now always wins over a pending schedule
        let review = machine.publish_review(id).await.unwrap();
        assert_eq!(review.status, ReviewStatus::Published);
        assert!(review.scheduled_publish_at.is_none());
    }

    #[tokio::test]
    async fn test_publish_requires_title() {
        let store = Arc::new(MemoryContentStore::new());
        let review = Review::new("", AccessLevel::Free, Uuid::now_v7());
        let id = review.id;
        store.insert_review(review).await;
        let machine = PublicationStateMachine::new(store);

        let err = machine.publish_review(id).await.unwrap_err();
        assert!(matches!(err, PublicationError::Validation(_)));
    }

    #[tokio::test]
    async fn test_archived_rejects_everything() {
        let (_, machine, id) = setup().await;
        machine.archive_review(id).await.unwrap();

        assert!(matches!(
            machine.publish_review(id).await.unwrap_err(),
            PublicationError::Precondition(_)
        ));
        assert!(matches!(
            machine
                .schedule_review(id, Utc::now() + Duration::hours(1))
                .await
                .unwrap_err(),
            PublicationError::Precondition(_)
        ));
        // Re-archive is a transition from archived like any other
        assert!(matches!(
            machine.archive_review(id).await.unwrap_err(),
            PublicationError::Precondition(_)
        ));
    }

    #[tokio::test]
    async fn test_schedule_requires_future_instant() {
        let (_, machine, id) = setup().await;
        let err = machine
            .schedule_review(id, Utc::now() - Duration::minutes(5))
            .await
            .unwrap_err();
        assert!(matches!(err, PublicationError::Precondition(_)));
    }

    #[tokio::test]
    async fn test_publish_syncs_policy_post() {
        let (store, machine, id) = setup().await;
        let post = store
            .create_post(
                id,
                NewPost {
                    title: "Discussion".into(),
                    publish_with_review: true,
                },
            )
            .await
            .unwrap();

        machine.publish_review(id).await.unwrap();

        let post = store.get_post(post.id).await.unwrap();
        assert_eq!(post.post_status, PostStatus::Published);
        assert_eq!(post.visibility_level, VisibilityLevel::Public);
        assert!(machine.emitted_post_visibility(post.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_publish_leaves_non_policy_post_alone() {
        let (store, machine, id) = setup().await;
        let post = store
            .create_post(
                id,
                NewPost {
                    title: "Discussion".into(),
                    publish_with_review: false,
                },
            )
            .await
            .unwrap();

        machine.publish_review(id).await.unwrap();

        let post = store.get_post(post.id).await.unwrap();
        assert_eq!(post.post_status, PostStatus::Draft);
    }

    #[tokio::test]
    async fn test_publish_does_not_resurrect_hidden_post() {
        let (store, machine, id) = setup().await;
        let post = store
            .create_post(
                id,
                NewPost {
                    title: "Discussion".into(),
                    publish_with_review: true,
                },
            )
            .await
            .unwrap();
        machine.hide_post(post.id).await.unwrap();

        machine.publish_review(id).await.unwrap();

        let post = store.get_post(post.id).await.unwrap();
        assert_eq!(post.post_status, PostStatus::Hidden);
    }

    #[tokio::test]
    async fn test_hide_keeps_review_link() {
        let (store, machine, id) = setup().await;
        let post = store
            .create_post(
                id,
                NewPost {
                    title: "Discussion".into(),
                    publish_with_review: false,
                },
            )
            .await
            .unwrap();
        machine.publish_post(post.id).await.unwrap();

        let hidden = machine.hide_post(post.id).await.unwrap();
        assert_eq!(hidden.post_status, PostStatus::Hidden);
        assert_eq!(hidden.visibility_level, VisibilityLevel::Hidden);
        assert_eq!(hidden.review_id, id);
        assert!(hidden.invariants_hold());
    }

    #[tokio::test]
    async fn test_unhide_toggle() {
        let (store, machine, id) = setup().await;
        let post = store
            .create_post(
                id,
                NewPost {
                    title: "Discussion".into(),
                    publish_with_review: false,
                },
            )
            .await
            .unwrap();

        // Unhide only applies to hidden posts
        let err = machine.unhide_post(post.id).await.unwrap_err();
        assert!(matches!(err, PublicationError::Precondition(_)));

        machine.hide_post(post.id).await.unwrap();
        let restored = machine.unhide_post(post.id).await.unwrap();
        assert_eq!(restored.post_status, PostStatus::Published);
        assert_eq!(restored.visibility_level, VisibilityLevel::Public);
    }

    #[tokio::test]
    async fn test_archiving_review_takes_discussion_down() {
        let (store, machine, id) = setup().await;
        let post = store
            .create_post(
                id,
                NewPost {
                    title: "Discussion".into(),
                    publish_with_review: false,
                },
            )
            .await
            .unwrap();
        machine.publish_review(id).await.unwrap();
        machine.publish_post(post.id).await.unwrap();
        assert!(machine.emitted_post_visibility(post.id).await.unwrap());

        machine.archive_review(id).await.unwrap();

        // The post record never changed, only its emitted visibility did
        let post = store.get_post(post.id).await.unwrap();
        assert_eq!(post.post_status, PostStatus::Published);
        assert!(!machine.emitted_post_visibility(post.id).await.unwrap());
    }
}
