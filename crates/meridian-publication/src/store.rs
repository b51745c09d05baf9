//! Content store contract
//!
//! This module defines the abstract contract over the review/post
//! row-store and an in-memory implementation for single-process use and
//! testing. Writes are last-write-wins at the store layer; concurrent
//! admin edits to the same review are not serialized by this core.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{PublicationError, PublicationResult};
use crate::post::CommunityPost;
use crate::review::Review;

/// Fields for creating a community post under a review.
#[derive(Debug, Clone)]
pub struct NewPost {
    /// Post title
    pub title: String,

    /// Gate emitted visibility on the owning review's publication
    pub publish_with_review: bool,
}

/// Abstract contract over the review/post store.
///
/// Row writes are whole-record: the state machine reads an entity,
/// applies a transition, and writes the result back.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch a review by id.
    ///
    /// # Errors
    ///
    /// `NotFound` if no review with this id exists.
    async fn get_review(&self, id: Uuid) -> PublicationResult<Review>;

    /// Write a review record back.
    async fn update_review(&self, review: Review) -> PublicationResult<Review>;

    /// Fetch a post by id.
    async fn get_post(&self, id: Uuid) -> PublicationResult<CommunityPost>;

    /// Fetch the post owned by a review, if one exists.
    async fn get_post_by_review(&self, review_id: Uuid)
        -> PublicationResult<Option<CommunityPost>>;

    /// Write a post record back.
    async fn update_post(&self, post: CommunityPost) -> PublicationResult<CommunityPost>;

    /// Create a post under a review and set the review's back-reference.
    async fn create_post(&self, review_id: Uuid, fields: NewPost)
        -> PublicationResult<CommunityPost>;

    /// List reviews currently in the scheduled state.
    async fn list_scheduled_reviews(&self) -> PublicationResult<Vec<Review>>;

    /// List posts currently in the scheduled state.
    async fn list_scheduled_posts(&self) -> PublicationResult<Vec<CommunityPost>>;
}

#[cfg(feature = "memory")]
pub use memory::MemoryContentStore;

#[cfg(feature = "memory")]
mod memory {
    use super::*;
    use crate::post::PostStatus;
    use crate::review::ReviewStatus;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory content store.
    ///
    /// Suitable for single-process applications and testing.
    pub struct MemoryContentStore {
        reviews: Arc<RwLock<HashMap<Uuid, Review>>>,
        posts: Arc<RwLock<HashMap<Uuid, CommunityPost>>>,
    }

    impl std::fmt::Debug for MemoryContentStore {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.debug_struct("MemoryContentStore").finish()
        }
    }

    impl MemoryContentStore {
        /// Create an empty in-memory store.
        pub fn new() -> Self {
            Self {
                reviews: Arc::new(RwLock::new(HashMap::new())),
                posts: Arc::new(RwLock::new(HashMap::new())),
            }
        }

        /// Insert or replace a review record.
        pub async fn insert_review(&self, review: Review) {
            self.reviews.write().await.insert(review.id, review);
        }

        /// Insert or replace a post record.
        pub async fn insert_post(&self, post: CommunityPost) {
            self.posts.write().await.insert(post.id, post);
        }
    }

    impl Default for MemoryContentStore {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ContentStore for MemoryContentStore {
        async fn get_review(&self, id: Uuid) -> PublicationResult<Review> {
            self.reviews
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PublicationError::NotFound(format!("review {id}")))
        }

        async fn update_review(&self, mut review: Review) -> PublicationResult<Review> {
            let mut reviews = self.reviews.write().await;
            if !reviews.contains_key(&review.id) {
                return Err(PublicationError::NotFound(format!("review {}", review.id)));
            }
            review.updated_at = Utc::now();
            reviews.insert(review.id, review.clone());
            Ok(review)
        }

        async fn get_post(&self, id: Uuid) -> PublicationResult<CommunityPost> {
            self.posts
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PublicationError::NotFound(format!("post {id}")))
        }

        async fn get_post_by_review(
            &self,
            review_id: Uuid,
        ) -> PublicationResult<Option<CommunityPost>> {
            Ok(self
                .posts
                .read()
                .await
                .values()
                .find(|p| p.review_id == review_id)
                .cloned())
        }

        async fn update_post(&self, mut post: CommunityPost) -> PublicationResult<CommunityPost> {
            let mut posts = self.posts.write().await;
            if !posts.contains_key(&post.id) {
                return Err(PublicationError::NotFound(format!("post {}", post.id)));
            }
            post.updated_at = Utc::now();
            posts.insert(post.id, post.clone());
            Ok(post)
        }

        async fn create_post(
            &self,
            review_id: Uuid,
            fields: NewPost,
        ) -> PublicationResult<CommunityPost> {
            let mut reviews = self.reviews.write().await;
            let review = reviews
                .get_mut(&review_id)
                .ok_or_else(|| PublicationError::NotFound(format!("review {review_id}")))?;

            let mut post = CommunityPost::new(review_id, fields.title);
            post.publish_with_review = fields.publish_with_review;

            review.community_post_id = Some(post.id);
            review.updated_at = Utc::now();
            self.posts.write().await.insert(post.id, post.clone());
            Ok(post)
        }

        async fn list_scheduled_reviews(&self) -> PublicationResult<Vec<Review>> {
            Ok(self
                .reviews
                .read()
                .await
                .values()
                .filter(|r| r.status == ReviewStatus::Scheduled)
                .cloned()
                .collect())
        }

        async fn list_scheduled_posts(&self) -> PublicationResult<Vec<CommunityPost>> {
            Ok(self
                .posts
                .read()
                .await
                .values()
                .filter(|p| p.post_status == PostStatus::Scheduled)
                .cloned()
                .collect())
        }
    }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use meridian_entitlement::AccessLevel;

    #[tokio::test]
    async fn test_get_review_not_found() {
        let store = MemoryContentStore::new();
        let err = store.get_review(Uuid::now_v7()).await.unwrap_err();
        assert!(matches!(err, PublicationError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_create_post_sets_back_reference() {
        let store = MemoryContentStore::new();
        let review = Review::new("Statins revisited", AccessLevel::Free, Uuid::now_v7());
        let review_id = review.id;
        store.insert_review(review).await;

        let post = store
            .create_post(
                review_id,
                NewPost {
                    title: "Discussion".into(),
                    publish_with_review: true,
                },
            )
            .await
            .unwrap();

        assert_eq!(post.review_id, review_id);
        assert!(post.publish_with_review);
        let review = store.get_review(review_id).await.unwrap();
        assert_eq!(review.community_post_id, Some(post.id));
        let by_review = store.get_post_by_review(review_id).await.unwrap();
        assert_eq!(by_review.map(|p| p.id), Some(post.id));
    }

    #[tokio::test]
    async fn test_create_post_under_missing_review() {
        let store = MemoryContentStore::new();
        let err = store
            .create_post(
                Uuid::now_v7(),
                NewPost {
                    title: "Discussion".into(),
                    publish_with_review: false,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PublicationError::NotFound(_)));
    }
}
