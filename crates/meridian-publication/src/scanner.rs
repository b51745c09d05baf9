//! Scheduled publication scanning
//!
//! An external periodic job asks this core which scheduled items are due
//! and then performs the actual flips through the state machine. The
//! scanner is a pure query: it never mutates anything and does not own
//! the trigger's timing.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PublicationResult;
use crate::post::PostStatus;
use crate::review::ReviewStatus;
use crate::store::ContentStore;

/// Kind of entity a due transition applies to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A review
    Review,

    /// A community post
    CommunityPost,
}

/// State a due item should be flipped to.
///
/// Scheduling only ever queues publication today, so this carries a
/// single target.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TargetState {
    /// Flip the item to published
    Published,
}

/// One scheduled item whose publish instant has arrived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DueTransition {
    /// Kind of entity to flip
    pub entity: EntityKind,

    /// Entity id
    pub id: Uuid,

    /// State the entity should be moved to
    pub target: TargetState,

    /// The instant the item was scheduled for
    pub scheduled_publish_at: DateTime<Utc>,
}

/// Identifies scheduled publications that are due to flip state.
///
/// The caller is expected to run each returned transition through the
/// `PublicationStateMachine`; nothing is flipped here.
pub struct ScheduledPublicationScanner {
    store: Arc<dyn ContentStore>,
}

impl ScheduledPublicationScanner {
    /// Create a scanner over the given content store.
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// List items whose publish instant has arrived.
    ///
    /// An item is due when its state is still scheduled and its
    /// `scheduled_publish_at` is at or before `now`. Results are ordered
    /// by scheduled instant, oldest first.
    ///
    /// # Arguments
    ///
    /// * `now` - The instant to evaluate schedules against
    pub async fn due_transitions(&self, now: DateTime<Utc>) -> PublicationResult<Vec<DueTransition>> {
        let mut due = Vec::new();

        for review in self.store.list_scheduled_reviews().await? {
            if review.status != ReviewStatus::Scheduled {
                continue;
            }
            if let Some(at) = review.scheduled_publish_at {
                if at <= now {
                    due.push(DueTransition {
                        entity: EntityKind::Review,
                        id: review.id,
                        target: TargetState::Published,
                        scheduled_publish_at: at,
                    });
                }
            }
        }

        for post in self.store.list_scheduled_posts().await? {
            if post.post_status != PostStatus::Scheduled {
                continue;
            }
            if let Some(at) = post.scheduled_publish_at {
                if at <= now {
                    due.push(DueTransition {
                        entity: EntityKind::CommunityPost,
                        id: post.id,
                        target: TargetState::Published,
                        scheduled_publish_at: at,
                    });
                }
            }
        }

        due.sort_by_key(|t| t.scheduled_publish_at);
        Ok(due)
    }
}

#[cfg(all(test, feature = "memory"))]
mod tests {
    use super::*;
    use crate::machine::PublicationStateMachine;
    use crate::review::Review;
    use crate::store::{MemoryContentStore, NewPost};
    use chrono::Duration;
    use meridian_entitlement::AccessLevel;

    #[tokio::test]
    async fn test_due_and_future_items() {
        let store = Arc::new(MemoryContentStore::new());
        let machine = PublicationStateMachine::new(store.clone());
        let scanner = ScheduledPublicationScanner::new(store.clone());

        let due = Review::new("Due review", AccessLevel::Free, Uuid::now_v7());
        let due_id = due.id;
        let future = Review::new("Future review", AccessLevel::Free, Uuid::now_v7());
        let future_id = future.id;
        store.insert_review(due).await;
        store.insert_review(future).await;

        machine
            .schedule_review(due_id, Utc::now() + Duration::milliseconds(5))
            .await
            .unwrap();
        machine
            .schedule_review(future_id, Utc::now() + Duration::hours(6))
            .await
            .unwrap();

        let transitions = scanner
            .due_transitions(Utc::now() + Duration::minutes(1))
            .await
            .unwrap();
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].id, due_id);
        assert_eq!(transitions[0].entity, EntityKind::Review);
        assert_eq!(transitions[0].target, TargetState::Published);
    }

    #[tokio::test]
    async fn test_flipped_items_stop_being_due() {
        let store = Arc::new(MemoryContentStore::new());
        let machine = PublicationStateMachine::new(store.clone());
        let scanner = ScheduledPublicationScanner::new(store.clone());

        let review = Review::new("Review", AccessLevel::Free, Uuid::now_v7());
        let id = review.id;
        store.insert_review(review).await;
        machine
            .schedule_review(id, Utc::now() + Duration::milliseconds(5))
            .await
            .unwrap();

        // The trigger publishes through the machine, as intended
        machine.publish_review(id).await.unwrap();

        let transitions = scanner
            .due_transitions(Utc::now() + Duration::minutes(1))
            .await
            .unwrap();
        assert!(transitions.is_empty());
    }

    #[tokio::test]
    async fn test_due_posts_are_listed_in_schedule_order() {
        let store = Arc::new(MemoryContentStore::new());
        let machine = PublicationStateMachine::new(store.clone());
        let scanner = ScheduledPublicationScanner::new(store.clone());

        let review = Review::new("Review", AccessLevel::Free, Uuid::now_v7());
        let review_id = review.id;
        store.insert_review(review).await;
        let post = store
            .create_post(
                review_id,
                NewPost {
                    title: "Discussion".into(),
                    publish_with_review: false,
                },
            )
            .await
            .unwrap();

        machine
            .schedule_post(post.id, Utc::now() + Duration::milliseconds(10))
            .await
            .unwrap();
        machine
            .schedule_review(review_id, Utc::now() + Duration::milliseconds(5))
            .await
            .unwrap();

        let transitions = scanner
            .due_transitions(Utc::now() + Duration::minutes(1))
            .await
            .unwrap();
        assert_eq!(transitions.len(), 2);
        // Oldest scheduled instant first
        assert_eq!(transitions[0].id, review_id);
        assert_eq!(transitions[1].id, post.id);
        assert_eq!(transitions[1].entity, EntityKind::CommunityPost);
    }
}
