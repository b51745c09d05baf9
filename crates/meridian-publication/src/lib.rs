//! # Meridian Publication
//!
//! This crate governs the publication lifecycle of reviews and their
//! linked community posts for the Meridian platform, shared by the
//! Compendium admin console and the Commons community app.
//!
//! ## Overview
//!
//! The meridian-publication crate handles:
//! - **Reviews**: Draft → scheduled → published → archived lifecycle
//! - **Community posts**: Linked discussion threads with their own
//!   stored status and a derived, review-gated emitted visibility
//! - **State machine**: Transition validation and application
//! - **Scanning**: A pure query listing scheduled items due to flip
//!
//! ## Architecture
//!
//! ```text
//! Review ──(weak link)──→ CommunityPost
//!   │                        │
//!   └── PublicationStateMachine ──→ ContentStore
//!              │
//!              └── post_visible_to_members(review, post)  (derived)
//!
//! ScheduledPublicationScanner ──→ DueTransition[]  (external trigger flips)
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use uuid::Uuid;
//! use meridian_entitlement::AccessLevel;
//! use meridian_publication::{MemoryContentStore, PublicationStateMachine, Review};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryContentStore::new());
//! let review = Review::new("Beta-blockers in heart failure", AccessLevel::Premium, Uuid::now_v7());
//! let review_id = review.id;
//! store.insert_review(review).await;
//!
//! let machine = PublicationStateMachine::new(store);
//! machine.publish_review(review_id).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Cross-Crate Integration
//!
//! This crate is designed to work with:
//! - `meridian-entitlement`: Access levels gating published content
//! - `meridian-admin`: The administrative action surface
//!
//! ## Feature Flags
//!
//! - `memory`: In-memory `ContentStore` backend (enabled by default)

pub mod error;
pub mod machine;
pub mod post;
pub mod review;
pub mod scanner;
pub mod store;
pub mod visibility;

// Re-export main types for convenience
pub use error::{PublicationError, PublicationResult};
pub use machine::PublicationStateMachine;
pub use post::{CommunityPost, PostStatus, VisibilityLevel};
pub use review::{Review, ReviewStatus};
pub use scanner::{DueTransition, EntityKind, ScheduledPublicationScanner, TargetState};
pub use store::{ContentStore, NewPost};
pub use visibility::post_visible_to_members;

#[cfg(feature = "memory")]
pub use store::MemoryContentStore;
