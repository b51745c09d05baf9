//! # Meridian Admin
//!
//! This crate provides the administrative action surface for the
//! Meridian platform: the operation identifiers the Compendium console
//! submits, mapped 1:1 onto the entitlement coordinators and the
//! publication state machine.
//!
//! ## Overview
//!
//! The meridian-admin crate handles:
//! - **Actions**: The console's operation identifiers
//! - **Dispatch**: One command type routed to the owning subsystem
//! - **Retry policy**: The sanctioned retry loop for store failures
//!
//! ## Architecture
//!
//! ```text
//! AdminCommand (promote | demote | assign_role | revoke_role |
//!               publish | schedule | hide | unhide)
//!        │
//!   AdminSurface ──→ CellUpdateCoordinator / BulkOperationCoordinator
//!        │                    (meridian-entitlement)
//!        └─────────→ PublicationStateMachine
//!                             (meridian-publication)
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use uuid::Uuid;
//! use meridian_admin::{AdminCommand, AdminSurface};
//! use meridian_entitlement::{MemoryUserDirectory, UpdateContext};
//! use meridian_publication::MemoryContentStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let surface = AdminSurface::new(
//!     Arc::new(MemoryUserDirectory::new()),
//!     Arc::new(MemoryContentStore::new()),
//! );
//!
//! let ctx = UpdateContext::new(Uuid::now_v7());
//! let user_id = Uuid::now_v7();
//! surface.execute(AdminCommand::Promote { user_id }, &ctx).await?;
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod retry;
pub mod surface;

// Re-export main types for convenience
pub use actions::AdminAction;
pub use retry::{with_store_retry, RetryConfig, Retryable};
pub use surface::{AdminCommand, AdminError, AdminOutcome, AdminResult, AdminSurface, PublicationTarget};
