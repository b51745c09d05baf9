//! # Meridian Entitlement
//!
//! This crate resolves user entitlements for the Meridian platform,
//! shared by the Compendium admin console and the Commons community app.
//!
//! ## Overview
//!
//! The meridian-entitlement crate handles:
//! - **Roles**: The primary role plus time-bounded additional grants
//! - **Tiers**: Subscription tiers and content access levels
//! - **Resolution**: The single authoritative effective-entitlement
//!   computation over the independently-writable sources
//! - **Cell updates**: Single-attribute administrative edits
//! - **Bulk operations**: Sequential many-user edits with per-item
//!   failure isolation
//!
//! ## Architecture
//!
//! ```text
//! UserRecord
//!   ├─ primary_role ─┐
//!   ├─ tier + window ├─→ EntitlementResolver ─→ EffectiveEntitlement
//!   ├─ RoleGrant[]  ─┘
//!   └─ ClaimsMirror ──→ ConsistencyWarning (reported, never resolved from)
//!
//! CellUpdateCoordinator ─→ UserDirectory ←─ BulkOperationCoordinator
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use chrono::Utc;
//! use meridian_entitlement::{EntitlementResolver, PrimaryRole, RoleGrant, UserRecord};
//! use uuid::Uuid;
//!
//! let granted_by = Uuid::now_v7();
//! let user = UserRecord::new("jo@example.com", PrimaryRole::Practitioner)
//!     .with_grant(RoleGrant::new("admin", granted_by));
//!
//! let entitlement = EntitlementResolver::resolve(&user, Utc::now());
//! assert_eq!(entitlement.role, PrimaryRole::Admin);
//! ```
//!
//! ## Cross-Crate Integration
//!
//! This crate is designed to work with:
//! - `meridian-publication`: Content lifecycle gated by access levels
//! - `meridian-admin`: The administrative action surface
//!
//! ## Feature Flags
//!
//! - `memory`: In-memory `UserDirectory` backend (enabled by default)

pub mod bulk;
pub mod cell_update;
pub mod error;
pub mod resolver;
pub mod roles;
pub mod store;
pub mod tiers;
pub mod user;

// Re-export main types for convenience
pub use bulk::{
    BulkConfig, BulkFailure, BulkOperation, BulkOperationCoordinator, BulkOperationResult,
    BulkSummary,
};
pub use cell_update::{CellUpdate, CellUpdateCoordinator, UpdateContext};
pub use error::{EntitlementError, EntitlementResult};
pub use resolver::{ConsistencyWarning, EffectiveEntitlement, EntitlementResolver};
pub use roles::{PrimaryRole, RoleGrant, ADMIN_ROLE};
pub use store::{UserDirectory, UserUpdate};
pub use tiers::{AccessLevel, SubscriptionTier};
pub use user::{ClaimsMirror, UserRecord};

#[cfg(feature = "memory")]
pub use store::MemoryUserDirectory;
