//! Administrative action surface
//!
//! This module maps console action identifiers 1:1 onto the entitlement
//! coordinators and the publication state machine, so the UI layer
//! submits one command type and receives one outcome type regardless of
//! which subsystem does the work.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;
use uuid::Uuid;

use meridian_entitlement::{
    BulkOperation, BulkOperationCoordinator, BulkOperationResult, CellUpdate,
    CellUpdateCoordinator, EffectiveEntitlement, EntitlementError, PrimaryRole, UpdateContext,
    UserDirectory,
};
use meridian_publication::{
    CommunityPost, ContentStore, PublicationError, PublicationStateMachine, Review,
};

use crate::actions::AdminAction;
use crate::retry::Retryable;

/// Admin surface error types.
///
/// Wraps the per-subsystem taxonomies unchanged so callers keep the
/// retryability and code information of the underlying error.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Entitlement subsystem error
    #[error(transparent)]
    Entitlement(#[from] EntitlementError),

    /// Publication subsystem error
    #[error(transparent)]
    Publication(#[from] PublicationError),
}

/// Result type for admin surface operations.
pub type AdminResult<T> = Result<T, AdminError>;

impl AdminError {
    /// Check if this error is safe to retry per caller policy.
    pub fn is_retryable(&self) -> bool {
        match self {
            AdminError::Entitlement(e) => e.is_retryable(),
            AdminError::Publication(e) => e.is_retryable(),
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            AdminError::Entitlement(e) => e.error_code(),
            AdminError::Publication(e) => e.error_code(),
        }
    }
}

impl Retryable for AdminError {
    fn is_retryable(&self) -> bool {
        AdminError::is_retryable(self)
    }
}

/// Review or post targeted by a publication action.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum PublicationTarget {
    /// A review
    Review(Uuid),

    /// A community post
    Post(Uuid),
}

/// A fully-parameterized admin command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AdminCommand {
    /// Set the user's primary role to admin
    Promote {
        /// Target user
        user_id: Uuid,
    },

    /// Set the user's primary role back to practitioner
    Demote {
        /// Target user
        user_id: Uuid,
    },

    /// Attach an additional role grant
    AssignRole {
        /// Target user
        user_id: Uuid,

        /// Role to grant
        role_name: String,

        /// Grant expiry (None = no expiry)
        #[serde(skip_serializing_if = "Option::is_none")]
        expires_at: Option<DateTime<Utc>>,
    },

    /// Revoke an additional role grant
    RevokeRole {
        /// Target user
        user_id: Uuid,

        /// Role to revoke
        role_name: String,
    },

    /// Publish a review or post immediately
    Publish {
        /// Target entity
        target: PublicationTarget,
    },

    /// Schedule a review or post
    Schedule {
        /// Target entity
        target: PublicationTarget,

        /// When to publish
        publish_at: DateTime<Utc>,
    },

    /// Hide a community post
    Hide {
        /// Target post
        post_id: Uuid,
    },

    /// Restore a hidden community post
    Unhide {
        /// Target post
        post_id: Uuid,
    },
}

impl AdminCommand {
    /// The action identifier this command carries.
    pub fn action(&self) -> AdminAction {
        match self {
            Self::Promote { .. } => AdminAction::Promote,
            Self::Demote { .. } => AdminAction::Demote,
            Self::AssignRole { .. } => AdminAction::AssignRole,
            Self::RevokeRole { .. } => AdminAction::RevokeRole,
            Self::Publish { .. } => AdminAction::Publish,
            Self::Schedule { .. } => AdminAction::Schedule,
            Self::Hide { .. } => AdminAction::Hide,
            Self::Unhide { .. } => AdminAction::Unhide,
        }
    }
}

/// Outcome of an admin command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdminOutcome {
    /// The user's freshly resolved entitlement
    Entitlement(EffectiveEntitlement),

    /// The review after the transition
    Review(Review),

    /// The post after the transition
    Post(CommunityPost),
}

/// Unified admin surface.
///
/// Holds the entitlement coordinators and the publication state machine
/// and routes each command to the owning subsystem.
pub struct AdminSurface {
    cells: CellUpdateCoordinator,
    bulk: BulkOperationCoordinator,
    machine: PublicationStateMachine,
}

impl AdminSurface {
    /// Create a surface over the given stores.
    ///
    /// # Arguments
    ///
    /// * `directory` - The user/role store
    /// * `content` - The review/post store
    pub fn new(directory: Arc<dyn UserDirectory>, content: Arc<dyn ContentStore>) -> Self {
        Self {
            cells: CellUpdateCoordinator::new(directory.clone()),
            bulk: BulkOperationCoordinator::new(directory),
            machine: PublicationStateMachine::new(content),
        }
    }

    /// Execute one admin command.
    ///
    /// # Arguments
    ///
    /// * `command` - The command to execute
    /// * `ctx` - Admin identity and console context
    #[instrument(skip(self, command, ctx), fields(action = command.action().as_str()))]
    pub async fn execute(
        &self,
        command: AdminCommand,
        ctx: &UpdateContext,
    ) -> AdminResult<AdminOutcome> {
        match command {
            AdminCommand::Promote { user_id } => {
                let entitlement = self
                    .cells
                    .apply(
                        user_id,
                        CellUpdate::PrimaryRole {
                            role: PrimaryRole::Admin,
                        },
                        ctx,
                    )
                    .await?;
                Ok(AdminOutcome::Entitlement(entitlement))
            }

            AdminCommand::Demote { user_id } => {
                let entitlement = self
                    .cells
                    .apply(
                        user_id,
                        CellUpdate::PrimaryRole {
                            role: PrimaryRole::Practitioner,
                        },
                        ctx,
                    )
                    .await?;
                Ok(AdminOutcome::Entitlement(entitlement))
            }

            AdminCommand::AssignRole {
                user_id,
                role_name,
                expires_at,
            } => {
                let entitlement = self
                    .cells
                    .apply(
                        user_id,
                        CellUpdate::GrantRole {
                            role_name,
                            expires_at,
                        },
                        ctx,
                    )
                    .await?;
                Ok(AdminOutcome::Entitlement(entitlement))
            }

            AdminCommand::RevokeRole { user_id, role_name } => {
                let entitlement = self
                    .cells
                    .apply(user_id, CellUpdate::RevokeRole { role_name }, ctx)
                    .await?;
                Ok(AdminOutcome::Entitlement(entitlement))
            }

            AdminCommand::Publish { target } => match target {
                PublicationTarget::Review(id) => {
                    Ok(AdminOutcome::Review(self.machine.publish_review(id).await?))
                }
                PublicationTarget::Post(id) => {
                    Ok(AdminOutcome::Post(self.machine.publish_post(id).await?))
                }
            },

            AdminCommand::Schedule { target, publish_at } => match target {
                PublicationTarget::Review(id) => Ok(AdminOutcome::Review(
                    self.machine.schedule_review(id, publish_at).await?,
                )),
                PublicationTarget::Post(id) => Ok(AdminOutcome::Post(
                    self.machine.schedule_post(id, publish_at).await?,
                )),
            },

            AdminCommand::Hide { post_id } => {
                Ok(AdminOutcome::Post(self.machine.hide_post(post_id).await?))
            }

            AdminCommand::Unhide { post_id } => {
                Ok(AdminOutcome::Post(self.machine.unhide_post(post_id).await?))
            }
        }
    }

    /// Apply one operation to many users.
    ///
    /// See `BulkOperationCoordinator` for the sequencing and isolation
    /// guarantees.
    pub async fn execute_bulk(
        &self,
        user_ids: &[Uuid],
        operation: BulkOperation,
        ctx: &UpdateContext,
    ) -> AdminResult<BulkOperationResult> {
        Ok(self.bulk.apply_bulk(user_ids, operation, ctx).await?)
    }

    /// The underlying publication state machine.
    ///
    /// Exposed for the scheduled-publication trigger, which flips due
    /// items through the same machine the console uses.
    pub fn publication_machine(&self) -> &PublicationStateMachine {
        &self.machine
    }
}
