use serde::Serialize;

use crate::auth::{Capability, Role};

/// Errors returned by workflow operations.
///
/// Every failure leaves the entity untouched; validation of all guards for a
/// transition completes before any field is mutated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize)]
pub enum WorkflowError {
    /// The entity's current status is not a valid source for the transition.
    #[error("cannot {transition} from status {current}")]
    InvalidTransition {
        transition: &'static str,
        current: String,
    },

    /// The actor's role lacks the capability required by the transition.
    #[error("role {role} lacks capability {capability}")]
    PermissionDenied { role: Role, capability: Capability },

    /// A transition payload violated a guard (empty rejection reason,
    /// over-quantity approval, source == destination, zero items, ...).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Concurrent modification detected by the store's version check.
    /// Callers should reload and retry; the engine never retries itself.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("failed to publish event: {0}")]
    EventError(String),
}
