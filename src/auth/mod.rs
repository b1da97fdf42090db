//! Roles, capabilities and the approval hierarchy.
//!
//! Authorization is table-driven: a capability maps to the fixed set of
//! roles allowed to perform it, and value-gated approvals compare an amount
//! against per-level limits. Anything not present in a table is denied.

pub mod approval;
pub mod permissions;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use approval::{
    approval_roles, can_approve_amount, required_approval_level, ApprovalConfig, ApprovalLevel,
};
pub use permissions::{
    allowed_roles, has_all_permissions, has_any_permission, has_permission, Capability, Role,
};

/// The identity attempting a transition. Always passed explicitly; the
/// engine performs no ambient session lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }
}
