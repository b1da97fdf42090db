use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::Role;

/// Value-based approval levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum ApprovalLevel {
    #[serde(rename = "LEVEL_1")]
    #[strum(serialize = "LEVEL_1")]
    Level1,
    #[serde(rename = "LEVEL_2")]
    #[strum(serialize = "LEVEL_2")]
    Level2,
    #[serde(rename = "LEVEL_3")]
    #[strum(serialize = "LEVEL_3")]
    Level3,
}

/// Per-level approval limits. Amounts up to `level1_limit` need level 1,
/// up to `level2_limit` level 2, anything above level 3.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApprovalConfig {
    pub level1_limit: Decimal,
    pub level2_limit: Decimal,
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            level1_limit: dec!(10_000),
            level2_limit: dec!(50_000),
        }
    }
}

/// Determines the approval level required for an amount.
pub fn required_approval_level(amount: Decimal, config: &ApprovalConfig) -> ApprovalLevel {
    if amount <= config.level1_limit {
        ApprovalLevel::Level1
    } else if amount <= config.level2_limit {
        ApprovalLevel::Level2
    } else {
        ApprovalLevel::Level3
    }
}

/// Roles that may approve at a given level. Roles not listed for the
/// required level are denied; there is no fallback entry.
pub fn approval_roles(level: ApprovalLevel) -> &'static [Role] {
    match level {
        ApprovalLevel::Level1 => &[Role::Supervisor, Role::ContractManager, Role::Admin],
        ApprovalLevel::Level2 => &[Role::ContractManager, Role::Admin],
        ApprovalLevel::Level3 => &[Role::Admin],
    }
}

/// Checks whether a role may approve a specific amount.
pub fn can_approve_amount(role: Role, amount: Decimal, config: &ApprovalConfig) -> bool {
    approval_roles(required_approval_level(amount, config)).contains(&role)
}
