use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::Versioned;

/// Enum representing the possible statuses of a stock transfer.
///
/// `Completed` is accepted as a terminal alias of `Received` for records
/// loaded from older systems; no transition produces it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferStatus {
    #[default]
    Draft,
    Pending,
    Approved,
    Rejected,
    InTransit,
    Received,
    Completed,
    Cancelled,
}

impl TransferStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Received | Self::Completed | Self::Cancelled | Self::Rejected
        )
    }
}

/// A line item on a stock transfer.
///
/// Quantity invariants: `shipped_qty <= requested_qty` and
/// `received_qty <= shipped_qty`, both enforced by the transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockTransferItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub requested_qty: Decimal,
    pub shipped_qty: Option<Decimal>,
    pub received_qty: Option<Decimal>,
    pub unit_price: Decimal,
    pub notes: Option<String>,
}

impl StockTransferItem {
    pub fn new(product_id: Uuid, requested_qty: Decimal, unit_price: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            requested_qty,
            shipped_qty: None,
            received_qty: None,
            unit_price,
            notes: None,
        }
    }
}

/// An inter-location stock transfer. Source and destination must differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockTransfer {
    pub id: Uuid,
    /// Human-readable number, `TR-YYYY-NNNN`.
    pub transfer_number: String,
    pub source_location_id: Uuid,
    pub destination_location_id: Uuid,
    pub requester_id: Uuid,
    pub approver_id: Option<Uuid>,
    pub status: TransferStatus,
    pub items: Vec<StockTransferItem>,
    /// Present iff `status == Rejected`; stored exactly as supplied.
    pub rejection_reason: Option<String>,
    pub notes: Option<String>,
    pub total_items: u32,
    pub total_value: Decimal,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub received_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StockTransfer {
    pub fn new(
        transfer_number: String,
        source_location_id: Uuid,
        destination_location_id: Uuid,
        requester_id: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            transfer_number,
            source_location_id,
            destination_location_id,
            requester_id,
            approver_id: None,
            status: TransferStatus::default(),
            items: Vec::new(),
            rejection_reason: None,
            notes: None,
            total_items: 0,
            total_value: Decimal::ZERO,
            submitted_at: None,
            approved_at: None,
            rejected_at: None,
            shipped_at: None,
            received_at: None,
            cancelled_at: None,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    /// Recomputes derived totals from the line items.
    pub fn recalculate_totals(&mut self) {
        self.total_items = self.items.len() as u32;
        self.total_value = self
            .items
            .iter()
            .map(|item| item.requested_qty * item.unit_price)
            .sum();
    }
}

impl Versioned for StockTransfer {
    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i64 {
        self.version
    }

    fn set_version(&mut self, version: i64) {
        self.version = version;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_transfer_starts_in_draft() {
        let transfer = StockTransfer::new(
            "TR-2026-0001".into(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
        );
        assert_eq!(transfer.status, TransferStatus::Draft);
        assert_eq!(transfer.version, 1);
    }

    #[test]
    fn terminal_statuses() {
        assert!(TransferStatus::Received.is_terminal());
        assert!(TransferStatus::Completed.is_terminal());
        assert!(TransferStatus::Cancelled.is_terminal());
        assert!(TransferStatus::Rejected.is_terminal());
        assert!(!TransferStatus::InTransit.is_terminal());
        assert!(!TransferStatus::Draft.is_terminal());
    }

    #[test]
    fn status_serializes_screaming_snake() {
        let json = serde_json::to_string(&TransferStatus::InTransit).unwrap();
        assert_eq!(json, "\"IN_TRANSIT\"");
    }
}
