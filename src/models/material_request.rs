use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::Versioned;

/// Enum representing the possible statuses of a material request.
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
pub enum RequestStatus {
    #[default]
    Draft,
    Pending,
    Approved,
    PartiallyApproved,
    Rejected,
    Separating,
    Ready,
    Delivered,
    Cancelled,
}

impl RequestStatus {
    /// Terminal statuses admit no further transition.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled | Self::Rejected)
    }
}

/// Request priority. Informational only: it never affects transitions, just
/// the ordering of pending-approval listings.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

/// A line item on a material request.
///
/// Quantity invariants: `approved_qty <= requested_qty` and
/// `delivered_qty <= approved_qty`, both enforced by the transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRequestItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub requested_qty: Decimal,
    pub approved_qty: Option<Decimal>,
    pub separated_qty: Option<Decimal>,
    pub delivered_qty: Option<Decimal>,
    pub unit_price: Decimal,
    pub notes: Option<String>,
}

impl MaterialRequestItem {
    pub fn new(product_id: Uuid, requested_qty: Decimal, unit_price: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id,
            requested_qty,
            approved_qty: None,
            separated_qty: None,
            delivered_qty: None,
            unit_price,
            notes: None,
        }
    }

    /// The quantity ceiling for separation and delivery: the approved
    /// quantity once set, otherwise the requested quantity.
    pub fn approval_ceiling(&self) -> Decimal {
        self.approved_qty.unwrap_or(self.requested_qty)
    }
}

/// A material requisition raised against a contract, optionally scoped to a
/// work front and activity. Mutated only through the workflow transitions;
/// cancellation is a terminal status, never a deletion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialRequest {
    pub id: Uuid,
    /// Human-readable number, `RM-YYYY-NNNN`.
    pub request_number: String,
    pub contract_id: Uuid,
    pub work_front_id: Option<Uuid>,
    pub activity_id: Option<Uuid>,
    pub requester_id: Uuid,
    pub approver_id: Option<Uuid>,
    pub separator_id: Option<Uuid>,
    pub status: RequestStatus,
    pub priority: RequestPriority,
    pub needed_date: Option<DateTime<Utc>>,
    pub items: Vec<MaterialRequestItem>,
    /// Present iff `status == Rejected`; stored exactly as supplied.
    pub rejection_reason: Option<String>,
    pub notes: Option<String>,
    pub total_items: u32,
    pub total_value: Decimal,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub separation_started_at: Option<DateTime<Utc>>,
    pub separated_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MaterialRequest {
    pub fn new(request_number: String, contract_id: Uuid, requester_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            request_number,
            contract_id,
            work_front_id: None,
            activity_id: None,
            requester_id,
            approver_id: None,
            separator_id: None,
            status: RequestStatus::default(),
            priority: RequestPriority::default(),
            needed_date: None,
            items: Vec::new(),
            rejection_reason: None,
            notes: None,
            total_items: 0,
            total_value: Decimal::ZERO,
            submitted_at: None,
            approved_at: None,
            rejected_at: None,
            separation_started_at: None,
            separated_at: None,
            delivered_at: None,
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

impl Versioned for MaterialRequest {
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
