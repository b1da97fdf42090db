//! Stock transfer transitions.
//!
//! Deliberately not unified with the material request table: transfers ship
//! and receive only along the single `Approved -> InTransit -> Received`
//! path, while requests may deliver from either separation state.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{Actor, Capability};
use crate::errors::WorkflowError;
use crate::models::{StockTransfer, TransferStatus};

use super::{check, TransitionRule};

pub const SUBMIT: TransitionRule<TransferStatus> = TransitionRule {
    name: "submit",
    from: &[TransferStatus::Draft],
    to: TransferStatus::Pending,
    capability: Capability::TransfersSubmit,
};

pub const APPROVE: TransitionRule<TransferStatus> = TransitionRule {
    name: "approve",
    from: &[TransferStatus::Pending],
    to: TransferStatus::Approved,
    capability: Capability::TransfersApprove,
};

pub const REJECT: TransitionRule<TransferStatus> = TransitionRule {
    name: "reject",
    from: &[TransferStatus::Pending],
    to: TransferStatus::Rejected,
    capability: Capability::TransfersReject,
};

pub const SHIP: TransitionRule<TransferStatus> = TransitionRule {
    name: "ship",
    from: &[TransferStatus::Approved],
    to: TransferStatus::InTransit,
    capability: Capability::TransfersShip,
};

pub const RECEIVE: TransitionRule<TransferStatus> = TransitionRule {
    name: "receive",
    from: &[TransferStatus::InTransit],
    to: TransferStatus::Received,
    capability: Capability::TransfersReceive,
};

pub const CANCEL: TransitionRule<TransferStatus> = TransitionRule {
    name: "cancel",
    from: &[
        TransferStatus::Draft,
        TransferStatus::Pending,
        TransferStatus::Approved,
        TransferStatus::InTransit,
    ],
    to: TransferStatus::Cancelled,
    capability: Capability::TransfersCancel,
};

pub const RULES: &[TransitionRule<TransferStatus>] =
    &[SUBMIT, APPROVE, REJECT, SHIP, RECEIVE, CANCEL];

/// Mainline status ordering derived from the transition table.
pub fn progress_order() -> Vec<TransferStatus> {
    super::progress_order(
        TransferStatus::Draft,
        RULES,
        &[TransferStatus::Cancelled, TransferStatus::Rejected],
    )
}

/// Per-item shipped quantity supplied at ship time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemShipment {
    pub item_id: Uuid,
    pub shipped_qty: Decimal,
}

/// Per-item received quantity supplied at receive time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemReceipt {
    pub item_id: Uuid,
    pub received_qty: Decimal,
}

pub fn submit(transfer: &mut StockTransfer, actor: &Actor) -> Result<(), WorkflowError> {
    check(&SUBMIT, transfer.status, actor)?;
    if transfer.items.is_empty() {
        return Err(WorkflowError::InvalidArgument(
            "transfer has no items".into(),
        ));
    }
    if transfer.source_location_id == transfer.destination_location_id {
        return Err(WorkflowError::InvalidArgument(
            "source and destination locations must differ".into(),
        ));
    }
    let now = Utc::now();
    transfer.status = TransferStatus::Pending;
    transfer.submitted_at = Some(now);
    transfer.updated_at = now;
    Ok(())
}

pub fn approve(transfer: &mut StockTransfer, actor: &Actor) -> Result<(), WorkflowError> {
    check(&APPROVE, transfer.status, actor)?;
    let now = Utc::now();
    transfer.status = TransferStatus::Approved;
    transfer.approver_id = Some(actor.id);
    transfer.approved_at = Some(now);
    transfer.updated_at = now;
    Ok(())
}

/// Rejects a transfer. The reason is stored exactly as supplied.
pub fn reject(
    transfer: &mut StockTransfer,
    actor: &Actor,
    reason: &str,
) -> Result<(), WorkflowError> {
    check(&REJECT, transfer.status, actor)?;
    if reason.trim().is_empty() {
        return Err(WorkflowError::InvalidArgument(
            "rejection reason must not be empty".into(),
        ));
    }
    let now = Utc::now();
    transfer.status = TransferStatus::Rejected;
    transfer.rejection_reason = Some(reason.to_string());
    transfer.approver_id = Some(actor.id);
    transfer.rejected_at = Some(now);
    transfer.updated_at = now;
    Ok(())
}

/// Ships a transfer, recording the shipped quantity of every item.
/// Each shipped quantity must not exceed the requested quantity.
pub fn ship(
    transfer: &mut StockTransfer,
    actor: &Actor,
    shipments: &[ItemShipment],
) -> Result<(), WorkflowError> {
    check(&SHIP, transfer.status, actor)?;

    let mut resolved: Vec<(usize, Decimal)> = Vec::with_capacity(shipments.len());
    for shipment in shipments {
        let index = transfer
            .items
            .iter()
            .position(|item| item.id == shipment.item_id)
            .ok_or_else(|| {
                WorkflowError::InvalidArgument(format!(
                    "shipment references unknown item {}",
                    shipment.item_id
                ))
            })?;
        if resolved.iter().any(|(i, _)| *i == index) {
            return Err(WorkflowError::InvalidArgument(format!(
                "duplicate shipment for item {}",
                shipment.item_id
            )));
        }
        if shipment.shipped_qty < Decimal::ZERO {
            return Err(WorkflowError::InvalidArgument(format!(
                "shipped quantity for item {} is negative",
                shipment.item_id
            )));
        }
        if shipment.shipped_qty > transfer.items[index].requested_qty {
            return Err(WorkflowError::InvalidArgument(format!(
                "shipped quantity {} exceeds requested quantity {} for item {}",
                shipment.shipped_qty, transfer.items[index].requested_qty, shipment.item_id
            )));
        }
        resolved.push((index, shipment.shipped_qty));
    }
    if resolved.len() != transfer.items.len() {
        return Err(WorkflowError::InvalidArgument(
            "every item must receive a shipped quantity".into(),
        ));
    }

    let now = Utc::now();
    for (index, qty) in resolved {
        transfer.items[index].shipped_qty = Some(qty);
    }
    transfer.status = TransferStatus::InTransit;
    transfer.shipped_at = Some(now);
    transfer.updated_at = now;
    Ok(())
}

/// Receives a transfer, recording the received quantity of every item.
/// Each received quantity must not exceed the shipped quantity.
pub fn receive(
    transfer: &mut StockTransfer,
    actor: &Actor,
    receipts: &[ItemReceipt],
) -> Result<(), WorkflowError> {
    check(&RECEIVE, transfer.status, actor)?;

    let mut resolved: Vec<(usize, Decimal)> = Vec::with_capacity(receipts.len());
    for receipt in receipts {
        let index = transfer
            .items
            .iter()
            .position(|item| item.id == receipt.item_id)
            .ok_or_else(|| {
                WorkflowError::InvalidArgument(format!(
                    "receipt references unknown item {}",
                    receipt.item_id
                ))
            })?;
        if resolved.iter().any(|(i, _)| *i == index) {
            return Err(WorkflowError::InvalidArgument(format!(
                "duplicate receipt for item {}",
                receipt.item_id
            )));
        }
        let shipped = transfer.items[index].shipped_qty.ok_or_else(|| {
            WorkflowError::InvalidArgument(format!(
                "item {} has no shipped quantity recorded",
                receipt.item_id
            ))
        })?;
        if receipt.received_qty < Decimal::ZERO {
            return Err(WorkflowError::InvalidArgument(format!(
                "received quantity for item {} is negative",
                receipt.item_id
            )));
        }
        if receipt.received_qty > shipped {
            return Err(WorkflowError::InvalidArgument(format!(
                "received quantity {} exceeds shipped quantity {} for item {}",
                receipt.received_qty, shipped, receipt.item_id
            )));
        }
        resolved.push((index, receipt.received_qty));
    }
    if resolved.len() != transfer.items.len() {
        return Err(WorkflowError::InvalidArgument(
            "every item must receive a received quantity".into(),
        ));
    }

    let now = Utc::now();
    for (index, qty) in resolved {
        transfer.items[index].received_qty = Some(qty);
    }
    transfer.status = TransferStatus::Received;
    transfer.received_at = Some(now);
    transfer.updated_at = now;
    Ok(())
}

pub fn cancel(transfer: &mut StockTransfer, actor: &Actor) -> Result<(), WorkflowError> {
    check(&CANCEL, transfer.status, actor)?;
    let now = Utc::now();
    transfer.status = TransferStatus::Cancelled;
    transfer.cancelled_at = Some(now);
    transfer.updated_at = now;
    Ok(())
}
