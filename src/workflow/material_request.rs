//! Material request transitions.

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::{Actor, Capability};
use crate::errors::WorkflowError;
use crate::models::{MaterialRequest, RequestStatus};

use super::{check, TransitionRule};

pub const SUBMIT: TransitionRule<RequestStatus> = TransitionRule {
    name: "submit",
    from: &[RequestStatus::Draft],
    to: RequestStatus::Pending,
    capability: Capability::RequestsSubmit,
};

/// Default target; `approve` downgrades to `PartiallyApproved` when any
/// item is approved below its requested quantity.
pub const APPROVE: TransitionRule<RequestStatus> = TransitionRule {
    name: "approve",
    from: &[RequestStatus::Pending],
    to: RequestStatus::Approved,
    capability: Capability::RequestsApprove,
};

pub const REJECT: TransitionRule<RequestStatus> = TransitionRule {
    name: "reject",
    from: &[RequestStatus::Pending],
    to: RequestStatus::Rejected,
    capability: Capability::RequestsReject,
};

pub const START_SEPARATION: TransitionRule<RequestStatus> = TransitionRule {
    name: "start_separation",
    from: &[RequestStatus::Approved, RequestStatus::PartiallyApproved],
    to: RequestStatus::Separating,
    capability: Capability::RequestsSeparate,
};

pub const COMPLETE_SEPARATION: TransitionRule<RequestStatus> = TransitionRule {
    name: "complete_separation",
    from: &[RequestStatus::Separating],
    to: RequestStatus::Ready,
    capability: Capability::RequestsSeparate,
};

pub const DELIVER: TransitionRule<RequestStatus> = TransitionRule {
    name: "deliver",
    from: &[RequestStatus::Separating, RequestStatus::Ready],
    to: RequestStatus::Delivered,
    capability: Capability::RequestsDeliver,
};

pub const CANCEL: TransitionRule<RequestStatus> = TransitionRule {
    name: "cancel",
    from: &[
        RequestStatus::Draft,
        RequestStatus::Pending,
        RequestStatus::Approved,
        RequestStatus::PartiallyApproved,
        RequestStatus::Separating,
        RequestStatus::Ready,
    ],
    to: RequestStatus::Cancelled,
    capability: Capability::RequestsCancel,
};

pub const RULES: &[TransitionRule<RequestStatus>] = &[
    SUBMIT,
    APPROVE,
    REJECT,
    START_SEPARATION,
    COMPLETE_SEPARATION,
    DELIVER,
    CANCEL,
];

/// Mainline status ordering derived from the transition table.
pub fn progress_order() -> Vec<RequestStatus> {
    super::progress_order(
        RequestStatus::Draft,
        RULES,
        &[RequestStatus::Cancelled, RequestStatus::Rejected],
    )
}

/// Per-item approved quantity supplied at approval time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemApproval {
    pub item_id: Uuid,
    pub approved_qty: Decimal,
}

pub fn submit(request: &mut MaterialRequest, actor: &Actor) -> Result<(), WorkflowError> {
    check(&SUBMIT, request.status, actor)?;
    if request.items.is_empty() {
        return Err(WorkflowError::InvalidArgument(
            "request has no items".into(),
        ));
    }
    let now = Utc::now();
    request.status = RequestStatus::Pending;
    request.submitted_at = Some(now);
    request.updated_at = now;
    Ok(())
}

/// Approves a request, recording the approved quantity of every item.
///
/// Every line item must be covered exactly once. If all approved quantities
/// equal the requested ones the request becomes `Approved`, otherwise
/// `PartiallyApproved`. Any quantity below zero or above the requested
/// quantity aborts the whole transition with no field changed.
pub fn approve(
    request: &mut MaterialRequest,
    actor: &Actor,
    approvals: &[ItemApproval],
) -> Result<(), WorkflowError> {
    check(&APPROVE, request.status, actor)?;

    let mut resolved: Vec<(usize, Decimal)> = Vec::with_capacity(approvals.len());
    for approval in approvals {
        let index = request
            .items
            .iter()
            .position(|item| item.id == approval.item_id)
            .ok_or_else(|| {
                WorkflowError::InvalidArgument(format!(
                    "approval references unknown item {}",
                    approval.item_id
                ))
            })?;
        if resolved.iter().any(|(i, _)| *i == index) {
            return Err(WorkflowError::InvalidArgument(format!(
                "duplicate approval for item {}",
                approval.item_id
            )));
        }
        if approval.approved_qty < Decimal::ZERO {
            return Err(WorkflowError::InvalidArgument(format!(
                "approved quantity for item {} is negative",
                approval.item_id
            )));
        }
        if approval.approved_qty > request.items[index].requested_qty {
            return Err(WorkflowError::InvalidArgument(format!(
                "approved quantity {} exceeds requested quantity {} for item {}",
                approval.approved_qty, request.items[index].requested_qty, approval.item_id
            )));
        }
        resolved.push((index, approval.approved_qty));
    }
    if resolved.len() != request.items.len() {
        return Err(WorkflowError::InvalidArgument(
            "every item must receive an approved quantity".into(),
        ));
    }

    let partial = resolved
        .iter()
        .any(|(index, qty)| *qty < request.items[*index].requested_qty);

    let now = Utc::now();
    for (index, qty) in resolved {
        request.items[index].approved_qty = Some(qty);
    }
    request.status = if partial {
        RequestStatus::PartiallyApproved
    } else {
        RequestStatus::Approved
    };
    request.approver_id = Some(actor.id);
    request.approved_at = Some(now);
    request.updated_at = now;
    Ok(())
}

/// Rejects a request. The reason is stored exactly as supplied.
pub fn reject(
    request: &mut MaterialRequest,
    actor: &Actor,
    reason: &str,
) -> Result<(), WorkflowError> {
    check(&REJECT, request.status, actor)?;
    if reason.trim().is_empty() {
        return Err(WorkflowError::InvalidArgument(
            "rejection reason must not be empty".into(),
        ));
    }
    let now = Utc::now();
    request.status = RequestStatus::Rejected;
    request.rejection_reason = Some(reason.to_string());
    request.approver_id = Some(actor.id);
    request.rejected_at = Some(now);
    request.updated_at = now;
    Ok(())
}

pub fn start_separation(request: &mut MaterialRequest, actor: &Actor) -> Result<(), WorkflowError> {
    check(&START_SEPARATION, request.status, actor)?;
    let now = Utc::now();
    request.status = RequestStatus::Separating;
    request.separator_id = Some(actor.id);
    request.separation_started_at = Some(now);
    request.updated_at = now;
    Ok(())
}

/// Completes separation, recording separated quantities at the approval
/// ceiling of each item.
pub fn complete_separation(
    request: &mut MaterialRequest,
    actor: &Actor,
) -> Result<(), WorkflowError> {
    check(&COMPLETE_SEPARATION, request.status, actor)?;
    let now = Utc::now();
    for item in &mut request.items {
        item.separated_qty = Some(item.approval_ceiling());
    }
    request.status = RequestStatus::Ready;
    request.separated_at = Some(now);
    request.updated_at = now;
    Ok(())
}

/// Delivers a request, recording delivered quantities at the approval
/// ceiling of each item. Allowed straight from `Separating` as well as from
/// `Ready`.
pub fn deliver(request: &mut MaterialRequest, actor: &Actor) -> Result<(), WorkflowError> {
    check(&DELIVER, request.status, actor)?;
    let now = Utc::now();
    for item in &mut request.items {
        item.delivered_qty = Some(item.approval_ceiling());
    }
    request.status = RequestStatus::Delivered;
    request.delivered_at = Some(now);
    request.updated_at = now;
    Ok(())
}

pub fn cancel(request: &mut MaterialRequest, actor: &Actor) -> Result<(), WorkflowError> {
    check(&CANCEL, request.status, actor)?;
    let now = Utc::now();
    request.status = RequestStatus::Cancelled;
    request.cancelled_at = Some(now);
    request.updated_at = now;
    Ok(())
}
