use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{can_approve_amount, has_permission, Actor, ApprovalConfig, Capability};
use crate::errors::WorkflowError;
use crate::events::{Event, EventSender};
use crate::models::{MaterialRequest, MaterialRequestItem, RequestPriority, RequestStatus};
use crate::store::EntityStore;
use crate::workflow::material_request as workflow;

pub use crate::workflow::material_request::ItemApproval;

/// Payload for creating a material request (created in `Draft`).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateMaterialRequest {
    pub contract_id: Uuid,
    pub work_front_id: Option<Uuid>,
    pub activity_id: Option<Uuid>,
    pub priority: Option<RequestPriority>,
    pub needed_date: Option<DateTime<Utc>>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Draft-only header updates; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateMaterialRequest {
    pub work_front_id: Option<Uuid>,
    pub activity_id: Option<Uuid>,
    pub priority: Option<RequestPriority>,
    pub needed_date: Option<DateTime<Utc>>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Payload for adding a line item to a draft request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddRequestItem {
    pub product_id: Uuid,
    pub requested_qty: Decimal,
    pub unit_price: Decimal,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Service for managing material requests.
#[derive(Clone)]
pub struct MaterialRequestService {
    store: Arc<dyn EntityStore<MaterialRequest>>,
    event_sender: Arc<EventSender>,
    approval_config: ApprovalConfig,
}

impl MaterialRequestService {
    pub fn new(
        store: Arc<dyn EntityStore<MaterialRequest>>,
        event_sender: Arc<EventSender>,
        approval_config: ApprovalConfig,
    ) -> Self {
        Self {
            store,
            event_sender,
            approval_config,
        }
    }

    /// Generates the next request number, `RM-YYYY-NNNN`, per year.
    async fn next_request_number(&self) -> Result<String, WorkflowError> {
        let prefix = format!("RM-{}-", Utc::now().year());
        let count = self
            .store
            .list()
            .await?
            .iter()
            .filter(|request| request.request_number.starts_with(&prefix))
            .count();
        Ok(format!("{}{:04}", prefix, count + 1))
    }

    /// Creates a new request in `Draft`.
    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        input: CreateMaterialRequest,
        actor: &Actor,
    ) -> Result<MaterialRequest, WorkflowError> {
        if !has_permission(actor.role, Capability::RequestsCreate) {
            return Err(WorkflowError::PermissionDenied {
                role: actor.role,
                capability: Capability::RequestsCreate,
            });
        }
        input
            .validate()
            .map_err(|e| WorkflowError::InvalidArgument(e.to_string()))?;

        let request_number = self.next_request_number().await?;
        let mut request = MaterialRequest::new(request_number, input.contract_id, actor.id);
        request.work_front_id = input.work_front_id;
        request.activity_id = input.activity_id;
        request.priority = input.priority.unwrap_or_default();
        request.needed_date = input.needed_date;
        request.notes = input.notes;

        let created = self.store.insert(request).await?;
        info!(
            request_id = %created.id,
            request_number = %created.request_number,
            "material request created"
        );
        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<MaterialRequest, WorkflowError> {
        self.store.load(id).await
    }

    pub async fn list(&self) -> Result<Vec<MaterialRequest>, WorkflowError> {
        self.store.list().await
    }

    /// Requests waiting for approval, most urgent first, oldest first
    /// within the same priority.
    pub async fn list_pending_approval(&self) -> Result<Vec<MaterialRequest>, WorkflowError> {
        let mut pending: Vec<MaterialRequest> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|request| request.status == RequestStatus::Pending)
            .collect();
        pending.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.created_at.cmp(&b.created_at))
        });
        Ok(pending)
    }

    /// Updates header fields of a draft request.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateMaterialRequest,
        actor: &Actor,
    ) -> Result<MaterialRequest, WorkflowError> {
        let mut request = self.store.load(id).await?;
        if request.status != RequestStatus::Draft {
            return Err(WorkflowError::InvalidTransition {
                transition: "update",
                current: request.status.to_string(),
            });
        }
        if !has_permission(actor.role, Capability::RequestsEdit) {
            return Err(WorkflowError::PermissionDenied {
                role: actor.role,
                capability: Capability::RequestsEdit,
            });
        }
        input
            .validate()
            .map_err(|e| WorkflowError::InvalidArgument(e.to_string()))?;

        if let Some(work_front_id) = input.work_front_id {
            request.work_front_id = Some(work_front_id);
        }
        if let Some(activity_id) = input.activity_id {
            request.activity_id = Some(activity_id);
        }
        if let Some(priority) = input.priority {
            request.priority = priority;
        }
        if let Some(needed_date) = input.needed_date {
            request.needed_date = Some(needed_date);
        }
        if let Some(notes) = input.notes {
            request.notes = Some(notes);
        }
        request.updated_at = Utc::now();
        self.store.save(request).await
    }

    /// Adds a line item to a draft request and recomputes totals.
    #[instrument(skip(self, item))]
    pub async fn add_item(
        &self,
        id: Uuid,
        item: AddRequestItem,
        actor: &Actor,
    ) -> Result<MaterialRequest, WorkflowError> {
        let mut request = self.store.load(id).await?;
        if request.status != RequestStatus::Draft {
            return Err(WorkflowError::InvalidTransition {
                transition: "add_item",
                current: request.status.to_string(),
            });
        }
        if !has_permission(actor.role, Capability::RequestsEdit) {
            return Err(WorkflowError::PermissionDenied {
                role: actor.role,
                capability: Capability::RequestsEdit,
            });
        }
        if item.requested_qty <= Decimal::ZERO {
            return Err(WorkflowError::InvalidArgument(
                "requested quantity must be positive".into(),
            ));
        }
        if item.unit_price < Decimal::ZERO {
            return Err(WorkflowError::InvalidArgument(
                "unit price must not be negative".into(),
            ));
        }

        let mut line = MaterialRequestItem::new(item.product_id, item.requested_qty, item.unit_price);
        line.notes = item.notes;
        request.items.push(line);
        request.recalculate_totals();
        request.updated_at = Utc::now();
        self.store.save(request).await
    }

    /// Removes a line item from a draft request and recomputes totals.
    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        id: Uuid,
        item_id: Uuid,
        actor: &Actor,
    ) -> Result<MaterialRequest, WorkflowError> {
        let mut request = self.store.load(id).await?;
        if request.status != RequestStatus::Draft {
            return Err(WorkflowError::InvalidTransition {
                transition: "remove_item",
                current: request.status.to_string(),
            });
        }
        if !has_permission(actor.role, Capability::RequestsEdit) {
            return Err(WorkflowError::PermissionDenied {
                role: actor.role,
                capability: Capability::RequestsEdit,
            });
        }
        let before = request.items.len();
        request.items.retain(|item| item.id != item_id);
        if request.items.len() == before {
            return Err(WorkflowError::InvalidArgument(format!(
                "item {} does not belong to request {}",
                item_id, id
            )));
        }
        request.recalculate_totals();
        request.updated_at = Utc::now();
        self.store.save(request).await
    }

    /// Submits a draft request for approval.
    #[instrument(skip(self))]
    pub async fn submit(&self, id: Uuid, actor: &Actor) -> Result<MaterialRequest, WorkflowError> {
        let mut request = self.store.load(id).await?;
        workflow::submit(&mut request, actor)?;
        let saved = self.store.save(request).await?;
        self.emit(Event::MaterialRequestSubmitted(saved.id)).await?;
        info!(request_id = %saved.id, "material request submitted");
        Ok(saved)
    }

    /// Approves a request with per-item quantities.
    ///
    /// On top of `requests.approve`, the actor's role must be allowed to
    /// approve the request's total value under the configured limits.
    #[instrument(skip(self, approvals))]
    pub async fn approve(
        &self,
        id: Uuid,
        actor: &Actor,
        approvals: &[ItemApproval],
    ) -> Result<MaterialRequest, WorkflowError> {
        let mut request = self.store.load(id).await?;
        workflow::approve(&mut request, actor, approvals)?;

        if !can_approve_amount(actor.role, request.total_value, &self.approval_config) {
            error!(
                request_id = %id,
                role = %actor.role,
                total_value = %request.total_value,
                "approval amount exceeds the role's limit"
            );
            return Err(WorkflowError::PermissionDenied {
                role: actor.role,
                capability: Capability::RequestsApprove,
            });
        }

        let partial = request.status == RequestStatus::PartiallyApproved;
        let saved = self.store.save(request).await?;
        self.emit(Event::MaterialRequestApproved {
            request_id: saved.id,
            partial,
        })
        .await?;
        info!(request_id = %saved.id, partial, "material request approved");
        Ok(saved)
    }

    /// Rejects a pending request with a reason.
    #[instrument(skip(self, reason))]
    pub async fn reject(
        &self,
        id: Uuid,
        actor: &Actor,
        reason: &str,
    ) -> Result<MaterialRequest, WorkflowError> {
        let mut request = self.store.load(id).await?;
        workflow::reject(&mut request, actor, reason)?;
        let saved = self.store.save(request).await?;
        self.emit(Event::MaterialRequestRejected(saved.id)).await?;
        info!(request_id = %saved.id, "material request rejected");
        Ok(saved)
    }

    /// Starts warehouse separation of an approved request.
    #[instrument(skip(self))]
    pub async fn start_separation(
        &self,
        id: Uuid,
        actor: &Actor,
    ) -> Result<MaterialRequest, WorkflowError> {
        let mut request = self.store.load(id).await?;
        workflow::start_separation(&mut request, actor)?;
        let saved = self.store.save(request).await?;
        self.emit(Event::MaterialRequestSeparationStarted(saved.id))
            .await?;
        info!(request_id = %saved.id, "material request separation started");
        Ok(saved)
    }

    /// Completes separation; the request becomes ready for delivery.
    #[instrument(skip(self))]
    pub async fn complete_separation(
        &self,
        id: Uuid,
        actor: &Actor,
    ) -> Result<MaterialRequest, WorkflowError> {
        let mut request = self.store.load(id).await?;
        workflow::complete_separation(&mut request, actor)?;
        let saved = self.store.save(request).await?;
        self.emit(Event::MaterialRequestReady(saved.id)).await?;
        info!(request_id = %saved.id, "material request ready for delivery");
        Ok(saved)
    }

    /// Registers delivery of a separated request.
    #[instrument(skip(self))]
    pub async fn deliver(&self, id: Uuid, actor: &Actor) -> Result<MaterialRequest, WorkflowError> {
        let mut request = self.store.load(id).await?;
        workflow::deliver(&mut request, actor)?;
        let saved = self.store.save(request).await?;
        self.emit(Event::MaterialRequestDelivered(saved.id)).await?;
        info!(request_id = %saved.id, "material request delivered");
        Ok(saved)
    }

    /// Cancels a request in any non-terminal status.
    #[instrument(skip(self))]
    pub async fn cancel(&self, id: Uuid, actor: &Actor) -> Result<MaterialRequest, WorkflowError> {
        let mut request = self.store.load(id).await?;
        workflow::cancel(&mut request, actor)?;
        let saved = self.store.save(request).await?;
        self.emit(Event::MaterialRequestCancelled(saved.id)).await?;
        info!(request_id = %saved.id, "material request cancelled");
        Ok(saved)
    }

    async fn emit(&self, event: Event) -> Result<(), WorkflowError> {
        self.event_sender.send(event).await.map_err(|e| {
            error!("failed to publish material request event: {}", e);
            WorkflowError::EventError(e)
        })
    }
}
