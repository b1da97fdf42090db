use std::sync::Arc;

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use uuid::Uuid;
use validator::Validate;

use crate::auth::{has_permission, Actor, Capability};
use crate::errors::WorkflowError;
use crate::events::{Event, EventSender};
use crate::models::{StockTransfer, StockTransferItem, TransferStatus};
use crate::store::EntityStore;
use crate::workflow::stock_transfer as workflow;

pub use crate::workflow::stock_transfer::{ItemReceipt, ItemShipment};

/// Payload for creating a stock transfer (created in `Draft`).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateStockTransfer {
    pub source_location_id: Uuid,
    pub destination_location_id: Uuid,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Payload for adding a line item to a draft transfer.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddTransferItem {
    pub product_id: Uuid,
    pub requested_qty: Decimal,
    pub unit_price: Decimal,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

/// Service for managing inter-location stock transfers.
#[derive(Clone)]
pub struct StockTransferService {
    store: Arc<dyn EntityStore<StockTransfer>>,
    event_sender: Arc<EventSender>,
}

impl StockTransferService {
    pub fn new(store: Arc<dyn EntityStore<StockTransfer>>, event_sender: Arc<EventSender>) -> Self {
        Self {
            store,
            event_sender,
        }
    }

    /// Generates the next transfer number, `TR-YYYY-NNNN`, per year.
    async fn next_transfer_number(&self) -> Result<String, WorkflowError> {
        let prefix = format!("TR-{}-", Utc::now().year());
        let count = self
            .store
            .list()
            .await?
            .iter()
            .filter(|transfer| transfer.transfer_number.starts_with(&prefix))
            .count();
        Ok(format!("{}{:04}", prefix, count + 1))
    }

    /// Creates a new transfer in `Draft`. Source and destination must
    /// already differ at creation time.
    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        input: CreateStockTransfer,
        actor: &Actor,
    ) -> Result<StockTransfer, WorkflowError> {
        if !has_permission(actor.role, Capability::TransfersCreate) {
            return Err(WorkflowError::PermissionDenied {
                role: actor.role,
                capability: Capability::TransfersCreate,
            });
        }
        input
            .validate()
            .map_err(|e| WorkflowError::InvalidArgument(e.to_string()))?;
        if input.source_location_id == input.destination_location_id {
            return Err(WorkflowError::InvalidArgument(
                "source and destination locations must differ".into(),
            ));
        }

        let transfer_number = self.next_transfer_number().await?;
        let mut transfer = StockTransfer::new(
            transfer_number,
            input.source_location_id,
            input.destination_location_id,
            actor.id,
        );
        transfer.notes = input.notes;

        let created = self.store.insert(transfer).await?;
        info!(
            transfer_id = %created.id,
            transfer_number = %created.transfer_number,
            "stock transfer created"
        );
        Ok(created)
    }

    pub async fn get(&self, id: Uuid) -> Result<StockTransfer, WorkflowError> {
        self.store.load(id).await
    }

    pub async fn list(&self) -> Result<Vec<StockTransfer>, WorkflowError> {
        self.store.list().await
    }

    /// Transfers waiting for approval, oldest first.
    pub async fn list_pending_approval(&self) -> Result<Vec<StockTransfer>, WorkflowError> {
        let mut pending: Vec<StockTransfer> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(|transfer| transfer.status == TransferStatus::Pending)
            .collect();
        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(pending)
    }

    /// Adds a line item to a draft transfer and recomputes totals.
    #[instrument(skip(self, item))]
    pub async fn add_item(
        &self,
        id: Uuid,
        item: AddTransferItem,
        actor: &Actor,
    ) -> Result<StockTransfer, WorkflowError> {
        let mut transfer = self.store.load(id).await?;
        if transfer.status != TransferStatus::Draft {
            return Err(WorkflowError::InvalidTransition {
                transition: "add_item",
                current: transfer.status.to_string(),
            });
        }
        if !has_permission(actor.role, Capability::TransfersEdit) {
            return Err(WorkflowError::PermissionDenied {
                role: actor.role,
                capability: Capability::TransfersEdit,
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

        let mut line = StockTransferItem::new(item.product_id, item.requested_qty, item.unit_price);
        line.notes = item.notes;
        transfer.items.push(line);
        transfer.recalculate_totals();
        transfer.updated_at = Utc::now();
        self.store.save(transfer).await
    }

    /// Removes a line item from a draft transfer and recomputes totals.
    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        id: Uuid,
        item_id: Uuid,
        actor: &Actor,
    ) -> Result<StockTransfer, WorkflowError> {
        let mut transfer = self.store.load(id).await?;
        if transfer.status != TransferStatus::Draft {
            return Err(WorkflowError::InvalidTransition {
                transition: "remove_item",
                current: transfer.status.to_string(),
            });
        }
        if !has_permission(actor.role, Capability::TransfersEdit) {
            return Err(WorkflowError::PermissionDenied {
                role: actor.role,
                capability: Capability::TransfersEdit,
            });
        }
        let before = transfer.items.len();
        transfer.items.retain(|item| item.id != item_id);
        if transfer.items.len() == before {
            return Err(WorkflowError::InvalidArgument(format!(
                "item {} does not belong to transfer {}",
                item_id, id
            )));
        }
        transfer.recalculate_totals();
        transfer.updated_at = Utc::now();
        self.store.save(transfer).await
    }

    /// Submits a draft transfer for approval.
    #[instrument(skip(self))]
    pub async fn submit(&self, id: Uuid, actor: &Actor) -> Result<StockTransfer, WorkflowError> {
        let mut transfer = self.store.load(id).await?;
        workflow::submit(&mut transfer, actor)?;
        let saved = self.store.save(transfer).await?;
        self.emit(Event::StockTransferSubmitted(saved.id)).await?;
        info!(transfer_id = %saved.id, "stock transfer submitted");
        Ok(saved)
    }

    /// Approves a pending transfer.
    #[instrument(skip(self))]
    pub async fn approve(&self, id: Uuid, actor: &Actor) -> Result<StockTransfer, WorkflowError> {
        let mut transfer = self.store.load(id).await?;
        workflow::approve(&mut transfer, actor)?;
        let saved = self.store.save(transfer).await?;
        self.emit(Event::StockTransferApproved(saved.id)).await?;
        info!(transfer_id = %saved.id, "stock transfer approved");
        Ok(saved)
    }

    /// Rejects a pending transfer with a reason.
    #[instrument(skip(self, reason))]
    pub async fn reject(
        &self,
        id: Uuid,
        actor: &Actor,
        reason: &str,
    ) -> Result<StockTransfer, WorkflowError> {
        let mut transfer = self.store.load(id).await?;
        workflow::reject(&mut transfer, actor, reason)?;
        let saved = self.store.save(transfer).await?;
        self.emit(Event::StockTransferRejected(saved.id)).await?;
        info!(transfer_id = %saved.id, "stock transfer rejected");
        Ok(saved)
    }

    /// Ships an approved transfer with per-item quantities.
    #[instrument(skip(self, shipments))]
    pub async fn ship(
        &self,
        id: Uuid,
        actor: &Actor,
        shipments: &[ItemShipment],
    ) -> Result<StockTransfer, WorkflowError> {
        let mut transfer = self.store.load(id).await?;
        workflow::ship(&mut transfer, actor, shipments)?;
        let saved = self.store.save(transfer).await?;
        self.emit(Event::StockTransferShipped(saved.id)).await?;
        info!(transfer_id = %saved.id, "stock transfer shipped");
        Ok(saved)
    }

    /// Receives an in-transit transfer with per-item quantities.
    #[instrument(skip(self, receipts))]
    pub async fn receive(
        &self,
        id: Uuid,
        actor: &Actor,
        receipts: &[ItemReceipt],
    ) -> Result<StockTransfer, WorkflowError> {
        let mut transfer = self.store.load(id).await?;
        workflow::receive(&mut transfer, actor, receipts)?;
        let saved = self.store.save(transfer).await?;
        self.emit(Event::StockTransferReceived(saved.id)).await?;
        info!(transfer_id = %saved.id, "stock transfer received");
        Ok(saved)
    }

    /// Cancels a transfer in any non-terminal status.
    #[instrument(skip(self))]
    pub async fn cancel(&self, id: Uuid, actor: &Actor) -> Result<StockTransfer, WorkflowError> {
        let mut transfer = self.store.load(id).await?;
        workflow::cancel(&mut transfer, actor)?;
        let saved = self.store.save(transfer).await?;
        self.emit(Event::StockTransferCancelled(saved.id)).await?;
        info!(transfer_id = %saved.id, "stock transfer cancelled");
        Ok(saved)
    }

    async fn emit(&self, event: Event) -> Result<(), WorkflowError> {
        self.event_sender.send(event).await.map_err(|e| {
            error!("failed to publish stock transfer event: {}", e);
            WorkflowError::EventError(e)
        })
    }
}
