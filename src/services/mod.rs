//! Orchestration services.
//!
//! Each operation loads the entity from the store, applies the pure
//! transition, persists the result through the store's version check and
//! publishes a domain event. Serializing concurrent attempts on the same
//! entity id is the caller's job; a `Conflict` from the store means reload
//! and retry.

pub mod material_requests;
pub mod stock_transfers;

pub use material_requests::{
    AddRequestItem, CreateMaterialRequest, MaterialRequestService, UpdateMaterialRequest,
};
pub use stock_transfers::{AddTransferItem, CreateStockTransfer, StockTransferService};
