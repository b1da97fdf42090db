//! Domain entities owned by the workflow engine.

pub mod material_request;
pub mod stock_transfer;

pub use material_request::{
    MaterialRequest, MaterialRequestItem, RequestPriority, RequestStatus,
};
pub use stock_transfer::{StockTransfer, StockTransferItem, TransferStatus};
