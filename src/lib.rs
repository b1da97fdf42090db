//! Warehouse Workflow Library
//!
//! Approval workflow engine for material requisitions and inter-location
//! stock transfers. The crate provides a pure, table-driven transition core
//! plus an async service layer over a pluggable entity store; persistence,
//! identity resolution and notification delivery are the embedding host's
//! concern.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod errors;
pub mod events;
pub mod models;
pub mod services;
pub mod store;
pub mod workflow;

pub use auth::{Actor, ApprovalConfig, ApprovalLevel, Capability, Role};
pub use config::{init_tracing, AppConfig};
pub use errors::WorkflowError;
pub use events::{Event, EventSender};
pub use models::{
    MaterialRequest, MaterialRequestItem, RequestPriority, RequestStatus, StockTransfer,
    StockTransferItem, TransferStatus,
};
pub use services::{MaterialRequestService, StockTransferService};
pub use store::{EntityStore, InMemoryStore, Versioned};
