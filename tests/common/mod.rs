#![allow(dead_code)]

use std::sync::Arc;

use tokio::sync::mpsc;
use uuid::Uuid;

use warehouse_workflow::events::{self, Event};
use warehouse_workflow::{
    Actor, ApprovalConfig, EntityStore, InMemoryStore, MaterialRequest, MaterialRequestService,
    Role, StockTransfer, StockTransferService,
};

pub fn actor(role: Role) -> Actor {
    Actor::new(Uuid::new_v4(), role)
}

pub fn request_service() -> (MaterialRequestService, mpsc::Receiver<Event>) {
    let (sender, receiver) = events::channel(64);
    let store: Arc<dyn EntityStore<MaterialRequest>> = Arc::new(InMemoryStore::new());
    let service = MaterialRequestService::new(store, Arc::new(sender), ApprovalConfig::default());
    (service, receiver)
}

pub fn transfer_service() -> (StockTransferService, mpsc::Receiver<Event>) {
    let (sender, receiver) = events::channel(64);
    let store: Arc<dyn EntityStore<StockTransfer>> = Arc::new(InMemoryStore::new());
    let service = StockTransferService::new(store, Arc::new(sender));
    (service, receiver)
}

pub fn drain_events(receiver: &mut mpsc::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}
