//! Domain events emitted after successful transitions.
//!
//! Consumers (notification, audit) subscribe on the receiving end of the
//! channel; the engine only publishes.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Events that can occur in the workflow engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    MaterialRequestSubmitted(Uuid),
    MaterialRequestApproved { request_id: Uuid, partial: bool },
    MaterialRequestRejected(Uuid),
    MaterialRequestSeparationStarted(Uuid),
    MaterialRequestReady(Uuid),
    MaterialRequestDelivered(Uuid),
    MaterialRequestCancelled(Uuid),
    StockTransferSubmitted(Uuid),
    StockTransferApproved(Uuid),
    StockTransferRejected(Uuid),
    StockTransferShipped(Uuid),
    StockTransferReceived(Uuid),
    StockTransferCancelled(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously.
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Creates a bounded event channel.
pub fn channel(buffer: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (sender, receiver) = mpsc::channel(buffer);
    (EventSender::new(sender), receiver)
}
