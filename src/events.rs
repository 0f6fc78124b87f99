use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Events emitted by the mutation paths after their transactions commit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    ItemUpserted {
        item_id: Uuid,
        scanned_code: String,
        created: bool,
    },
    StockAdded {
        item_id: Uuid,
        scanned_code: String,
        event_id: Uuid,
        on_hand: i32,
    },
    StockRemoved {
        item_id: Uuid,
        scanned_code: String,
        event_id: Uuid,
        on_hand: i32,
    },
    ZeroStockScan {
        item_id: Uuid,
        scanned_code: String,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Consumes the event stream, logging each event. Runs until every sender is
/// dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::ItemUpserted {
                scanned_code,
                created,
                ..
            } => {
                info!(code = %scanned_code, created = %created, "item upserted");
            }
            Event::StockAdded {
                scanned_code,
                on_hand,
                ..
            } => {
                info!(code = %scanned_code, on_hand = %on_hand, "stock added");
            }
            Event::StockRemoved {
                scanned_code,
                on_hand,
                ..
            } => {
                info!(code = %scanned_code, on_hand = %on_hand, "stock removed");
            }
            Event::ZeroStockScan { scanned_code, .. } => {
                info!(code = %scanned_code, "remove scanned against empty stock");
            }
        }
    }
    warn!("Event channel closed; event processor exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (tx, mut rx) = mpsc::channel(4);
        let sender = EventSender::new(tx);

        sender
            .send(Event::ZeroStockScan {
                item_id: Uuid::new_v4(),
                scanned_code: "X1".into(),
            })
            .await
            .unwrap();

        match rx.recv().await {
            Some(Event::ZeroStockScan { scanned_code, .. }) => assert_eq!(scanned_code, "X1"),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn send_fails_once_receiver_is_dropped() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let sender = EventSender::new(tx);

        let result = sender
            .send(Event::ZeroStockScan {
                item_id: Uuid::new_v4(),
                scanned_code: "X1".into(),
            })
            .await;
        assert!(result.is_err());
    }
}
