use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Domain events emitted after a transfer operation commits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    StockAdded {
        item_id: Uuid,
        quantity: i32,
        performed_by: Uuid,
    },
    StockAssigned {
        assignment_id: Uuid,
        volunteer_id: Uuid,
        line_count: usize,
    },
    StockReturned {
        volunteer_id: Uuid,
        line_count: usize,
    },
    DistributionRecorded {
        distribution_id: Uuid,
        request_id: String,
        volunteer_id: Uuid,
    },
    DamageReported {
        item_id: Uuid,
        quantity: i32,
        volunteer_id: Uuid,
    },
    ItemCreated(Uuid),
    ItemDeactivated(Uuid),
    CampaignCreated(Uuid),
    UserCreated(Uuid),
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Post-commit notification. The operation already committed, so a full
    /// channel or stopped consumer must not fail the request.
    pub async fn notify(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!("Dropping domain event: {}", e);
        }
    }
}

/// Consumes and logs domain events. Spawned once at startup.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::DistributionRecorded {
                distribution_id,
                request_id,
                volunteer_id,
            } => {
                info!(
                    %distribution_id,
                    %request_id,
                    %volunteer_id,
                    "distribution recorded"
                );
            }
            Event::DamageReported {
                item_id,
                quantity,
                volunteer_id,
            } => {
                warn!(%item_id, quantity, %volunteer_id, "damage reported");
            }
            other => info!(event = ?other, "domain event"),
        }
    }

    info!("Event processing loop stopped");
}
