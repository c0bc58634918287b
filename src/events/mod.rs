use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
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

    /// Sends an event without surfacing delivery failures to the caller.
    /// Used for audit records and other fire-and-forget notifications.
    pub async fn send_lossy(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!(error = %e, "dropping event: consumer unavailable");
        }
    }
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Purchase order events
    PurchaseOrderCreated(Uuid),
    PurchaseOrderUpdated(Uuid),
    PurchaseOrderNumberMigrated {
        purchase_order_id: Uuid,
        old_number: String,
        new_number: String,
        assets_repointed: u64,
    },
    PurchaseOrderDeleted {
        purchase_order_id: Uuid,
        po_number: String,
        assets_soft_deleted: u64,
    },

    // Asset events
    AssetCreated(Uuid),
    AssetUpdated(Uuid),
    AssetsSynced {
        po_number: String,
        assets_updated: u64,
    },

    /// Fire-and-forget audit record consumed by the external audit-log sink.
    AssetAudit {
        asset_id: Uuid,
        user_id: Option<Uuid>,
        action: String,
        details: String,
    },
}

impl Event {
    /// Short tag used for logging and metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::PurchaseOrderCreated(_) => "purchase_order_created",
            Event::PurchaseOrderUpdated(_) => "purchase_order_updated",
            Event::PurchaseOrderNumberMigrated { .. } => "purchase_order_number_migrated",
            Event::PurchaseOrderDeleted { .. } => "purchase_order_deleted",
            Event::AssetCreated(_) => "asset_created",
            Event::AssetUpdated(_) => "asset_updated",
            Event::AssetsSynced { .. } => "assets_synced",
            Event::AssetAudit { .. } => "asset_audit",
        }
    }
}

/// Consumes events from the channel, logging each and relaying to an
/// optional broadcast channel for in-process subscribers.
pub async fn process_events(
    mut receiver: mpsc::Receiver<Event>,
    relay: Option<broadcast::Sender<Event>>,
) {
    info!("Event processor started");
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::AssetAudit {
                asset_id,
                user_id,
                action,
                details,
            } => {
                info!(
                    asset_id = %asset_id,
                    user_id = ?user_id,
                    action = %action,
                    details = %details,
                    "audit record"
                );
            }
            other => {
                debug!(kind = other.kind(), "processing event");
            }
        }

        if let Some(relay) = &relay {
            // Broadcast send only fails when there are no subscribers.
            let _ = relay.send(event);
        }
    }
    info!("Event processor stopped");
}
