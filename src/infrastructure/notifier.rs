use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::domain::notifications::{FaviconEvent, FaviconNotifier, NotifyError};

/// Fans favicon events out to in-process subscribers (the push client and
/// event-stream handlers each hold a receiver).
#[derive(Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<FaviconEvent>,
}

impl BroadcastNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FaviconEvent> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl FaviconNotifier for BroadcastNotifier {
    async fn notify(&self, event: FaviconEvent) -> Result<(), NotifyError> {
        // An event with no subscribers is dropped, not an error.
        match self.tx.send(event) {
            Ok(receivers) => debug!(receivers, "favicon event published"),
            Err(broadcast::error::SendError(event)) => {
                debug!(site_id = %event.site_id, "favicon event had no subscribers");
            }
        }
        Ok(())
    }
}

/// Logs every published event until the notifier is dropped.
pub async fn log_favicon_events(mut rx: broadcast::Receiver<FaviconEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => info!(
                site_id = %event.site_id,
                occurred_at = %event.occurred_at,
                "favicon event"
            ),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "favicon event log fell behind");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
