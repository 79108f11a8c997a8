use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ids::SiteId;

/// Announces that a site's favicon should be (re)published downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaviconEvent {
    pub site_id: SiteId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification failed: {0}")]
    Failed(String),
}

#[async_trait]
pub trait FaviconNotifier: Send + Sync {
    async fn notify(&self, event: FaviconEvent) -> Result<(), NotifyError>;
}
