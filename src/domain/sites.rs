use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ids::SiteId;

/// A site that embeds the feedback widget.
#[derive(Debug, Clone)]
pub struct Site {
    pub id: SiteId,
    pub name: String,
    /// Public base URL the favicon pipeline fetches from.
    pub origin: Option<String>,
    pub favicon: SiteFaviconState,
    /// Origin used by the most recent favicon attempt.
    pub favicon_origin: Option<String>,
    pub favicon_last_attempt_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Persisted favicon fields of a site. `fetched_at` is `None` until a fetch has succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteFaviconState {
    pub data: Vec<u8>,
    pub content_type: String,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl SiteFaviconState {
    pub fn has_favicon(&self) -> bool {
        !self.data.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSite {
    pub name: String,
    #[serde(default)]
    pub origin: Option<String>,
}

impl NewSite {
    pub fn normalize(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.origin = self
            .origin
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty());
        self
    }
}
