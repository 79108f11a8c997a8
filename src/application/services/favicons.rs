use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use crate::domain::favicons::{CollectionResult, FaviconUpdate};
use crate::domain::resolver::{FaviconResolver, ResolveError};
use crate::domain::sites::SiteFaviconState;

/// A collection attempt whose resolution failed.
///
/// `attempted` holds the origin and attempt time, which callers still persist.
#[derive(Debug, Error)]
#[error("favicon collection failed: {source}")]
pub struct CollectionFailure {
    pub attempted: FaviconUpdate,
    #[source]
    pub source: ResolveError,
}

/// Turns one resolution attempt into proposed storage updates and a
/// notification decision. Performs no I/O besides calling the resolver.
#[derive(Clone)]
pub struct FaviconCollector {
    resolver: Arc<dyn FaviconResolver>,
}

impl FaviconCollector {
    pub fn new(resolver: Arc<dyn FaviconResolver>) -> Self {
        Self { resolver }
    }

    pub async fn collect(
        &self,
        stored: &SiteFaviconState,
        origin: &str,
        force_notify: bool,
        now: DateTime<Utc>,
    ) -> Result<CollectionResult, CollectionFailure> {
        let origin = origin.trim();
        if origin.is_empty() {
            return Ok(CollectionResult::default());
        }

        let mut updates = FaviconUpdate::attempt(origin, now);

        let asset = match self.resolver.resolve_asset(origin).await {
            Ok(asset) => asset,
            Err(source) => {
                return Err(CollectionFailure {
                    attempted: updates,
                    source,
                });
            }
        };

        let mut should_notify = false;
        match asset {
            Some(asset) if !asset.data.is_empty() => {
                if asset.differs_from(stored) {
                    debug!(origin, content_type = %asset.content_type, "favicon changed");
                    updates.data = Some(asset.data);
                    updates.content_type = Some(asset.content_type);
                    should_notify = true;
                }
                updates.fetched_at = Some(now);
            }
            _ => debug!(origin, "no favicon resolved"),
        }

        if force_notify {
            should_notify = true;
        }

        Ok(CollectionResult {
            updates: Some(updates),
            should_notify,
            event_at: should_notify.then_some(now),
        })
    }
}
