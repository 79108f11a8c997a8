use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use futures::StreamExt;
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::application::services::favicons::{CollectionFailure, FaviconCollector};
use crate::domain::RepositoryError;
use crate::domain::favicons::FaviconUpdate;
use crate::domain::ids::SiteId;
use crate::domain::notifications::{FaviconEvent, FaviconNotifier};
use crate::domain::repositories::SiteRepository;
use crate::domain::sites::Site;

/// What happened to one site during a refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SiteRefresh {
    /// The stored favicon was replaced.
    pub changed: bool,
    pub notified: bool,
    pub event_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub attempted: usize,
    pub changed: usize,
    pub notified: usize,
    pub failed: usize,
}

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Collection(#[from] CollectionFailure),
    #[error("failed to store favicon update: {0}")]
    Storage(#[from] RepositoryError),
}

/// Drives the collector for stored sites: persists its proposals and fires
/// notifications. Shared by the periodic task and the on-demand admin path.
#[derive(Clone)]
pub struct FaviconRefresher {
    site_repo: Arc<dyn SiteRepository>,
    collector: FaviconCollector,
    notifier: Arc<dyn FaviconNotifier>,
    concurrency: usize,
}

impl FaviconRefresher {
    pub fn new(
        site_repo: Arc<dyn SiteRepository>,
        collector: FaviconCollector,
        notifier: Arc<dyn FaviconNotifier>,
        concurrency: usize,
    ) -> Self {
        Self {
            site_repo,
            collector,
            notifier,
            concurrency: concurrency.max(1),
        }
    }

    /// Collect, persist and notify for a single site.
    ///
    /// On resolution failure the attempt metadata is still written before the
    /// error is returned. Nothing is announced unless the update was stored.
    pub async fn refresh_site(
        &self,
        site: &Site,
        force_notify: bool,
    ) -> Result<SiteRefresh, RefreshError> {
        let origin = site.origin.as_deref().unwrap_or_default();
        let outcome = self
            .collector
            .collect(&site.favicon, origin, force_notify, Utc::now())
            .await;

        let result = match outcome {
            Ok(result) => result,
            Err(failure) => {
                let _ = self.persist(site, &failure.attempted).await;
                return Err(failure.into());
            }
        };

        let changed = result
            .updates
            .as_ref()
            .is_some_and(FaviconUpdate::replaces_favicon);
        if let Some(updates) = &result.updates {
            self.persist(site, updates).await?;
        }

        let mut notified = false;
        if result.should_notify
            && let Some(occurred_at) = result.event_at
        {
            let event = FaviconEvent {
                site_id: site.id,
                occurred_at,
            };
            match self.notifier.notify(event).await {
                Ok(()) => notified = true,
                Err(err) => {
                    warn!(error = %err, site_id = %site.id, "failed to send favicon notification");
                }
            }
        }

        Ok(SiteRefresh {
            changed,
            notified,
            event_at: result.event_at,
        })
    }

    /// Refresh every site with an origin using at most `concurrency` workers.
    pub async fn refresh_all(&self) -> RefreshSummary {
        let start = Instant::now();

        let sites = match self.site_repo.list_with_origin().await {
            Ok(sites) => sites,
            Err(err) => {
                error!(error = %err, "failed to list sites for favicon refresh");
                return RefreshSummary::default();
            }
        };

        let outcomes: Vec<_> = futures::stream::iter(sites)
            .map(|site| {
                let refresher = self.clone();
                async move { (site.id, refresher.refresh_current(site.id).await) }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut summary = RefreshSummary {
            attempted: outcomes.len(),
            ..RefreshSummary::default()
        };
        for (site_id, outcome) in outcomes {
            match outcome {
                Ok(refresh) => {
                    summary.changed += usize::from(refresh.changed);
                    summary.notified += usize::from(refresh.notified);
                }
                Err(err) => {
                    summary.failed += 1;
                    warn!(error = %err, %site_id, "favicon refresh failed");
                }
            }
        }

        info!(
            duration_ms = start.elapsed().as_millis(),
            attempted = summary.attempted,
            changed = summary.changed,
            notified = summary.notified,
            failed = summary.failed,
            "favicon refresh complete"
        );
        summary
    }

    /// Reload the site right before collecting so a refresh stored while the
    /// run was queued is compared against.
    async fn refresh_current(&self, id: SiteId) -> Result<SiteRefresh, RefreshError> {
        let site = self.site_repo.get(id).await?;
        self.refresh_site(&site, false).await
    }

    async fn persist(&self, site: &Site, update: &FaviconUpdate) -> Result<(), RepositoryError> {
        self.site_repo
            .apply_favicon_update(site.id, update)
            .await
            .inspect_err(|err| {
                error!(
                    error = %err,
                    site_id = %site.id,
                    fields = ?update.staged_fields(),
                    "failed to store favicon update"
                );
            })
    }
}

/// Periodically refreshes all favicons. Runs as a long-lived background task;
/// spawn with `tokio::spawn`. The first run starts immediately.
pub async fn favicon_refresh_task(refresher: FaviconRefresher, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        refresher.refresh_all().await;
    }
}
