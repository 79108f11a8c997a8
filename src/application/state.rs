use std::sync::Arc;

use crate::application::services::{FaviconCollector, FaviconRefresher};
use crate::domain::notifications::FaviconNotifier;
use crate::domain::repositories::SiteRepository;
use crate::domain::resolver::FaviconResolver;
use crate::infrastructure::database::Database;
use crate::infrastructure::repositories::sites::SqlSiteRepository;

/// Collaborators that vary between production and test environments.
/// Repositories and services are created from the database pool.
pub struct AppStateConfig {
    pub resolver: Arc<dyn FaviconResolver>,
    pub notifier: Arc<dyn FaviconNotifier>,
    pub refresh_concurrency: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub site_repo: Arc<dyn SiteRepository>,
    pub favicon_refresher: FaviconRefresher,
}

impl AppState {
    pub fn from_database(database: &Database, config: AppStateConfig) -> Self {
        let site_repo: Arc<dyn SiteRepository> =
            Arc::new(SqlSiteRepository::new(database.clone_pool()));

        let collector = FaviconCollector::new(config.resolver);
        let favicon_refresher = FaviconRefresher::new(
            Arc::clone(&site_repo),
            collector,
            config.notifier,
            config.refresh_concurrency,
        );

        Self {
            site_repo,
            favicon_refresher,
        }
    }
}
