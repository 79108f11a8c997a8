use async_trait::async_trait;

use super::RepositoryError;
use crate::domain::favicons::FaviconUpdate;
use crate::domain::ids::SiteId;
use crate::domain::sites::{NewSite, Site};

#[async_trait]
pub trait SiteRepository: Send + Sync {
    async fn insert(&self, site: NewSite) -> Result<Site, RepositoryError>;
    async fn get(&self, id: SiteId) -> Result<Site, RepositoryError>;
    /// Sites with a configured origin, ordered by id.
    async fn list_with_origin(&self) -> Result<Vec<Site>, RepositoryError>;
    /// Write the staged fields of `update` in a single statement.
    async fn apply_favicon_update(
        &self,
        id: SiteId,
        update: &FaviconUpdate,
    ) -> Result<(), RepositoryError>;
}
