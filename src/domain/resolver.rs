use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::favicons::Asset;

/// Hard failures of a resolution attempt. Missing or unusable icons are not errors.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid origin {origin:?}: {reason}")]
    InvalidOrigin { origin: String, reason: String },
    #[error("favicon resolution exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),
}

/// Locates the favicon of a site from its public origin.
///
/// Implementations hold no per-call state and may be shared across workers.
#[async_trait]
pub trait FaviconResolver: Send + Sync {
    /// URL of the favicon, or the inline `data:` URI when the page embeds it.
    async fn resolve(&self, origin: &str) -> Result<Option<String>, ResolveError>;

    async fn resolve_asset(&self, origin: &str) -> Result<Option<Asset>, ResolveError>;
}
