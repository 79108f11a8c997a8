mod data_uri;
mod fetch;
mod links;
mod strategies;

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::favicons::Asset;
use crate::domain::resolver::{FaviconResolver, ResolveError};
use fetch::Fetcher;
use strategies::{IconStrategy, Lookup, Origin, default_chain};

pub use strategies::ResolvedIcon;

pub const DEFAULT_USER_AGENT: &str = "feedbackd-favicon/1.0";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct ResolverConfig {
    pub user_agent: String,
    /// Timeout applied to each individual request of the chain.
    pub request_timeout: Duration,
    /// Upper bound for a whole resolution attempt.
    pub deadline: Duration,
    pub max_body_bytes: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(10),
            deadline: Duration::from_secs(20),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Resolves favicons over HTTP by walking the strategy chain in order.
pub struct HttpFaviconResolver {
    fetcher: Fetcher,
    strategies: Vec<Box<dyn IconStrategy>>,
    deadline: Duration,
}

impl HttpFaviconResolver {
    pub fn new(config: &ResolverConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: reqwest::Client, config: &ResolverConfig) -> Self {
        Self {
            fetcher: Fetcher::new(client, config.request_timeout, config.max_body_bytes),
            strategies: default_chain(),
            deadline: config.deadline,
        }
    }

    async fn run_chain(&self, origin: &Origin) -> Result<Option<ResolvedIcon>, ResolveError> {
        for strategy in &self.strategies {
            match strategy.lookup(&self.fetcher, origin).await? {
                Lookup::Found(icon) => {
                    debug!(strategy = strategy.name(), url = %icon.url, "favicon resolved");
                    return Ok(Some(icon));
                }
                Lookup::Absent => {
                    debug!(strategy = strategy.name(), "no favicon from strategy");
                }
            }
        }
        Ok(None)
    }

    /// Run the chain once, keeping both where the icon came from and its content.
    pub async fn resolve_icon(&self, origin: &str) -> Result<Option<ResolvedIcon>, ResolveError> {
        let origin = Origin::parse(origin)?;
        tokio::time::timeout(self.deadline, self.run_chain(&origin))
            .await
            .map_err(|_| ResolveError::DeadlineExceeded(self.deadline))?
    }
}

#[async_trait]
impl FaviconResolver for HttpFaviconResolver {
    async fn resolve(&self, origin: &str) -> Result<Option<String>, ResolveError> {
        Ok(self.resolve_icon(origin).await?.map(|icon| icon.url))
    }

    async fn resolve_asset(&self, origin: &str) -> Result<Option<Asset>, ResolveError> {
        Ok(self.resolve_icon(origin).await?.map(|icon| icon.asset))
    }
}
