use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use super::{ResolverArgs, print_json};
use crate::infrastructure::favicon::{HttpFaviconResolver, ResolvedIcon};

#[derive(Debug, Args)]
pub struct ResolveCommand {
    /// Public origin of the site, e.g. https://example.com
    pub origin: String,

    #[command(flatten)]
    pub resolver: ResolverArgs,
}

#[derive(Debug, Serialize)]
struct ResolvedOutput {
    origin: String,
    url: Option<String>,
    content_type: Option<String>,
    size_bytes: Option<usize>,
}

impl ResolvedOutput {
    fn new(origin: String, icon: Option<&ResolvedIcon>) -> Self {
        Self {
            origin,
            url: icon.map(|i| i.url.clone()),
            content_type: icon.map(|i| i.asset.content_type.clone()),
            size_bytes: icon.map(|i| i.asset.data.len()),
        }
    }
}

pub async fn run(command: ResolveCommand) -> Result<()> {
    let resolver = HttpFaviconResolver::new(&command.resolver.to_config())
        .context("failed to build HTTP client")?;
    let origin = command.origin.trim().to_string();

    let icon = resolver
        .resolve_icon(&origin)
        .await
        .with_context(|| format!("failed to resolve favicon for {origin}"))?;

    print_json(&ResolvedOutput::new(origin, icon.as_ref()))
}
