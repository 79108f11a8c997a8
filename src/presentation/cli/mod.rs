pub mod resolve;

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::infrastructure::favicon::{DEFAULT_USER_AGENT, ResolverConfig};
use resolve::ResolveCommand;

#[derive(Debug, Parser)]
#[command(author, version, about = "Feedback widget backend: site favicon collection", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the HTTP server and the periodic favicon refresh
    Serve(ServeCommand),

    /// Resolve the favicon of an origin once and print the result
    Resolve(ResolveCommand),
}

#[derive(Debug, Args)]
pub struct ServeCommand {
    #[arg(
        long,
        env = "FEEDBACKD_DATABASE_URL",
        default_value = "sqlite://feedbackd.db"
    )]
    pub database_url: String,

    #[arg(long, env = "FEEDBACKD_BIND_ADDRESS", default_value = "127.0.0.1:3000")]
    pub bind_address: SocketAddr,

    /// Seconds between favicon refresh runs
    #[arg(long, env = "FEEDBACKD_REFRESH_INTERVAL_SECS", default_value_t = 6 * 60 * 60)]
    pub refresh_interval_secs: u64,

    /// Sites refreshed in parallel
    #[arg(long, env = "FEEDBACKD_REFRESH_CONCURRENCY", default_value_t = 8)]
    pub refresh_concurrency: usize,

    #[command(flatten)]
    pub resolver: ResolverArgs,
}

#[derive(Debug, Args)]
pub struct ResolverArgs {
    /// Upper bound for resolving one site, in seconds
    #[arg(long, env = "FEEDBACKD_SITE_TIMEOUT_SECS", default_value_t = 20)]
    pub site_timeout_secs: u64,

    /// Timeout for each outbound request, in seconds
    #[arg(long, env = "FEEDBACKD_REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// Largest response body accepted from a site
    #[arg(long, env = "FEEDBACKD_MAX_BODY_BYTES", default_value_t = 1024 * 1024)]
    pub max_body_bytes: usize,

    #[arg(long, env = "FEEDBACKD_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

impl ResolverArgs {
    pub fn to_config(&self) -> ResolverConfig {
        ResolverConfig {
            user_agent: self.user_agent.clone(),
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
            deadline: Duration::from_secs(self.site_timeout_secs.max(1)),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

pub(crate) fn print_json<T>(value: &T) -> anyhow::Result<()>
where
    T: serde::Serialize,
{
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
