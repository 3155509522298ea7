use std::time::Duration;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "attsweep", about = "Bulk attachment cleanup for issue trackers")]
pub struct CliConfig {
    /// Base URL of the tracker, e.g. https://example.backlog.com
    #[arg(long, env = "ATTSWEEP_BASE_URL")]
    pub base_url: String,

    /// API key used for every request
    #[arg(long, env = "ATTSWEEP_API_KEY")]
    pub api_key: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    /// Concurrent per-issue fetches during a scan
    #[arg(long, default_value = "4")]
    pub fetch_concurrency: usize,

    /// Concurrent delete requests during a sweep
    #[arg(long, default_value = "3")]
    pub delete_concurrency: usize,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Verify credentials and list accessible projects
    Check,

    /// List accessible projects
    Projects,

    /// List every attachment of a project
    Scan {
        /// Numeric project id
        #[arg(long)]
        project: u64,

        /// Lower issue-key bound, e.g. PROJ-10 (requires --to)
        #[arg(long, default_value = "")]
        from: String,

        /// Upper issue-key bound, e.g. PROJ-25 (requires --from)
        #[arg(long, default_value = "")]
        to: String,
    },

    /// Delete attachments of a project
    Sweep {
        /// Numeric project id
        #[arg(long)]
        project: u64,

        /// Lower issue-key bound (requires --to)
        #[arg(long, default_value = "")]
        from: String,

        /// Upper issue-key bound (requires --from)
        #[arg(long, default_value = "")]
        to: String,

        /// Delete every attachment found
        #[arg(long, conflicts_with = "key")]
        all: bool,

        /// Delete a specific attachment, as ISSUEID:ATTACHMENTID.
        /// Repeatable.
        #[arg(long)]
        key: Vec<String>,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

impl CliConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn engine_config(&self) -> attsweep_engine::EngineConfig {
        attsweep_engine::EngineConfig {
            fetch_concurrency: self.fetch_concurrency,
            delete_concurrency: self.delete_concurrency,
            ..attsweep_engine::EngineConfig::default()
        }
    }
}
