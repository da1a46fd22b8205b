//! Command-line arguments
//!
//! Flags override the configuration file and environment variables.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, OutputFormat, split_list};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_COMMIT_HASH"),
    ", built ",
    env!("BUILD_TIMESTAMP"),
    ")"
);

/// Report the last committer of every matching file across a GitHub organization
#[derive(Debug, Parser)]
#[command(name = "org-crawler", version = VERSION, about)]
pub struct Cli {
    /// Organization to crawl [env: GITHUB_ORG]
    #[arg(short, long)]
    pub org: Option<String>,

    /// File extensions to report, repeatable or comma-separated (e.g. .py,.sql) [env: GITHUB_FILE_TYPE]
    #[arg(short, long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// GitHub token [env: GITHUB_TOKEN]
    #[arg(long, hide = true)]
    pub token: Option<String>,

    /// API base URL, for GitHub Enterprise [env: GITHUB_API_URL]
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Deepest directory level to list; the repository root is 0
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Repositories crawled at once (default: all)
    #[arg(long, value_name = "N")]
    pub max_concurrency: Option<usize>,

    /// List this branch instead of each repository's default branch
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Attempts per commit lookup, including the first
    #[arg(long, value_name = "N")]
    pub max_retries: Option<u32>,

    /// Seconds to wait between rate-limited attempts
    #[arg(long, value_name = "SECS")]
    pub retry_delay: Option<f64>,

    /// HTTP statuses treated as rate limiting, comma-separated (default: 403)
    #[arg(long, value_name = "CODES", value_delimiter = ',')]
    pub retry_on: Vec<u16>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Write the report here instead of stdout
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Configuration file (default: platform config dir/org-crawler/config.toml)
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log per-request detail (overridden by RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Copy every flag that was given onto `config`
    pub fn apply(&self, config: &mut Config) {
        if let Some(org) = &self.org {
            config.github.organization = org.clone();
        }
        if !self.extensions.is_empty() {
            config.crawl.extensions = self.extensions.iter().flat_map(|e| split_list(e)).collect();
        }
        if let Some(token) = &self.token {
            config.github.token = Some(token.clone());
        }
        if let Some(url) = &self.api_url {
            config.github.api_url = url.clone();
        }
        if let Some(depth) = self.max_depth {
            config.crawl.max_depth = depth;
        }
        if let Some(limit) = self.max_concurrency {
            config.crawl.max_concurrent_repos = Some(limit);
        }
        if let Some(branch) = &self.branch {
            config.crawl.branch = Some(branch.clone());
        }
        if let Some(attempts) = self.max_retries {
            config.retry.max_attempts = attempts;
        }
        if let Some(delay) = self.retry_delay {
            config.retry.delay_secs = delay;
        }
        if !self.retry_on.is_empty() {
            config.retry.retry_on = self.retry_on.clone();
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(path) = &self.output {
            config.output.path = Some(path.clone());
        }
    }
}
