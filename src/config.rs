//! Configuration system for org-crawler
//!
//! Supports loading from multiple sources with priority:
//! CLI args > Environment variables > Config file > Defaults
use crate::api::github::DEFAULT_API_URL;
use crate::error::{ConfigError, CrawlError};
use crate::retry::RetryPolicy;
use crate::types::ExtensionFilter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Deepest traversal bound accepted from configuration
pub const MAX_DEPTH_LIMIT: usize = 32;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Upstream API and credential
    #[serde(default)]
    pub github: GitHubConfig,

    /// What to crawl and how wide
    #[serde(default)]
    pub crawl: CrawlConfig,

    /// Commit lookup retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Report output
    #[serde(default)]
    pub output: OutputConfig,
}

/// GitHub API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// Organization whose repositories are crawled
    #[serde(default)]
    pub organization: String,

    /// Personal access token; never written back to disk
    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    /// API base URL (GitHub Enterprise: https://host/api/v3)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Traversal configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// File name suffixes to report (e.g. [".py", ".sql"])
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Deepest directory level listed; the repository root is level 0
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Repositories traversed at once; unset starts them all immediately
    #[serde(default)]
    pub max_concurrent_repos: Option<usize>,

    /// Branch to list instead of each repository's default branch
    #[serde(default)]
    pub branch: Option<String>,
}

/// Retry configuration for rate-limited commit lookups
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per lookup, including the first
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts, in seconds
    #[serde(default = "default_retry_delay_secs")]
    pub delay_secs: f64,

    /// HTTP statuses treated as rate limiting
    #[serde(default = "default_retry_on")]
    pub retry_on: Vec<u16>,
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Destination file; stdout when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Report rendering format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One human-readable line per file
    #[default]
    Text,
    /// The whole report as a pretty-printed JSON document
    Json,
    /// One JSON file record per line
    Jsonl,
}

// Default value functions
fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_user_agent() -> String {
    format!("org-crawler/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_depth() -> usize {
    5
}

fn default_max_attempts() -> u32 {
    crate::retry::DEFAULT_MAX_ATTEMPTS
}

fn default_retry_delay_secs() -> f64 {
    crate::retry::DEFAULT_RETRY_DELAY.as_secs_f64()
}

fn default_retry_on() -> Vec<u16> {
    vec![403]
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            organization: String::new(),
            token: None,
            api_url: default_api_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            extensions: Vec::new(),
            max_depth: default_max_depth(),
            max_concurrent_repos: None,
            branch: None,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            delay_secs: default_retry_delay_secs(),
            retry_on: default_retry_on(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self, CrawlError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()).into());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::LoadFailed(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseFailed(format!("Invalid TOML: {}", e)))?;

        Ok(config)
    }

    /// Load configuration from default location or create default
    pub fn load_or_default() -> Result<Self, CrawlError> {
        let config_path = crate::paths::PlatformPaths::default_config_path();

        if config_path.exists() {
            tracing::info!("Loading config from: {}", config_path.display());
            Self::from_file(&config_path)
        } else {
            tracing::debug!("No config file found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), CrawlError> {
        if self.github.organization.trim().is_empty() {
            return Err(ConfigError::MissingRequired("github.organization".to_string()).into());
        }

        if self.extension_filter().is_empty() {
            return Err(ConfigError::MissingRequired("crawl.extensions".to_string()).into());
        }

        if self.crawl.max_depth > MAX_DEPTH_LIMIT {
            return Err(ConfigError::InvalidValue {
                key: "crawl.max_depth".to_string(),
                reason: format!(
                    "must be at most {}, got {}",
                    MAX_DEPTH_LIMIT, self.crawl.max_depth
                ),
            }
            .into());
        }

        if self.crawl.max_concurrent_repos == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "crawl.max_concurrent_repos".to_string(),
                reason: "must be greater than 0 when set".to_string(),
            }
            .into());
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                key: "retry.max_attempts".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        if Duration::try_from_secs_f64(self.retry.delay_secs).is_err() {
            return Err(ConfigError::InvalidValue {
                key: "retry.delay_secs".to_string(),
                reason: format!(
                    "must be a non-negative number of seconds within range, got {}",
                    self.retry.delay_secs
                ),
            }
            .into());
        }

        if self.github.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "github.timeout_secs".to_string(),
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(org) = lookup("GITHUB_ORG") {
            self.github.organization = org;
        }

        if let Some(token) = lookup("GITHUB_TOKEN") {
            self.github.token = Some(token);
        }

        if let Some(url) = lookup("GITHUB_API_URL") {
            self.github.api_url = url;
        }

        // Comma-separated, e.g. ".py,.sql"
        if let Some(types) = lookup("GITHUB_FILE_TYPE") {
            self.crawl.extensions = split_list(&types);
        }

        if let Some(depth) = lookup("ORG_CRAWLER_MAX_DEPTH")
            && let Ok(depth) = depth.trim().parse()
        {
            self.crawl.max_depth = depth;
        }

        if let Some(limit) = lookup("ORG_CRAWLER_MAX_CONCURRENCY")
            && let Ok(limit) = limit.trim().parse()
        {
            self.crawl.max_concurrent_repos = Some(limit);
        }

        if let Some(delay) = lookup("ORG_CRAWLER_RETRY_DELAY")
            && let Ok(delay) = delay.trim().parse()
        {
            self.retry.delay_secs = delay;
        }
    }

    /// Load the file (explicit path or default location) and apply env overrides
    pub fn load(path: Option<&Path>) -> Result<Self, CrawlError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::load_or_default()?,
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn extension_filter(&self) -> ExtensionFilter {
        ExtensionFilter::new(&self.crawl.extensions)
    }

    /// Retry policy for commit lookups. Out-of-range delays are clamped;
    /// [`Config::validate`] reports them as errors.
    pub fn retry_policy(&self) -> RetryPolicy {
        let delay = Duration::try_from_secs_f64(self.retry.delay_secs).unwrap_or(
            if self.retry.delay_secs > 0.0 {
                Duration::MAX
            } else {
                Duration::ZERO
            },
        );
        RetryPolicy::fixed(self.retry.max_attempts, delay, self.retry.retry_on.clone())
    }
}

/// Split a comma-separated list, dropping blanks
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
