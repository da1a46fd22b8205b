//! # org-crawler - last-committer report for a GitHub organization
//!
//! Lists every repository of an organization, walks each repository's tree
//! down to a fixed depth, and for every file whose name matches one of the
//! configured extensions looks up the most recent commit touching it.
//!
//! ## Overview
//!
//! ```text
//! Crawler ──► list_repositories (paged, 100 per page)
//!    │
//!    ├──► TreeWalker (repo 1) ──► CommitResolver ──► RetryPolicy
//!    ├──► TreeWalker (repo 2) ──► ...
//!    └──► TreeWalker (repo N)
//!            │
//!            ▼
//!      merged CrawlReport ──► report::write_report
//! ```
//!
//! Repository traversals run concurrently; inside one repository the walk is
//! sequential and depth-first. A failed repository listing aborts the crawl.
//! A failed directory listing or commit lookup only drops that subtree or
//! leaves that file's committer fields empty.
//!
//! ## Usage Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use org_crawler::api::GitHubApi;
//! use org_crawler::config::Config;
//! use org_crawler::crawl::{CrawlSettings, Crawler};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut config = Config::default();
//!     config.github.organization = "acme".to_string();
//!     config.github.token = std::env::var("GITHUB_TOKEN").ok();
//!     config.crawl.extensions = vec![".py".to_string()];
//!     config.validate()?;
//!
//!     let api = GitHubApi::new(&config.github)?;
//!     let crawler = Crawler::new(Arc::new(api), CrawlSettings::from_config(&config));
//!     let report = crawler.crawl().await?;
//!     println!("{} matching files", report.files.len());
//!     Ok(())
//! }
//! ```

/// Upstream API trait and the GitHub REST binding
pub mod api;

/// Command-line arguments
pub mod cli;

/// Configuration management with environment variable overrides
pub mod config;

/// Repository listing, tree walking, commit resolution and orchestration
pub mod crawl;

/// Error types and utilities
pub mod error;

/// Platform config file location
pub mod paths;

/// Report rendering and output
pub mod report;

/// Bounded retry with pluggable backoff
pub mod retry;

/// In-memory API fake for tests
pub mod testing;

/// Domain types shared across the crate
pub mod types;

pub use crawl::{CrawlSettings, Crawler};
pub use error::{ApiError, CrawlError};
pub use types::{CrawlReport, FileRecord, Repository};
