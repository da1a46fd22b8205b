//! Concurrent organization crawl
//!
//! [`Crawler::crawl`] lists the organization's repositories, walks every
//! repository's tree as its own chain of requests, and merges the per-repository
//! results once all chains have finished. Chains are interleaved on the
//! calling task rather than spawned, so the API client is only borrowed.

mod lister;
mod resolver;
mod walker;

pub use lister::{PAGE_SIZE, list_repositories};
pub use resolver::CommitResolver;
pub use walker::{DirectoryNode, MAX_DEPTH, TreeWalker, WalkOutcome};

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;

use crate::api::ForgeApi;
use crate::config::Config;
use crate::error::{CrawlError, ValidationError};
use crate::retry::RetryPolicy;
use crate::types::{CrawlReport, ExtensionFilter, Repository};

/// Everything that shapes one crawl, fixed for its lifetime
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub organization: String,
    pub filter: ExtensionFilter,
    pub max_depth: usize,
    /// Repositories walked at once; `None` starts all of them immediately
    pub max_concurrent_repos: Option<usize>,
    /// Branch listed instead of each repository's default branch
    pub branch: Option<String>,
    pub retry: RetryPolicy,
}

impl CrawlSettings {
    pub fn new(organization: impl Into<String>, filter: ExtensionFilter) -> Self {
        Self {
            organization: organization.into(),
            filter,
            max_depth: MAX_DEPTH,
            max_concurrent_repos: None,
            branch: None,
            retry: RetryPolicy::default(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            organization: config.github.organization.clone(),
            filter: config.extension_filter(),
            max_depth: config.crawl.max_depth,
            max_concurrent_repos: config.crawl.max_concurrent_repos,
            branch: config.crawl.branch.clone(),
            retry: config.retry_policy(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_concurrent_repos(mut self, limit: Option<usize>) -> Self {
        self.max_concurrent_repos = limit;
        self
    }

    pub fn with_branch(mut self, branch: Option<String>) -> Self {
        self.branch = branch;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Crawl orchestrator
#[derive(Clone)]
pub struct Crawler {
    api: Arc<dyn ForgeApi>,
    settings: Arc<CrawlSettings>,
}

impl Crawler {
    pub fn new(api: Arc<dyn ForgeApi>, settings: CrawlSettings) -> Self {
        Self {
            api,
            settings: Arc::new(settings),
        }
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    /// Crawl the whole organization.
    ///
    /// Fails only when the repository listing fails or the organization or
    /// filter are empty. Per-directory and per-file failures end up in
    /// [`CrawlReport::errors`].
    pub async fn crawl(&self) -> Result<CrawlReport, CrawlError> {
        let start = Instant::now();
        let settings = &*self.settings;
        let api = self.api.as_ref();

        if settings.filter.is_empty() {
            return Err(ValidationError::Empty("extension filter".to_string()).into());
        }

        let repositories = list_repositories(api, &settings.organization).await?;

        let resolver = CommitResolver::new(api, &settings.organization, &settings.retry);
        let walker = TreeWalker::new(
            api,
            &settings.organization,
            &settings.filter,
            settings.max_depth,
            resolver,
        );

        let limit = settings
            .max_concurrent_repos
            .unwrap_or(repositories.len())
            .max(1);
        tracing::info!(
            "Crawling {} repositories of '{}' ({} at a time, max depth {})",
            repositories.len(),
            settings.organization,
            limit,
            settings.max_depth
        );

        // Completion order, not listing order
        let walker = &walker;
        let outcomes: Vec<WalkOutcome> = futures::stream::iter(repositories.iter())
            .map(move |repository| walker.walk_repository(repository, self.branch_for(repository)))
            .buffer_unordered(limit)
            .collect()
            .await;

        let mut files = Vec::new();
        let mut errors = Vec::new();
        for outcome in outcomes {
            files.extend(outcome.files);
            errors.extend(outcome.errors);
        }

        let report = CrawlReport {
            organization: settings.organization.clone(),
            repositories_crawled: repositories.len(),
            files,
            errors,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        tracing::info!(
            "Crawl of '{}' finished: {} repositories, {} files ({} without commit data), {} errors in {} ms",
            report.organization,
            report.repositories_crawled,
            report.files.len(),
            report.unresolved_count(),
            report.errors.len(),
            report.duration_ms
        );

        Ok(report)
    }

    fn branch_for<'r>(&'r self, repository: &'r Repository) -> &'r str {
        self.settings
            .branch
            .as_deref()
            .unwrap_or(&repository.default_branch)
    }
}
