//! Upstream code-hosting API abstraction
//!
//! The crawl engine only talks to [`ForgeApi`]; [`GitHubApi`] is the REST
//! binding used by the binary, [`crate::testing::MockForge`] the in-memory one
//! used by tests.

pub mod github;
pub use github::GitHubApi;

use crate::error::ApiError;
use crate::types::{CommitInfo, DirEntry, Repository};

/// Read-only operations the crawler needs from a code-hosting service
#[async_trait::async_trait]
pub trait ForgeApi: Send + Sync {
    /// Fetch one page (1-based) of the organization's repositories.
    /// An empty page marks the end of the listing.
    async fn list_repositories_page(
        &self,
        organization: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Repository>, ApiError>;

    /// List the entries of a directory on a branch. `path` is relative to the
    /// repository root; the empty string is the root itself.
    async fn list_directory(
        &self,
        organization: &str,
        repository: &str,
        branch: &str,
        path: &str,
    ) -> Result<Vec<DirEntry>, ApiError>;

    /// Most recent commit touching `path` on `branch`, `None` without history
    async fn latest_commit(
        &self,
        organization: &str,
        repository: &str,
        branch: &str,
        path: &str,
    ) -> Result<Option<CommitInfo>, ApiError>;
}
