//! In-memory [`ForgeApi`] for tests
//!
//! [`MockForge`] serves a scripted organization: a repository list, a map of
//! directory listings and per-path commit responses. Every call is recorded
//! so tests can assert on request counts and order.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};

use crate::api::ForgeApi;
use crate::error::ApiError;
use crate::types::{CommitInfo, DirEntry, EntryKind, Repository};

/// Record of a method call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    ListRepositories { page: u32, per_page: u32 },
    ListDirectory { repository: String, branch: String, path: String },
    LatestCommit { repository: String, branch: String, path: String },
}

#[derive(Default)]
struct MockState {
    repositories: Vec<Repository>,
    listing_error: Option<(u32, ApiError)>,
    directories: HashMap<(String, String), Result<Vec<DirEntry>, ApiError>>,
    commit_scripts: HashMap<(String, String), VecDeque<Result<Option<CommitInfo>, ApiError>>>,
    default_commit: Option<CommitInfo>,
    calls: Vec<MockCall>,
}

/// Scripted code-hosting service
pub struct MockForge {
    state: Mutex<MockState>,
}

impl Default for MockForge {
    fn default() -> Self {
        Self::new()
    }
}

impl MockForge {
    /// An empty organization whose unscripted files resolve to [`sample_commit`]
    pub fn new() -> Self {
        let state = MockState {
            default_commit: Some(sample_commit()),
            ..Default::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    fn with_state(self, f: impl FnOnce(&mut MockState)) -> Self {
        f(&mut self.lock());
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_repository(self, name: &str, default_branch: &str) -> Self {
        self.with_state(|s| s.repositories.push(Repository::new(name, default_branch)))
    }

    /// Fail the repository listing at `page` (1-based)
    pub fn with_listing_error(self, page: u32, error: ApiError) -> Self {
        self.with_state(|s| s.listing_error = Some((page, error)))
    }

    /// Directory contents at `path` (empty for the root). Unscripted
    /// directories answer 404.
    pub fn with_directory(self, repository: &str, path: &str, entries: Vec<DirEntry>) -> Self {
        self.with_state(|s| {
            s.directories
                .insert((repository.to_string(), path.to_string()), Ok(entries));
        })
    }

    pub fn with_directory_error(self, repository: &str, path: &str, error: ApiError) -> Self {
        self.with_state(|s| {
            s.directories
                .insert((repository.to_string(), path.to_string()), Err(error));
        })
    }

    /// Responses returned, in order, by successive commit lookups of `path`.
    /// Once the script runs out the default commit is served.
    pub fn with_commit_responses(
        self,
        repository: &str,
        path: &str,
        responses: Vec<Result<Option<CommitInfo>, ApiError>>,
    ) -> Self {
        self.with_state(|s| {
            s.commit_scripts
                .insert((repository.to_string(), path.to_string()), responses.into());
        })
    }

    /// Commit served for paths without a script; `None` means no history
    pub fn with_default_commit(self, commit: Option<CommitInfo>) -> Self {
        self.with_state(|s| s.default_commit = commit)
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    /// Paths listed in `repository`, in request order
    pub fn listed_paths(&self, repository: &str) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                MockCall::ListDirectory {
                    repository: r,
                    path,
                    ..
                } if r == repository => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of commit lookups issued for `repository`/`path`
    pub fn commit_lookups(&self, repository: &str, path: &str) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| {
                matches!(call, MockCall::LatestCommit { repository: r, path: p, .. }
                    if r == repository && p == path)
            })
            .count()
    }

    pub fn repository_pages_requested(&self) -> Vec<u32> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                MockCall::ListRepositories { page, .. } => Some(*page),
                _ => None,
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl ForgeApi for MockForge {
    async fn list_repositories_page(
        &self,
        organization: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Repository>, ApiError> {
        let mut state = self.lock();
        state.calls.push(MockCall::ListRepositories { page, per_page });

        if let Some((failing_page, error)) = &state.listing_error
            && *failing_page == page
        {
            return Err(error.clone());
        }

        let start = (page.saturating_sub(1) as usize).saturating_mul(per_page as usize);
        tracing::trace!("mock: listing {} page {}", organization, page);
        Ok(state
            .repositories
            .iter()
            .skip(start)
            .take(per_page as usize)
            .cloned()
            .collect())
    }

    async fn list_directory(
        &self,
        organization: &str,
        repository: &str,
        branch: &str,
        path: &str,
    ) -> Result<Vec<DirEntry>, ApiError> {
        let mut state = self.lock();
        state.calls.push(MockCall::ListDirectory {
            repository: repository.to_string(),
            branch: branch.to_string(),
            path: path.to_string(),
        });

        match state
            .directories
            .get(&(repository.to_string(), path.to_string()))
        {
            Some(result) => result.clone(),
            None => Err(ApiError::Status {
                status: 404,
                url: format!("mock://{}/{}/contents/{}", organization, repository, path),
                message: "Not Found".to_string(),
            }),
        }
    }

    async fn latest_commit(
        &self,
        _organization: &str,
        repository: &str,
        branch: &str,
        path: &str,
    ) -> Result<Option<CommitInfo>, ApiError> {
        let mut state = self.lock();
        state.calls.push(MockCall::LatestCommit {
            repository: repository.to_string(),
            branch: branch.to_string(),
            path: path.to_string(),
        });

        let scripted = state
            .commit_scripts
            .get_mut(&(repository.to_string(), path.to_string()))
            .and_then(|script| script.pop_front());

        match scripted {
            Some(response) => response,
            None => Ok(state.default_commit.clone()),
        }
    }
}

/// File entry at `path`; the name is the last path segment
pub fn file(path: &str) -> DirEntry {
    entry(path, EntryKind::File)
}

/// Directory entry at `path`
pub fn dir(path: &str) -> DirEntry {
    entry(path, EntryKind::Dir)
}

/// Symlink or submodule style entry the walker skips
pub fn other(path: &str) -> DirEntry {
    entry(path, EntryKind::Other)
}

fn entry(path: &str, kind: EntryKind) -> DirEntry {
    DirEntry {
        name: path.rsplit('/').next().unwrap_or(path).to_string(),
        path: path.to_string(),
        kind,
        url: format!("https://github.test/blob/{}", path),
    }
}

/// Commit served by default for unscripted paths
pub fn sample_commit() -> CommitInfo {
    commit_by("Ada Lovelace", "ada@example.com", sample_date())
}

pub fn commit_by(name: &str, email: &str, at: DateTime<Utc>) -> CommitInfo {
    CommitInfo {
        author_name: Some(name.to_string()),
        author_email: Some(email.to_string()),
        authored_at: Some(at),
    }
}

fn sample_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
        .single()
        .unwrap_or_default()
}

/// A 403 as GitHub sends for its secondary rate limit
pub fn rate_limited() -> ApiError {
    ApiError::Status {
        status: 403,
        url: "mock://commits".to_string(),
        message: "You have exceeded a secondary rate limit".to_string(),
    }
}
