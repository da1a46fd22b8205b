use super::resolver::CommitResolver;
use crate::api::ForgeApi;
use crate::types::{EntryKind, ExtensionFilter, FileRecord, Repository};

/// Default traversal bound; the repository root is depth 0
pub const MAX_DEPTH: usize = 5;

/// One pending directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryNode {
    /// Path relative to the repository root, empty for the root
    pub path: String,
    pub depth: usize,
}

/// Files and non-fatal errors collected from one traversal
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub files: Vec<FileRecord>,
    pub errors: Vec<String>,
}

/// Depth-bounded, depth-first walk over one repository's tree
///
/// Uses an explicit stack instead of recursion. Each directory's matching
/// files are emitted in listing order, then its subdirectories are visited
/// one full subtree at a time, so every directory's files stay contiguous.
pub struct TreeWalker<'a> {
    api: &'a dyn ForgeApi,
    organization: &'a str,
    filter: &'a ExtensionFilter,
    max_depth: usize,
    resolver: CommitResolver<'a>,
}

impl<'a> TreeWalker<'a> {
    pub fn new(
        api: &'a dyn ForgeApi,
        organization: &'a str,
        filter: &'a ExtensionFilter,
        max_depth: usize,
        resolver: CommitResolver<'a>,
    ) -> Self {
        Self {
            api,
            organization,
            filter,
            max_depth,
            resolver,
        }
    }

    /// Walk a repository from its root
    pub async fn walk_repository(&self, repository: &Repository, branch: &str) -> WalkOutcome {
        let outcome = self.walk_from(&repository.name, branch, "", 0).await;
        tracing::info!(
            "Crawled {} on {}: {} matching files, {} errors",
            repository.name,
            branch,
            outcome.files.len(),
            outcome.errors.len()
        );
        outcome
    }

    /// Walk the subtree at `start`, which sits at `depth` below the root.
    /// Nodes deeper than the bound are never listed.
    pub async fn walk_from(
        &self,
        repository: &str,
        branch: &str,
        start: &str,
        depth: usize,
    ) -> WalkOutcome {
        let mut outcome = WalkOutcome::default();
        let mut stack = vec![DirectoryNode {
            path: start.to_string(),
            depth,
        }];

        while let Some(node) = stack.pop() {
            if node.depth > self.max_depth {
                tracing::debug!(
                    "Not descending into {}/{}: depth {} exceeds {}",
                    repository,
                    node.path,
                    node.depth,
                    self.max_depth
                );
                continue;
            }

            let entries = match self
                .api
                .list_directory(self.organization, repository, branch, &node.path)
                .await
            {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::warn!(
                        "Failed to list {}/{} on {}: {}",
                        repository,
                        display_path(&node.path),
                        branch,
                        err
                    );
                    outcome.errors.push(format!(
                        "{}/{}: listing failed: {}",
                        repository,
                        display_path(&node.path),
                        err
                    ));
                    continue;
                }
            };

            let mut subdirs = Vec::new();
            for entry in entries {
                match entry.kind {
                    EntryKind::File if self.filter.matches(&entry.name) => {
                        let commit = self
                            .resolver
                            .resolve(repository, branch, &entry.path, &mut outcome.errors)
                            .await;
                        outcome.files.push(FileRecord::new(
                            self.organization,
                            repository,
                            branch,
                            &entry,
                            commit,
                        ));
                    }
                    EntryKind::File => {}
                    EntryKind::Dir => subdirs.push(DirectoryNode {
                        path: entry.path,
                        depth: node.depth + 1,
                    }),
                    EntryKind::Other => {
                        tracing::debug!("Skipping {}/{}", repository, entry.path);
                    }
                }
            }

            // Reversed so the first listed subdirectory is popped first
            stack.extend(subdirs.into_iter().rev());
        }

        outcome
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "<root>" } else { path }
}
