use crate::api::ForgeApi;
use crate::retry::RetryPolicy;
use crate::types::CommitInfo;

/// Looks up the latest commit of a single path, retrying rate-limited calls
pub struct CommitResolver<'a> {
    api: &'a dyn ForgeApi,
    organization: &'a str,
    policy: &'a RetryPolicy,
}

impl<'a> CommitResolver<'a> {
    pub fn new(api: &'a dyn ForgeApi, organization: &'a str, policy: &'a RetryPolicy) -> Self {
        Self {
            api,
            organization,
            policy,
        }
    }

    /// Resolve the most recent commit touching `path` on `branch`.
    ///
    /// Never fails: a missing history, a terminal error or an exhausted
    /// retry budget all yield `None`. Failures are pushed onto `errors`.
    pub async fn resolve(
        &self,
        repository: &str,
        branch: &str,
        path: &str,
        errors: &mut Vec<String>,
    ) -> Option<CommitInfo> {
        let result = self
            .policy
            .run_api(|attempt| {
                if attempt > 1 {
                    tracing::debug!(
                        "Retrying commit lookup for {}/{} (attempt {})",
                        repository,
                        path,
                        attempt
                    );
                }
                self.api
                    .latest_commit(self.organization, repository, branch, path)
            })
            .await;

        match result {
            Ok(commit) => {
                if commit.is_none() {
                    tracing::debug!("No commit history for {}/{} on {}", repository, path, branch);
                }
                commit
            }
            Err(err) if self.policy.is_retryable(&err) => {
                tracing::warn!(
                    "Giving up on commit lookup for {}/{} after {} attempts: {}",
                    repository,
                    path,
                    self.policy.max_attempts,
                    err
                );
                errors.push(format!(
                    "{}/{}: commit lookup still rate limited after {} attempts: {}",
                    repository, path, self.policy.max_attempts, err
                ));
                None
            }
            Err(err) => {
                tracing::warn!("Commit lookup failed for {}/{}: {}", repository, path, err);
                errors.push(format!("{}/{}: commit lookup failed: {}", repository, path, err));
                None
            }
        }
    }
}
