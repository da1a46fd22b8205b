//! GitHub REST v3 binding of [`ForgeApi`]
//!
//! The credential, base URL and default headers are fixed when the client is
//! built and shared by every request of the crawl.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::ForgeApi;
use crate::config::GitHubConfig;
use crate::error::{ApiError, ConfigError, CrawlError};
use crate::types::{CommitInfo, DirEntry, EntryKind, Repository};

/// Public GitHub API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Longest error body excerpt kept in an [`ApiError`]
const MAX_ERROR_BODY: usize = 200;

/// Reqwest-backed GitHub client
pub struct GitHubApi {
    client: Client,
    base_url: Url,
}

impl GitHubApi {
    /// Build a client from the `[github]` configuration section
    pub fn new(config: &GitHubConfig) -> Result<Self, CrawlError> {
        let token = config
            .token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingRequired("github.token".to_string()))?;

        Self::with_token(
            &config.api_url,
            token,
            &config.user_agent,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn with_token(
        api_url: &str,
        token: &str,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, CrawlError> {
        let base_url = Url::parse(api_url).map_err(|e| ConfigError::InvalidValue {
            key: "github.api_url".to_string(),
            reason: format!("'{}' is not a valid URL: {}", api_url, e),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue {
                key: "github.api_url".to_string(),
                reason: format!("'{}' cannot be used as a base URL", api_url),
            }
            .into());
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.trim())).map_err(|_| {
            ConfigError::InvalidValue {
                key: "github.token".to_string(),
                reason: "contains characters not allowed in an HTTP header".to_string(),
            }
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        let agent = HeaderValue::from_str(user_agent).map_err(|_| ConfigError::InvalidValue {
            key: "github.user_agent".to_string(),
            reason: "contains characters not allowed in an HTTP header".to_string(),
        })?;
        headers.insert(USER_AGENT, agent);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| CrawlError::other(format!("Failed to build HTTP client: {}", e)))?;

        tracing::debug!("GitHub client targeting {}", base_url);

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// Append percent-encoded path segments to the base URL
    fn endpoint<'a, I>(&self, segments: I) -> Url
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(segments.into_iter().filter(|s| !s.is_empty()));
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let display_url = url.to_string();
        tracing::debug!("GET {} {:?}", display_url, query);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::Transport {
                url: display_url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ApiError::Transport {
            url: display_url.clone(),
            reason: e.to_string(),
        })?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: display_url,
                message: error_message(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::Decode {
            url: display_url,
            reason: e.to_string(),
        })
    }
}

#[async_trait::async_trait]
impl ForgeApi for GitHubApi {
    async fn list_repositories_page(
        &self,
        organization: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Repository>, ApiError> {
        let url = self.endpoint(["orgs", organization, "repos"]);
        let page = page.to_string();
        let per_page = per_page.to_string();
        let repos: Vec<RepoPayload> = self
            .get_json(url, &[("page", page.as_str()), ("per_page", per_page.as_str())])
            .await?;
        Ok(repos.into_iter().map(Repository::from).collect())
    }

    async fn list_directory(
        &self,
        organization: &str,
        repository: &str,
        branch: &str,
        path: &str,
    ) -> Result<Vec<DirEntry>, ApiError> {
        let url = self.endpoint(
            ["repos", organization, repository, "contents"]
                .into_iter()
                .chain(path.split('/')),
        );
        let entries: Vec<ContentPayload> = self.get_json(url, &[("ref", branch)]).await?;
        Ok(entries.into_iter().map(DirEntry::from).collect())
    }

    async fn latest_commit(
        &self,
        organization: &str,
        repository: &str,
        branch: &str,
        path: &str,
    ) -> Result<Option<CommitInfo>, ApiError> {
        let url = self.endpoint(["repos", organization, repository, "commits"]);
        let commits: Vec<CommitPayload> = self
            .get_json(url, &[("path", path), ("sha", branch), ("per_page", "1")])
            .await?;
        Ok(commits.into_iter().next().map(CommitInfo::from))
    }
}

/// Pull `message` out of a GitHub error body, falling back to the raw text
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.message,
        Err(_) => body.chars().take(MAX_ERROR_BODY).collect(),
    }
}

#[derive(Debug, Deserialize)]
struct RepoPayload {
    name: String,
    #[serde(default)]
    default_branch: Option<String>,
}

impl From<RepoPayload> for Repository {
    fn from(payload: RepoPayload) -> Self {
        Repository {
            name: payload.name,
            default_branch: payload.default_branch.unwrap_or_else(|| "main".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ContentPayload {
    name: String,
    path: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    html_url: Option<String>,
}

impl From<ContentPayload> for DirEntry {
    fn from(payload: ContentPayload) -> Self {
        let kind = match payload.kind.as_str() {
            "file" => EntryKind::File,
            "dir" => EntryKind::Dir,
            _ => EntryKind::Other,
        };
        DirEntry {
            name: payload.name,
            path: payload.path,
            kind,
            url: payload.html_url.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CommitPayload {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    #[serde(default)]
    author: Option<GitActor>,
}

#[derive(Debug, Deserialize)]
struct GitActor {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    date: Option<DateTime<Utc>>,
}

impl From<CommitPayload> for CommitInfo {
    fn from(payload: CommitPayload) -> Self {
        match payload.commit.author {
            Some(actor) => CommitInfo {
                author_name: actor.name,
                author_email: actor.email,
                authored_at: actor.date,
            },
            None => CommitInfo::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_api(base: &str) -> GitHubApi {
        GitHubApi::with_token(base, "ghp_test", "org-crawler-test", Duration::from_secs(5))
            .expect("client should build")
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let api = test_api(DEFAULT_API_URL);
        let url = api.endpoint(
            ["repos", "acme", "r1", "contents"]
                .into_iter()
                .chain("docs/my notes#1".split('/')),
        );
        assert_eq!(
            url.as_str(),
            "https://api.github.com/repos/acme/r1/contents/docs/my%20notes%231"
        );
    }

    #[test]
    fn test_endpoint_root_path() {
        let api = test_api(DEFAULT_API_URL);
        let url = api.endpoint(
            ["repos", "acme", "r1", "contents"]
                .into_iter()
                .chain("".split('/')),
        );
        assert_eq!(url.as_str(), "https://api.github.com/repos/acme/r1/contents");
    }

    #[test]
    fn test_endpoint_keeps_enterprise_prefix() {
        let api = test_api("https://ghe.example.com/api/v3/");
        let url = api.endpoint(["orgs", "acme", "repos"]);
        assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/orgs/acme/repos");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = GitHubApi::with_token("not a url", "t", "ua", Duration::from_secs(1));
        assert!(matches!(
            result,
            Err(CrawlError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_missing_token_rejected() {
        let config = GitHubConfig {
            token: None,
            ..Default::default()
        };
        let result = GitHubApi::new(&config);
        assert!(matches!(
            result,
            Err(CrawlError::Config(ConfigError::MissingRequired(_)))
        ));
    }

    #[test]
    fn test_parse_repositories() {
        let body = r#"[
            {"id": 1, "name": "r1", "default_branch": "main", "private": false},
            {"id": 2, "name": "legacy", "default_branch": "master"},
            {"id": 3, "name": "bare"}
        ]"#;
        let payload: Vec<RepoPayload> = serde_json::from_str(body).unwrap();
        let repos: Vec<Repository> = payload.into_iter().map(Repository::from).collect();

        assert_eq!(repos[0], Repository::new("r1", "main"));
        assert_eq!(repos[1], Repository::new("legacy", "master"));
        assert_eq!(repos[2].default_branch, "main");
    }

    #[test]
    fn test_parse_directory_listing() {
        let body = r#"[
            {"name": "a.py", "path": "a.py", "type": "file",
             "html_url": "https://github.com/acme/r1/blob/main/a.py"},
            {"name": "lib", "path": "lib", "type": "dir",
             "html_url": "https://github.com/acme/r1/tree/main/lib"},
            {"name": "vendor", "path": "vendor", "type": "submodule", "html_url": null},
            {"name": "link", "path": "link", "type": "symlink"}
        ]"#;
        let payload: Vec<ContentPayload> = serde_json::from_str(body).unwrap();
        let entries: Vec<DirEntry> = payload.into_iter().map(DirEntry::from).collect();

        assert_eq!(entries[0].kind, EntryKind::File);
        assert_eq!(entries[0].url, "https://github.com/acme/r1/blob/main/a.py");
        assert_eq!(entries[1].kind, EntryKind::Dir);
        assert_eq!(entries[2].kind, EntryKind::Other);
        assert_eq!(entries[2].url, "");
        assert_eq!(entries[3].kind, EntryKind::Other);
    }

    #[test]
    fn test_parse_commit() {
        let body = r#"[{
            "sha": "abc123",
            "commit": {
                "author": {"name": "Ada", "email": "ada@example.com", "date": "2024-03-01T12:00:00Z"},
                "committer": {"name": "GitHub", "email": "noreply@github.com", "date": "2024-03-02T00:00:00Z"},
                "message": "Add a.py"
            }
        }]"#;
        let payload: Vec<CommitPayload> = serde_json::from_str(body).unwrap();
        let commit = payload.into_iter().next().map(CommitInfo::from).unwrap();

        assert_eq!(commit.author_name.as_deref(), Some("Ada"));
        assert_eq!(commit.author_email.as_deref(), Some("ada@example.com"));
        assert_eq!(
            commit.authored_at.unwrap().to_rfc3339(),
            "2024-03-01T12:00:00+00:00"
        );
    }

    #[test]
    fn test_parse_commit_without_author() {
        let body = r#"[{"sha": "abc", "commit": {"author": null, "message": "x"}}]"#;
        let payload: Vec<CommitPayload> = serde_json::from_str(body).unwrap();
        let commit = payload.into_iter().next().map(CommitInfo::from).unwrap();
        assert_eq!(commit, CommitInfo::default());
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"message": "Bad credentials", "documentation_url": "x"}"#),
            "Bad credentials"
        );
        assert_eq!(error_message("gateway timeout"), "gateway timeout");
        assert_eq!(error_message(&"x".repeat(500)).len(), MAX_ERROR_BODY);
    }
}
