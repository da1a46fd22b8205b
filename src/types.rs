use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A repository belonging to the crawled organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Repository name (without the organization prefix)
    pub name: String,
    /// Branch listed when no override is configured
    pub default_branch: String,
}

impl Repository {
    pub fn new(name: impl Into<String>, default_branch: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_branch: default_branch.into(),
        }
    }
}

/// Kind of a directory listing entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    /// Symlinks, submodules and anything else the walker does not follow
    Other,
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// Display name (last path segment)
    pub name: String,
    /// Path relative to the repository root
    pub path: String,
    pub kind: EntryKind,
    /// Canonical browser URL of the entry
    pub url: String,
}

/// Author metadata of the most recent commit touching a path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub authored_at: Option<DateTime<Utc>>,
}

/// One matched file and its last-modification metadata
///
/// The committer fields are `None` when the file has no history on the
/// branch or the lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub organization: String,
    pub repository: String,
    pub branch: String,
    pub file_name: String,
    pub file_path: String,
    pub file_url: String,
    pub last_committer_name: Option<String>,
    pub last_committer_email: Option<String>,
    pub last_commit_date: Option<DateTime<Utc>>,
}

impl FileRecord {
    pub fn new(
        organization: &str,
        repository: &str,
        branch: &str,
        entry: &DirEntry,
        commit: Option<CommitInfo>,
    ) -> Self {
        let commit = commit.unwrap_or_default();
        Self {
            organization: organization.to_string(),
            repository: repository.to_string(),
            branch: branch.to_string(),
            file_name: entry.name.clone(),
            file_path: entry.path.clone(),
            file_url: entry.url.clone(),
            last_committer_name: commit.author_name,
            last_committer_email: commit.author_email,
            last_commit_date: commit.authored_at,
        }
    }

    /// True when any committer field was resolved
    pub fn has_commit(&self) -> bool {
        self.last_committer_name.is_some()
            || self.last_committer_email.is_some()
            || self.last_commit_date.is_some()
    }
}

/// Suffix filter over file names
///
/// Entries are normalized to start with a dot, so `py` and `.py` are
/// equivalent. Matching is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    suffixes: Vec<String>,
}

impl ExtensionFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut suffixes: Vec<String> = Vec::new();
        for ext in extensions {
            let ext = ext.as_ref().trim();
            if ext.is_empty() {
                continue;
            }
            let suffix = if ext.starts_with('.') {
                ext.to_string()
            } else {
                format!(".{}", ext)
            };
            if !suffixes.contains(&suffix) {
                suffixes.push(suffix);
            }
        }
        Self { suffixes }
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.suffixes.iter().any(|s| file_name.ends_with(s.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }

    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }
}

/// Result of a complete crawl, handed to the report writer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlReport {
    pub organization: String,
    /// Number of repositories whose traversal ran
    pub repositories_crawled: usize,
    pub files: Vec<FileRecord>,
    /// Non-fatal errors (failed listings, failed or exhausted commit lookups)
    #[serde(default)]
    pub errors: Vec<String>,
    /// Time taken in milliseconds
    pub duration_ms: u64,
}

impl CrawlReport {
    /// Records whose commit lookup produced no metadata
    pub fn unresolved_count(&self) -> usize {
        self.files.iter().filter(|f| !f.has_commit()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str) -> DirEntry {
        DirEntry {
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            path: path.to_string(),
            kind: EntryKind::File,
            url: format!("https://github.com/acme/r1/blob/main/{}", path),
        }
    }

    #[test]
    fn test_extension_filter_normalizes_leading_dot() {
        let filter = ExtensionFilter::new(["py", ".sql", " ", ".py"]);
        assert_eq!(filter.suffixes(), &[".py".to_string(), ".sql".to_string()]);
        assert!(filter.matches("main.py"));
        assert!(filter.matches("schema.sql"));
        assert!(!filter.matches("main.pyc"));
        assert!(!filter.matches("py"));
    }

    #[test]
    fn test_extension_filter_is_case_sensitive() {
        let filter = ExtensionFilter::new([".py"]);
        assert!(!filter.matches("SETUP.PY"));
    }

    #[test]
    fn test_extension_filter_accepts_compound_suffix() {
        let filter = ExtensionFilter::new(["tar.gz"]);
        assert!(filter.matches("release.tar.gz"));
        assert!(!filter.matches("release.gz"));
    }

    #[test]
    fn test_empty_filter() {
        let filter = ExtensionFilter::new(Vec::<String>::new());
        assert!(filter.is_empty());
        assert!(!filter.matches("a.py"));
    }

    #[test]
    fn test_file_record_without_commit() {
        let record = FileRecord::new("acme", "r1", "main", &entry("src/a.py"), None);
        assert_eq!(record.file_name, "a.py");
        assert_eq!(record.file_path, "src/a.py");
        assert!(!record.has_commit());
    }

    #[test]
    fn test_file_record_with_commit() {
        let commit = CommitInfo {
            author_name: Some("Ada".to_string()),
            author_email: Some("ada@example.com".to_string()),
            authored_at: Some("2024-03-01T12:00:00Z".parse().unwrap()),
        };
        let record = FileRecord::new("acme", "r1", "main", &entry("a.py"), Some(commit));
        assert!(record.has_commit());
        assert_eq!(record.last_committer_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_file_record_serializes_nulls() {
        let record = FileRecord::new("acme", "r1", "main", &entry("a.py"), None);
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["last_committer_name"].is_null());
        assert!(json["last_commit_date"].is_null());
        assert_eq!(json["repository"], "r1");
    }

    #[test]
    fn test_report_unresolved_count() {
        let resolved = FileRecord::new(
            "acme",
            "r1",
            "main",
            &entry("a.py"),
            Some(CommitInfo {
                author_name: Some("Ada".to_string()),
                ..Default::default()
            }),
        );
        let unresolved = FileRecord::new("acme", "r1", "main", &entry("b.py"), None);
        let report = CrawlReport {
            organization: "acme".to_string(),
            repositories_crawled: 1,
            files: vec![resolved, unresolved],
            errors: vec![],
            duration_ms: 5,
        };
        assert_eq!(report.unresolved_count(), 1);
    }
}
