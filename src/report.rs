//! Report rendering
//!
//! Renders a [`CrawlReport`] as text lines, a JSON document or JSON Lines,
//! and writes it to a file or stdout.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::config::OutputFormat;
use crate::types::{CrawlReport, FileRecord};

/// Render the report in the requested format
pub fn render(report: &CrawlReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(&report.files)),
        OutputFormat::Json => {
            let mut out =
                serde_json::to_string_pretty(report).context("Failed to serialize report")?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Jsonl => render_jsonl(&report.files),
    }
}

/// One line per file, e.g.
/// `Repo: r1, Branch: main, File: a.py, URL: https://..., Last Committer: Ada (ada@example.com), Date: 2024-03-01T12:00:00+00:00`
pub fn render_text(files: &[FileRecord]) -> String {
    let mut out = String::new();
    for file in files {
        let committer = match (&file.last_committer_name, &file.last_committer_email) {
            (Some(name), Some(email)) => format!("{} ({})", name, email),
            (Some(name), None) => name.clone(),
            (None, Some(email)) => email.clone(),
            (None, None) => "None".to_string(),
        };
        let date = file
            .last_commit_date
            .map(|d| d.to_rfc3339())
            .unwrap_or_else(|| "None".to_string());
        out.push_str(&format!(
            "Repo: {}, Branch: {}, File: {}, URL: {}, Last Committer: {}, Date: {}\n",
            file.repository, file.branch, file.file_path, file.file_url, committer, date
        ));
    }
    out
}

/// One JSON object per line
pub fn render_jsonl(files: &[FileRecord]) -> Result<String> {
    let mut out = String::new();
    for file in files {
        let line = serde_json::to_string(file)
            .with_context(|| format!("Failed to serialize record for {}", file.file_path))?;
        out.push_str(&line);
        out.push('\n');
    }
    Ok(out)
}

/// Write the rendered report to `path`, or to stdout when `path` is `None`
pub fn write_report(report: &CrawlReport, format: OutputFormat, path: Option<&Path>) -> Result<()> {
    let rendered = render(report, format)?;

    match path {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory {}", parent.display())
                })?;
            }
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            tracing::info!(
                "Wrote {} records to {}",
                report.files.len(),
                path.display()
            );
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(rendered.as_bytes())
                .context("Failed to write report to stdout")?;
            handle.flush().context("Failed to flush stdout")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{file, sample_commit};
    use tempfile::TempDir;

    fn sample_report() -> CrawlReport {
        CrawlReport {
            organization: "acme".to_string(),
            repositories_crawled: 2,
            files: vec![
                FileRecord::new("acme", "r1", "main", &file("a.py"), Some(sample_commit())),
                FileRecord::new("acme", "r1", "main", &file("lib/b.py"), None),
            ],
            errors: vec!["r1/lib/b.py: commit lookup failed: HTTP 404".to_string()],
            duration_ms: 42,
        }
    }

    #[test]
    fn test_render_text() {
        let text = render(&sample_report(), OutputFormat::Text).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "Repo: r1, Branch: main, File: a.py, URL: https://github.test/blob/a.py, \
             Last Committer: Ada Lovelace (ada@example.com), Date: 2024-03-01T12:00:00+00:00"
        );
        assert!(lines[1].ends_with("Last Committer: None, Date: None"));
    }

    #[test]
    fn test_render_jsonl() {
        let out = render(&sample_report(), OutputFormat::Jsonl).unwrap();
        let records: Vec<FileRecord> = out
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].file_path, "lib/b.py");
        assert!(records[1].last_committer_name.is_none());
    }

    #[test]
    fn test_render_json_document() {
        let out = render(&sample_report(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();

        assert_eq!(value["organization"], "acme");
        assert_eq!(value["repositories_crawled"], 2);
        assert_eq!(value["files"].as_array().unwrap().len(), 2);
        assert_eq!(value["errors"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_report_renders_nothing() {
        let report = CrawlReport {
            organization: "acme".to_string(),
            repositories_crawled: 0,
            files: vec![],
            errors: vec![],
            duration_ms: 0,
        };
        assert_eq!(render(&report, OutputFormat::Text).unwrap(), "");
        assert_eq!(render(&report, OutputFormat::Jsonl).unwrap(), "");
    }

    #[test]
    fn test_write_report_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out").join("files.jsonl");

        write_report(&sample_report(), OutputFormat::Jsonl, Some(&path)).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
