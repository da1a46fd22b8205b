/// End-to-end crawl tests against the in-memory API
use anyhow::Result;
use org_crawler::config::{Config, OutputFormat};
use org_crawler::crawl::{CrawlSettings, Crawler};
use org_crawler::error::{ApiError, CrawlError};
use org_crawler::report::{render, write_report};
use org_crawler::testing::{MockForge, dir, file, rate_limited};
use std::sync::Arc;
use tempfile::TempDir;

fn config_for(org: &str, extensions: &[&str]) -> Config {
    let mut config = Config::default();
    config.github.organization = org.to_string();
    config.github.token = Some("test-token".to_string());
    config.crawl.extensions = extensions.iter().map(|e| e.to_string()).collect();
    config.retry.delay_secs = 0.0;
    config
}

fn acme() -> MockForge {
    MockForge::new()
        .with_repository("R1", "main")
        .with_repository("R2", "main")
        .with_directory("R1", "", vec![file("a.py"), dir("lib")])
        .with_directory("R1", "lib", vec![file("lib/b.sql")])
        .with_directory("R2", "", vec![file("README.md"), file("setup.cfg")])
}

#[tokio::test]
async fn test_config_driven_crawl_reports_matching_files() -> Result<()> {
    let config = config_for("acme", &[".py"]);
    config.validate()?;

    let crawler = Crawler::new(Arc::new(acme()), CrawlSettings::from_config(&config));
    let report = crawler.crawl().await?;

    assert_eq!(report.repositories_crawled, 2);
    assert_eq!(report.files.len(), 1);
    assert_eq!(report.files[0].file_path, "a.py");
    assert_eq!(
        report.files[0].last_committer_email.as_deref(),
        Some("ada@example.com")
    );

    Ok(())
}

#[tokio::test]
async fn test_multiple_extensions_from_config() -> Result<()> {
    let config = config_for("acme", &["py", "sql"]);

    let crawler = Crawler::new(Arc::new(acme()), CrawlSettings::from_config(&config));
    let report = crawler.crawl().await?;

    let paths: Vec<&str> = report.files.iter().map(|f| f.file_path.as_str()).collect();
    assert_eq!(paths, vec!["a.py", "lib/b.sql"]);

    Ok(())
}

#[tokio::test]
async fn test_partial_failures_still_produce_report() -> Result<()> {
    let forge = MockForge::new()
        .with_repository("A", "main")
        .with_repository("B", "main")
        .with_directory("A", "", vec![file("a.py"), file("b.py")])
        .with_directory_error("B", "", ApiError::status_only(500, "mock://B"))
        .with_commit_responses("A", "b.py", vec![Err(rate_limited()); 3]);

    let config = config_for("acme", &[".py"]);
    let crawler = Crawler::new(Arc::new(forge), CrawlSettings::from_config(&config));
    let report = crawler.crawl().await?;

    assert_eq!(report.files.len(), 2);
    assert_eq!(report.unresolved_count(), 1);
    assert_eq!(report.errors.len(), 2);

    let dir = TempDir::new()?;
    let path = dir.path().join("report.json");
    write_report(&report, OutputFormat::Json, Some(&path))?;

    let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    assert_eq!(written["files"].as_array().map(Vec::len), Some(2));
    assert_eq!(written["errors"].as_array().map(Vec::len), Some(2));

    Ok(())
}

#[tokio::test]
async fn test_listing_failure_aborts_crawl() {
    let forge = acme().with_listing_error(1, ApiError::status_only(404, "mock://orgs/nope/repos"));

    let config = config_for("nope", &[".py"]);
    let crawler = Crawler::new(Arc::new(forge), CrawlSettings::from_config(&config));
    let result = crawler.crawl().await;

    let err = result.err().map(|e| e.to_string()).unwrap_or_default();
    assert!(err.contains("nope"), "unexpected error: {}", err);
}

#[tokio::test]
async fn test_text_report_lines() -> Result<()> {
    let config = config_for("acme", &[".py", ".sql"]);
    let crawler = Crawler::new(Arc::new(acme()), CrawlSettings::from_config(&config));
    let report = crawler.crawl().await?;

    let text = render(&report, OutputFormat::Text)?;
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Repo: R1, Branch: main, File: a.py, "));
    assert!(lines[1].contains("File: lib/b.sql"));

    Ok(())
}

#[test]
fn test_missing_organization_fails_validation() {
    let config = config_for("", &[".py"]);
    assert!(matches!(config.validate(), Err(CrawlError::Config(_))));
}
