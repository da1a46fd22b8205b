use anyhow::{Context, Result};
use clap::Parser;
use org_crawler::api::GitHubApi;
use org_crawler::cli::Cli;
use org_crawler::config::Config;
use org_crawler::crawl::{CrawlSettings, Crawler};
use org_crawler::report::write_report;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so the report can be piped
    let default_level = if cli.verbose { "org_crawler=debug" } else { "org_crawler=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply(&mut config);
    config.validate()?;

    let api = GitHubApi::new(&config.github).context("Failed to create GitHub client")?;
    let crawler = Crawler::new(Arc::new(api), CrawlSettings::from_config(&config));

    let report = crawler.crawl().await?;

    write_report(&report, config.output.format, config.output.path.as_deref())?;

    Ok(())
}
