use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::stream::{self, StreamExt};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use phishscan_api::api::{start_server, Settings, UrlAnalyzer};
use phishscan_api::utils::logger::{init_logger, init_stderr_logger};

#[derive(Debug, Parser)]
#[command(name = "phishscan", version, about = "Classifies URLs as safe or malicious")]
struct Cli {
    /// Configuration file (defaults to ./phishscan.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Classify URLs from the command line
    Check {
        urls: Vec<String>,
        /// File with one URL per line
        #[arg(short, long)]
        batch: Option<PathBuf>,
        #[arg(short = 'j', long, default_value_t = 4)]
        concurrency: usize,
    },
}

#[actix_web::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Serve { host: None, port: None }) {
        Command::Serve { host, port } => serve(settings, host, port).await,
        Command::Check { urls, batch, concurrency } => {
            check(settings, urls, batch.as_deref(), concurrency).await
        }
    }
}

async fn serve(settings: Settings, host: Option<String>, port: Option<u16>) -> Result<()> {
    init_logger(&settings.server.log_dir)?;

    let analyzer = UrlAnalyzer::from_settings(&settings).map_err(|e| {
        error!("Startup failed: {:#}", e);
        e
    })?;

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    start_server(&host, port, analyzer).await
}

async fn check(
    settings: Settings,
    mut urls: Vec<String>,
    batch: Option<&Path>,
    concurrency: usize,
) -> Result<()> {
    init_stderr_logger()?;

    if let Some(path) = batch {
        urls.extend(read_batch(path)?);
    }
    if urls.is_empty() {
        anyhow::bail!("No URLs given; pass them as arguments or with --batch");
    }

    let analyzer = UrlAnalyzer::from_settings(&settings)?;
    info!("Checking {} URLs with concurrency {}", urls.len(), concurrency);

    let analyzer = &analyzer;
    let mut results = stream::iter(urls)
        .map(|url| async move {
            let result = analyzer.analyze(&url).await;
            (url, result)
        })
        .buffer_unordered(concurrency.max(1));

    let mut failures = 0;
    while let Some((url, result)) = results.next().await {
        match result {
            Ok(result) => println!("{}\t{}\t{}", result.verdict, result.resolved_url, url),
            Err(e) => {
                failures += 1;
                error!("Classification failed for {}: {}", url, e);
                println!("ERROR\t-\t{}", url);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} URL(s) could not be classified", failures);
    }
    Ok(())
}

// One URL per line; blank lines and # comments are skipped
fn read_batch(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read batch file {}", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
