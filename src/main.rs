use anyhow::Result;
use clap::Parser;
use pubmed_harvest::config::load_config;
use pubmed_harvest::{ArtifactKind, EutilsClient, HarvestConfig, HarvestJob, JobStatus};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// PubMed Harvest - bulk-download PubMed records past the 9,999-record window
#[derive(Parser, Debug)]
#[command(name = "pubmed-harvest")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Bulk-download PubMed records past the 9,999-record window", long_about = None)]
struct Cli {
    /// PubMed search expression
    #[arg(default_value = "(Brain) AND (glymph*)")]
    query: String,

    /// Contact email sent to NCBI with every request
    #[arg(long, short)]
    email: Option<String>,

    /// Stop after this many records
    #[arg(long, short, default_value_t = 100)]
    max_results: usize,

    /// Ignore --max-results and fetch everything the query matches
    #[arg(long)]
    all: bool,

    /// Root directory for session output
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging (-v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => HarvestConfig::default(),
    };
    if let Some(email) = cli.email {
        config.email = email;
    }
    if let Some(output) = cli.output {
        config.output_root = output;
    }

    let max_results = if cli.all { None } else { Some(cli.max_results) };
    let client = EutilsClient::new(&config)?;
    let mut job = HarvestJob::spawn(client, &config, &cli.query, max_results);
    tracing::info!(job = %job.id(), query = %cli.query, "session launched");

    let status = loop {
        tokio::time::sleep(Duration::from_secs(1)).await;
        let snapshot = job.snapshot();
        tracing::info!(
            status = %snapshot.status,
            progress = snapshot.progress,
            total = snapshot.total,
            "session progress"
        );
        if snapshot.status.is_terminal() {
            break snapshot.status;
        }
    };
    job.join().await;

    match status {
        JobStatus::Completed => {
            for kind in [
                ArtifactKind::Ids,
                ArtifactKind::Json,
                ArtifactKind::Text,
                ArtifactKind::Archive,
            ] {
                if let Some(path) = job.artifact_path(kind) {
                    println!("{}: {}", kind, path.display());
                }
            }
            Ok(())
        }
        JobStatus::Failed(cause) => anyhow::bail!("harvest failed: {}", cause),
        other => anyhow::bail!("harvest ended in unexpected state: {}", other),
    }
}
