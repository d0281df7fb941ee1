//! dupkeep - playlist-aware duplicate quarantine for a media library
//!
//! Indexes a library tree into duplicate groups, resolves which paths are
//! pinned by `.m3u` playlists, and relocates the redundant unreferenced
//! copies into a quarantine directory. At least one copy per group always
//! survives, and nothing is deleted; every removal is a move.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use dupkeep::config::Config;
use dupkeep::pipeline::Pipeline;
use dupkeep::types::{MoveOutcome, RunSummary};

#[derive(Parser, Debug)]
#[command(
    name = "dupkeep",
    version,
    about = "Quarantine duplicate media files that no playlist references"
)]
struct Cli {
    /// Library root to scan for duplicate media files
    #[arg(long)]
    library_root: Option<PathBuf>,

    /// Directory containing .m3u playlist files
    #[arg(long)]
    playlists_root: Option<PathBuf>,

    /// Destination directory for quarantined files
    #[arg(long)]
    quarantine_dir: Option<PathBuf>,

    /// Report what would be quarantined without moving anything
    #[arg(long)]
    dry_run: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,

    /// Exit non-zero when any individual move fails
    #[arg(long)]
    strict: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    info!("Starting dupkeep");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::resolve(cli.library_root, cli.playlists_root, cli.quarantine_dir)?;
    info!(
        library = %config.library_root.display(),
        playlists = %config.playlists_root.display(),
        quarantine = %config.quarantine_dir.display(),
        "Configuration resolved"
    );

    let summary = Pipeline::new(config).with_dry_run(cli.dry_run).run().await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    if cli.strict && summary.failed > 0 {
        error!(failed = summary.failed, "Exiting non-zero (--strict)");
        std::process::exit(1);
    }

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!("Duplicate groups:    {}", summary.groups);
    println!("Playlist references: {}", summary.referenced_entries);
    println!("Protected files:     {}", summary.protected);

    if summary.dry_run {
        println!("Would quarantine:    {}", summary.removable);
        for record in &summary.records {
            println!(
                "  {} -> {}",
                record.path.display(),
                record.destination.display()
            );
        }
        return;
    }

    println!("Quarantined:         {}", summary.moved);
    println!("Failed:              {}", summary.failed);
    for record in &summary.records {
        if let MoveOutcome::Failed(reason) = &record.outcome {
            println!("  FAILED {}: {}", record.path.display(), reason);
        }
    }
}
