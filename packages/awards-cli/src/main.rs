//! Hotel Sparkling Awards runner
//!
//! Scores hotel listings from pre-rendered page snapshots and emits the
//! relational award tables as CSV.

mod snapshot;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sparkling_crawler::export::write_output_tables;
use sparkling_crawler::{run_pipeline, CoordinateTable, PipelineConfig, ScoringConfig};

use crate::snapshot::{SnapshotReader, SnapshotSentiment, SnapshotSource, SnapshotStore};

#[derive(Debug, Parser)]
#[command(name = "awards", version, about = "Score hotel listings and emit award tables")]
struct Args {
    /// Run file with listings and their rendered page snapshots.
    #[arg(long)]
    input: PathBuf,

    /// Directory the CSV tables are written to.
    #[arg(long, default_value = "out")]
    out: PathBuf,

    /// Stop collecting once this many reviews are accepted per listing.
    #[arg(long)]
    target_reviews: Option<usize>,

    /// Upper bound on page-advance attempts per listing.
    #[arg(long)]
    max_pages: Option<usize>,

    /// Country coordinate table (JSON), replacing the built-in one.
    #[arg(long)]
    coordinates: Option<PathBuf>,

    /// Scoring weight configuration (JSON), replacing the defaults.
    #[arg(long)]
    scoring: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present (development), then initialize logging
    let _ = dotenvy::dotenv();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sparkling_crawler=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = PipelineConfig::default();
    if let Some(target) = args.target_reviews {
        config.collector.target_count = target;
    }
    if let Some(max_pages) = args.max_pages {
        config.collector.max_pages = max_pages;
    }
    if let Some(path) = &args.coordinates {
        config.coordinates = CoordinateTable::from_path(path)?;
    }
    if let Some(path) = &args.scoring {
        config.scoring = ScoringConfig::from_path(path)?;
    }

    // An unreadable run file is this runner's "fetcher unreachable": fatal.
    let store = Arc::new(SnapshotStore::load(&args.input).context("Failed to load run file")?);
    let listings = store.listings();
    println!(
        "✓ Loaded {} listings from {}",
        listings.len(),
        args.input.display()
    );

    let source = SnapshotSource::new(Arc::clone(&store));
    let analyzer = SnapshotSentiment::from_store(&store, &config.defaults);

    let summary = run_pipeline(&listings, &source, &SnapshotReader, &analyzer, &config).await?;

    write_output_tables(&args.out, &summary.listings, &config.scoring)
        .context("Failed to write output tables")?;

    println!(
        "✓ Scored {} listings ({} failed), tables written to {}",
        summary.listings.len(),
        summary.failed,
        args.out.display()
    );
    Ok(())
}
