//! fedmerge Binary
//!
//! Merges subgraph entity-fetch request bodies into a single request and
//! prints the merged document together with its position map.
//!
//! # Usage
//!
//! ```bash
//! # With config file
//! fedmerge --config fedmerge.yaml a.json b.json c.json
//!
//! # With environment variables only
//! FEDMERGE_MERGER__VERIFY_COLLISIONS=false fedmerge a.json b.json
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use serde_json::value::RawValue;
use tracing::info;

use fedmerge_core::{BatchMerger, PositionMap};
use fedmerge_server::observability::{init_logging, init_metrics, LoggingConfig};
use fedmerge_server::GatewayConfig;

/// fedmerge - Deduplicating batch merger for federated entity fetches
#[derive(Parser, Debug)]
#[command(name = "fedmerge")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print Prometheus metrics to stderr after merging
    #[arg(long)]
    print_metrics: bool,

    /// Request body documents, in caller order
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

/// Command output: the merged document verbatim plus its position map.
#[derive(Serialize)]
struct MergeReport<'a> {
    document: &'a RawValue,
    positions: &'a PositionMap,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => GatewayConfig::load(path)?,
        None => GatewayConfig::from_env()?,
    };

    init_logging(LoggingConfig::from_settings(&config.logging))?;

    let metrics_state = if config.metrics.enabled {
        Some(init_metrics()?)
    } else {
        None
    };

    let documents = args
        .inputs
        .iter()
        .map(|path| {
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
        })
        .collect::<anyhow::Result<Vec<Vec<u8>>>>()?;

    let merger = BatchMerger::with_config(config.merger.to_merger_config());
    let (merged, positions) = merger.merge_to_vec(&documents)?;

    info!(
        inputs = documents.len(),
        groups = positions.len(),
        "merged request documents"
    );

    let merged = String::from_utf8(merged).context("merged document is not UTF-8")?;
    let document: &RawValue =
        serde_json::from_str(&merged).context("merged document is not valid JSON")?;
    let report = MergeReport {
        document,
        positions: &positions,
    };
    println!("{}", serde_json::to_string(&report)?);

    if args.print_metrics {
        match &metrics_state {
            Some(state) => eprintln!("{}", state.render()),
            None => eprintln!("metrics are disabled"),
        }
    }

    Ok(())
}
