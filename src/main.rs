use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

use launchdash::{report, server, utils, Args, Dataset};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    utils::setup_logging(args.verbose);
    utils::validate_args(&args)?;

    let dataset = match Dataset::from_path(&args.data) {
        Ok(dataset) => dataset,
        Err(e) => {
            error!(action = "load", component = "dataset", file_path = ?args.data, error = %e, "Dashboard cannot start");
            return Err(e).with_context(|| format!("Failed to load {}", args.data.display()));
        }
    };

    if args.summary {
        report::print_summary(&dataset);
        return Ok(());
    }

    info!(
        action = "configure",
        component = "dashboard",
        record_count = dataset.len(),
        sites = ?dataset.sites(),
        "Dataset ready"
    );

    server::serve(&args, Arc::new(dataset)).await
}
