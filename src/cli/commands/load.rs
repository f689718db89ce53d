//! Load command implementation
//!
//! Loads the given inputs and prints what was read, including every
//! diagnostic reported by the loaders.

use super::shared::{LoadSummary, load_inputs, loader_config, setup_logging};
use crate::cli::args::LoadArgs;
use anyhow::Result;
use tracing::info;

/// Run the load command
pub fn run_load(args: LoadArgs) -> Result<LoadSummary> {
    setup_logging(&args.logging);
    let config = loader_config(&args.loader)?;

    let (paths, data) = load_inputs(&args.paths, &config, !args.logging.quiet)?;
    let summary = LoadSummary::new(paths.len(), &data);
    info!(
        "Loaded {} steps from {} files with {} diagnostics",
        summary.steps_loaded, summary.files_read, summary.diagnostics
    );
    summary.print(&data);
    Ok(summary)
}
