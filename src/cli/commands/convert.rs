//! Convert command implementation
//!
//! Loads the given inputs and writes every treatment step, plus any
//! unrecognized trailing lines from PuffinPlot inputs, to one PuffinPlot file.

use super::shared::{LoadSummary, load_inputs, loader_config, setup_logging};
use crate::app::services::file_loaders::write_ppl;
use crate::cli::args::ConvertArgs;
use anyhow::{Context, Result};
use colored::*;
use tracing::{info, warn};

/// Run the convert command
pub fn run_convert(args: ConvertArgs) -> Result<LoadSummary> {
    setup_logging(&args.logging);
    let config = loader_config(&args.loader)?;

    let (paths, data) = load_inputs(&args.paths, &config, !args.logging.quiet)?;
    let summary = LoadSummary::new(paths.len(), &data);
    if data.treatment_steps.is_empty() {
        warn!("No treatment steps were loaded; writing a header-only file");
    }
    if !data.ams_data.is_empty() {
        warn!(
            "{} AMS specimens are not stored in PuffinPlot files and were skipped",
            data.ams_data.len()
        );
    }

    let text = write_ppl(&data.treatment_steps, &data.extra_lines);
    std::fs::write(&args.output, text)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    info!("Wrote {} steps to {}", data.treatment_steps.len(), args.output.display());

    summary.print(&data);
    println!(
        "\n{} {}",
        "Written:".bright_green().bold(),
        args.output.display().to_string().bright_white()
    );
    Ok(summary)
}
