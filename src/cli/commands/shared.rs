//! Shared components for CLI commands
//!
//! This module contains logging setup, input resolution, progress reporting
//! and summary printing used by the loading commands.

use crate::LoadedData;
use crate::app::services::file_loaders::{collect_paths, load_files_with_progress};
use crate::cli::args::{LoaderArgs, LoggingArgs};
use crate::config::LoaderConfig;
use crate::constants::PROGRESS_BAR_THRESHOLD;
use anyhow::{Context, Result, bail};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Counts reported at the end of a load
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    /// Number of input files read
    pub files_read: usize,
    /// Number of treatment steps loaded
    pub steps_loaded: usize,
    /// Number of distinct samples among the steps
    pub samples_loaded: usize,
    /// Number of AMS specimens loaded
    pub ams_loaded: usize,
    /// Number of diagnostics reported
    pub diagnostics: usize,
}

impl LoadSummary {
    pub fn new(files_read: usize, data: &LoadedData) -> Self {
        Self {
            files_read,
            steps_loaded: data.treatment_steps.len(),
            samples_loaded: data.sample_count(),
            ams_loaded: data.ams_data.len(),
            diagnostics: data.message_count(),
        }
    }

    /// Print the counts and every diagnostic to stdout
    pub fn print(&self, data: &LoadedData) {
        println!("\n{}", "Load Summary".bright_green().bold());
        println!(
            "  {} {}",
            "Files read:".bright_cyan(),
            self.files_read.to_string().bright_white()
        );
        println!(
            "  {} {}",
            "Treatment steps:".bright_cyan(),
            self.steps_loaded.to_string().bright_white().bold()
        );
        println!(
            "  {} {}",
            "Samples:".bright_cyan(),
            self.samples_loaded.to_string().bright_white()
        );
        if self.ams_loaded > 0 {
            println!(
                "  {} {}",
                "AMS specimens:".bright_cyan(),
                self.ams_loaded.to_string().bright_white()
            );
        }
        if self.diagnostics > 0 {
            println!(
                "  {} {}",
                "Diagnostics:".bright_yellow(),
                self.diagnostics.to_string().bright_yellow().bold()
            );
            for message in &data.messages {
                println!("    {} {}", "-".yellow(), message);
            }
        }
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(args: &LoggingArgs) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("palaeomag_ingest={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

/// Expand files, directories and glob patterns into a list of input files.
///
/// Directories are walked recursively. Each argument's files are sorted;
/// arguments keep their command-line order.
pub fn resolve_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.exists() {
            paths.extend(collect_paths(path)?);
            continue;
        }

        let mut matched = false;
        let entries =
            glob::glob(pattern).with_context(|| format!("Invalid glob pattern '{}'", pattern))?;
        for entry in entries {
            let entry = entry.with_context(|| format!("Failed to read a match for '{}'", pattern))?;
            paths.extend(collect_paths(&entry)?);
            matched = true;
        }
        if !matched {
            bail!("No files match '{}'", pattern);
        }
    }
    debug!("Resolved {} input files", paths.len());
    Ok(paths)
}

/// Build the loader configuration from the command-line flags
pub fn loader_config(args: &LoaderArgs) -> Result<LoaderConfig> {
    let config = args.to_config();
    config.validate().context("Invalid loader settings")?;
    Ok(config)
}

/// Resolve the inputs and load them, with a progress bar for larger batches
pub fn load_inputs(
    patterns: &[String],
    config: &LoaderConfig,
    show_progress: bool,
) -> Result<(Vec<PathBuf>, LoadedData)> {
    let paths = resolve_inputs(patterns)?;
    let options = config
        .to_load_options()
        .context("Failed to prepare load options")?;
    info!("Loading {} files", paths.len());

    let progress = (show_progress && paths.len() >= PROGRESS_BAR_THRESHOLD)
        .then(|| create_progress_bar(paths.len() as u64, "Loading files"));

    let data = load_files_with_progress(&paths, config.effective_file_type(), &options, |_| {
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    })?;

    if let Some(pb) = progress {
        pb.finish_with_message("Loaded");
    }
    Ok((paths, data))
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}
