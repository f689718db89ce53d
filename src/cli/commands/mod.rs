//! Command implementations for the palaeomagnetic loader CLI
//!
//! Each command is implemented in its own module:
//! - `load`: load inputs and print a summary with diagnostics
//! - `convert`: load inputs and write a PuffinPlot file
//! - `formats`: list supported formats and their options

pub mod convert;
pub mod formats;
pub mod load;
pub mod shared;

pub use shared::LoadSummary;

use crate::cli::args::{Args, Commands};
use anyhow::Result;

/// Main command runner
///
/// Dispatches to the handler for the chosen subcommand. Returns the load
/// summary for commands that load files.
pub fn run(args: Args) -> Result<Option<LoadSummary>> {
    match args.command {
        Some(Commands::Load(load_args)) => load::run_load(load_args).map(Some),
        Some(Commands::Convert(convert_args)) => convert::run_convert(convert_args).map(Some),
        Some(Commands::Formats) | None => {
            formats::run_formats();
            Ok(None)
        }
    }
}
