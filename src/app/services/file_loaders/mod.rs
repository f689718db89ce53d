//! Loaders for palaeomagnetic measurement files
//!
//! Each supported format has a loader implementing [`FileLoader`]. A loader
//! never fails because of bad input: unreadable files, unrecognized headers
//! and malformed lines become diagnostics on the returned [`LoadedData`].
//! An `Err` from a loader means the options it was given are unusable.
//!
//! ## Components
//!
//! - [`loaded_data`] - Result type holding steps, diagnostics and trailing lines
//! - [`options`] - Open option map and per-loader option definitions
//! - [`file_type`] - Supported formats and extension-based detection
//! - [`encoding`] - CP437/ASCII/default decoding and line splitting
//! - [`units`] - cgs to SI conversions
//! - [`twogee`], [`ppl`], [`zplot`], [`pmd`], [`iapd`], [`jr6`], [`ucdavis`],
//!   [`caltech`], [`ams`] - One loader per format
//!
//! ## Usage
//!
//! ```no_run
//! use palaeomag_ingest::{FileType, LoadOptions, load_file};
//! use std::path::Path;
//!
//! # fn example() -> palaeomag_ingest::Result<()> {
//! let data = load_file(Path::new("core.dat"), Some(FileType::TwoGee), &LoadOptions::new())?;
//! for message in &data.messages {
//!     eprintln!("{}", message);
//! }
//! println!("Loaded {} treatment steps", data.treatment_steps.len());
//! # Ok(())
//! # }
//! ```

pub mod ams;
pub mod caltech;
pub mod encoding;
pub mod file_type;
pub mod iapd;
pub mod jr6;
pub mod loaded_data;
pub mod options;
pub mod pmd;
pub mod ppl;
pub mod twogee;
pub mod ucdavis;
pub mod units;
pub mod zplot;

#[cfg(test)]
mod tests;

pub use file_type::FileType;
pub use loaded_data::LoadedData;
pub use options::{LoadOptions, OptionDefinition, OptionKind, OptionValue, validate_options};
pub use ppl::write_ppl;
pub use twogee::Protocol;

use crate::app::models::MeasurementType;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// A reader for one file format
pub trait FileLoader {
    /// Options this loader reads from the option map
    fn option_definitions(&self) -> Vec<OptionDefinition> {
        Vec::new()
    }

    /// Parse the complete contents of a file
    fn read_bytes(&self, bytes: &[u8], file_name: &str, options: &LoadOptions) -> Result<LoadedData>;

    /// Read and parse a file.
    ///
    /// Options are checked before the file is opened, so option misuse is
    /// reported even when the file cannot be read. A read failure becomes a
    /// diagnostic on an empty result.
    fn read_file(&self, path: &Path, options: &LoadOptions) -> Result<LoadedData> {
        validate_options(&self.option_definitions(), options)?;
        let name = file_name(path);
        match std::fs::read(path) {
            Ok(bytes) => self.read_bytes(&bytes, &name, options),
            Err(e) => Ok(LoadedData::from_message(format!("Error reading \"{}\": {}", name, e))),
        }
    }
}

/// Leaf name of a path, for diagnostics
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

/// Counts malformed-line diagnostics against a per-format ceiling
#[derive(Debug, Clone, Copy)]
pub(crate) struct LineErrors {
    limit: usize,
    count: usize,
}

impl LineErrors {
    pub(crate) fn new(limit: usize) -> Self {
        Self { limit, count: 0 }
    }

    /// Record a line diagnostic
    pub(crate) fn add(&mut self, data: &mut LoadedData, message: impl Into<String>) {
        data.add_message(message);
        self.count += 1;
    }

    /// Whether the ceiling has been passed; if so, says so on `data`
    pub(crate) fn exceeded(&self, data: &mut LoadedData, file_name: &str) -> bool {
        if self.count > self.limit {
            data.add_message(format!("Too many errors in {}", file_name));
            true
        } else {
            false
        }
    }
}

// =============================================================================
// Orchestration
// =============================================================================

/// Load one file with the loader for `file_type`, or for its guessed type.
///
/// Tray and holder readings (measurement type `NONE`) are dropped. A file
/// mixing discrete and continuous measurements is rejected: its diagnostics
/// are kept but its steps are not.
pub fn load_file(path: &Path, file_type: Option<FileType>, options: &LoadOptions) -> Result<LoadedData> {
    let name = file_name(path);
    let Some(file_type) = file_type.or_else(|| FileType::guess(path)) else {
        return Ok(LoadedData::from_message(format!(
            "Unknown file type for \"{}\" -- skipping this file",
            name
        )));
    };

    info!("Loading {} as {}", path.display(), file_type);
    let mut data = file_type.loader().read_file(path, options)?;
    data.treatment_steps.retain(|step| !step.ignore_on_loading());

    if data.measurement_types().len() > 1 {
        let mut rejected = LoadedData {
            messages: std::mem::take(&mut data.messages),
            ..LoadedData::default()
        };
        rejected.add_message(format!(
            "\"{}\" mixes discrete and continuous measurements -- ignoring this file",
            name
        ));
        return Ok(rejected);
    }

    info!(
        "Loaded {}: {} steps, {} AMS results, {} diagnostics",
        name,
        data.treatment_steps.len(),
        data.ams_data.len(),
        data.message_count()
    );
    Ok(data)
}

/// Load several files in order and merge the results.
///
/// The first file with real measurements fixes the batch's measurement type;
/// later files of the other type are rejected with a diagnostic.
pub fn load_files(paths: &[PathBuf], file_type: Option<FileType>, options: &LoadOptions) -> Result<LoadedData> {
    load_files_with_progress(paths, file_type, options, |_| {})
}

/// As [`load_files`], calling `on_loaded` after each file is read
pub fn load_files_with_progress<F>(
    paths: &[PathBuf],
    file_type: Option<FileType>,
    options: &LoadOptions,
    mut on_loaded: F,
) -> Result<LoadedData>
where
    F: FnMut(&Path),
{
    let mut combined = LoadedData::new();
    let mut established: Option<MeasurementType> = None;

    for path in paths {
        let data = load_file(path, file_type, options)?;
        on_loaded(path);
        let file_types = data.measurement_types();
        match (established, file_types.first()) {
            (Some(batch_type), Some(&this_type)) if this_type != batch_type => {
                combined.messages.extend(data.messages);
                combined.add_message(format!(
                    "\"{}\" contains {} measurements but earlier files are {} -- ignoring this file",
                    file_name(path),
                    this_type.nice_name(),
                    batch_type.nice_name()
                ));
                continue;
            }
            (None, Some(&this_type)) => established = Some(this_type),
            _ => {}
        }
        combined.merge(data);
    }
    Ok(combined)
}

/// All regular files under `root` in sorted order; `root` itself if it is a file
pub fn collect_paths(root: &Path) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    let mut paths = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            Error::directory_traversal(format!("Failed to read entry under {}", root.display()), e)
        })?;
        if entry.file_type().is_file() {
            paths.push(entry.into_path());
        }
    }
    debug!("Found {} files under {}", paths.len(), root.display());
    Ok(paths)
}
