//! Loader for Caltech (CIT) sample manifests and sample files
//!
//! A `.sam` manifest has two header lines followed by one sample file name
//! per line, relative to the manifest's directory. Each sample file starts
//! with the sample name and an orientation line, followed by fixed-width
//! measurement lines.

use super::encoding::{TextEncoding, char_slice, decode, split_lines};
use super::options::{LoadOptions, validate_options};
use super::units::gauss_to_am_vec;
use super::{FileLoader, LineErrors, LoadedData, file_name};
use crate::Result;
use crate::app::models::{MeasurementType, TreatmentStep, TreatmentType, Vec3};
use crate::constants::line_error_limits;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static DATA_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(..)(....)(......)(......)(......)(......)",
        r"(.........)(......)(......)(......)(.........)(.........)",
        r"(.........)(.........)(...........)(........)"
    ))
    .expect("valid CIT data pattern")
});

/// Manifest lines preceding the sample file list
const MANIFEST_HEADER_LINES: usize = 2;

/// Orientation values from a sample file's second line
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaltechOrientation {
    pub stratigraphic_level: f64,
    pub core_strike: f64,
    pub core_dip: f64,
    pub bed_strike: f64,
    pub bed_dip: f64,
    pub volume: f64,
}

impl CaltechOrientation {
    /// Read the fixed-width fields; unparseable fields are NaN
    pub fn parse(line: &str) -> Self {
        let field = |start: usize, end: Option<usize>| {
            char_slice(line, start, end).trim().parse().unwrap_or(f64::NAN)
        };
        Self {
            stratigraphic_level: field(1, Some(7)),
            core_strike: field(8, Some(13)),
            core_dip: field(14, Some(19)),
            bed_strike: field(20, Some(25)),
            bed_dip: field(26, Some(31)),
            volume: field(32, None),
        }
    }
}

/// Reads Caltech manifests and the sample files they list
#[derive(Debug, Default, Clone, Copy)]
pub struct CaltechLoader;

impl FileLoader for CaltechLoader {
    /// Parse a manifest whose sample files are relative to the working directory
    fn read_bytes(&self, bytes: &[u8], file_name: &str, _options: &LoadOptions) -> Result<LoadedData> {
        Ok(read_manifest(&decode(bytes, TextEncoding::Default), file_name, Path::new(".")))
    }

    fn read_file(&self, path: &Path, options: &LoadOptions) -> Result<LoadedData> {
        validate_options(&self.option_definitions(), options)?;
        let name = file_name(path);
        let directory = path.parent().unwrap_or(Path::new("."));
        match std::fs::read(path) {
            Ok(bytes) => Ok(read_manifest(&decode(&bytes, TextEncoding::Default), &name, directory)),
            Err(e) => Ok(LoadedData::from_message(format!("Error reading \"{}\": {}", name, e))),
        }
    }
}

fn read_manifest(text: &str, manifest_name: &str, directory: &Path) -> LoadedData {
    let lines = split_lines(text);
    if lines.is_empty() {
        return LoadedData::from_message(format!("{} is empty", manifest_name));
    }
    let mut data = LoadedData::new();
    for line in lines.iter().skip(MANIFEST_HEADER_LINES) {
        let leaf_name = line.trim();
        if leaf_name.is_empty() {
            continue;
        }
        let path = directory.join(leaf_name);
        debug!("Reading CIT sample file {}", path.display());
        match std::fs::read(&path) {
            Ok(bytes) => read_sample_file(&decode(&bytes, TextEncoding::Default), leaf_name, &mut data),
            Err(e) => data.add_message(format!("Error reading \"{}\": {}", leaf_name, e)),
        }
    }
    data
}

/// Parse one sample file, appending its steps and diagnostics to `data`
pub fn read_sample_file(text: &str, file_name: &str, data: &mut LoadedData) {
    let lines = split_lines(text);
    let Some(name_line) = lines.first() else {
        data.add_message(format!("{} is empty", file_name));
        return;
    };
    let sample_name = char_slice(name_line, 4, Some(13)).trim().to_string();
    let orientation = CaltechOrientation::parse(lines.get(1).copied().unwrap_or(""));
    debug!("CIT sample {}: {:?}", sample_name, orientation);

    let mut errors = LineErrors::new(line_error_limits::CALTECH);
    for (index, line) in lines.iter().enumerate().skip(2) {
        if line.trim().is_empty() {
            continue;
        }
        let line_number = index + 1;
        match read_step(line) {
            Some((mut step, level_ok)) => {
                if !level_ok {
                    data.add_message(format!(
                        "Unreadable treatment level at line {} in {}; using 0",
                        line_number, file_name
                    ));
                }
                step.discrete_id = sample_name.clone();
                step.sample_az = (orientation.core_strike + 270.0) % 360.0;
                step.set_sample_hade(orientation.core_dip);
                step.formation_az = (orientation.bed_strike + 90.0) % 360.0;
                step.formation_dip = orientation.bed_dip;
                data.add_step(step);
            }
            None => {
                errors.add(
                    data,
                    format!("Malformed line {} in {} -- ignoring it", line_number, file_name),
                );
                if errors.exceeded(data, file_name) {
                    break;
                }
            }
        }
    }
}

/// Parse a measurement line; the flag is false if the level was unreadable
fn read_step(line: &str) -> Option<(TreatmentStep, bool)> {
    let caps = DATA_PATTERN.captures(line)?;
    let number = |i: usize| caps[i].trim().parse::<f64>().ok();
    let intensity = number(7)?;
    let declination = number(9)?;
    let inclination = number(10)?;

    let level_text = &caps[2];
    let (level, level_ok) = match level_text.trim() {
        "" | "M" => (0.0, true),
        text => match text.parse::<f64>() {
            Ok(level) => (level, true),
            Err(_) => (0.0, false),
        },
    };

    let mut step = TreatmentStep::with_moment(gauss_to_am_vec(&Vec3::from_polar_degrees(
        intensity,
        inclination,
        declination,
    )));
    step.measurement_type = MeasurementType::Discrete;
    step.treatment_type = match &caps[1] {
        "NR" => TreatmentType::None,
        "AF" => TreatmentType::DegaussXyz,
        "TT" => TreatmentType::Thermal,
        _ => TreatmentType::Unknown,
    };
    match step.treatment_type {
        TreatmentType::DegaussXyz => step.set_af_all(level / 1000.0),
        TreatmentType::Thermal => step.temperature = level,
        _ => {}
    }
    Some((step, level_ok))
}
