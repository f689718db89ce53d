//! Loader for ZPlot data files
//!
//! A ZPlot file starts with a `File Name:` line and five further metadata
//! lines, the last of which names the study type. The column header line
//! starts with `Sample`; data lines are tab-separated. The treatment type is
//! not recorded explicitly and is inferred from the word "therm" in the
//! project, operation or study type.

use super::encoding::{TextEncoding, decode, split_lines};
use super::options::LoadOptions;
use super::units::{gauss_to_am_vec, oersted_to_tesla};
use super::{FileLoader, LineErrors, LoadedData};
use crate::Result;
use crate::app::models::{MeasurementType, TreatmentStep, TreatmentType, Vec3};
use crate::constants::{ZPLOT_MAGIC, line_error_limits};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// Expected patterns for the first seven header fields
static HEADER_FIELDS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        "Sample",
        "Project",
        "Demag.*",
        "Declin.*",
        "Inclin.*",
        "Intens.*",
        "Operation|Depth",
    ]
    .iter()
    .map(|p| Regex::new(&format!("^(?:{})$", p)).expect("valid header field pattern"))
    .collect()
});

static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+)?$").expect("valid number pattern"));

/// Number of metadata lines between the file name line and the study type
const SKIPPED_METADATA_LINES: usize = 4;

/// Reads ZPlot files
#[derive(Debug, Default, Clone, Copy)]
pub struct ZplotLoader;

impl FileLoader for ZplotLoader {
    fn read_bytes(&self, bytes: &[u8], file_name: &str, _options: &LoadOptions) -> Result<LoadedData> {
        Ok(read_text(&decode(bytes, TextEncoding::Default), file_name))
    }
}

fn read_text(text: &str, file_name: &str) -> LoadedData {
    let mut lines = split_lines(text)
        .into_iter()
        .enumerate()
        .map(|(i, line)| (i + 1, line));

    let Some((_, first_line)) = lines.next() else {
        return LoadedData::from_message(format!("{} is empty", file_name));
    };
    if !first_line.starts_with(ZPLOT_MAGIC) {
        return LoadedData::from_message(format!("Ignoring unrecognized file {}", file_name));
    }
    let study_type = lines
        .nth(SKIPPED_METADATA_LINES)
        .map_or(String::new(), |(_, line)| line.to_lowercase());
    let Some((_, header_line)) = lines.find(|(_, line)| line.starts_with("Sample")) else {
        return LoadedData::from_message(format!(
            "Couldn't find header line in ZPlot file {}: ignoring it",
            file_name
        ));
    };

    let mut data = LoadedData::new();
    let headers: Vec<&str> = header_line.split_whitespace().collect();
    if !(7..=8).contains(&headers.len()) {
        data.add_message(format!(
            "Wrong number of header fields in Zplot file {}: expected 7 or 8, got {}",
            file_name,
            headers.len()
        ));
    }
    for (pattern, header) in HEADER_FIELDS.iter().zip(&headers) {
        if !pattern.is_match(header) {
            data.add_message(format!("Unknown header field {} in file {}.", header, file_name));
        }
    }
    if data.message_count() > 0 {
        return data;
    }
    debug!("ZPlot study type for {}: {:?}", file_name, study_type);

    let mut measurement_type = MeasurementType::Unset;
    let mut errors = LineErrors::new(line_error_limits::ZPLOT);
    for (line_number, line) in lines {
        if line.trim().is_empty() {
            continue;
        }
        match read_step(line, &study_type, &mut measurement_type) {
            Some(step) => data.add_step(step),
            None => {
                errors.add(
                    &mut data,
                    format!("Malformed line {} in ZPlot file {} -- ignoring it", line_number, file_name),
                );
                if errors.exceeded(&mut data, file_name) {
                    break;
                }
            }
        }
    }
    data
}

/// Parse one data line; the first line decides discrete or continuous
fn read_step(line: &str, study_type: &str, measurement_type: &mut MeasurementType) -> Option<TreatmentStep> {
    let parts: Vec<&str> = line.split('\t').collect();
    if parts.len() < 7 {
        return None;
    }
    let number = |i: usize| parts[i].trim().parse::<f64>().ok();
    let (demag, dec, inc, intensity) = (number(2)?, number(3)?, number(4)?, number(5)?);
    let (id, project, operation) = (parts[0], parts[1], parts[6]);

    let mut step = TreatmentStep::with_moment(gauss_to_am_vec(&Vec3::from_polar_degrees(
        intensity, inc, dec,
    )));
    if *measurement_type == MeasurementType::Unset {
        *measurement_type = if NUMBER_PATTERN.is_match(id) {
            MeasurementType::Continuous
        } else {
            MeasurementType::Discrete
        };
    }
    step.measurement_type = *measurement_type;
    if *measurement_type == MeasurementType::Continuous {
        step.depth = Some(id.to_string());
    } else {
        step.discrete_id = id.to_string();
    }

    let thermal = [project, operation, study_type]
        .iter()
        .any(|s| s.to_lowercase().contains("therm"));
    if thermal {
        step.treatment_type = TreatmentType::Thermal;
        step.temperature = demag;
    } else {
        step.treatment_type = TreatmentType::DegaussXyz;
        step.set_af_all(oersted_to_tesla(demag));
    }
    Some(step)
}
