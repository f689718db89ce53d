//! Reader and writer for the native PuffinPlot tab-delimited format
//!
//! Line 1 names the format version, line 2 lists the column names and each
//! following line holds one treatment step. A blank line ends the data;
//! anything after it is preserved verbatim as extra lines. Version 2 files
//! store cgs units and 2G treatment names; version 3 stores SI units and the
//! native field values.

use super::encoding::{TextEncoding, decode, split_lines};
use super::options::LoadOptions;
use super::twogee::treatment_type_from_2g_name;
use super::units::{gauss_to_am_vec, oersted_to_tesla};
use super::{FileLoader, LineErrors, LoadedData};
use crate::Result;
use crate::app::models::{TreatmentStep, TreatmentStepField};
use crate::constants::{PPL_HEADER_PREFIX, PPL_WRITE_VERSION, line_error_limits};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static HEADER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^PuffinPlot file. Version (\d+)$").expect("valid version header pattern")
});

/// Reads PuffinPlot files of version 2 or 3
#[derive(Debug, Default, Clone, Copy)]
pub struct PplLoader;

impl FileLoader for PplLoader {
    fn read_bytes(&self, bytes: &[u8], file_name: &str, _options: &LoadOptions) -> Result<LoadedData> {
        Ok(read_text(&decode(bytes, TextEncoding::Default), file_name))
    }
}

fn read_text(text: &str, file_name: &str) -> LoadedData {
    let lines = split_lines(text);
    let Some(first_line) = lines.first() else {
        return LoadedData::from_message(format!("{} is empty.", file_name));
    };
    let Some(version) = HEADER_PATTERN
        .captures(first_line)
        .and_then(|c| c[1].parse::<u32>().ok())
    else {
        return LoadedData::from_message(format!(
            "{} doesn't appear to be a PuffinPlot file.",
            file_name
        ));
    };
    if version != 2 && version != 3 {
        return LoadedData::from_message(format!(
            "{} is of version {}, which cannot be loaded.",
            file_name, version
        ));
    }
    let Some(header) = lines.get(1) else {
        return LoadedData::from_message(format!("{} contains no headers or data.", file_name));
    };

    let mut fields = Vec::new();
    for heading in header.split('\t') {
        match heading.parse::<TreatmentStepField>() {
            Ok(field) => fields.push(field),
            Err(_) => {
                return LoadedData::from_message(format!(
                    "Unknown column heading \"{}\" in {}",
                    heading, file_name
                ));
            }
        }
    }
    if !fields.contains(&TreatmentStepField::Treatment) {
        return LoadedData::from_message(format!("{} has no TREATMENT column.", file_name));
    }
    debug!("{} is a version {} PuffinPlot file with {} columns", file_name, version, fields.len());

    let mut data = LoadedData::new();
    let mut errors = LineErrors::new(line_error_limits::PPL);
    let mut body = lines.iter().enumerate().skip(2);
    for (index, line) in body.by_ref() {
        if line.is_empty() {
            break;
        }
        match read_step(&fields, line, version) {
            Ok(step) => data.add_step(step),
            Err(e) => {
                errors.add(
                    &mut data,
                    format!("Error at line {} of file {}: {}", index + 1, file_name, e),
                );
                if errors.exceeded(&mut data, file_name) {
                    return data;
                }
            }
        }
    }
    for (_, line) in body {
        data.add_extra_line(*line);
    }
    data
}

fn read_step(fields: &[TreatmentStepField], line: &str, version: u32) -> Result<TreatmentStep> {
    let mut step = TreatmentStep::new();
    for (field, value) in fields.iter().zip(line.split('\t')) {
        if version == 2 && *field == TreatmentStepField::Treatment {
            step.treatment_type = treatment_type_from_2g_name(value);
        } else {
            step.set_value(*field, value, 1.0)?;
        }
    }
    if version == 2 {
        convert_from_cgs(&mut step);
    }
    Ok(step)
}

/// Convert a version 2 step from gauss and oersted to A/m and tesla
fn convert_from_cgs(step: &mut TreatmentStep) {
    step.moment = step.moment.map(|m| gauss_to_am_vec(&m));
    for field in [
        &mut step.af_x,
        &mut step.af_y,
        &mut step.af_z,
        &mut step.irm_field,
        &mut step.arm_field,
    ] {
        if !field.is_nan() {
            *field = oersted_to_tesla(*field);
        }
    }
}

/// Serialize steps as a current-version PuffinPlot file.
///
/// Extra lines, if any, follow the data after a single blank line.
pub fn write_ppl(steps: &[TreatmentStep], extra_lines: &[String]) -> String {
    let mut out = format!("{} {}\n", PPL_HEADER_PREFIX, PPL_WRITE_VERSION);
    let header: Vec<&str> = TreatmentStepField::real_fields().map(|f| f.name()).collect();
    out.push_str(&header.join("\t"));
    out.push('\n');
    for step in steps {
        out.push_str(&step.real_values().join("\t"));
        out.push('\n');
    }
    if !extra_lines.is_empty() {
        out.push('\n');
        for line in extra_lines {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}
