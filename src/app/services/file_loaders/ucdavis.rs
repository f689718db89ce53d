//! Loader for UC Davis long-core files
//!
//! One line holds every treatment level measured at one core depth. The
//! header names each column after the first as `parameter(level)`, e.g.
//! `D(20)` for the declination after 20 mT AF demagnetization. Moments are
//! built from the declination, inclination and intensity columns; the x, y
//! and z columns are present too but are not used.

use super::encoding::{TextEncoding, decode, split_lines};
use super::options::LoadOptions;
use super::{FileLoader, LineErrors, LoadedData};
use crate::Result;
use crate::app::models::{MeasurementType, TreatmentStep, TreatmentType, Vec3};
use crate::constants::line_error_limits;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::debug;

static COLUMN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^(]+)[(](\d+)[)]$").expect("valid column pattern"));

/// Column indices of the polar fields for one treatment level
#[derive(Debug, Clone, Copy, Default)]
struct LevelColumns {
    declination: Option<usize>,
    inclination: Option<usize>,
    intensity: Option<usize>,
}

/// Complete polar column set for one level
#[derive(Debug, Clone, Copy)]
struct PolarColumns {
    declination: usize,
    inclination: usize,
    intensity: usize,
}

/// Reads UC Davis files
#[derive(Debug, Default, Clone, Copy)]
pub struct UcDavisLoader;

impl FileLoader for UcDavisLoader {
    fn read_bytes(&self, bytes: &[u8], file_name: &str, _options: &LoadOptions) -> Result<LoadedData> {
        Ok(read_text(&decode(bytes, TextEncoding::Default), file_name))
    }
}

/// Map each treatment level (in mT) to its columns, in ascending level order
fn read_header(header: &str, file_name: &str) -> std::result::Result<BTreeMap<u32, PolarColumns>, String> {
    let mut levels: BTreeMap<u32, LevelColumns> = BTreeMap::new();
    for (index, heading) in header.trim().split('\t').enumerate().skip(1) {
        let caps = COLUMN_PATTERN
            .captures(heading.trim())
            .ok_or_else(|| format!("Unrecognized column heading \"{}\" in {}", heading, file_name))?;
        let level: u32 = caps[2]
            .parse()
            .map_err(|_| format!("Bad treatment level in column heading \"{}\" in {}", heading, file_name))?;
        let columns = levels.entry(level).or_default();
        match caps[1].trim() {
            "D" => columns.declination = Some(index),
            "I" => columns.inclination = Some(index),
            "J" => columns.intensity = Some(index),
            // cartesian components duplicate the polar ones
            "X" | "Y" | "Z" => {}
            other => debug!("Ignoring UC Davis column {} in {}", other, file_name),
        }
    }

    levels
        .into_iter()
        .map(|(level, columns)| match columns {
            LevelColumns {
                declination: Some(declination),
                inclination: Some(inclination),
                intensity: Some(intensity),
            } => Ok((
                level,
                PolarColumns {
                    declination,
                    inclination,
                    intensity,
                },
            )),
            _ => Err(format!(
                "Missing declination, inclination or intensity for level {} in {}",
                level, file_name
            )),
        })
        .collect()
}

fn read_text(text: &str, file_name: &str) -> LoadedData {
    let lines = split_lines(text);
    let Some(header) = lines.first() else {
        return LoadedData::from_message(format!("{} is empty", file_name));
    };
    let levels = match read_header(header, file_name) {
        Ok(levels) => levels,
        Err(message) => return LoadedData::from_message(message),
    };
    debug!("UC Davis levels in {}: {:?}", file_name, levels.keys().collect::<Vec<_>>());

    let mut data = LoadedData::new();
    let mut errors = LineErrors::new(line_error_limits::UC_DAVIS);
    for (index, line) in lines.iter().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let parts: Vec<&str> = line.trim_end().split('\t').collect();
        let values: Option<Vec<f64>> = parts.iter().map(|p| p.trim().parse().ok()).collect();
        let steps = values.and_then(|values| {
            levels
                .iter()
                .map(|(&level, columns)| make_step(&values, parts[0], level, columns))
                .collect::<Option<Vec<_>>>()
        });
        match steps {
            Some(steps) => steps.into_iter().for_each(|step| data.add_step(step)),
            None => {
                errors.add(
                    &mut data,
                    format!("Malformed line {} in {} -- ignoring it", index + 1, file_name),
                );
                if errors.exceeded(&mut data, file_name) {
                    break;
                }
            }
        }
    }
    data
}

fn make_step(values: &[f64], depth: &str, level: u32, columns: &PolarColumns) -> Option<TreatmentStep> {
    let mut step = TreatmentStep::with_moment(Vec3::from_polar_degrees(
        *values.get(columns.intensity)?,
        *values.get(columns.inclination)?,
        *values.get(columns.declination)?,
    ));
    step.treatment_type = TreatmentType::DegaussXyz;
    step.set_af_all(f64::from(level) / 1000.0);
    step.measurement_type = MeasurementType::Continuous;
    step.depth = Some(depth.to_string());
    Some(step)
}
