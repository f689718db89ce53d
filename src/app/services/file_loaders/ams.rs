//! Loader for AGICO anisotropy of magnetic susceptibility (ASC) exports
//!
//! ASC files are page-formatted reports rather than tables, so they are read
//! by scanning whitespace-separated tokens for labels: the token before
//! `ANISOTROPY` names a specimen, tokens before `Azi` and `Dip` give its
//! orientation, and the line starting `Specimen` and the line after it hold
//! the six susceptibility tensor components.

use super::encoding::{TextEncoding, decode, split_lines};
use super::options::{LoadOptions, OptionDefinition, OptionKind, OptionValue};
use super::{FileLoader, LoadedData};
use crate::Result;
use crate::app::models::AmsData;
use crate::app::services::orientation::{AzimuthParameter, DipParameter, OrientationParameters};
use crate::constants::option_keys;
use tracing::debug;

/// Convention used by AGICO software: P1=12, P2=0, P3=12, P4=90
const AGICO_ORIENTATION: OrientationParameters = OrientationParameters {
    p1: AzimuthParameter::A12,
    p2: DipParameter::D0,
    p3: AzimuthParameter::A12,
    p4: DipParameter::D90,
};

fn orientation_option() -> OptionDefinition {
    OptionDefinition::new(
        option_keys::ORIENTATION,
        "Orientation parameters used in the file",
        OptionKind::Orientation,
        Some(OptionValue::Orientation(AGICO_ORIENTATION)),
    )
}

/// Reads AGICO ASC files into [`LoadedData::ams_data`]
#[derive(Debug, Default, Clone, Copy)]
pub struct AmsLoader;

impl FileLoader for AmsLoader {
    fn option_definitions(&self) -> Vec<OptionDefinition> {
        vec![orientation_option()]
    }

    fn read_bytes(&self, bytes: &[u8], file_name: &str, options: &LoadOptions) -> Result<LoadedData> {
        let parameters = orientation_option()
            .value(options)?
            .and_then(|v| v.as_orientation())
            .unwrap_or(AGICO_ORIENTATION);
        Ok(read_text(&decode(bytes, TextEncoding::Default), file_name, &parameters))
    }
}

/// Values collected for the specimen currently being read
#[derive(Debug, Clone, Default)]
struct Specimen {
    name: String,
    sample_az: f64,
    sample_dip: f64,
    formation_az: f64,
    formation_dip: f64,
    azimuths_seen: usize,
    dips_seen: usize,
    diagonal: Option<[f64; 3]>,
}

impl Specimen {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

/// The last three tokens of a line as numbers
fn last_three(tokens: &[&str]) -> Option<[f64; 3]> {
    let [a, b, c] = tokens.get(tokens.len().checked_sub(3)?..)? else {
        return None;
    };
    Some([a.parse().ok()?, b.parse().ok()?, c.parse().ok()?])
}

fn read_text(text: &str, file_name: &str, parameters: &OrientationParameters) -> LoadedData {
    let mut data = LoadedData::new();
    let mut specimen = Specimen::named("UNKNOWN");
    let mut expecting_off_diagonal = false;

    for (index, raw_line) in split_lines(text).into_iter().enumerate() {
        let line = raw_line.replace('\u{c}', "");
        let tokens: Vec<&str> = line.split_whitespace().collect();

        if expecting_off_diagonal {
            expecting_off_diagonal = false;
            match (specimen.diagonal.take(), last_three(&tokens)) {
                (Some([k11, k22, k33]), Some([k12, k23, k13])) => {
                    data.add_ams_data(AmsData::new(
                        specimen.name.clone(),
                        parameters,
                        [k11, k22, k33, k12, k23, k13],
                        specimen.sample_az,
                        specimen.sample_dip,
                        specimen.formation_az,
                        specimen.formation_dip,
                    ));
                }
                _ => data.add_message(format!(
                    "Unreadable susceptibility tensor for {} at line {} in {}",
                    specimen.name,
                    index + 1,
                    file_name
                )),
            }
            continue;
        }

        for (i, token) in tokens.iter().enumerate().skip(1) {
            let previous = tokens[i - 1];
            match *token {
                "ANISOTROPY" => specimen = Specimen::named(previous),
                "Azi" => {
                    let value = previous.parse().unwrap_or(0.0);
                    if specimen.azimuths_seen == 0 {
                        specimen.sample_az = value;
                    } else {
                        specimen.formation_az = value;
                    }
                    specimen.azimuths_seen += 1;
                }
                "Dip" => {
                    let value = previous.parse().unwrap_or(0.0);
                    if specimen.dips_seen == 0 {
                        specimen.sample_dip = value;
                    } else {
                        specimen.formation_dip = value;
                    }
                    specimen.dips_seen += 1;
                }
                _ => {}
            }
        }

        if tokens.first() == Some(&"Specimen") {
            specimen.diagonal = last_three(&tokens);
            expecting_off_diagonal = true;
        }
    }

    debug!("Read {} AMS specimens from {}", data.ams_data.len(), file_name);
    if data.ams_data.is_empty() {
        data.add_message(format!("No AMS data found in {}", file_name));
    }
    data
}
