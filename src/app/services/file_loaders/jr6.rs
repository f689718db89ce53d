//! Loader for AGICO JR6 spinner magnetometer files
//!
//! Every line is one measurement in a fixed-width layout: specimen name,
//! treatment code, moment components with a shared decimal exponent, sample
//! and bedding orientations, and the four orientation parameters describing
//! the conventions those orientations use.

use super::encoding::{TextEncoding, decode, split_lines};
use super::options::{LoadOptions, OptionDefinition, OptionKind, OptionValue};
use super::{FileLoader, LineErrors, LoadedData};
use crate::Result;
use crate::app::models::{MeasurementType, TreatmentStep, TreatmentType, Vec3};
use crate::app::services::orientation::{OrientationParameters, VectorAndOrientations};
use crate::constants::{line_error_limits, option_keys};
use regex::Regex;
use std::sync::LazyLock;

static LINE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let xyz = r"([-0-9. ]{6})";
    let d4 = r"([-0-9. ]{4})";
    let pattern = format!(
        r"^(.{{10}})(.{{8}}){xyz}{xyz}{xyz}{d4}{d4}{d4}{d4}{d4}{d4}{d4}(  3|  6|  9| 12)(  0| 90)(  3|  6|  9| 12)(  0| 90){d4}$"
    );
    Regex::new(&pattern).expect("valid JR6 line pattern")
});

/// One parsed JR6 line, in the file's own orientation conventions
#[derive(Debug, Clone, PartialEq)]
pub struct Jr6DataLine {
    pub name: String,
    pub treatment_type: TreatmentType,
    pub treatment_level: f64,
    pub moment: Vec3,
    pub azimuth: f64,
    pub dip: f64,
    pub foliation_azimuth: f64,
    pub foliation_dip: f64,
    pub lineation_trend: f64,
    pub lineation_plunge: f64,
    pub parameters: OrientationParameters,
    pub precision: f64,
}

impl Jr6DataLine {
    /// Parse a line; numeric treatment codes take `default_treatment`
    pub fn parse(line: &str, default_treatment: TreatmentType) -> Option<Self> {
        let caps = LINE_PATTERN.captures(line)?;
        let number = |i: usize| caps[i].trim().parse::<f64>().ok();
        let exponent: i32 = caps[6].trim().parse().ok()?;
        let (treatment_type, treatment_level) = parse_treatment(caps[2].trim(), default_treatment)?;
        let parameters = OrientationParameters::read(&caps[13], &caps[14], &caps[15], &caps[16]).ok()?;
        Some(Self {
            name: caps[1].trim().to_string(),
            treatment_type,
            treatment_level,
            moment: Vec3::new(number(3)?, number(4)?, number(5)?).times(10f64.powi(exponent)),
            azimuth: number(7)?,
            dip: number(8)?,
            foliation_azimuth: number(9)?,
            foliation_dip: number(10)?,
            lineation_trend: number(11)?,
            lineation_plunge: number(12)?,
            parameters,
            precision: number(17)?,
        })
    }

    /// Moment and orientations converted to the canonical convention
    pub fn canonical(&self) -> VectorAndOrientations {
        self.parameters.convert_to_canonical(&VectorAndOrientations::new(
            self.moment,
            self.azimuth,
            self.dip,
            self.foliation_azimuth,
            self.foliation_dip,
        ))
    }
}

/// Decode a treatment field: blank, a bare level, `NRM`, or a letter code
fn parse_treatment(field: &str, default_treatment: TreatmentType) -> Option<(TreatmentType, f64)> {
    if field.is_empty() {
        return Some((TreatmentType::None, 0.0));
    }
    if field.chars().all(|c| c.is_ascii_digit()) {
        return Some((default_treatment, field.parse().ok()?));
    }
    if field == "NRM" {
        return Some((TreatmentType::None, 0.0));
    }
    let mut chars = field.chars();
    let treatment_type = match chars.next()? {
        'N' => TreatmentType::None,
        'T' => TreatmentType::Thermal,
        'A' => TreatmentType::DegaussXyz,
        'M' => TreatmentType::Arm,
        _ => TreatmentType::Unknown,
    };
    let rest = chars.as_str().trim();
    let level = if rest.is_empty() { 0.0 } else { rest.parse().ok()? };
    Some((treatment_type, level))
}

fn treatment_type_option() -> OptionDefinition {
    OptionDefinition::new(
        option_keys::TREATMENT_TYPE,
        "Treatment type for purely numeric treatment codes",
        OptionKind::TreatmentType,
        Some(OptionValue::TreatmentType(TreatmentType::DegaussXyz)),
    )
}

/// Reads JR6 files
#[derive(Debug, Default, Clone, Copy)]
pub struct Jr6Loader;

impl FileLoader for Jr6Loader {
    fn option_definitions(&self) -> Vec<OptionDefinition> {
        vec![treatment_type_option()]
    }

    fn read_bytes(&self, bytes: &[u8], file_name: &str, options: &LoadOptions) -> Result<LoadedData> {
        let default_treatment = treatment_type_option()
            .value(options)?
            .and_then(|v| v.as_treatment_type())
            .unwrap_or(TreatmentType::DegaussXyz);
        let text = decode(bytes, TextEncoding::Ascii);
        Ok(read_text(&text, file_name, default_treatment))
    }
}

fn read_text(text: &str, file_name: &str, default_treatment: TreatmentType) -> LoadedData {
    let lines = split_lines(text);
    if lines.is_empty() {
        return LoadedData::from_message(format!("{} is empty", file_name));
    }
    let mut data = LoadedData::new();
    let mut errors = LineErrors::new(line_error_limits::JR6);
    for (index, line) in lines.iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match Jr6DataLine::parse(line, default_treatment) {
            Some(data_line) => data.add_step(make_step(&data_line)),
            None => {
                errors.add(
                    &mut data,
                    format!("Malformed line {} in JR6 file {} -- ignoring it", index + 1, file_name),
                );
                if errors.exceeded(&mut data, file_name) {
                    break;
                }
            }
        }
    }
    data
}

fn make_step(line: &Jr6DataLine) -> TreatmentStep {
    let mut step = TreatmentStep::new();
    line.canonical().apply_to(&mut step);
    step.measurement_type = MeasurementType::Discrete;
    step.discrete_id = line.name.clone();
    step.treatment_type = line.treatment_type;
    step.alpha95 = line.precision;
    let level = line.treatment_level;
    match line.treatment_type {
        TreatmentType::Thermal => step.temperature = level,
        TreatmentType::DegaussXyz | TreatmentType::Arm => step.set_af_all(level / 1000.0),
        TreatmentType::DegaussZ => step.af_z = level / 1000.0,
        TreatmentType::Irm => step.irm_field = level / 1000.0,
        _ => {}
    }
    step
}
