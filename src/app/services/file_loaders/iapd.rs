//! Loader for IAPD single-sample files
//!
//! The first line holds the sample name followed by sample azimuth, sample
//! dip, formation azimuth, formation dip and volume, separated by spaces.
//! Each further line holds one treatment step as space-separated numbers:
//! treatment level, intensity in mA/m, two unused values, α95, declination
//! and inclination. IAPD files record neither the treatment type nor the
//! measurement type, so both come from the load options.

use super::encoding::{TextEncoding, decode, split_lines};
use super::options::{LoadOptions, OptionDefinition, OptionKind, OptionValue};
use super::{FileLoader, LoadedData};
use crate::Result;
use crate::app::models::{MeasurementType, TreatmentStep, TreatmentType, Vec3};
use crate::constants::{IAPD_HIGH_ALPHA95, option_keys};
use tracing::debug;

/// Default sample azimuth, sample dip, formation azimuth, formation dip and volume
const HEADER_DEFAULTS: [f64; 5] = [0.0, 90.0, 0.0, 0.0, 10.0];

/// Number of numeric fields on a data line
const DATA_FIELD_COUNT: usize = 7;

fn treatment_type_option() -> OptionDefinition {
    OptionDefinition::new(
        option_keys::TREATMENT_TYPE,
        "Treatment type of all steps in the file",
        OptionKind::TreatmentType,
        Some(OptionValue::TreatmentType(TreatmentType::DegaussXyz)),
    )
}

fn measurement_type_option() -> OptionDefinition {
    OptionDefinition::new(
        option_keys::MEASUREMENT_TYPE,
        "Measurement type of all steps in the file",
        OptionKind::MeasurementType,
        Some(OptionValue::MeasurementType(MeasurementType::Discrete)),
    )
}

/// Reads IAPD files
#[derive(Debug, Default, Clone, Copy)]
pub struct IapdLoader;

impl FileLoader for IapdLoader {
    fn option_definitions(&self) -> Vec<OptionDefinition> {
        vec![treatment_type_option(), measurement_type_option()]
    }

    fn read_bytes(&self, bytes: &[u8], file_name: &str, options: &LoadOptions) -> Result<LoadedData> {
        let treatment_type = treatment_type_option()
            .value(options)?
            .and_then(|v| v.as_treatment_type())
            .unwrap_or(TreatmentType::DegaussXyz);
        let measurement_type = measurement_type_option()
            .value(options)?
            .and_then(|v| v.as_measurement_type())
            .unwrap_or(MeasurementType::Discrete);
        let text = decode(bytes, TextEncoding::Default);
        Ok(read_text(&text, file_name, treatment_type, measurement_type))
    }
}

/// Sample-level values from the header line
#[derive(Debug, Clone, PartialEq)]
struct Header {
    name: String,
    sample_az: f64,
    sample_dip: f64,
    formation_az: f64,
    formation_dip: f64,
    volume: f64,
}

fn read_header(line: &str, file_name: &str, data: &mut LoadedData) -> Option<Header> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let name = match tokens.first() {
        Some(name) => name.to_string(),
        None => {
            data.add_message(format!("No sample name in \"{}\"", file_name));
            "Unknown".to_string()
        }
    };
    let mut values = HEADER_DEFAULTS;
    for (value, token) in values.iter_mut().zip(tokens.iter().skip(1)) {
        match token.parse() {
            Ok(v) => *value = v,
            Err(_) => {
                data.add_message(format!("Malformed header in \"{}\"", file_name));
                return None;
            }
        }
    }
    let [sample_az, sample_dip, formation_az, formation_dip, volume] = values;
    Some(Header {
        name,
        sample_az,
        sample_dip,
        formation_az,
        formation_dip,
        volume,
    })
}

fn read_text(
    text: &str,
    file_name: &str,
    treatment_type: TreatmentType,
    measurement_type: MeasurementType,
) -> LoadedData {
    let lines = split_lines(text);
    let Some(header_line) = lines.first() else {
        return LoadedData::from_message(format!("{} is empty", file_name));
    };
    let mut data = LoadedData::new();
    let Some(header) = read_header(header_line, file_name, &mut data) else {
        return data;
    };
    debug!("IAPD header for {}: {:?}", file_name, header);

    let mut max_alpha95 = 0.0_f64;
    let mut malformed_reported = false;
    for line in lines.iter().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let mut fields = [0.0; DATA_FIELD_COUNT];
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let mut malformed = tokens.len() < DATA_FIELD_COUNT;
        for (field, token) in fields.iter_mut().zip(&tokens) {
            match token.parse() {
                Ok(v) => *field = v,
                Err(_) => malformed = true,
            }
        }
        if malformed && !malformed_reported {
            data.add_message(format!("Malformed data fields in \"{}\".", file_name));
            malformed_reported = true;
        }

        let [level, intensity, _, _, alpha95, dec, inc] = fields;
        let mut step = TreatmentStep::with_moment(Vec3::from_polar_degrees(intensity / 1000.0, inc, dec));
        match treatment_type {
            TreatmentType::Thermal => step.temperature = level,
            TreatmentType::DegaussXyz | TreatmentType::Arm => step.set_af_all(level / 1000.0),
            TreatmentType::DegaussZ => step.af_z = level / 1000.0,
            TreatmentType::Irm => step.irm_field = level / 1000.0,
            _ => {}
        }
        step.discrete_id = header.name.clone();
        if measurement_type == MeasurementType::Continuous && header.name.parse::<f64>().is_ok() {
            step.depth = Some(header.name.clone());
        }
        step.sample_az = header.sample_az;
        step.sample_dip = header.sample_dip;
        step.formation_az = header.formation_az;
        step.formation_dip = header.formation_dip;
        step.volume = header.volume;
        step.treatment_type = treatment_type;
        step.measurement_type = measurement_type;
        step.alpha95 = alpha95;
        max_alpha95 = max_alpha95.max(alpha95);
        data.add_step(step);
    }
    if max_alpha95 >= IAPD_HIGH_ALPHA95 {
        data.add_message(format!(
            "File \"{}\" has high α95 values (max. {:.1}).",
            file_name, max_alpha95
        ));
    }
    data
}
