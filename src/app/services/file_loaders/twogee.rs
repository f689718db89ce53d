//! Loader for 2G Enterprises magnetometer ASCII files
//!
//! A 2G file is tab-delimited with a header line naming the columns. Only a
//! known set of column names is read; others are reported once and ignored.
//! Depending on the measurement protocol, one treatment step may be spread
//! over two or three consecutive lines (empty-tray, normal, and y-flipped
//! readings) which are combined into a single corrected moment.

use super::encoding::{TextEncoding, decode, split_lines};
use super::options::{LoadOptions, OptionDefinition, OptionKind, OptionValue};
use super::units::{gauss_to_am_vec, oersted_to_tesla};
use super::{FileLoader, LineErrors, LoadedData};
use crate::app::models::{ArmAxis, MeasurementType, TreatmentStep, TreatmentType, Vec3};
use crate::constants::{line_error_limits, option_keys};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

// =============================================================================
// Measurement Protocol
// =============================================================================

/// Order of tray and sample readings in a 2G run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Protocol {
    /// Sample readings only
    #[default]
    Normal,
    /// Empty-tray reading, then sample reading
    TrayNormal,
    /// Sample reading, then empty-tray reading
    NormalTray,
    /// Tray, sample, then sample flipped about the y axis
    TrayNormalYflip,
    /// One tray reading at the start, then sample readings
    TrayFirst,
    /// As `TrayNormal`, but only the first tray reading is subtracted
    TrayNormalIgnore,
}

impl Protocol {
    pub const ALL: [Protocol; 6] = [
        Protocol::Normal,
        Protocol::TrayNormal,
        Protocol::NormalTray,
        Protocol::TrayNormalYflip,
        Protocol::TrayFirst,
        Protocol::TrayNormalIgnore,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Protocol::Normal => "NORMAL",
            Protocol::TrayNormal => "TRAY_NORMAL",
            Protocol::NormalTray => "NORMAL_TRAY",
            Protocol::TrayNormalYflip => "TRAY_NORMAL_YFLIP",
            Protocol::TrayFirst => "TRAY_FIRST",
            Protocol::TrayNormalIgnore => "TRAY_NORMAL_IGNORE",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Protocol {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        Protocol::ALL
            .into_iter()
            .find(|p| p.name() == normalized)
            .ok_or_else(|| Error::invalid_option(option_keys::PROTOCOL, format!("unknown protocol '{}'", s)))
    }
}

// =============================================================================
// 2G Name Tables
// =============================================================================

fn normalize_name(name: &str) -> String {
    name.trim().trim_matches('"').to_lowercase()
}

/// Treatment type from the wording used in 2G "Treatment Type" columns
pub fn treatment_type_from_2g_name(name: &str) -> TreatmentType {
    match normalize_name(name).as_str() {
        "none" => TreatmentType::None,
        "degauss x, y, & z" => TreatmentType::DegaussXyz,
        "degauss z" => TreatmentType::DegaussZ,
        "degauss z - arm axial" => TreatmentType::Arm,
        "irm" => TreatmentType::Irm,
        "thermal demag" => TreatmentType::Thermal,
        _ => TreatmentType::Unknown,
    }
}

/// Measurement type from the wording used in 2G "Meas. type" columns
pub fn measurement_type_from_2g_name(name: &str) -> MeasurementType {
    match normalize_name(name).as_str() {
        "sample/discrete" => MeasurementType::Discrete,
        "sample/continuous" => MeasurementType::Continuous,
        "na" => MeasurementType::None,
        _ => MeasurementType::Unknown,
    }
}

/// Column names read from 2G files
const RECOGNIZED_COLUMNS: &[&str] = &[
    "Meas. type",
    "Depth",
    "Position",
    "Area",
    "Volume",
    "Declination: Unrotated",
    "Inclination: Unrotated",
    "Intensity",
    "X corr",
    "Y corr",
    "Z corr",
    "X intensity",
    "Y intensity",
    "Z intensity",
    "X mean",
    "Y mean",
    "Z mean",
    "MS corr",
    "Sample ID",
    "Treatment Type",
    "ARM Gauss",
    "IRM Gauss",
    "AF X",
    "AF Y",
    "AF Z",
    "Temp C",
    "ARM axis",
    "Sample Azimiuth",
    "Sample Dip",
    "Formation Dip Azimuth",
    "Formation Dip",
    "Mag Dev",
    "Run #",
    "Sample Timestamp",
    "X drift",
    "Y drift",
    "Z drift",
];

// =============================================================================
// Loader
// =============================================================================

fn protocol_option() -> OptionDefinition {
    OptionDefinition::new(
        option_keys::PROTOCOL,
        "Measurement protocol (order of tray and sample readings)",
        OptionKind::Protocol,
        Some(OptionValue::Protocol(Protocol::Normal)),
    )
}

fn sensor_lengths_option() -> OptionDefinition {
    OptionDefinition::new(
        option_keys::SENSOR_LENGTHS,
        "Effective sensor lengths in cm for continuous measurements",
        OptionKind::Vector,
        Some(OptionValue::Vector(Vec3::new(1.0, 1.0, 1.0))),
    )
}

fn use_polar_moment_option() -> OptionDefinition {
    OptionDefinition::new(
        option_keys::USE_POLAR_MOMENT,
        "Read moments from declination/inclination/intensity columns",
        OptionKind::Bool,
        Some(OptionValue::Bool(false)),
    )
}

/// Settings controlling how 2G lines become treatment steps
#[derive(Debug, Clone, Copy)]
struct Settings {
    protocol: Protocol,
    sensor_lengths: Vec3,
    use_polar_moment: bool,
}

/// Reads 2G ASCII export files
#[derive(Debug, Default, Clone, Copy)]
pub struct TwoGeeLoader;

impl FileLoader for TwoGeeLoader {
    fn option_definitions(&self) -> Vec<OptionDefinition> {
        vec![protocol_option(), sensor_lengths_option(), use_polar_moment_option()]
    }

    fn read_bytes(&self, bytes: &[u8], file_name: &str, options: &LoadOptions) -> Result<LoadedData> {
        let settings = Settings {
            protocol: protocol_option()
                .value(options)?
                .and_then(|v| v.as_protocol())
                .unwrap_or_default(),
            sensor_lengths: sensor_lengths_option()
                .value(options)?
                .and_then(|v| v.as_vector())
                .unwrap_or(Vec3::new(1.0, 1.0, 1.0)),
            use_polar_moment: use_polar_moment_option()
                .value(options)?
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
        };
        info!("Reading 2G file {} ({} protocol)", file_name, settings.protocol);
        let text = decode(bytes, TextEncoding::Default);
        Ok(read_text(&text, file_name, settings))
    }
}

fn read_text(text: &str, file_name: &str, settings: Settings) -> LoadedData {
    let mut lines = split_lines(text)
        .into_iter()
        .enumerate()
        .map(|(i, line)| (i + 1, line));

    let Some((_, header)) = lines.next() else {
        return LoadedData::from_message(format!("{} is empty.", file_name));
    };

    let mut columns = HashMap::new();
    let mut unknown = Vec::new();
    for (index, name) in header.split('\t').enumerate() {
        if RECOGNIZED_COLUMNS.contains(&name) {
            columns.entry(name).or_insert(index);
        } else if !name.trim().is_empty() {
            unknown.push(name);
        }
    }
    if columns.is_empty() {
        return LoadedData::from_message(format!(
            "No recognized column headers in {} -- is this a 2G file?",
            file_name
        ));
    }
    debug!("Recognized 2G columns in {}: {:?}", file_name, columns.keys().collect::<Vec<_>>());

    let mut reader = Reader {
        file_name,
        columns,
        settings,
        data: LoadedData::new(),
        errors: LineErrors::new(line_error_limits::TWOGEE),
        last_line: 1,
    };
    if !unknown.is_empty() {
        reader.data.add_message(format!(
            "Ignoring unrecognized columns in {}: {}",
            file_name,
            unknown.join(", ")
        ));
    }

    let mut tray_moment: Option<Vec3> = None;
    while let Some((line_number, line)) = lines.next() {
        if let Some(step) = reader.read_step(Some((line_number, line))) {
            if !step.has_mag_sus() && !step.has_moment() {
                // nothing measured on this line
            } else if settings.protocol == Protocol::TrayFirst && line_number == 2 {
                tray_moment = step.moment;
            } else if step.is_mag_sus_only() {
                reader.attach_mag_sus(step);
            } else {
                let combined = match settings.protocol {
                    Protocol::Normal => Some(step),
                    Protocol::TrayNormal => {
                        let normal = reader.read_step(lines.next());
                        normal.map(|normal| combine_two(step, &normal, true))
                    }
                    Protocol::NormalTray => {
                        let tray = reader.read_step(lines.next());
                        tray.map(|tray| combine_two(tray, &step, false))
                    }
                    Protocol::TrayNormalIgnore => reader.read_step(lines.next()).map(|mut normal| {
                        let tray = *tray_moment.get_or_insert(moment_of(&step));
                        normal.moment = Some(moment_of(&normal).minus(&tray));
                        normal
                    }),
                    Protocol::TrayNormalYflip => {
                        let normal = reader.read_step(lines.next());
                        let flipped = normal.as_ref().and_then(|_| reader.read_step(lines.next()));
                        normal.zip(flipped).map(|(normal, flipped)| combine_three(step, &normal, &flipped))
                    }
                    Protocol::TrayFirst => {
                        let mut step = step;
                        let tray = tray_moment.unwrap_or(Vec3::ORIGIN);
                        step.moment = Some(moment_of(&step).minus(&tray));
                        Some(step)
                    }
                };
                match combined {
                    Some(step) => reader.data.add_step(step),
                    None => break,
                }
            }
        }
        if reader.errors.exceeded(&mut reader.data, file_name) {
            break;
        }
    }
    reader.data
}

fn moment_of(step: &TreatmentStep) -> Vec3 {
    step.moment.unwrap_or(Vec3::ORIGIN)
}

/// Subtract a tray reading, keeping the other fields of the tray or normal step
fn combine_two(tray: TreatmentStep, normal: &TreatmentStep, keep_tray: bool) -> TreatmentStep {
    let moment = moment_of(normal).minus(&moment_of(&tray));
    let mut result = if keep_tray { tray } else { normal.clone() };
    result.moment = Some(moment);
    result
}

/// Combine tray, normal and y-flipped readings into one moment.
///
/// The flipped reading has x and z inverted and y unchanged, giving three
/// estimates of x and z and two of y.
fn combine_three(tray: TreatmentStep, normal: &TreatmentStep, flipped: &TreatmentStep) -> TreatmentStep {
    let tray_v = moment_of(&tray);
    let normal_v = moment_of(normal);
    let flipped_v = moment_of(flipped);
    let normal_tray = normal_v.minus(&tray_v);
    let normal_flipped = normal_v.minus(&flipped_v).divide_by(2.0);
    let flipped_tray = flipped_v.minus(&tray_v);
    let x_z = Vec3::mean(&[normal_tray, normal_flipped, flipped_tray.invert()]).unwrap_or(Vec3::ORIGIN);
    let y = Vec3::mean(&[normal_tray, flipped_tray]).unwrap_or(Vec3::ORIGIN);
    let mut result = tray;
    result.moment = Some(Vec3::new(x_z.x, y.y, x_z.z));
    result
}

// =============================================================================
// Line Reading
// =============================================================================

struct Reader<'a> {
    file_name: &'a str,
    columns: HashMap<&'a str, usize>,
    settings: Settings,
    data: LoadedData,
    errors: LineErrors,
    last_line: usize,
}

impl Reader<'_> {
    /// Read one line into a step, recording any problem as a diagnostic
    fn read_step(&mut self, entry: Option<(usize, &str)>) -> Option<TreatmentStep> {
        let Some((line_number, line)) = entry else {
            self.data.add_message(format!(
                "File ended unexpectedly at line {} -- is 2G Protocol correctly set?",
                self.last_line
            ));
            return None;
        };
        self.last_line = line_number;
        if line.trim().is_empty() {
            return None;
        }
        let row = Row {
            columns: &self.columns,
            values: line.split('\t').collect(),
        };
        match row.to_step(self.settings) {
            Ok(step) => Some(step),
            Err(reason) => {
                self.errors.add(
                    &mut self.data,
                    format!(
                        "{} at line {} in file {} -- ignoring this line.",
                        reason, line_number, self.file_name
                    ),
                );
                None
            }
        }
    }

    /// Attach a susceptibility-only reading to the preceding moment measurement
    fn attach_mag_sus(&mut self, step: TreatmentStep) {
        match self.data.treatment_steps.last_mut() {
            Some(previous) if !previous.is_mag_sus_only() => previous.mag_sus = step.mag_sus,
            Some(_) => self.data.add_step(step),
            // no treatment step to attach it to
            None => {}
        }
    }
}

/// One tab-split data line with access by column name
struct Row<'a> {
    columns: &'a HashMap<&'a str, usize>,
    values: Vec<&'a str>,
}

type LineResult<T> = std::result::Result<T, String>;

impl Row<'_> {
    fn has(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Raw text of a column, or `None` if the file has no such column
    fn text(&self, name: &str) -> LineResult<Option<&str>> {
        let Some(&index) = self.columns.get(name) else {
            return Ok(None);
        };
        self.values
            .get(index)
            .map(|v| Some(*v))
            .ok_or_else(|| format!("Missing value for \"{}\"", name))
    }

    /// Numeric value of a column; `NA` and empty text read as NaN
    fn number(&self, name: &str) -> LineResult<Option<f64>> {
        match self.text(name)? {
            None => Ok(None),
            Some(text) => {
                let text = text.trim();
                if text.is_empty() || text == "NA" {
                    Ok(Some(f64::NAN))
                } else {
                    text.parse()
                        .map(Some)
                        .map_err(|_| format!("Malformed number \"{}\" for \"{}\"", text, name))
                }
            }
        }
    }

    /// Whether a column exists and holds something other than `NA`
    fn is_valid(&self, name: &str) -> bool {
        matches!(self.text(name), Ok(Some(text)) if text != "NA")
    }

    /// Numeric value present and not NaN
    fn measured(&self, name: &str) -> LineResult<Option<f64>> {
        Ok(self.number(name)?.filter(|v| !v.is_nan()))
    }

    fn number_or_zero(&self, name: &str) -> LineResult<f64> {
        Ok(self.number(name)?.unwrap_or(0.0))
    }

    fn raw_moment(&self, use_polar: bool) -> LineResult<Option<Vec3>> {
        if use_polar {
            if self.is_valid("Declination: Unrotated") {
                return Ok(Some(Vec3::from_polar_degrees(
                    self.number_or_zero("Intensity")?,
                    self.number_or_zero("Inclination: Unrotated")?,
                    self.number_or_zero("Declination: Unrotated")?,
                )));
            }
            return Ok(None);
        }
        for axes in [
            ["X corr", "Y corr", "Z corr"],
            ["X intensity", "Y intensity", "Z intensity"],
            ["X mean", "Y mean", "Z mean"],
        ] {
            if self.is_valid(axes[0]) {
                return Ok(Some(Vec3::new(
                    self.number_or_zero(axes[0])?,
                    self.number_or_zero(axes[1])?,
                    self.number_or_zero(axes[2])?,
                )));
            }
        }
        Ok(None)
    }

    fn treatment_type(&self) -> LineResult<TreatmentType> {
        if let Some(name) = self.text("Treatment Type")? {
            return Ok(treatment_type_from_2g_name(name));
        }
        let inferred = [
            ("ARM Gauss", TreatmentType::Arm),
            ("IRM Gauss", TreatmentType::Irm),
            ("AF X", TreatmentType::DegaussXyz),
            ("AF Z", TreatmentType::DegaussZ),
            ("Temp C", TreatmentType::Thermal),
        ]
        .into_iter()
        .find(|(column, _)| self.is_valid(column))
        .map_or(TreatmentType::DegaussZ, |(_, t)| t);
        Ok(inferred)
    }

    fn to_step(&self, settings: Settings) -> LineResult<TreatmentStep> {
        let mut step = TreatmentStep::new();

        let measurement_type = match self.text("Meas. type")? {
            Some(name) => measurement_type_from_2g_name(name),
            None if self.has("Depth") => MeasurementType::Continuous,
            None => MeasurementType::Discrete,
        };

        if let Some(area) = self.number("Area")? {
            step.area = area;
        }
        if let Some(volume) = self.number("Volume")? {
            step.volume = volume;
        }
        if let Some(raw) = self.raw_moment(settings.use_polar_moment)? {
            // raw moments are in gauss·cm³
            let magnetization = match measurement_type {
                // polar continuous moments are already corrected for sensor length and area
                MeasurementType::Continuous if settings.use_polar_moment => raw,
                MeasurementType::Continuous => {
                    raw.divide_by_vec(&settings.sensor_lengths.times(step.area))
                }
                MeasurementType::Discrete => raw.divide_by(step.volume),
                _ => Vec3::ORIGIN,
            };
            step.moment = Some(gauss_to_am_vec(&magnetization));
        }
        if let Some(mag_sus) = self.number("MS corr")? {
            step.mag_sus = mag_sus;
        }
        if let Some(id) = self.text("Sample ID")? {
            step.discrete_id = id.to_string();
        }
        if let Some(depth) = self.text("Depth")? {
            if measurement_type == MeasurementType::Discrete {
                // discrete files store slot number + 1 in the depth column
                let slot: f64 = depth
                    .trim()
                    .parse()
                    .map_err(|_| format!("Malformed slot depth \"{}\"", depth))?;
                step.slot_number = slot.trunc() as i32 - 1;
            } else {
                step.depth = Some(depth.to_string());
            }
        } else if measurement_type.is_continuous() {
            if let Some(position) = self.text("Position")? {
                step.depth = Some(position.to_string());
            }
        }
        step.measurement_type = measurement_type;
        step.treatment_type = self.treatment_type()?;

        if let Some(af) = self.measured("AF X")? {
            step.af_x = oersted_to_tesla(af);
        }
        if let Some(af) = self.measured("AF Y")? {
            step.af_y = oersted_to_tesla(af);
        }
        if let Some(af) = self.measured("AF Z")? {
            step.af_z = oersted_to_tesla(af);
        }
        // labelled gauss, but these are oersted field strengths
        if let Some(field) = self.measured("IRM Gauss")? {
            step.irm_field = oersted_to_tesla(field);
        }
        if let Some(field) = self.measured("ARM Gauss")? {
            step.arm_field = oersted_to_tesla(field);
        }
        if let Some(axis) = self.text("ARM axis")? {
            step.arm_axis = ArmAxis::from_name(axis);
        }
        if let Some(temperature) = self.number("Temp C")? {
            step.temperature = temperature;
        }
        if let Some(az) = self.number("Sample Azimiuth")? {
            step.sample_az = az;
        }
        if let Some(dip) = self.number("Sample Dip")? {
            step.sample_dip = dip;
        }
        if let Some(az) = self.number("Formation Dip Azimuth")? {
            step.formation_az = az;
        }
        if let Some(dip) = self.number("Formation Dip")? {
            step.formation_dip = dip;
        }
        if let Some(dev) = self.number("Mag Dev")? {
            step.mag_dev = dev;
        }
        if let Some(run) = self.number("Run #")? {
            // discrete files store run number + slot number
            let mut run_number = if run.is_nan() { 0 } else { run.trunc() as i32 };
            if measurement_type == MeasurementType::Discrete && step.slot_number != -1 {
                run_number -= step.slot_number;
            }
            step.run_number = run_number;
        }
        if let Some(timestamp) = self.text("Sample Timestamp")? {
            step.timestamp = timestamp.to_string();
        }
        if let Some(drift) = self.number("X drift")? {
            step.x_drift = drift;
        }
        if let Some(drift) = self.number("Y drift")? {
            step.y_drift = drift;
        }
        if let Some(drift) = self.number("Z drift")? {
            step.z_drift = drift;
        }
        Ok(step)
    }
}
