//! User-defined tabular file format definitions

use crate::app::models::{MeasurementType, TreatmentStep, TreatmentStepField, TreatmentType, Vec3};
use crate::app::services::file_loaders::encoding::char_slice;
use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Preference keys under which a format is persisted
pub mod prefs_keys {
    pub const SEPARATOR: &str = "fileformat.separator";
    pub const HEADER_LINES: &str = "fileformat.headerLines";
    pub const MEAS_TYPE: &str = "fileformat.measType";
    pub const TREAT_TYPE: &str = "fileformat.treatType";
    pub const USE_FIXED_WIDTH: &str = "fileformat.useFixedWidth";
    pub const COLUMN_WIDTHS: &str = "fileformat.columnWidths";
    pub const COLUMN_MAP: &str = "fileformat.columnMap";
    pub const MOMENT_UNIT: &str = "fileformat.momentUnit";
    pub const FIELD_UNIT: &str = "fileformat.fieldUnit";
}

// =============================================================================
// Units
// =============================================================================

/// Unit of magnetic moment (magnetization) columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MomentUnit {
    /// A/m
    #[default]
    Am,
    /// mA/m
    MilliampsPerMetre,
}

impl MomentUnit {
    pub const ALL: [MomentUnit; 2] = [MomentUnit::Am, MomentUnit::MilliampsPerMetre];

    pub fn name(self) -> &'static str {
        match self {
            MomentUnit::Am => "AM",
            MomentUnit::MilliampsPerMetre => "MILLIAMPS_PER_METRE",
        }
    }

    /// Multiplier converting a value in this unit to A/m
    pub fn factor_for_am(self) -> f64 {
        match self {
            MomentUnit::Am => 1.0,
            MomentUnit::MilliampsPerMetre => 0.001,
        }
    }
}

/// Unit of applied field columns (AF, IRM and ARM)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldUnit {
    #[default]
    Tesla,
    Millitesla,
}

impl FieldUnit {
    pub const ALL: [FieldUnit; 2] = [FieldUnit::Tesla, FieldUnit::Millitesla];

    pub fn name(self) -> &'static str {
        match self {
            FieldUnit::Tesla => "TESLA",
            FieldUnit::Millitesla => "MILLITESLA",
        }
    }

    /// Multiplier converting a value in this unit to tesla
    pub fn factor_for_tesla(self) -> f64 {
        match self {
            FieldUnit::Tesla => 1.0,
            FieldUnit::Millitesla => 0.001,
        }
    }
}

macro_rules! named_unit {
    ($unit:ident) => {
        impl fmt::Display for $unit {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $unit {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                let normalized = s.trim().to_ascii_uppercase();
                $unit::ALL
                    .into_iter()
                    .find(|u| u.name() == normalized)
                    .ok_or_else(|| Error::file_format(format!("unknown {} '{}'", stringify!($unit), s)))
            }
        }
    };
}

named_unit!(MomentUnit);
named_unit!(FieldUnit);

// =============================================================================
// File Format
// =============================================================================

/// Column-to-field mapping and layout of a custom tabular file
#[derive(Debug, Clone, PartialEq)]
pub struct FileFormat {
    /// Zero-based column index to the field it holds
    pub column_map: BTreeMap<usize, TreatmentStepField>,
    /// Lines to skip before the data
    pub header_lines: usize,
    pub measurement_type: MeasurementType,
    pub treatment_type: TreatmentType,
    /// Regular expression separating columns when widths are not fixed
    pub separator: String,
    pub use_fixed_width_columns: bool,
    /// Character widths of fixed-width columns; the last column takes the rest
    pub column_widths: Vec<usize>,
    pub moment_unit: MomentUnit,
    pub field_unit: FieldUnit,
}

impl Default for FileFormat {
    fn default() -> Self {
        Self {
            column_map: BTreeMap::new(),
            header_lines: 0,
            measurement_type: MeasurementType::Continuous,
            treatment_type: TreatmentType::DegaussXyz,
            separator: "\t".to_string(),
            use_fixed_width_columns: false,
            column_widths: Vec::new(),
            moment_unit: MomentUnit::Am,
            field_unit: FieldUnit::Tesla,
        }
    }
}

impl FileFormat {
    pub fn new(column_map: BTreeMap<usize, TreatmentStepField>) -> Self {
        Self {
            column_map,
            ..Self::default()
        }
    }

    pub fn with_header_lines(mut self, header_lines: usize) -> Self {
        self.header_lines = header_lines;
        self
    }

    pub fn with_measurement_type(mut self, measurement_type: MeasurementType) -> Self {
        self.measurement_type = measurement_type;
        self
    }

    pub fn with_treatment_type(mut self, treatment_type: TreatmentType) -> Self {
        self.treatment_type = treatment_type;
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Split lines at fixed character widths instead of at the separator
    pub fn with_column_widths(mut self, column_widths: Vec<usize>) -> Self {
        self.use_fixed_width_columns = true;
        self.column_widths = column_widths;
        self
    }

    pub fn with_moment_unit(mut self, moment_unit: MomentUnit) -> Self {
        self.moment_unit = moment_unit;
        self
    }

    pub fn with_field_unit(mut self, field_unit: FieldUnit) -> Self {
        self.field_unit = field_unit;
        self
    }

    fn maps(&self, field: TreatmentStepField) -> bool {
        self.column_map.values().any(|f| *f == field)
    }

    /// Whether every line yields a complete moment vector
    pub fn specifies_full_vector(&self) -> bool {
        use TreatmentStepField as F;
        (self.maps(F::XMoment) && self.maps(F::YMoment) && self.maps(F::ZMoment))
            || (self.maps(F::VirtDeclination) && self.maps(F::VirtInclination) && self.maps(F::VirtMagnetization))
    }

    /// Whether every line yields at least a moment direction
    pub fn specifies_direction(&self) -> bool {
        use TreatmentStepField as F;
        self.specifies_full_vector() || (self.maps(F::VirtDeclination) && self.maps(F::VirtInclination))
    }

    /// Compiled separator pattern
    pub fn separator_pattern(&self) -> Result<Regex> {
        Regex::new(&self.separator)
            .map_err(|e| Error::file_format(format!("invalid separator '{}': {}", self.separator, e)))
    }

    fn split_line(&self, line: &str, separator: &Regex) -> Vec<String> {
        if !self.use_fixed_width_columns {
            return separator.split(line).map(str::to_string).collect();
        }
        let mut fields = Vec::with_capacity(self.column_widths.len() + 1);
        let mut start = 0;
        for width in &self.column_widths {
            fields.push(char_slice(line, start, Some(start + width)));
            start += width;
        }
        fields.push(char_slice(line, start, None));
        fields
    }

    /// Factor converting a field's values in this format to canonical units
    fn factor_for(&self, field: TreatmentStepField) -> f64 {
        use TreatmentStepField as F;
        match field {
            F::XMoment | F::YMoment | F::ZMoment | F::VirtMagnetization => self.moment_unit.factor_for_am(),
            F::AfX | F::AfY | F::AfZ | F::IrmField | F::ArmField => self.field_unit.factor_for_tesla(),
            _ => 1.0,
        }
    }

    /// Parse a single data line
    pub fn read_line(&self, line: &str) -> Result<TreatmentStep> {
        Ok(self.read_fields(&self.split_line(line, &self.separator_pattern()?)))
    }

    /// Parse the data lines following the header lines
    pub fn read_lines<S: AsRef<str>>(&self, lines: &[S]) -> Result<Vec<TreatmentStep>> {
        let separator = self.separator_pattern()?;
        Ok(lines
            .iter()
            .skip(self.header_lines)
            .map(|line| line.as_ref().trim_end_matches(['\r', '\n']))
            .filter(|line| !line.trim().is_empty())
            .map(|line| self.read_fields(&self.split_line(line, &separator)))
            .collect())
    }

    fn read_fields(&self, fields: &[String]) -> TreatmentStep {
        use TreatmentStepField as F;
        let mut step = TreatmentStep::with_moment(Vec3::ORIGIN);
        step.measurement_type = self.measurement_type;
        step.treatment_type = self.treatment_type;
        step.discrete_id = "UNKNOWN".to_string();
        step.depth = Some("0".to_string());
        step.sample_az = 0.0;
        step.sample_dip = 90.0;
        step.formation_az = 0.0;
        step.formation_dip = 0.0;

        let (mut dec, mut inc, mut intensity) = (f64::NAN, f64::NAN, f64::NAN);
        for (index, field) in &self.column_map {
            let Some(raw) = fields.get(*index) else {
                continue;
            };
            let value = strip_quotes(raw.trim());
            let parse = || value.parse::<f64>().unwrap_or(f64::NAN);
            match field {
                F::VirtMagnetization => intensity = parse() * self.factor_for(*field),
                F::VirtDeclination => dec = parse(),
                F::VirtInclination => inc = parse(),
                _ => step.set_value_or_default(*field, value, self.factor_for(*field)),
            }
        }

        if !(dec.is_nan() || inc.is_nan()) {
            if intensity.is_nan() {
                intensity = 1.0;
            }
            step.moment = Some(Vec3::from_polar_degrees(intensity, inc, dec));
        }
        if self.maps(F::Volume) && step.volume != 0.0 {
            step.moment = step.moment.map(|m| m.divide_by(step.volume));
        }
        step
    }

    /// Parse a comma-separated list of widths, skipping ill-formed entries
    pub fn convert_string_to_column_widths(widths: &str) -> Vec<usize> {
        widths
            .split(',')
            .filter_map(|w| w.trim().parse().ok())
            .collect()
    }

    pub fn column_widths_as_string(&self) -> String {
        self.column_widths
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }

    fn column_map_as_string(&self) -> String {
        self.column_map
            .iter()
            .map(|(index, field)| format!("{},{}", index, field.name()))
            .collect::<Vec<_>>()
            .join("\t")
    }

    fn parse_column_map(text: &str) -> Result<BTreeMap<usize, TreatmentStepField>> {
        let mut column_map = BTreeMap::new();
        for entry in text.split('\t').filter(|e| !e.trim().is_empty()) {
            let (index, field) = entry
                .split_once(',')
                .ok_or_else(|| Error::file_format(format!("malformed column map entry '{}'", entry)))?;
            let index = index
                .trim()
                .parse()
                .map_err(|_| Error::file_format(format!("bad column index in '{}'", entry)))?;
            let field = field
                .trim()
                .parse()
                .map_err(|_| Error::file_format(format!("unknown field in '{}'", entry)))?;
            column_map.insert(index, field);
        }
        Ok(column_map)
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Flatten the format into a preferences map
    pub fn to_prefs(&self) -> BTreeMap<String, String> {
        use prefs_keys::*;
        [
            (SEPARATOR, self.separator.clone()),
            (HEADER_LINES, self.header_lines.to_string()),
            (MEAS_TYPE, self.measurement_type.name().to_string()),
            (TREAT_TYPE, self.treatment_type.name().to_string()),
            (USE_FIXED_WIDTH, self.use_fixed_width_columns.to_string()),
            (COLUMN_WIDTHS, self.column_widths_as_string()),
            (COLUMN_MAP, self.column_map_as_string()),
            (MOMENT_UNIT, self.moment_unit.name().to_string()),
            (FIELD_UNIT, self.field_unit.name().to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    /// Rebuild a format from a preferences map; absent keys take defaults
    pub fn from_prefs(prefs: &BTreeMap<String, String>) -> Result<Self> {
        use prefs_keys::*;
        let defaults = Self::default();
        let get = |key: &str| prefs.get(key).map(String::as_str);

        let header_lines = match get(HEADER_LINES) {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|_| Error::file_format(format!("bad header line count '{}'", v)))?,
            None => defaults.header_lines,
        };
        let measurement_type = match get(MEAS_TYPE) {
            Some(v) => v
                .parse()
                .map_err(|_| Error::file_format(format!("unknown measurement type '{}'", v)))?,
            None => defaults.measurement_type,
        };
        let treatment_type = match get(TREAT_TYPE) {
            Some(v) => v
                .parse()
                .map_err(|_| Error::file_format(format!("unknown treatment type '{}'", v)))?,
            None => defaults.treatment_type,
        };
        let use_fixed_width_columns = match get(USE_FIXED_WIDTH) {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|_| Error::file_format(format!("bad fixed-width flag '{}'", v)))?,
            None => defaults.use_fixed_width_columns,
        };

        Ok(Self {
            column_map: Self::parse_column_map(get(COLUMN_MAP).unwrap_or(""))?,
            header_lines,
            measurement_type,
            treatment_type,
            separator: get(SEPARATOR).map_or(defaults.separator, str::to_string),
            use_fixed_width_columns,
            column_widths: Self::convert_string_to_column_widths(get(COLUMN_WIDTHS).unwrap_or("")),
            moment_unit: get(MOMENT_UNIT).map_or(Ok(defaults.moment_unit), str::parse)?,
            field_unit: get(FIELD_UNIT).map_or(Ok(defaults.field_unit), str::parse)?,
        })
    }

    /// Read a format from `key=value` lines.
    ///
    /// Blank lines and lines starting with `#` are ignored. Values are taken
    /// verbatim after the first `=`, with `\t` standing for a tab so that
    /// separators and column maps can be written on one line.
    pub fn from_prefs_text(text: &str) -> Result<Self> {
        let mut prefs = BTreeMap::new();
        for line in text.lines() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| Error::file_format(format!("expected key=value, got '{}'", line)))?;
            prefs.insert(key.trim().to_string(), value.replace("\\t", "\t"));
        }
        Self::from_prefs(&prefs)
    }
}

fn strip_quotes(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
