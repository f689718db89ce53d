//! Load options and their definitions
//!
//! Options travel as an open map from identifier to typed value. Each loader
//! publishes [`OptionDefinition`]s describing what it reads from the map;
//! supplying a value of the wrong kind, or omitting a required option, is a
//! caller error rather than a data diagnostic.

use super::twogee::Protocol;
use crate::app::models::{MeasurementType, TreatmentType, Vec3};
use crate::app::services::orientation::OrientationParameters;
use crate::app::services::tabular::FileFormat;
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of value an option holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    TreatmentType,
    MeasurementType,
    Protocol,
    Vector,
    Bool,
    Format,
    Orientation,
    Text,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptionKind::TreatmentType => "treatment type",
            OptionKind::MeasurementType => "measurement type",
            OptionKind::Protocol => "2G protocol",
            OptionKind::Vector => "vector",
            OptionKind::Bool => "boolean",
            OptionKind::Format => "file format",
            OptionKind::Orientation => "orientation parameters",
            OptionKind::Text => "text",
        };
        f.write_str(name)
    }
}

/// A typed option value
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    TreatmentType(TreatmentType),
    MeasurementType(MeasurementType),
    Protocol(Protocol),
    Vector(Vec3),
    Bool(bool),
    Format(Box<FileFormat>),
    Orientation(OrientationParameters),
    Text(String),
}

impl OptionValue {
    pub fn kind(&self) -> OptionKind {
        match self {
            OptionValue::TreatmentType(_) => OptionKind::TreatmentType,
            OptionValue::MeasurementType(_) => OptionKind::MeasurementType,
            OptionValue::Protocol(_) => OptionKind::Protocol,
            OptionValue::Vector(_) => OptionKind::Vector,
            OptionValue::Bool(_) => OptionKind::Bool,
            OptionValue::Format(_) => OptionKind::Format,
            OptionValue::Orientation(_) => OptionKind::Orientation,
            OptionValue::Text(_) => OptionKind::Text,
        }
    }

    pub fn as_treatment_type(&self) -> Option<TreatmentType> {
        match self {
            OptionValue::TreatmentType(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_measurement_type(&self) -> Option<MeasurementType> {
        match self {
            OptionValue::MeasurementType(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_protocol(&self) -> Option<Protocol> {
        match self {
            OptionValue::Protocol(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<Vec3> {
        match self {
            OptionValue::Vector(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_format(&self) -> Option<&FileFormat> {
        match self {
            OptionValue::Format(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_orientation(&self) -> Option<OrientationParameters> {
        match self {
            OptionValue::Orientation(o) => Some(*o),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::TreatmentType(t) => write!(f, "{}", t),
            OptionValue::MeasurementType(t) => write!(f, "{}", t),
            OptionValue::Protocol(p) => write!(f, "{}", p),
            OptionValue::Vector(v) => write!(f, "{},{},{}", v.x, v.y, v.z),
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Format(_) => f.write_str("<custom format>"),
            OptionValue::Orientation(o) => write!(f, "{}", o),
            OptionValue::Text(s) => f.write_str(s),
        }
    }
}

/// Open map of load options keyed by identifier
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadOptions {
    values: BTreeMap<String, OptionValue>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, identifier: impl Into<String>, value: OptionValue) -> Self {
        self.insert(identifier, value);
        self
    }

    pub fn insert(&mut self, identifier: impl Into<String>, value: OptionValue) {
        self.values.insert(identifier.into(), value);
    }

    pub fn get(&self, identifier: &str) -> Option<&OptionValue> {
        self.values.get(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.values.contains_key(identifier)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OptionValue)> {
        self.values.iter()
    }
}

/// Description of one option a loader understands
#[derive(Debug, Clone)]
pub struct OptionDefinition {
    pub identifier: &'static str,
    pub description: &'static str,
    pub kind: OptionKind,
    pub default: Option<OptionValue>,
    pub required: bool,
}

impl OptionDefinition {
    /// An optional option with a default value
    pub fn new(
        identifier: &'static str,
        description: &'static str,
        kind: OptionKind,
        default: Option<OptionValue>,
    ) -> Self {
        Self {
            identifier,
            description,
            kind,
            default,
            required: false,
        }
    }

    /// An option that must be supplied
    pub fn required(identifier: &'static str, description: &'static str, kind: OptionKind) -> Self {
        Self {
            identifier,
            description,
            kind,
            default: None,
            required: true,
        }
    }

    /// The supplied value, or the default if none was supplied
    pub fn value(&self, options: &LoadOptions) -> Result<Option<OptionValue>> {
        match options.get(self.identifier) {
            Some(value) if value.kind() == self.kind => Ok(Some(value.clone())),
            Some(value) => Err(Error::invalid_option(
                self.identifier,
                format!(
                    "supplied value {} has the wrong kind (should be {})",
                    value, self.kind
                ),
            )),
            None if self.required => Err(Error::invalid_option(
                self.identifier,
                "required option was not supplied",
            )),
            None => Ok(self.default.clone()),
        }
    }
}

/// Check every definition against the supplied options
pub fn validate_options(definitions: &[OptionDefinition], options: &LoadOptions) -> Result<()> {
    for definition in definitions {
        definition.value(options)?;
    }
    Ok(())
}
