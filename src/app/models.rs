//! Data models for palaeomagnetic measurements
//!
//! This module contains the canonical record type produced by every loader
//! together with its vocabulary of treatment, measurement and ARM axis types.
//!
//! ## Components
//!
//! - [`Vec3`]: Cartesian vector with polar conversion and orientation corrections
//! - [`TreatmentStep`]: one measurement at one treatment level for one sample
//! - [`TreatmentStepField`]: named fields of a step, used by tabular formats
//! - [`AmsData`]: anisotropy of magnetic susceptibility tensor for one specimen

pub mod ams;
pub mod treatment_field;
pub mod treatment_step;
pub mod vec3;

pub use ams::AmsData;
pub use treatment_field::{FieldKind, TreatmentStepField};
pub use treatment_step::TreatmentStep;
pub use vec3::Vec3;

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Treatment Type
// =============================================================================

/// Laboratory treatment applied before a measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TreatmentType {
    /// No treatment (natural remanence)
    None,
    /// Alternating-field demagnetization on three axes
    DegaussXyz,
    /// Alternating-field demagnetization on the z axis
    DegaussZ,
    /// Anhysteretic remanent magnetization
    Arm,
    /// Isothermal remanent magnetization
    Irm,
    /// Thermal demagnetization
    Thermal,
    Unknown,
}

impl TreatmentType {
    pub const ALL: [TreatmentType; 7] = [
        TreatmentType::None,
        TreatmentType::DegaussXyz,
        TreatmentType::DegaussZ,
        TreatmentType::Arm,
        TreatmentType::Irm,
        TreatmentType::Thermal,
        TreatmentType::Unknown,
    ];

    /// Canonical upper-case name used in the native file format
    pub fn name(self) -> &'static str {
        match self {
            TreatmentType::None => "NONE",
            TreatmentType::DegaussXyz => "DEGAUSS_XYZ",
            TreatmentType::DegaussZ => "DEGAUSS_Z",
            TreatmentType::Arm => "ARM",
            TreatmentType::Irm => "IRM",
            TreatmentType::Thermal => "THERMAL",
            TreatmentType::Unknown => "UNKNOWN",
        }
    }

    pub fn nice_name(self) -> &'static str {
        match self {
            TreatmentType::None => "No treatment",
            TreatmentType::DegaussXyz => "3-axis degauss",
            TreatmentType::DegaussZ => "Z-axis degauss",
            TreatmentType::Arm => "Z-axis ARM",
            TreatmentType::Irm => "IRM",
            TreatmentType::Thermal => "Heating",
            TreatmentType::Unknown => "Unknown",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            TreatmentType::None => "",
            TreatmentType::DegaussXyz
            | TreatmentType::DegaussZ
            | TreatmentType::Arm
            | TreatmentType::Irm => "T",
            TreatmentType::Thermal => "°C",
            TreatmentType::Unknown => "?",
        }
    }

    /// Whether the treatment level is a magnetic field strength
    pub fn is_magnetic_field(self) -> bool {
        matches!(
            self,
            TreatmentType::DegaussXyz
                | TreatmentType::DegaussZ
                | TreatmentType::Arm
                | TreatmentType::Irm
        )
    }

    /// Whether the treatment involves an alternating field
    pub fn involves_af(self) -> bool {
        matches!(
            self,
            TreatmentType::DegaussXyz | TreatmentType::DegaussZ | TreatmentType::Arm
        )
    }
}

impl fmt::Display for TreatmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TreatmentType {
    type Err = Error;

    /// Parse a canonical name; case and `-`/`_` are not significant
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        TreatmentType::ALL
            .into_iter()
            .find(|t| t.name() == normalized)
            .ok_or_else(|| Error::field_value("TREATMENT", s))
    }
}

// =============================================================================
// Measurement Type
// =============================================================================

/// Whether a measurement is of a discrete specimen or a continuous core
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeasurementType {
    /// Discrete specimen, identified by name
    Discrete,
    /// Position on a continuous core, identified by depth
    Continuous,
    /// Explicitly not a measurement (e.g. a tray or holder reading)
    None,
    /// Not yet set
    Unset,
    /// Could not be determined
    Unknown,
}

impl MeasurementType {
    pub const ALL: [MeasurementType; 5] = [
        MeasurementType::Discrete,
        MeasurementType::Continuous,
        MeasurementType::None,
        MeasurementType::Unset,
        MeasurementType::Unknown,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MeasurementType::Discrete => "DISCRETE",
            MeasurementType::Continuous => "CONTINUOUS",
            MeasurementType::None => "NONE",
            MeasurementType::Unset => "UNSET",
            MeasurementType::Unknown => "UNKNOWN",
        }
    }

    pub fn nice_name(self) -> &'static str {
        match self {
            MeasurementType::Discrete => "Discrete",
            MeasurementType::Continuous => "Continuous",
            MeasurementType::None => "None",
            MeasurementType::Unset => "Unset",
            MeasurementType::Unknown => "Unknown",
        }
    }

    /// Heading for the sample identifier column of this measurement type
    pub fn column_header(self) -> &'static str {
        match self {
            MeasurementType::Continuous => "Depth",
            _ => "Sample",
        }
    }

    /// Interpret a free-text measurement type from an instrument file.
    ///
    /// Matching is case-insensitive: any string containing "discrete" or
    /// "continuous" maps to that type, and exactly "na" maps to `None`.
    pub fn from_name(name: &str) -> Self {
        let lower = name.trim().to_ascii_lowercase();
        if lower.contains("discrete") {
            MeasurementType::Discrete
        } else if lower.contains("continuous") {
            MeasurementType::Continuous
        } else if lower == "na" {
            MeasurementType::None
        } else {
            MeasurementType::Unknown
        }
    }

    /// Whether this type denotes a real sample measurement
    pub fn is_actual_measurement(self) -> bool {
        matches!(self, MeasurementType::Discrete | MeasurementType::Continuous)
    }

    pub fn is_continuous(self) -> bool {
        self == MeasurementType::Continuous
    }
}

impl fmt::Display for MeasurementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MeasurementType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_uppercase();
        MeasurementType::ALL
            .into_iter()
            .find(|t| t.name() == normalized)
            .ok_or_else(|| Error::field_value("MEAS_TYPE", s))
    }
}

// =============================================================================
// ARM Axis
// =============================================================================

/// Axis along which an ARM biasing field was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArmAxis {
    Axial,
    None,
    Unknown,
}

impl ArmAxis {
    pub fn name(self) -> &'static str {
        match self {
            ArmAxis::Axial => "AXIAL",
            ArmAxis::None => "NONE",
            ArmAxis::Unknown => "UNKNOWN",
        }
    }

    /// Lenient conversion used by instrument files; "NA" means no axis
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "AXIAL" => ArmAxis::Axial,
            "NONE" | "NA" => ArmAxis::None,
            _ => ArmAxis::Unknown,
        }
    }
}

impl fmt::Display for ArmAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_treatment_type_names_round_trip() {
        for treatment in TreatmentType::ALL {
            assert_eq!(treatment.name().parse::<TreatmentType>().unwrap(), treatment);
        }
        assert_eq!(
            "degauss-xyz".parse::<TreatmentType>().unwrap(),
            TreatmentType::DegaussXyz
        );
        assert!("boiling".parse::<TreatmentType>().is_err());
    }

    #[test]
    fn test_treatment_type_units() {
        assert_eq!(TreatmentType::Thermal.unit(), "°C");
        assert_eq!(TreatmentType::Irm.unit(), "T");
        assert!(TreatmentType::Arm.is_magnetic_field());
        assert!(!TreatmentType::Thermal.is_magnetic_field());
        assert!(!TreatmentType::Irm.involves_af());
    }

    #[test]
    fn test_measurement_type_from_name() {
        assert_eq!(
            MeasurementType::from_name("Sample/Discrete"),
            MeasurementType::Discrete
        );
        assert_eq!(
            MeasurementType::from_name("sample/CONTINUOUS"),
            MeasurementType::Continuous
        );
        assert_eq!(MeasurementType::from_name("NA"), MeasurementType::None);
        assert_eq!(MeasurementType::from_name("nan"), MeasurementType::Unknown);
        assert!(MeasurementType::Discrete.is_actual_measurement());
        assert!(!MeasurementType::Unset.is_actual_measurement());
    }

    #[test]
    fn test_measurement_type_from_str() {
        assert_eq!(
            "continuous".parse::<MeasurementType>().unwrap(),
            MeasurementType::Continuous
        );
        assert!("core".parse::<MeasurementType>().is_err());
        assert_eq!(MeasurementType::Continuous.column_header(), "Depth");
    }

    #[test]
    fn test_arm_axis_from_name() {
        assert_eq!(ArmAxis::from_name("axial"), ArmAxis::Axial);
        assert_eq!(ArmAxis::from_name("NA"), ArmAxis::None);
        assert_eq!(ArmAxis::from_name("sideways"), ArmAxis::Unknown);
    }
}
