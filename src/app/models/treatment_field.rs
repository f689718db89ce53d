//! Named fields of a treatment step
//!
//! Every value a [`TreatmentStep`](super::TreatmentStep) persists has a field
//! here, named as it appears in the column header of the native file format.
//! Virtual fields are computed from other values and are never written out,
//! but tabular formats may map input columns onto them.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Storage kind of a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Double,
    Int,
    Bool,
    MeasurementType,
    TreatmentType,
    ArmAxis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TreatmentStepField {
    // Identifiers
    DiscreteId,
    Depth,
    RunNumber,
    Timestamp,
    SlotNumber,

    // Lab measurements
    MeasType,
    XMoment,
    YMoment,
    ZMoment,
    MagSus,
    Volume,
    Area,

    // Field measurements
    SampleAz,
    SampleDip,
    FormAz,
    FormDip,
    MagDev,

    // Treatments
    Treatment,
    AfX,
    AfY,
    AfZ,
    Temperature,
    IrmField,
    ArmField,
    ArmAxis,

    // Carried through from the input file
    Alpha95,

    // Processing flags
    PpSelected,
    PpAnchorPca,
    PpHidden,
    PpOnCircle,
    PpInPca,

    // Virtual fields
    VirtMagnetization,
    VirtDeclination,
    VirtInclination,
    VirtSampleHade,
    VirtFormStrike,
}

use TreatmentStepField as F;

/// All fields in declaration order
const ALL_FIELDS: [TreatmentStepField; 36] = [
    F::DiscreteId,
    F::Depth,
    F::RunNumber,
    F::Timestamp,
    F::SlotNumber,
    F::MeasType,
    F::XMoment,
    F::YMoment,
    F::ZMoment,
    F::MagSus,
    F::Volume,
    F::Area,
    F::SampleAz,
    F::SampleDip,
    F::FormAz,
    F::FormDip,
    F::MagDev,
    F::Treatment,
    F::AfX,
    F::AfY,
    F::AfZ,
    F::Temperature,
    F::IrmField,
    F::ArmField,
    F::ArmAxis,
    F::Alpha95,
    F::PpSelected,
    F::PpAnchorPca,
    F::PpHidden,
    F::PpOnCircle,
    F::PpInPca,
    F::VirtMagnetization,
    F::VirtDeclination,
    F::VirtInclination,
    F::VirtSampleHade,
    F::VirtFormStrike,
];

impl TreatmentStepField {
    pub fn all() -> &'static [TreatmentStepField] {
        &ALL_FIELDS
    }

    /// Persisted fields, in the column order of the native file format
    pub fn real_fields() -> impl Iterator<Item = TreatmentStepField> {
        ALL_FIELDS.into_iter().filter(|f| !f.is_virtual())
    }

    /// Column name in the native file format
    pub fn name(self) -> &'static str {
        match self {
            F::DiscreteId => "DISCRETE_ID",
            F::Depth => "DEPTH",
            F::RunNumber => "RUN_NUMBER",
            F::Timestamp => "TIMESTAMP",
            F::SlotNumber => "SLOT_NUMBER",
            F::MeasType => "MEAS_TYPE",
            F::XMoment => "X_MOMENT",
            F::YMoment => "Y_MOMENT",
            F::ZMoment => "Z_MOMENT",
            F::MagSus => "MAG_SUS",
            F::Volume => "VOLUME",
            F::Area => "AREA",
            F::SampleAz => "SAMPLE_AZ",
            F::SampleDip => "SAMPLE_DIP",
            F::FormAz => "FORM_AZ",
            F::FormDip => "FORM_DIP",
            F::MagDev => "MAG_DEV",
            F::Treatment => "TREATMENT",
            F::AfX => "AF_X",
            F::AfY => "AF_Y",
            F::AfZ => "AF_Z",
            F::Temperature => "TEMPERATURE",
            F::IrmField => "IRM_FIELD",
            F::ArmField => "ARM_FIELD",
            F::ArmAxis => "ARM_AXIS",
            F::Alpha95 => "ALPHA95",
            F::PpSelected => "PP_SELECTED",
            F::PpAnchorPca => "PP_ANCHOR_PCA",
            F::PpHidden => "PP_HIDDEN",
            F::PpOnCircle => "PP_ONCIRCLE",
            F::PpInPca => "PP_INPCA",
            F::VirtMagnetization => "VIRT_MAGNETIZATION",
            F::VirtDeclination => "VIRT_DECLINATION",
            F::VirtInclination => "VIRT_INCLINATION",
            F::VirtSampleHade => "VIRT_SAMPLE_HADE",
            F::VirtFormStrike => "VIRT_FORM_STRIKE",
        }
    }

    /// Human-readable column heading
    pub fn heading(self) -> &'static str {
        match self {
            F::DiscreteId => "Sample ID",
            F::Depth => "Depth",
            F::RunNumber => "Run #",
            F::Timestamp => "Sample Timestamp",
            F::SlotNumber => "Tray slot number",
            F::MeasType => "Measurement type",
            F::XMoment => "X moment",
            F::YMoment => "Y moment",
            F::ZMoment => "Z moment",
            F::MagSus => "Magnetic susceptibility",
            F::Volume => "Volume",
            F::Area => "Area",
            F::SampleAz => "Sample azimuth",
            F::SampleDip => "Sample dip",
            F::FormAz => "Formation dip azimuth",
            F::FormDip => "Formation dip",
            F::MagDev => "Magnetic deviation",
            F::Treatment => "Treatment type",
            F::AfX => "AF X field",
            F::AfY => "AF Y field",
            F::AfZ => "AF Z field",
            F::Temperature => "Temperature",
            F::IrmField => "IRM Gauss",
            F::ArmField => "ARM Gauss",
            F::ArmAxis => "ARM axis",
            F::Alpha95 => "α95",
            F::PpSelected => "Selected",
            F::PpAnchorPca => "PCA anchored",
            F::PpHidden => "Hidden",
            F::PpOnCircle => "Use for great circle",
            F::PpInPca => "Use for PCA",
            F::VirtMagnetization => "Magnetization",
            F::VirtDeclination => "Declination",
            F::VirtInclination => "Inclination",
            F::VirtSampleHade => "Sample hade",
            F::VirtFormStrike => "Formation strike",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            F::DiscreteId | F::Depth | F::Timestamp => FieldKind::Text,
            F::RunNumber | F::SlotNumber => FieldKind::Int,
            F::MeasType => FieldKind::MeasurementType,
            F::Treatment => FieldKind::TreatmentType,
            F::ArmAxis => FieldKind::ArmAxis,
            F::PpSelected | F::PpAnchorPca | F::PpHidden | F::PpOnCircle | F::PpInPca => {
                FieldKind::Bool
            }
            _ => FieldKind::Double,
        }
    }

    /// Value substituted when a supplied string cannot be parsed
    pub fn default_value(self) -> &'static str {
        match self {
            F::MeasType => "CONTINUOUS",
            F::Treatment => "DEGAUSS_XYZ",
            F::ArmAxis => "AXIAL",
            F::Alpha95 => "NaN",
            F::PpSelected | F::PpAnchorPca | F::PpHidden | F::PpOnCircle | F::PpInPca => "false",
            _ => "0",
        }
    }

    /// Whether the field is computed rather than stored
    pub fn is_virtual(self) -> bool {
        matches!(
            self,
            F::VirtMagnetization
                | F::VirtDeclination
                | F::VirtInclination
                | F::VirtSampleHade
                | F::VirtFormStrike
        )
    }

    /// Whether tabular formats may map an input column onto the field
    pub fn is_importable(self) -> bool {
        !matches!(
            self,
            F::PpSelected | F::PpAnchorPca | F::PpHidden | F::PpOnCircle | F::PpInPca
        )
    }

    /// Look up a field by its human-readable heading
    pub fn from_heading(heading: &str) -> Option<TreatmentStepField> {
        ALL_FIELDS.into_iter().find(|f| f.heading() == heading)
    }
}

impl fmt::Display for TreatmentStepField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TreatmentStepField {
    type Err = Error;

    /// Parse a native column name; matching is case-sensitive
    fn from_str(s: &str) -> Result<Self> {
        ALL_FIELDS
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| Error::unknown_field(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique_and_parse_back() {
        for field in TreatmentStepField::all() {
            assert_eq!(field.name().parse::<TreatmentStepField>().unwrap(), *field);
        }
    }

    #[test]
    fn test_unknown_and_case_sensitive_names_rejected() {
        assert!("treatment".parse::<TreatmentStepField>().is_err());
        assert!("WIBBLE".parse::<TreatmentStepField>().is_err());
    }

    #[test]
    fn test_real_fields_exclude_virtual() {
        let real: Vec<_> = TreatmentStepField::real_fields().collect();
        assert_eq!(real.first(), Some(&TreatmentStepField::DiscreteId));
        assert!(real.contains(&TreatmentStepField::Alpha95));
        assert!(!real.contains(&TreatmentStepField::VirtDeclination));
        assert_eq!(real.len(), 31);
    }

    #[test]
    fn test_heading_lookup() {
        assert_eq!(
            TreatmentStepField::from_heading("Run #"),
            Some(TreatmentStepField::RunNumber)
        );
        assert_eq!(TreatmentStepField::from_heading("Run number"), None);
    }

    #[test]
    fn test_importable() {
        assert!(TreatmentStepField::VirtDeclination.is_importable());
        assert!(!TreatmentStepField::PpHidden.is_importable());
    }
}
