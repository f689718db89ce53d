//! Test utilities for custom tabular format tests

use crate::app::models::{MeasurementType, TreatmentStepField, TreatmentType};
use crate::app::services::tabular::{FieldUnit, FileFormat, MomentUnit};
use std::collections::BTreeMap;


/// Build a column map from (index, field) pairs
pub fn column_map(columns: &[(usize, TreatmentStepField)]) -> BTreeMap<usize, TreatmentStepField> {
    columns.iter().copied().collect()
}

/// Discrete AF format with two header lines, space separators, A/m and mT
pub fn make_format(columns: &[(usize, TreatmentStepField)]) -> FileFormat {
    FileFormat::new(column_map(columns))
        .with_header_lines(2)
        .with_measurement_type(MeasurementType::Discrete)
        .with_treatment_type(TreatmentType::DegaussXyz)
        .with_separator(" ")
        .with_moment_unit(MomentUnit::Am)
        .with_field_unit(FieldUnit::Millitesla)
}
