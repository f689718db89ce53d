//! Result of loading one or more files

use crate::app::models::{AmsData, MeasurementType, TreatmentStep};
use tracing::warn;

/// Records, diagnostics and preserved trailing lines from a load
///
/// Diagnostics describe problems with the input data. They are kept in the
/// order they occurred and are never dropped.
#[derive(Debug, Clone, Default)]
pub struct LoadedData {
    /// Parsed measurements in file order
    pub treatment_steps: Vec<TreatmentStep>,

    /// Human-readable problems found in the input
    pub messages: Vec<String>,

    /// Unparsed lines following the data section, kept for round-tripping
    pub extra_lines: Vec<String>,

    /// Susceptibility anisotropy results from AMS files
    pub ams_data: Vec<AmsData>,
}

impl LoadedData {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty result carrying a single diagnostic
    pub fn from_message(message: impl Into<String>) -> Self {
        let mut data = Self::new();
        data.add_message(message);
        data
    }

    pub fn add_step(&mut self, step: TreatmentStep) {
        self.treatment_steps.push(step);
    }

    /// Record a diagnostic; it is also logged at warn level
    pub fn add_message(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!("{}", message);
        self.messages.push(message);
    }

    pub fn add_extra_line(&mut self, line: impl Into<String>) {
        self.extra_lines.push(line.into());
    }

    pub fn add_ams_data(&mut self, ams: AmsData) {
        self.ams_data.push(ams);
    }

    /// Append everything from another result, preserving order
    pub fn merge(&mut self, other: LoadedData) {
        self.treatment_steps.extend(other.treatment_steps);
        self.messages.extend(other.messages);
        self.extra_lines.extend(other.extra_lines);
        self.ams_data.extend(other.ams_data);
    }

    pub fn is_empty(&self) -> bool {
        self.treatment_steps.is_empty() && self.ams_data.is_empty()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Distinct measurement types among real measurements, in order of first appearance
    pub fn measurement_types(&self) -> Vec<MeasurementType> {
        let mut types = Vec::new();
        for step in &self.treatment_steps {
            let t = step.measurement_type;
            if t.is_actual_measurement() && !types.contains(&t) {
                types.push(t);
            }
        }
        types
    }

    /// Number of distinct samples (names or depths)
    pub fn sample_count(&self) -> usize {
        let mut ids: Vec<&str> = self.treatment_steps.iter().map(|s| s.id_or_depth()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }
}
