//! Orientation convention normalization
//!
//! Loaders read a magnetic moment and the sample and formation orientations
//! as the instrument recorded them, bundle them into a
//! [`VectorAndOrientations`], and convert that bundle to the canonical
//! convention (P1=12, P2=90, P3=12, P4=0) with an
//! [`OrientationParameters`] before storing it on a treatment step.
//!
//! ## Components
//!
//! - [`parameters`] - P1–P4 convention types and the conversion rules

pub mod parameters;

#[cfg(test)]
mod tests;

pub use parameters::{AzimuthParameter, DipParameter, OrientationParameters};

use crate::app::models::{TreatmentStep, Vec3};
use serde::{Deserialize, Serialize};

/// A moment vector with the orientations needed to correct it, in some convention
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorAndOrientations {
    pub vector: Vec3,
    pub sample_az: f64,
    pub sample_dip: f64,
    pub formation_az: f64,
    pub formation_dip: f64,
}

impl VectorAndOrientations {
    pub fn new(
        vector: Vec3,
        sample_az: f64,
        sample_dip: f64,
        formation_az: f64,
        formation_dip: f64,
    ) -> Self {
        Self {
            vector,
            sample_az,
            sample_dip,
            formation_az,
            formation_dip,
        }
    }

    /// Store moment and orientations on a step
    pub fn apply_to(&self, step: &mut TreatmentStep) {
        step.moment = Some(self.vector);
        step.sample_az = self.sample_az;
        step.sample_dip = self.sample_dip;
        step.formation_az = self.formation_az;
        step.formation_dip = self.formation_dip;
    }
}
