//! Anisotropy of magnetic susceptibility data

use crate::app::services::orientation::OrientationParameters;
use serde::{Deserialize, Serialize};

/// Susceptibility tensor and orientation for one specimen, in canonical convention
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmsData {
    pub name: String,
    /// Tensor components `[k11, k22, k33, k12, k23, k13]` in specimen co-ordinates
    pub tensor: [f64; 6],
    pub sample_az: f64,
    pub sample_dip: f64,
    pub formation_az: f64,
    pub formation_dip: f64,
}

impl AmsData {
    /// Build from values recorded in the convention described by `params`
    pub fn new(
        name: impl Into<String>,
        params: &OrientationParameters,
        tensor: [f64; 6],
        sample_az: f64,
        sample_dip: f64,
        formation_az: f64,
        formation_dip: f64,
    ) -> Self {
        Self {
            name: name.into(),
            tensor: params.p1.rotate_tensor(&tensor),
            sample_az: params.p3.rotate_sample_azimuth(sample_az),
            sample_dip: params.p2.correct_sample_dip(sample_dip),
            formation_az: params.p4.correct_formation_azimuth(formation_az),
            formation_dip,
        }
    }
}
