//! Orientation convention parameters
//!
//! Instruments and programs disagree on how sample and formation orientations
//! are recorded. Four parameters describe a convention:
//!
//! - P1: clock position of the specimen's marked arrow relative to the up-core
//!   direction (3, 6, 9 or 12)
//! - P2: whether the recorded sample dip is a plunge (90) or a dip of the
//!   frontal plane (0)
//! - P3: clock position of the measured azimuth relative to the dip direction
//!   antipode (3, 6, 9 or 12)
//! - P4: whether the formation is recorded as dip direction/dip (0) or as a
//!   right-hand-rule strike/dip (90)

use super::VectorAndOrientations;
use crate::app::models::Vec3;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Azimuth Parameter (P1, P3)
// =============================================================================

/// A clock position: 12, 3, 6 or 9 o'clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AzimuthParameter {
    A3,
    A6,
    A9,
    A12,
}

impl AzimuthParameter {
    /// Number of clockwise quarter turns from 12 o'clock
    pub fn quarter_turns(self) -> u32 {
        match self {
            AzimuthParameter::A12 => 0,
            AzimuthParameter::A3 => 1,
            AzimuthParameter::A6 => 2,
            AzimuthParameter::A9 => 3,
        }
    }

    pub fn clock_value(self) -> u32 {
        match self {
            AzimuthParameter::A3 => 3,
            AzimuthParameter::A6 => 6,
            AzimuthParameter::A9 => 9,
            AzimuthParameter::A12 => 12,
        }
    }

    pub fn from_value(value: u32) -> Result<Self> {
        match value {
            3 => Ok(AzimuthParameter::A3),
            6 => Ok(AzimuthParameter::A6),
            9 => Ok(AzimuthParameter::A9),
            12 => Ok(AzimuthParameter::A12),
            _ => Err(Error::orientation_parameter(value.to_string())),
        }
    }

    /// Sine and cosine of the rotation, exact for quarter turns
    fn sin_cos(self) -> (f64, f64) {
        match self.quarter_turns() {
            0 => (0.0, 1.0),
            1 => (1.0, 0.0),
            2 => (0.0, -1.0),
            _ => (-1.0, 0.0),
        }
    }

    /// Rotate a specimen-frame vector about z so that the arrow points up-core (P1)
    pub fn rotate_vector(self, v: &Vec3) -> Vec3 {
        let (s, c) = self.sin_cos();
        Vec3::new(c * v.x - s * v.y, s * v.x + c * v.y, v.z)
    }

    /// Rotate a symmetric second-rank tensor `[k11, k22, k33, k12, k23, k13]`
    /// about z in the same sense as [`rotate_vector`](Self::rotate_vector)
    pub fn rotate_tensor(self, k: &[f64; 6]) -> [f64; 6] {
        let (s, c) = self.sin_cos();
        let [k11, k22, k33, k12, k23, k13] = *k;
        [
            c * c * k11 - 2.0 * c * s * k12 + s * s * k22,
            s * s * k11 + 2.0 * c * s * k12 + c * c * k22,
            k33,
            c * s * k11 + (c * c - s * s) * k12 - c * s * k22,
            s * k13 + c * k23,
            c * k13 - s * k23,
        ]
    }

    /// Map a measured sample azimuth onto the dip-direction antipode convention (P3)
    pub fn rotate_sample_azimuth(self, azimuth: f64) -> f64 {
        (azimuth - 90.0 * f64::from(self.quarter_turns())).rem_euclid(360.0)
    }
}

impl FromStr for AzimuthParameter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "3" => Ok(AzimuthParameter::A3),
            "6" => Ok(AzimuthParameter::A6),
            "9" => Ok(AzimuthParameter::A9),
            "12" => Ok(AzimuthParameter::A12),
            _ => Err(Error::orientation_parameter(s)),
        }
    }
}

impl fmt::Display for AzimuthParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.clock_value())
    }
}

// =============================================================================
// Dip Parameter (P2, P4)
// =============================================================================

/// A dip convention: 0 or 90 degrees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DipParameter {
    D0,
    D90,
}

impl DipParameter {
    pub fn degrees(self) -> u32 {
        match self {
            DipParameter::D0 => 0,
            DipParameter::D90 => 90,
        }
    }

    pub fn from_value(value: u32) -> Result<Self> {
        match value {
            0 => Ok(DipParameter::D0),
            90 => Ok(DipParameter::D90),
            _ => Err(Error::orientation_parameter(value.to_string())),
        }
    }

    /// Convert a sample dip to a plunge (P2)
    pub fn correct_sample_dip(self, dip: f64) -> f64 {
        match self {
            DipParameter::D0 => 90.0 - dip,
            DipParameter::D90 => dip,
        }
    }

    /// Convert a formation azimuth to a dip direction (P4)
    pub fn correct_formation_azimuth(self, azimuth: f64) -> f64 {
        match self {
            DipParameter::D0 => azimuth,
            DipParameter::D90 => (azimuth + 90.0) % 360.0,
        }
    }
}

impl FromStr for DipParameter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "0" => Ok(DipParameter::D0),
            "90" => Ok(DipParameter::D90),
            _ => Err(Error::orientation_parameter(s)),
        }
    }
}

impl fmt::Display for DipParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.degrees())
    }
}

// =============================================================================
// Orientation Parameters
// =============================================================================

/// A complete orientation convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrientationParameters {
    pub p1: AzimuthParameter,
    pub p2: DipParameter,
    pub p3: AzimuthParameter,
    pub p4: DipParameter,
}

impl OrientationParameters {
    /// The convention every loader normalizes to
    pub const CANONICAL: OrientationParameters = OrientationParameters {
        p1: AzimuthParameter::A12,
        p2: DipParameter::D90,
        p3: AzimuthParameter::A12,
        p4: DipParameter::D0,
    };

    pub fn new(
        p1: AzimuthParameter,
        p2: DipParameter,
        p3: AzimuthParameter,
        p4: DipParameter,
    ) -> Self {
        Self { p1, p2, p3, p4 }
    }

    /// Parse four parameter strings such as `("3", "0", "3", "0")`
    pub fn read(p1: &str, p2: &str, p3: &str, p4: &str) -> Result<Self> {
        Ok(Self::new(p1.parse()?, p2.parse()?, p3.parse()?, p4.parse()?))
    }

    pub fn from_values(p1: u32, p2: u32, p3: u32, p4: u32) -> Result<Self> {
        Ok(Self::new(
            AzimuthParameter::from_value(p1)?,
            DipParameter::from_value(p2)?,
            AzimuthParameter::from_value(p3)?,
            DipParameter::from_value(p4)?,
        ))
    }

    /// Express a measurement's geometry in the canonical convention
    pub fn convert_to_canonical(&self, raw: &VectorAndOrientations) -> VectorAndOrientations {
        VectorAndOrientations {
            vector: self.p1.rotate_vector(&raw.vector),
            sample_az: self.p3.rotate_sample_azimuth(raw.sample_az),
            sample_dip: self.p2.correct_sample_dip(raw.sample_dip),
            formation_az: self.p4.correct_formation_azimuth(raw.formation_az),
            formation_dip: raw.formation_dip,
        }
    }
}

impl Default for OrientationParameters {
    fn default() -> Self {
        Self::CANONICAL
    }
}

impl FromStr for OrientationParameters {
    type Err = Error;

    /// Parse the comma-separated form `P1,P2,P3,P4`
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').collect();
        match parts.as_slice() {
            [p1, p2, p3, p4] => Self::read(p1, p2, p3, p4),
            _ => Err(Error::orientation_parameter(s)),
        }
    }
}

impl fmt::Display for OrientationParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.p1, self.p2, self.p3, self.p4)
    }
}
