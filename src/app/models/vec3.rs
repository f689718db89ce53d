//! Three-dimensional vectors for magnetic moments
//!
//! Directions follow the palaeomagnetic convention: declination is measured
//! clockwise from +x towards +y, inclination is positive downwards (+z).

use serde::{Deserialize, Serialize};
use std::fmt;

/// An immutable Cartesian vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    /// The zero vector
    pub const ORIGIN: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Build a vector from magnitude, inclination and declination in radians
    pub fn from_polar_radians(mag: f64, inc: f64, dec: f64) -> Self {
        Self::new(
            mag * inc.cos() * dec.cos(),
            mag * inc.cos() * dec.sin(),
            mag * inc.sin(),
        )
    }

    /// Build a vector from magnitude, inclination and declination in degrees
    pub fn from_polar_degrees(mag: f64, inc: f64, dec: f64) -> Self {
        Self::from_polar_radians(mag, inc.to_radians(), dec.to_radians())
    }

    #[inline]
    pub fn mag(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Declination in radians, in the range [0, 2π)
    pub fn dec(&self) -> f64 {
        let theta = self.y.atan2(self.x);
        if theta < 0.0 {
            theta + 2.0 * std::f64::consts::PI
        } else {
            theta
        }
    }

    /// Inclination in radians
    pub fn inc(&self) -> f64 {
        self.z.atan2((self.x * self.x + self.y * self.y).sqrt())
    }

    pub fn dec_deg(&self) -> f64 {
        self.dec().to_degrees()
    }

    pub fn inc_deg(&self) -> f64 {
        self.inc().to_degrees()
    }

    #[inline]
    pub fn times(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    #[inline]
    pub fn divide_by(&self, divisor: f64) -> Self {
        Self::new(self.x / divisor, self.y / divisor, self.z / divisor)
    }

    /// Component-wise division
    #[inline]
    pub fn divide_by_vec(&self, divisor: &Vec3) -> Self {
        Self::new(self.x / divisor.x, self.y / divisor.y, self.z / divisor.z)
    }

    #[inline]
    pub fn plus(&self, other: &Vec3) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    #[inline]
    pub fn minus(&self, other: &Vec3) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    #[inline]
    pub fn invert(&self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }

    pub fn with_x(&self, x: f64) -> Self {
        Self::new(x, self.y, self.z)
    }

    pub fn with_y(&self, y: f64) -> Self {
        Self::new(self.x, y, self.z)
    }

    pub fn with_z(&self, z: f64) -> Self {
        Self::new(self.x, self.y, z)
    }

    /// Arithmetic mean of a set of vectors, or `None` for an empty set
    pub fn mean(vectors: &[Vec3]) -> Option<Vec3> {
        if vectors.is_empty() {
            return None;
        }
        let sum = vectors.iter().fold(Vec3::ORIGIN, |acc, v| acc.plus(v));
        Some(sum.divide_by(vectors.len() as f64))
    }

    /// Apply a 3×3 matrix given as rows
    fn transform(&self, m: &[[f64; 3]; 3]) -> Self {
        Self::new(
            self.x * m[0][0] + self.y * m[0][1] + self.z * m[0][2],
            self.x * m[1][0] + self.y * m[1][1] + self.z * m[1][2],
            self.x * m[2][0] + self.y * m[2][1] + self.z * m[2][2],
        )
    }

    /// Rotate about the x axis by `angle` radians
    pub fn rot_x(&self, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        self.transform(&[[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]])
    }

    /// Rotate about the y axis by `angle` radians
    pub fn rot_y(&self, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        self.transform(&[[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]])
    }

    /// Rotate about the z axis by `angle` radians
    pub fn rot_z(&self, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        self.transform(&[[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Rotate a specimen-frame vector into geographic co-ordinates.
    ///
    /// `az` is the sample dip azimuth and `dip` the sample dip, both in
    /// radians.
    pub fn correct_sample(&self, az: f64, dip: f64) -> Self {
        let (sin_az, cos_az) = az.sin_cos();
        let (sin_dip, cos_dip) = dip.sin_cos();
        self.transform(&[
            [sin_dip * cos_az, -sin_az, cos_dip * cos_az],
            [sin_dip * sin_az, cos_az, cos_dip * sin_az],
            [-cos_dip, 0.0, sin_dip],
        ])
    }

    /// Rotate a geographic vector into tectonic (bedding-corrected) co-ordinates.
    ///
    /// `az` is the formation dip azimuth and `dip` the formation dip, both in
    /// radians.
    pub fn correct_form(&self, az: f64, dip: f64) -> Self {
        let (sa, ca) = az.sin_cos();
        let (sd, cd) = dip.sin_cos();
        self.transform(&[
            [ca * cd * ca + sa * sa, cd * sa * ca - sa * ca, sd * ca],
            [sa * cd * ca - ca * sa, cd * sa * sa + ca * ca, sd * sa],
            [-ca * sd, -sa * sd, cd],
        ])
    }

    /// Component-wise comparison with an absolute tolerance
    pub fn approx_eq(&self, other: &Vec3, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.z - other.z).abs() <= tolerance
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
