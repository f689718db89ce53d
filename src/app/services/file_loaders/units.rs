//! cgs to SI unit conversions

use crate::app::models::Vec3;
use crate::constants::{GAUSS_TO_AM, OERSTED_PER_TESLA};

/// Magnetization in gauss (emu/cm³) to A/m
pub fn gauss_to_am(gauss: f64) -> f64 {
    gauss * GAUSS_TO_AM
}

pub fn gauss_to_am_vec(gauss: &Vec3) -> Vec3 {
    gauss.times(GAUSS_TO_AM)
}

/// Field strength in oersted to tesla
pub fn oersted_to_tesla(oersted: f64) -> f64 {
    oersted / OERSTED_PER_TESLA
}
