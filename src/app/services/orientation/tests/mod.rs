//! Test utilities for orientation convention tests

use crate::app::models::Vec3;


/// Smallest angular difference between two declinations, in degrees
pub fn declination_difference(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

/// Assert that a vector has the expected declination and inclination
pub fn assert_direction(v: &Vec3, dec: f64, inc: f64, tolerance: f64, context: &str) {
    let actual_dec = v.dec_deg();
    let actual_inc = v.inc_deg();
    assert!(
        declination_difference(actual_dec, dec) <= tolerance,
        "{}: expected declination {}, got {}",
        context,
        dec,
        actual_dec
    );
    assert!(
        (actual_inc - inc).abs() <= tolerance,
        "{}: expected inclination {}, got {}",
        context,
        inc,
        actual_inc
    );
}
