//! Test utilities for file loader testing
//!
//! Helpers here build temporary input files and compare floating-point
//! results with explicit tolerances.

use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::app::models::Vec3;

mod caltech_tests;
mod iapd_tests;
mod pmd_tests;
mod ppl_tests;
mod ucdavis_tests;

/// Helper to create a temporary file with given content and extension
pub fn create_temp_file(content: &str, extension: &str) -> NamedTempFile {
    let mut temp_file = tempfile::Builder::new()
        .suffix(&format!(".{}", extension))
        .tempfile()
        .unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

/// Helper to write a named file inside a directory
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

/// Assert two values agree within a tolerance
pub fn assert_close(actual: f64, expected: f64, tolerance: f64, context: &str) {
    assert!(
        (actual - expected).abs() <= tolerance,
        "{}: expected {}, got {}",
        context,
        expected,
        actual
    );
}

/// Assert two vectors agree component-wise within a tolerance
pub fn assert_vec_close(actual: &Vec3, expected: &Vec3, tolerance: f64, context: &str) {
    assert!(
        actual.approx_eq(expected, tolerance),
        "{}: expected {}, got {}",
        context,
        expected,
        actual
    );
}
