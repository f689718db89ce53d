//! Tests for the Caltech manifest and sample file loader

use super::*;
use crate::app::models::{MeasurementType, TreatmentType};
use crate::app::services::file_loaders::caltech::{CaltechLoader, CaltechOrientation, read_sample_file};
use crate::app::services::file_loaders::{FileLoader, LoadOptions, LoadedData};
use tempfile::TempDir;

/// A fixed-width CIT measurement line
fn data_line(kind: &str, level: &str, intensity: f64, dec: f64, inc: f64) -> String {
    format!(
        "{:<2}{:>4}{:>6}{:>6}{:>6}{:>6}{:>9}{:>6}{:>6}{:>6}{:>9}{:>9}{:>9}{:>9}{:>11}{:>8}",
        kind, level, "0.0", "0.0", "0.0", "0.0", intensity, "0.0", dec, inc, "0", "0", "0", "0", "0", "0"
    )
}

fn orientation_line(strike: f64, dip: f64, bed_strike: f64, bed_dip: f64) -> String {
    format!(" {:>6} {:>5} {:>5} {:>5} {:>5} {}", 1.5, strike, dip, bed_strike, bed_dip, 2.0)
}

fn sample_file(lines: &[String]) -> String {
    let mut text = format!("CIT SAMPLE01 first sample\n{}\n", orientation_line(30.0, 60.0, 100.0, 20.0));
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text
}

#[test]
fn test_orientation_line() {
    let orientation = CaltechOrientation::parse(&orientation_line(30.0, 60.0, 100.0, 20.0));
    assert_eq!(orientation.stratigraphic_level, 1.5);
    assert_eq!(orientation.core_strike, 30.0);
    assert_eq!(orientation.core_dip, 60.0);
    assert_eq!(orientation.bed_strike, 100.0);
    assert_eq!(orientation.bed_dip, 20.0);
    assert_eq!(orientation.volume, 2.0);

    let partial = CaltechOrientation::parse(" 1.5");
    assert_eq!(partial.stratigraphic_level, 1.5);
    assert!(partial.core_strike.is_nan());
}

#[test]
fn test_sample_file_steps() {
    let text = sample_file(&[
        data_line("NR", "", 1.5, 45.0, 30.0),
        data_line("AF", "20", 1.0, 40.0, 25.0),
        data_line("TT", "250", 0.5, 35.0, 20.0),
    ]);
    let mut data = LoadedData::new();
    read_sample_file(&text, "s1", &mut data);
    assert!(data.messages.is_empty(), "{:?}", data.messages);
    assert_eq!(data.treatment_steps.len(), 3);

    let nrm = &data.treatment_steps[0];
    assert_eq!(nrm.discrete_id, "SAMPLE01");
    assert_eq!(nrm.measurement_type, MeasurementType::Discrete);
    assert_eq!(nrm.treatment_type, TreatmentType::None);
    assert_eq!(nrm.sample_az, 300.0);
    assert_eq!(nrm.sample_dip, 30.0);
    assert_eq!(nrm.formation_az, 190.0);
    assert_eq!(nrm.formation_dip, 20.0);
    assert_vec_close(
        &nrm.moment.unwrap(),
        &Vec3::from_polar_degrees(1.5, 30.0, 45.0).times(1000.0),
        1e-9,
        "moment",
    );

    assert_eq!(data.treatment_steps[1].treatment_type, TreatmentType::DegaussXyz);
    assert_close(data.treatment_steps[1].af_x, 0.02, 1e-12, "AF");
    assert_eq!(data.treatment_steps[2].treatment_type, TreatmentType::Thermal);
    assert_eq!(data.treatment_steps[2].temperature, 250.0);
}

#[test]
fn test_unreadable_level_defaults_to_zero() {
    let text = sample_file(&[data_line("AF", "M", 1.0, 0.0, 0.0), data_line("AF", "xx", 1.0, 0.0, 0.0)]);
    let mut data = LoadedData::new();
    read_sample_file(&text, "s1", &mut data);
    assert_eq!(data.treatment_steps.len(), 2);
    assert_eq!(data.treatment_steps[1].af_x, 0.0);
    assert_eq!(data.messages, vec!["Unreadable treatment level at line 4 in s1; using 0".to_string()]);
}

#[test]
fn test_malformed_lines_stop_sample_file() {
    let lines: Vec<String> = (0..6).map(|_| "too short".to_string()).collect();
    let mut data = LoadedData::new();
    read_sample_file(&sample_file(&lines), "s1", &mut data);
    assert_eq!(data.messages.len(), 5);
    assert_eq!(data.messages[0], "Malformed line 3 in s1 -- ignoring it");
    assert_eq!(data.messages[4], "Too many errors in s1");
}

#[test]
fn test_manifest_reads_sample_files_relative_to_manifest() {
    let dir = TempDir::new().unwrap();
    write_file(dir.path(), "s1", &sample_file(&[data_line("NR", "", 1.0, 0.0, 0.0)]));
    write_file(dir.path(), "s2", &sample_file(&[data_line("AF", "10", 1.0, 0.0, 0.0)]));
    let manifest = write_file(dir.path(), "site.sam", "Site header\n 12.0 34.0 5.0\ns1\nmissing\n\ns2\n");

    let data = CaltechLoader.read_file(&manifest, &LoadOptions::new()).unwrap();
    assert_eq!(data.treatment_steps.len(), 2);
    assert_eq!(data.messages.len(), 1);
    assert!(data.messages[0].starts_with("Error reading \"missing\":"));
}

#[test]
fn test_missing_manifest_is_a_diagnostic() {
    let dir = TempDir::new().unwrap();
    let data = CaltechLoader
        .read_file(&dir.path().join("nothing.sam"), &LoadOptions::new())
        .unwrap();
    assert!(data.treatment_steps.is_empty());
    assert!(data.messages[0].starts_with("Error reading \"nothing.sam\":"));
}
