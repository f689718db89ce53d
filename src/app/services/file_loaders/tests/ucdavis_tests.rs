//! Tests for the UC Davis long-core loader

use super::*;
use crate::app::models::{MeasurementType, TreatmentType};
use crate::app::services::file_loaders::ucdavis::UcDavisLoader;
use crate::app::services::file_loaders::{FileLoader, LoadOptions, LoadedData};

const HEADER: &str =
    "Depth\tX(0)\tY(0)\tZ(0)\tD(0)\tI(0)\tJ(0)\tX(20)\tY(20)\tZ(20)\tD(20)\tI(20)\tJ(20)";

fn read(text: &str) -> LoadedData {
    UcDavisLoader.read_bytes(text.as_bytes(), "core.txt", &LoadOptions::new()).unwrap()
}

#[test]
fn test_one_step_per_level() {
    let text = format!(
        "{}\r\n12.5\t0\t0\t0\t45\t30\t2\t0\t0\t0\t50\t35\t1\r\n13.0\t0\t0\t0\t40\t20\t3\t0\t0\t0\t41\t21\t1.5\r\n",
        HEADER
    );
    let data = read(&text);
    assert!(data.messages.is_empty(), "{:?}", data.messages);
    assert_eq!(data.treatment_steps.len(), 4);

    let first = &data.treatment_steps[0];
    assert_eq!(first.measurement_type, MeasurementType::Continuous);
    assert_eq!(first.treatment_type, TreatmentType::DegaussXyz);
    assert_eq!(first.depth.as_deref(), Some("12.5"));
    assert_eq!(first.af_x, 0.0);
    assert_vec_close(
        &first.moment.unwrap(),
        &Vec3::from_polar_degrees(2.0, 30.0, 45.0),
        1e-12,
        "level 0",
    );

    let second = &data.treatment_steps[1];
    assert_close(second.af_z, 0.02, 1e-12, "AF");
    assert_vec_close(
        &second.moment.unwrap(),
        &Vec3::from_polar_degrees(1.0, 35.0, 50.0),
        1e-12,
        "level 20",
    );
    assert_eq!(data.treatment_steps[3].depth.as_deref(), Some("13.0"));
}

#[test]
fn test_levels_sorted_numerically() {
    let text = "Depth\tD(100)\tI(100)\tJ(100)\tD(5)\tI(5)\tJ(5)\n1\t10\t20\t1\t30\t40\t2\n";
    let data = read(text);
    assert_close(data.treatment_steps[0].af_x, 0.005, 1e-12, "first level");
    assert_close(data.treatment_steps[1].af_x, 0.1, 1e-12, "second level");
}

#[test]
fn test_incomplete_level_rejects_file() {
    let data = read("Depth\tD(40)\tI(40)\n1\t2\t3\n");
    assert!(data.treatment_steps.is_empty());
    assert_eq!(
        data.messages,
        vec!["Missing declination, inclination or intensity for level 40 in core.txt".to_string()]
    );
}

#[test]
fn test_unrecognized_heading_rejects_file() {
    let data = read("Depth\tfoo\n1\t2\n");
    assert_eq!(data.messages, vec!["Unrecognized column heading \"foo\" in core.txt".to_string()]);
}

#[test]
fn test_malformed_line_and_ceiling() {
    let mut text = format!("{}\n", HEADER);
    for _ in 0..5 {
        text.push_str("abc\t0\t0\t0\t45\t30\t2\t0\t0\t0\t50\t35\t1\n");
    }
    let data = read(&text);
    assert!(data.treatment_steps.is_empty());
    assert_eq!(data.messages[0], "Malformed line 2 in core.txt -- ignoring it");
    assert_eq!(data.messages.len(), 5);
    assert_eq!(data.messages[4], "Too many errors in core.txt");
}

#[test]
fn test_trailing_tab_on_data_line() {
    let text = format!(
        "{}\n12.5\t0\t0\t0\t45\t30\t2\t0\t0\t0\t50\t35\t1\t\n",
        HEADER
    );
    let data = read(&text);
    assert!(data.messages.is_empty(), "{:?}", data.messages);
    assert_eq!(data.treatment_steps.len(), 2);
    assert_eq!(data.treatment_steps[1].depth.as_deref(), Some("12.5"));
}
