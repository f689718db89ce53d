//! Tests for the IAPD loader

use super::*;
use crate::app::models::{MeasurementType, TreatmentType};
use crate::app::services::file_loaders::iapd::IapdLoader;
use crate::app::services::file_loaders::{FileLoader, LoadOptions, LoadedData, OptionValue};
use crate::constants::option_keys;

fn read(text: &str, options: &LoadOptions) -> LoadedData {
    IapdLoader.read_bytes(text.as_bytes(), "s1.iapd", options).unwrap()
}

#[test]
fn test_af_file_with_defaults() {
    let text = "S1 10 80 120 15 11\n0 5000 0 0 2.5 45 30\n20 2500 0 0 6.0 50 35\n";
    let data = read(text, &LoadOptions::new());
    assert_eq!(data.treatment_steps.len(), 2);
    assert_eq!(
        data.messages,
        vec!["File \"s1.iapd\" has high α95 values (max. 6.0).".to_string()]
    );
    let step = &data.treatment_steps[1];
    assert_eq!(step.discrete_id, "S1");
    assert_eq!(step.measurement_type, MeasurementType::Discrete);
    assert_eq!(step.treatment_type, TreatmentType::DegaussXyz);
    assert_close(step.af_y, 0.02, 1e-12, "AF");
    assert_eq!(step.sample_az, 10.0);
    assert_eq!(step.sample_dip, 80.0);
    assert_eq!(step.formation_az, 120.0);
    assert_eq!(step.formation_dip, 15.0);
    assert_eq!(step.volume, 11.0);
    assert_eq!(step.alpha95, 6.0);
    assert_vec_close(
        &step.moment.unwrap(),
        &Vec3::from_polar_degrees(2.5, 35.0, 50.0),
        1e-12,
        "moment",
    );
}

#[test]
fn test_header_defaults() {
    let data = read("S1\n0 1000 0 0 1 0 0\n", &LoadOptions::new());
    let step = &data.treatment_steps[0];
    assert_eq!(step.sample_az, 0.0);
    assert_eq!(step.sample_dip, 90.0);
    assert_eq!(step.volume, 10.0);
    assert!(data.messages.is_empty());
}

#[test]
fn test_thermal_continuous_options() {
    let options = LoadOptions::new()
        .with(option_keys::TREATMENT_TYPE, OptionValue::TreatmentType(TreatmentType::Thermal))
        .with(
            option_keys::MEASUREMENT_TYPE,
            OptionValue::MeasurementType(MeasurementType::Continuous),
        );
    let data = read("12.5 0 90 0 0 10\n350 1000 0 0 1 0 0\n", &options);
    let step = &data.treatment_steps[0];
    assert_eq!(step.treatment_type, TreatmentType::Thermal);
    assert_eq!(step.temperature, 350.0);
    assert_eq!(step.depth.as_deref(), Some("12.5"));
}

#[test]
fn test_malformed_header_aborts() {
    let data = read("S1 ten 80\n0 1000 0 0 1 0 0\n", &LoadOptions::new());
    assert!(data.treatment_steps.is_empty());
    assert_eq!(data.messages, vec!["Malformed header in \"s1.iapd\"".to_string()]);
}

#[test]
fn test_malformed_data_reported_once() {
    let text = "S1\n0 1000 x 0 1 0 0\n\n10 1000 0 y 1 0 0\n";
    let data = read(text, &LoadOptions::new());
    assert_eq!(data.treatment_steps.len(), 2);
    assert_eq!(data.messages, vec!["Malformed data fields in \"s1.iapd\".".to_string()]);
}

#[test]
fn test_missing_sample_name() {
    let data = read("   \n0 1000 0 0 1 0 0\n", &LoadOptions::new());
    assert_eq!(data.messages, vec!["No sample name in \"s1.iapd\"".to_string()]);
    assert_eq!(data.treatment_steps[0].discrete_id, "Unknown");
}
