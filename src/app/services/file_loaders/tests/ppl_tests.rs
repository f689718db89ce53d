//! Tests for reading and writing the native PuffinPlot format

use super::*;
use crate::app::models::{MeasurementType, TreatmentStep, TreatmentType};
use crate::app::services::file_loaders::ppl::PplLoader;
use crate::app::services::file_loaders::{FileLoader, LoadOptions, LoadedData, write_ppl};

fn read(text: &str) -> LoadedData {
    PplLoader.read_bytes(text.as_bytes(), "suite.ppl", &LoadOptions::new()).unwrap()
}

fn create_step(id: &str, af: f64, moment: Vec3) -> TreatmentStep {
    let mut step = TreatmentStep::with_moment(moment);
    step.discrete_id = id.to_string();
    step.measurement_type = MeasurementType::Discrete;
    step.treatment_type = TreatmentType::DegaussXyz;
    step.set_af_all(af);
    step.sample_az = 42.0;
    step.set_sample_hade(12.5);
    step.alpha95 = 3.25;
    step.selected = true;
    step
}

#[test]
fn test_write_then_read_preserves_values() {
    let steps = vec![
        create_step("S1", 0.0, Vec3::new(0.1, -0.2, 0.3)),
        create_step("S1", 0.01, Vec3::new(1.0 / 3.0, 2e-9, -7.5)),
        TreatmentStep::new(),
    ];
    let text = write_ppl(&steps, &[]);
    assert!(text.starts_with("PuffinPlot file. Version 3\n"));

    let data = read(&text);
    assert!(data.messages.is_empty(), "{:?}", data.messages);
    assert!(data.extra_lines.is_empty());
    assert_eq!(data.treatment_steps.len(), steps.len());
    for (read_back, original) in data.treatment_steps.iter().zip(&steps) {
        assert_eq!(read_back.real_values(), original.real_values());
    }
    assert_eq!(data.treatment_steps[2].moment, None);
    assert_eq!(data.treatment_steps[2].depth, None);
}

#[test]
fn test_extra_lines_round_trip() {
    let extra = vec!["SAMPLE_CALCULATIONS\tS1".to_string(), "# free text".to_string()];
    let text = write_ppl(&[create_step("S1", 0.0, Vec3::new(1.0, 0.0, 0.0))], &extra);
    let data = read(&text);
    assert_eq!(data.treatment_steps.len(), 1);
    assert_eq!(data.extra_lines, extra);
    assert_eq!(write_ppl(&data.treatment_steps, &data.extra_lines), text);
}

#[test]
fn test_version_2_is_converted_from_cgs() {
    let text = "PuffinPlot file. Version 2\n\
                DISCRETE_ID\tTREATMENT\tX_MOMENT\tY_MOMENT\tZ_MOMENT\tAF_X\tAF_Y\tAF_Z\tIRM_FIELD\n\
                S1\tDegauss X, Y, & Z\t0.001\t0.002\t0.003\t200\t300\tNaN\t1000\n";
    let data = read(text);
    assert!(data.messages.is_empty(), "{:?}", data.messages);
    let step = &data.treatment_steps[0];
    assert_eq!(step.treatment_type, TreatmentType::DegaussXyz);
    assert_vec_close(&step.moment.unwrap(), &Vec3::new(1.0, 2.0, 3.0), 1e-12, "moment");
    assert_close(step.af_x, 0.02, 1e-12, "AF X");
    assert_close(step.af_y, 0.03, 1e-12, "AF Y");
    assert!(step.af_z.is_nan());
    assert_close(step.irm_field, 0.1, 1e-12, "IRM");
}

#[test]
fn test_header_problems() {
    assert_eq!(read("").messages, vec!["suite.ppl is empty.".to_string()]);
    assert_eq!(
        read("Some other file\n").messages,
        vec!["suite.ppl doesn't appear to be a PuffinPlot file.".to_string()]
    );
    assert_eq!(
        read("PuffinPlot file. Version 4\nTREATMENT\n").messages,
        vec!["suite.ppl is of version 4, which cannot be loaded.".to_string()]
    );
    assert_eq!(
        read("PuffinPlot file. Version 3\n").messages,
        vec!["suite.ppl contains no headers or data.".to_string()]
    );
    assert_eq!(
        read("PuffinPlot file. Version 3\nDISCRETE_ID\tFROBNICATION\n").messages,
        vec!["Unknown column heading \"FROBNICATION\" in suite.ppl".to_string()]
    );
    assert_eq!(
        read("PuffinPlot file. Version 3\nDISCRETE_ID\tX_MOMENT\nS1\t1\n").messages,
        vec!["suite.ppl has no TREATMENT column.".to_string()]
    );
}

#[test]
fn test_headings_are_case_sensitive() {
    let data = read("PuffinPlot file. Version 3\ndiscrete_id\tTREATMENT\n");
    assert_eq!(data.messages.len(), 1);
    assert!(data.messages[0].starts_with("Unknown column heading"));
}

#[test]
fn test_malformed_value_skips_line() {
    let text = "PuffinPlot file. Version 3\n\
                DISCRETE_ID\tTREATMENT\tX_MOMENT\n\
                S1\tDEGAUSS_XYZ\tabc\n\
                S2\tTHERMAL\t1.5\n";
    let data = read(text);
    assert_eq!(data.treatment_steps.len(), 1);
    assert_eq!(data.treatment_steps[0].discrete_id, "S2");
    assert_eq!(data.messages.len(), 1);
    assert!(data.messages[0].starts_with("Error at line 3 of file suite.ppl:"));
}
