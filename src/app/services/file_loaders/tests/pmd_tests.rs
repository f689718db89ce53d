//! Tests for the PMD loader and its consistency check

use super::*;
use crate::app::models::{MeasurementType, TreatmentType};
use crate::app::services::file_loaders::pmd::{PmdDataLine, PmdHeader, PmdLoader, parse_treatment_code};
use crate::app::services::file_loaders::{FileLoader, LoadOptions, LoadedData};

const HEADER: &str = "TEST1     a=  0.0   b=  0.0   s=  0.0   d=  0.0   v=10.0E-6m3";
const HEADINGS: &str = "STEP  Xc (Am2)  Yc (Am2)  Zc (Am2)  MAG(A/m)   Dg    Ig    Ds    Is   a95 ";
const NRM_LINE: &str = "NRM   1.00E-05  0.00E+00  0.00E+00  1.00E+00   0.0   0.0   0.0   0.0  0.0 1";
const THERMAL_LINE: &str = "T250  1.00E-05  0.00E+00  0.00E+00  1.00E+00   0.0   0.0   0.0   0.0  1.5 1";
const INCONSISTENT_LINE: &str = "M020  1.00E-05  0.00E+00  0.00E+00  1.00E+00  10.0   0.0   0.0   0.0  0.0 1";

fn pmd_file(comment: &str, data_lines: &[&str]) -> String {
    let mut text = format!("{}\r\n{}\r\n{}\r\n", comment, HEADER, HEADINGS);
    for line in data_lines {
        text.push_str(line);
        text.push_str("\r\n");
    }
    text
}

fn read(text: &str) -> LoadedData {
    PmdLoader.read_bytes(text.as_bytes(), "test1.pmd", &LoadOptions::new()).unwrap()
}

#[test]
fn test_header_parsing() {
    let header = PmdHeader::parse(HEADER).unwrap();
    assert_eq!(header.name, "TEST1");
    assert_eq!(header.volume, 10.0e-6);
    assert_eq!(header.timestamp, None);

    let header =
        PmdHeader::parse("     26a  a=355.0   b= 77.0   s=  0.0   d=  0.0   v=11.0E-6m3   05-27-1994 09:08").unwrap();
    assert_eq!(header.name, "26a");
    assert_eq!(header.sample_azimuth, 355.0);
    assert_eq!(header.sample_hade, 77.0);
    assert_eq!(header.timestamp.as_deref(), Some("1994-05-27 09:08"));
}

#[test]
fn test_greek_header_letters() {
    let header = PmdHeader::parse("TEST1     α= 10.0   ß= 20.0   s= 30.0   d= 40.0   v=10.0E-6m3").unwrap();
    assert_eq!(header.sample_azimuth, 10.0);
    assert_eq!(header.formation_dip, 40.0);
}

#[test]
fn test_treatment_codes() {
    assert_eq!(parse_treatment_code("NRM"), Some((TreatmentType::None, 0.0)));
    assert_eq!(parse_treatment_code("M020"), Some((TreatmentType::DegaussXyz, 20.0)));
    assert_eq!(parse_treatment_code("H100"), Some((TreatmentType::DegaussXyz, 100.0)));
    assert_eq!(parse_treatment_code("T250"), Some((TreatmentType::Thermal, 250.0)));
    assert_eq!(parse_treatment_code("20mT"), Some((TreatmentType::DegaussXyz, 20.0)));
    assert_eq!(parse_treatment_code("250°"), Some((TreatmentType::Thermal, 250.0)));
    assert_eq!(parse_treatment_code("250C"), Some((TreatmentType::Thermal, 250.0)));
    assert_eq!(parse_treatment_code("X999"), None);
}

#[test]
fn test_data_line_parsing() {
    let line = PmdDataLine::parse(THERMAL_LINE).unwrap();
    assert_eq!(line.treatment_type, TreatmentType::Thermal);
    assert_eq!(line.treatment_level, 250.0);
    assert_eq!(line.moment, Vec3::new(1.0e-5, 0.0, 0.0));
    assert_eq!(line.alpha95, 1.5);
    assert!(PmdDataLine::parse("garbage").is_none());
}

#[test]
fn test_consistent_file() {
    let data = read(&pmd_file("comment", &[NRM_LINE, THERMAL_LINE]));
    assert!(data.messages.is_empty(), "{:?}", data.messages);
    assert_eq!(data.treatment_steps.len(), 2);
    let step = &data.treatment_steps[1];
    assert_eq!(step.discrete_id, "TEST1");
    assert_eq!(step.measurement_type, MeasurementType::Discrete);
    assert_eq!(step.treatment_type, TreatmentType::Thermal);
    assert_eq!(step.temperature, 250.0);
    assert_eq!(step.sample_dip, 90.0);
    assert_eq!(step.formation_az, 90.0);
    assert_eq!(step.alpha95, 1.5);
    assert_vec_close(&step.moment.unwrap(), &Vec3::new(1.0, 0.0, 0.0), 1e-9, "magnetization");
}

#[test]
fn test_inconsistent_data_reported() {
    let data = read(&pmd_file("comment", &[INCONSISTENT_LINE]));
    assert_eq!(data.treatment_steps.len(), 1);
    assert_close(data.treatment_steps[0].af_x, 0.02, 1e-12, "AF");
    assert_eq!(
        data.messages,
        vec!["Inconsistent data (file test1.pmd, line 4): calculated 0.0000, found 10.0000".to_string()]
    );
}

#[test]
fn test_jr6_derived_files_skip_consistency_check() {
    let data = read(&pmd_file("JR6 file", &[INCONSISTENT_LINE]));
    assert!(data.messages.is_empty());
    assert_eq!(data.treatment_steps.len(), 1);
}

#[test]
fn test_dos_eof_marker_ends_data() {
    let data = read(&pmd_file("comment", &[NRM_LINE, "\u{1a}", THERMAL_LINE]));
    assert_eq!(data.treatment_steps.len(), 1);
}

#[test]
fn test_bad_headers() {
    let data = read("comment\nnot a header\n");
    assert_eq!(data.messages, vec!["Line 2: unknown format for first header line".to_string()]);
    let data = read(&format!("comment\n{}\nnot headings\n", HEADER));
    assert_eq!(data.messages, vec!["Line 3: unknown format for second header line".to_string()]);
    assert_eq!(read("").messages, vec!["test1.pmd is empty".to_string()]);
}

#[test]
fn test_malformed_data_lines() {
    let data = read(&pmd_file("comment", &[NRM_LINE, "rubbish", THERMAL_LINE]));
    assert_eq!(data.treatment_steps.len(), 2);
    assert_eq!(data.messages, vec!["Line 5: malformed data line".to_string()]);
}

#[test]
fn test_cp437_degree_sign_in_treatment_code() {
    let mut bytes = pmd_file("comment", &[]).into_bytes();
    bytes.extend_from_slice(b"250");
    bytes.push(0xF8);
    bytes.extend_from_slice("  1.00E-05  0.00E+00  0.00E+00  1.00E+00   0.0   0.0   0.0   0.0  0.0 1\r\n".as_bytes());
    let data = PmdLoader.read_bytes(&bytes, "test1.pmd", &LoadOptions::new()).unwrap();
    assert!(data.messages.is_empty(), "{:?}", data.messages);
    assert_eq!(data.treatment_steps[0].temperature, 250.0);
}
