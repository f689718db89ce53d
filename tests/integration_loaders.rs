//! End-to-end tests for loading measurement files through the public API

use palaeomag_ingest::app::services::file_loaders::{collect_paths, write_ppl};
use palaeomag_ingest::{
    FileType, LoadOptions, LoaderConfig, MeasurementType, TreatmentType, Vec3, load_file,
    load_files,
};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TWOGEE_DISCRETE: &str = "Meas. type\tSample ID\tVolume\tX corr\tY corr\tZ corr\tAF X\n\
                               Sample/Discrete\tG1\t1\t0.001\t0\t0\t0\n\
                               Sample/Discrete\tG1\t1\t0.0005\t0\t0\t100\n";

const TWOGEE_CONTINUOUS: &str = "Depth\tArea\tX corr\tY corr\tZ corr\tAF Z\n\
                                 12.5\t4\t0.004\t0.008\t0.012\t200\n";

const PMD_FILE: &str = "Site comment\r\n\
                        P1        a=  0.0   b=  0.0   s=  0.0   d=  0.0   v=10.0E-6m3\r\n\
                        STEP  Xc (Am2)  Yc (Am2)  Zc (Am2)  MAG(A/m)   Dg    Ig    Ds    Is   a95 \r\n\
                        NRM   1.00E-05  0.00E+00  0.00E+00  1.00E+00   0.0   0.0   0.0   0.0  0.0 1\r\n";

fn jr6_file() -> String {
    let measurements = "  0.08 -1.45 -0.46  -2 107  88  11  12  13  14 12  0 12  0   1";
    format!(
        "{:<10}{:<8}{}\n{:<10}{:<8}{}\n",
        "J1", "NRM", measurements, "J1", "A20", measurements
    )
}

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_mixed_format_directory() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    std::fs::create_dir(root.join("spinner")).unwrap();
    write(root, "run.dat", TWOGEE_DISCRETE);
    write(root, "p1.pmd", PMD_FILE);
    write(&root.join("spinner"), "site.jr6", &jr6_file());

    let paths = collect_paths(root).unwrap();
    assert_eq!(paths.len(), 3);
    let data = load_files(&paths, None, &LoadOptions::new()).unwrap();

    assert!(data.messages.is_empty(), "{:?}", data.messages);
    assert_eq!(data.treatment_steps.len(), 5);
    assert_eq!(data.sample_count(), 3);
    assert_eq!(data.measurement_types(), vec![MeasurementType::Discrete]);

    let ids: Vec<&str> = data.treatment_steps.iter().map(|s| s.discrete_id.as_str()).collect();
    assert_eq!(ids, vec!["P1", "G1", "G1", "J1", "J1"]);
    assert_eq!(data.treatment_steps[2].treatment_type, TreatmentType::DegaussXyz);
}

#[test]
fn test_continuous_file_after_discrete_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let discrete = write(temp_dir.path(), "a.jr6", &jr6_file());
    let continuous = write(temp_dir.path(), "b.dat", TWOGEE_CONTINUOUS);

    let data = load_files(&[discrete, continuous], None, &LoadOptions::new()).unwrap();
    assert_eq!(data.treatment_steps.len(), 2);
    assert_eq!(data.messages.len(), 1);
    assert!(data.messages[0].contains("b.dat"));
}

#[test]
fn test_convert_round_trip_through_ppl() {
    let temp_dir = TempDir::new().unwrap();
    let source = write(temp_dir.path(), "run.dat", TWOGEE_DISCRETE);
    let loaded = load_file(&source, None, &LoadOptions::new()).unwrap();

    let output = write(
        temp_dir.path(),
        "out.ppl",
        &write_ppl(&loaded.treatment_steps, &loaded.extra_lines),
    );
    let reloaded = load_file(&output, None, &LoadOptions::new()).unwrap();

    assert!(reloaded.messages.is_empty(), "{:?}", reloaded.messages);
    assert_eq!(reloaded.treatment_steps.len(), loaded.treatment_steps.len());
    for (a, b) in reloaded.treatment_steps.iter().zip(&loaded.treatment_steps) {
        assert_eq!(a.real_values(), b.real_values());
    }
}

#[test]
fn test_custom_format_from_config() {
    let temp_dir = TempDir::new().unwrap();
    let format = write(
        temp_dir.path(),
        "format.txt",
        "# spreadsheet export\n\
         fileformat.separator=,\n\
         fileformat.headerLines=1\n\
         fileformat.measType=DISCRETE\n\
         fileformat.treatType=THERMAL\n\
         fileformat.columnMap=0,DISCRETE_ID\\t1,TEMPERATURE\\t2,X_MOMENT\\t3,Y_MOMENT\\t4,Z_MOMENT\n",
    );
    let data_file = write(
        temp_dir.path(),
        "export.csv",
        "name,temp,x,y,z\n\"C1\",0,1,2,3\n\"C1\",300,0.5,1,1.5\n",
    );

    let config = LoaderConfig::new().with_format_path(&format);
    let options = config.to_load_options().unwrap();
    let data = load_file(&data_file, config.effective_file_type(), &options).unwrap();

    assert!(data.messages.is_empty(), "{:?}", data.messages);
    assert_eq!(data.treatment_steps.len(), 2);
    let step = &data.treatment_steps[1];
    assert_eq!(step.discrete_id, "C1");
    assert_eq!(step.treatment_type, TreatmentType::Thermal);
    assert_eq!(step.temperature, 300.0);
    assert_eq!(step.moment, Some(Vec3::new(0.5, 1.0, 1.5)));
}

#[test]
fn test_ams_file_by_extension() {
    let temp_dir = TempDir::new().unwrap();
    let path = write(
        temp_dir.path(),
        "site.asc",
        "A1 ANISOTROPY OF MAGNETIC SUSCEPTIBILITY\n\
         Orientation 10 Azi 80 Dip\n\
         Bedding 0 Azi 0 Dip\n\
         Specimen 1.02 0.99 0.99\n\
         Tensor 0.001 0.002 0.003\n",
    );
    let data = load_file(&path, None, &LoadOptions::new()).unwrap();
    assert!(data.treatment_steps.is_empty());
    assert_eq!(data.ams_data.len(), 1);
    assert_eq!(data.ams_data[0].name, "A1");
    assert_eq!(data.ams_data[0].sample_dip, 10.0);
    assert_eq!(data.ams_data[0].formation_az, 90.0);
}

#[test]
fn test_explicit_type_overrides_extension() {
    let temp_dir = TempDir::new().unwrap();
    let path = write(temp_dir.path(), "renamed.txt", &jr6_file());
    let data = load_file(&path, Some(FileType::Jr6), &LoadOptions::new()).unwrap();
    assert_eq!(data.treatment_steps.len(), 2);
    assert!(data.messages.is_empty(), "{:?}", data.messages);
}
