//! Loader for PMD fixed-width files
//!
//! PMD files hold one specimen each. Line 1 is a free comment, line 2 gives
//! the specimen name, orientation and volume, and line 3 is one of a few
//! known column-heading lines. Each data line holds a treatment code, the
//! specimen-frame moment in A·m², the magnetization, and the geographic and
//! tectonic directions the exporting program calculated. Those directions
//! are recomputed here and any disagreement is reported.

use super::encoding::{TextEncoding, decode, split_lines};
use super::options::LoadOptions;
use super::{FileLoader, LineErrors, LoadedData};
use crate::Result;
use crate::app::models::{MeasurementType, TreatmentStep, TreatmentType, Vec3};
use crate::constants::{PMD_ANGLE_TOLERANCE, PMD_JR6_COMMENT, PMD_MAGNITUDE_TOLERANCE, line_error_limits};
use chrono::NaiveDateTime;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static HEADER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let number = r"([0-9 -][0-9 -][0-9 ][.][0-9])   ";
    let pattern = format!(
        r"^(.........) [aα]={number}[bß]={number}s={number}d={number}v=(.......)m3(   ?(\d\d)[-/](\d\d)[-/](\d\d\d\d) (\d\d):(\d\d))?$"
    );
    Regex::new(&pattern).expect("valid PMD header pattern")
});

static DATA_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    let moment = r"([- +]\d[.]\d\dE[-+]\d\d)";
    let positive = r"([ 0-9][ 0-9][ 0-9][.][0-9])";
    let signed = r"([-0-9 ][-0-9 ][-0-9 ][.][0-9])";
    let pattern = format!(
        r"^(....) {moment} {moment} {moment} {moment} {positive} {signed} {positive} {signed} ([ 0-9]\d[.]\d) (.*)$"
    );
    Regex::new(&pattern).expect("valid PMD data pattern")
});

static LETTER_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([HMT])(\d\d\d)$").expect("valid treatment pattern"));
static MILLITESLA_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,3})(?:M|MT|mT)$").expect("valid treatment pattern"));
static DEGREE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,3})[°░C]$").expect("valid treatment pattern"));

/// Known third lines (column headings)
const VALID_COLUMN_HEADINGS: [&str; 6] = [
    " PAL  Xc (Am2)  Yc (Am2)  Zc (Am2)  MAG(A/m)   Dg    Ig    Ds    Is   a95 ",
    "STEP  Xc [Am2]  Yc [Am2]  Zc [Am2]  MAG[A/m]   Dg    Ig    Ds    Is  a95 ",
    "STEP  Xc [Am2]  Yc [Am2]  Zc [Am2]  MAG[A/m]   Dg    Ig    Ds    Is   a95",
    "STEP  Xc (Am2)  Yc (Am2)  Zc (Am2)  MAG(A/m)   GDEC  GINC  SDEC  SINC a95 ",
    "STEP  Xc [Am²]  Yc [Am²]  Zc [Am²]  MAG[A/m]   Dg    Ig    Ds    Is  a95 ",
    "STEP  Xc (Am2)  Yc (Am2)  Zc (Am2)  MAG(A/m)   Dg    Ig    Ds    Is   a95 ",
];

/// End-of-file marker written by DOS programs
const DOS_EOF: &str = "\u{1a}";

/// Specimen header (line 2)
#[derive(Debug, Clone, PartialEq)]
pub struct PmdHeader {
    pub name: String,
    /// Azimuth of the specimen x axis
    pub sample_azimuth: f64,
    /// Hade of the specimen x axis
    pub sample_hade: f64,
    pub formation_strike: f64,
    pub formation_dip: f64,
    /// Specimen volume in m³
    pub volume: f64,
    /// Measurement time as `YYYY-MM-DD HH:MM`
    pub timestamp: Option<String>,
}

impl PmdHeader {
    pub fn parse(line: &str) -> Option<Self> {
        let caps = HEADER_PATTERN.captures(line)?;
        let number = |i: usize| caps[i].trim().parse::<f64>().ok();
        let timestamp = match (caps.get(8), caps.get(9), caps.get(10), caps.get(11), caps.get(12)) {
            (Some(month), Some(day), Some(year), Some(hour), Some(minute)) => {
                let text = format!(
                    "{}-{}-{} {}:{}",
                    month.as_str(),
                    day.as_str(),
                    year.as_str(),
                    hour.as_str(),
                    minute.as_str()
                );
                match NaiveDateTime::parse_from_str(&text, "%m-%d-%Y %H:%M") {
                    Ok(time) => Some(time.format("%Y-%m-%d %H:%M").to_string()),
                    Err(e) => {
                        debug!("Ignoring invalid PMD timestamp {}: {}", text, e);
                        None
                    }
                }
            }
            _ => None,
        };
        Some(Self {
            name: caps[1].trim().to_string(),
            sample_azimuth: number(2)?,
            sample_hade: number(3)?,
            formation_strike: number(4)?,
            formation_dip: number(5)?,
            volume: number(6)?,
            timestamp,
        })
    }
}

/// One parsed data line
#[derive(Debug, Clone, PartialEq)]
pub struct PmdDataLine {
    pub treatment_type: TreatmentType,
    /// Temperature in °C or AF field in mT
    pub treatment_level: f64,
    /// Specimen-frame moment in A·m²
    pub moment: Vec3,
    /// Magnetization in A/m
    pub magnetization: f64,
    pub geographic_dec: f64,
    pub geographic_inc: f64,
    pub tectonic_dec: f64,
    pub tectonic_inc: f64,
    pub alpha95: f64,
}

impl PmdDataLine {
    pub fn parse(line: &str) -> Option<Self> {
        let caps = DATA_PATTERN.captures(line)?;
        let number = |i: usize| caps[i].trim().parse::<f64>().ok();
        let (treatment_type, treatment_level) = parse_treatment_code(caps[1].trim())?;
        Some(Self {
            treatment_type,
            treatment_level,
            moment: Vec3::new(number(2)?, number(3)?, number(4)?),
            magnetization: number(5)?,
            geographic_dec: number(6)?,
            geographic_inc: number(7)?,
            tectonic_dec: number(8)?,
            tectonic_inc: number(9)?,
            alpha95: number(10)?,
        })
    }
}

/// Decode a treatment code such as `NRM`, `M020`, `T250`, `20mT` or `250°`
pub fn parse_treatment_code(code: &str) -> Option<(TreatmentType, f64)> {
    if code == "NRM" {
        return Some((TreatmentType::None, 0.0));
    }
    if let Some(caps) = LETTER_CODE.captures(code) {
        let level = caps[2].parse().ok()?;
        let treatment_type = match &caps[1] {
            "T" => TreatmentType::Thermal,
            _ => TreatmentType::DegaussXyz,
        };
        return Some((treatment_type, level));
    }
    if let Some(caps) = MILLITESLA_CODE.captures(code) {
        return Some((TreatmentType::DegaussXyz, caps[1].parse().ok()?));
    }
    if let Some(caps) = DEGREE_CODE.captures(code) {
        return Some((TreatmentType::Thermal, caps[1].parse().ok()?));
    }
    None
}

/// Reads PMD files
#[derive(Debug, Default, Clone, Copy)]
pub struct PmdLoader;

impl FileLoader for PmdLoader {
    fn read_bytes(&self, bytes: &[u8], file_name: &str, _options: &LoadOptions) -> Result<LoadedData> {
        Ok(read_text(&decode(bytes, TextEncoding::Cp437), file_name))
    }
}

fn read_text(text: &str, file_name: &str) -> LoadedData {
    let lines = split_lines(text);
    if lines.is_empty() {
        return LoadedData::from_message(format!("{} is empty", file_name));
    }
    let Some(header) = lines.get(1).and_then(|line| PmdHeader::parse(line)) else {
        return LoadedData::from_message("Line 2: unknown format for first header line");
    };
    if !lines.get(2).is_some_and(|line| VALID_COLUMN_HEADINGS.contains(line)) {
        return LoadedData::from_message("Line 3: unknown format for second header line");
    }
    let check_consistency = lines[0] != PMD_JR6_COMMENT;
    debug!("PMD specimen {} in {}: {:?}", header.name, file_name, header);

    let mut data = LoadedData::new();
    let mut errors = LineErrors::new(line_error_limits::PMD);
    for (index, line) in lines.iter().enumerate().skip(3) {
        let line_number = index + 1;
        if *line == DOS_EOF {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        let Some(data_line) = PmdDataLine::parse(line) else {
            errors.add(&mut data, format!("Line {}: malformed data line", line_number));
            if errors.exceeded(&mut data, file_name) {
                break;
            }
            continue;
        };
        let step = make_step(&header, &data_line);
        if check_consistency {
            let location = format!("file {}, line {}", file_name, line_number);
            for message in inconsistencies(&header, &data_line, step.intensity()) {
                data.add_message(format!("Inconsistent data ({}): {}", location, message));
            }
        }
        data.add_step(step);
    }
    data
}

fn make_step(header: &PmdHeader, line: &PmdDataLine) -> TreatmentStep {
    let mut step = TreatmentStep::with_moment(line.moment.divide_by(header.volume));
    step.measurement_type = MeasurementType::Discrete;
    step.discrete_id = header.name.clone();
    step.sample_az = header.sample_azimuth;
    step.sample_dip = 90.0 - header.sample_hade;
    step.formation_az = (header.formation_strike + 90.0) % 360.0;
    step.formation_dip = header.formation_dip;
    step.alpha95 = line.alpha95;
    if let Some(timestamp) = &header.timestamp {
        step.timestamp = timestamp.clone();
    }
    step.treatment_type = line.treatment_type;
    match line.treatment_type {
        TreatmentType::DegaussXyz => step.set_af_all(line.treatment_level / 1000.0),
        TreatmentType::Thermal => step.temperature = line.treatment_level,
        _ => {}
    }
    step
}

/// Differences between the stated and recomputed directions and magnetization
fn inconsistencies(header: &PmdHeader, line: &PmdDataLine, magnetization: f64) -> Vec<String> {
    let geographic = line.moment.correct_sample(
        header.sample_azimuth.to_radians(),
        (90.0 - header.sample_hade).to_radians(),
    );
    let tectonic = geographic.correct_form(
        (header.formation_strike + 90.0).to_radians(),
        header.formation_dip.to_radians(),
    );
    let declination_difference = |a: f64, b: f64| {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    };

    let mut messages = Vec::new();
    let mut check = |calculated: f64, found: f64, difference: f64, tolerance: f64| {
        if difference > tolerance {
            messages.push(format!("calculated {:.4}, found {:.4}", calculated, found));
        }
    };
    let (dec, inc) = (geographic.dec_deg(), geographic.inc_deg());
    check(dec, line.geographic_dec, declination_difference(dec, line.geographic_dec), PMD_ANGLE_TOLERANCE);
    check(inc, line.geographic_inc, (inc - line.geographic_inc).abs(), PMD_ANGLE_TOLERANCE);
    let (dec, inc) = (tectonic.dec_deg(), tectonic.inc_deg());
    check(dec, line.tectonic_dec, declination_difference(dec, line.tectonic_dec), PMD_ANGLE_TOLERANCE);
    check(inc, line.tectonic_inc, (inc - line.tectonic_inc).abs(), PMD_ANGLE_TOLERANCE);
    check(
        magnetization,
        line.magnetization,
        (magnetization - line.magnetization).abs(),
        magnetization.max(line.magnetization) * PMD_MAGNITUDE_TOLERANCE,
    );
    messages
}
