//! The canonical measurement record
//!
//! A [`TreatmentStep`] holds one magnetometer measurement of one sample after
//! one laboratory treatment. Every loader produces these, whatever its input
//! format. Moments are stored in the specimen co-ordinate frame and in SI
//! units (A/m after normalization by volume or area).

use super::{ArmAxis, MeasurementType, TreatmentStepField, TreatmentType, Vec3};
use crate::constants::{DEFAULT_AREA, DEFAULT_VOLUME, UNSET};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One measurement of one sample at one treatment level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreatmentStep {
    /// Sample name; meaningful for discrete measurements
    pub discrete_id: String,

    /// Core depth as written in the source file; meaningful for continuous measurements
    pub depth: Option<String>,

    pub measurement_type: MeasurementType,
    pub treatment_type: TreatmentType,

    /// AF field strengths per axis in tesla
    pub af_x: f64,
    pub af_y: f64,
    pub af_z: f64,

    /// Temperature in °C
    pub temperature: f64,

    /// Magnetic susceptibility
    pub mag_sus: f64,

    /// Sample dip azimuth in degrees
    pub sample_az: f64,
    /// Sample dip in degrees
    pub sample_dip: f64,
    /// Formation dip azimuth in degrees
    pub formation_az: f64,
    /// Formation dip in degrees
    pub formation_dip: f64,
    /// Local geomagnetic declination in degrees
    pub mag_dev: f64,

    /// IRM field in tesla
    pub irm_field: f64,
    /// ARM bias field in tesla
    pub arm_field: f64,
    pub arm_axis: ArmAxis,

    /// Magnetic moment per unit volume in A/m, in specimen co-ordinates
    pub moment: Option<Vec3>,

    pub run_number: i32,
    /// Discrete sample volume in cm³
    pub volume: f64,
    /// Continuous core cross-section in cm²
    pub area: f64,
    pub timestamp: String,
    pub x_drift: f64,
    pub y_drift: f64,
    pub z_drift: f64,
    /// Position on the measurement tray
    pub slot_number: i32,

    /// Confidence or precision value carried through from the input file
    pub alpha95: f64,

    pub selected: bool,
    pub in_pca: bool,
    pub on_circle: bool,
    pub pca_anchored: bool,
    pub hidden: bool,
}

impl Default for TreatmentStep {
    fn default() -> Self {
        Self {
            discrete_id: UNSET.to_string(),
            depth: None,
            measurement_type: MeasurementType::Unset,
            treatment_type: TreatmentType::Unknown,
            af_x: f64::NAN,
            af_y: f64::NAN,
            af_z: f64::NAN,
            temperature: f64::NAN,
            mag_sus: f64::NAN,
            sample_az: f64::NAN,
            sample_dip: f64::NAN,
            formation_az: f64::NAN,
            formation_dip: f64::NAN,
            mag_dev: 0.0,
            irm_field: f64::NAN,
            arm_field: f64::NAN,
            arm_axis: ArmAxis::Unknown,
            moment: None,
            run_number: -1,
            volume: DEFAULT_VOLUME,
            area: DEFAULT_AREA,
            timestamp: UNSET.to_string(),
            x_drift: 0.0,
            y_drift: 0.0,
            z_drift: 0.0,
            slot_number: -1,
            alpha95: f64::NAN,
            selected: false,
            in_pca: false,
            on_circle: false,
            pca_anchored: true,
            hidden: false,
        }
    }
}

impl TreatmentStep {
    /// Create an empty step with all fields at their defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a step holding only a magnetic moment
    pub fn with_moment(moment: Vec3) -> Self {
        Self {
            moment: Some(moment),
            ..Self::default()
        }
    }

    /// Set all three AF fields to the same strength
    pub fn set_af_all(&mut self, tesla: f64) {
        self.af_x = tesla;
        self.af_y = tesla;
        self.af_z = tesla;
    }

    /// The single treatment level: temperature in °C or field in tesla.
    ///
    /// For three-axis AF the first positive axis value is taken; an all-zero
    /// treatment is a genuine zero level.
    pub fn treatment_level(&self) -> f64 {
        match self.treatment_type {
            TreatmentType::None | TreatmentType::Unknown => 0.0,
            TreatmentType::DegaussXyz => [self.af_x, self.af_y, self.af_z]
                .into_iter()
                .find(|v| *v > 0.0)
                .unwrap_or(0.0),
            // ARM levels vary the AF and keep the bias field constant
            TreatmentType::DegaussZ | TreatmentType::Arm => self.af_z,
            TreatmentType::Thermal => self.temperature,
            TreatmentType::Irm => self.irm_field,
        }
    }

    /// Treatment level rounded for display: millitesla for fields, °C for heating
    pub fn formatted_treatment_level(&self) -> String {
        if self.treatment_type.unit() == "T" {
            format!("{:.0}", self.treatment_level() * 1000.0)
        } else {
            format!("{:.0}", self.treatment_level())
        }
    }

    /// Magnitude of the moment, or NaN if there is none
    pub fn intensity(&self) -> f64 {
        self.moment.map_or(f64::NAN, |m| m.mag())
    }

    /// Depth for continuous measurements, sample name otherwise
    pub fn id_or_depth(&self) -> &str {
        if self.measurement_type == MeasurementType::Continuous {
            self.depth.as_deref().unwrap_or("")
        } else {
            &self.discrete_id
        }
    }

    /// Depth as a number, if present and numeric
    pub fn depth_value(&self) -> Option<f64> {
        self.depth.as_deref().and_then(|d| d.trim().parse().ok())
    }

    /// Angle between the sample axis and the vertical
    pub fn sample_hade(&self) -> f64 {
        90.0 - self.sample_dip
    }

    pub fn set_sample_hade(&mut self, hade: f64) {
        self.sample_dip = 90.0 - hade;
    }

    /// Right-hand-rule strike of the formation
    pub fn formation_strike(&self) -> f64 {
        let strike = self.formation_az - 90.0;
        if strike < 0.0 { strike + 360.0 } else { strike }
    }

    pub fn set_formation_strike(&mut self, strike: f64) {
        let az = strike + 90.0;
        self.formation_az = if az > 360.0 { az - 360.0 } else { az };
    }

    pub fn has_mag_sus(&self) -> bool {
        !self.mag_sus.is_nan()
    }

    pub fn has_moment(&self) -> bool {
        self.moment.is_some()
    }

    /// Whether the step carries a susceptibility reading and no moment
    pub fn is_mag_sus_only(&self) -> bool {
        self.moment.is_none_or(|m| m == Vec3::ORIGIN) && self.has_mag_sus()
    }

    /// Steps of type `NONE` (tray and holder readings) are dropped on loading
    pub fn ignore_on_loading(&self) -> bool {
        self.measurement_type == MeasurementType::None
    }

    pub fn has_sample_orientation(&self) -> bool {
        !self.sample_az.is_nan() && !self.sample_dip.is_nan()
    }

    pub fn has_formation_orientation(&self) -> bool {
        !self.formation_az.is_nan() && !self.formation_dip.is_nan()
    }

    /// Moment rotated into geographic co-ordinates
    pub fn sample_corrected_moment(&self) -> Option<Vec3> {
        let moment = self.moment?;
        if !self.has_sample_orientation() {
            return Some(moment);
        }
        Some(moment.correct_sample(
            (self.sample_az + self.mag_dev).to_radians(),
            self.sample_dip.to_radians(),
        ))
    }

    /// Moment rotated into geographic and then tectonic co-ordinates
    pub fn formation_corrected_moment(&self) -> Option<Vec3> {
        let moment = self.sample_corrected_moment()?;
        if !self.has_sample_orientation() || !self.has_formation_orientation() {
            return Some(moment);
        }
        Some(moment.correct_form(
            self.formation_az.to_radians(),
            self.formation_dip.to_radians(),
        ))
    }

    // =========================================================================
    // Generic field access
    // =========================================================================

    /// String form of a field value.
    ///
    /// An absent moment or depth reads as `NA`.
    pub fn value(&self, field: TreatmentStepField) -> String {
        use TreatmentStepField as F;
        let moment_component = |select: fn(&Vec3) -> f64| {
            self.moment
                .as_ref()
                .map_or_else(|| "NA".to_string(), |m| fmt_double(select(m)))
        };
        match field {
            F::DiscreteId => self.discrete_id.clone(),
            F::Depth => self.depth.clone().unwrap_or_else(|| "NA".to_string()),
            F::RunNumber => self.run_number.to_string(),
            F::Timestamp => self.timestamp.clone(),
            F::SlotNumber => self.slot_number.to_string(),
            F::MeasType => self.measurement_type.to_string(),
            F::XMoment => moment_component(|m| m.x),
            F::YMoment => moment_component(|m| m.y),
            F::ZMoment => moment_component(|m| m.z),
            F::MagSus => fmt_double(self.mag_sus),
            F::Volume => fmt_double(self.volume),
            F::Area => fmt_double(self.area),
            F::SampleAz => fmt_double(self.sample_az),
            F::SampleDip => fmt_double(self.sample_dip),
            F::FormAz => fmt_double(self.formation_az),
            F::FormDip => fmt_double(self.formation_dip),
            F::MagDev => fmt_double(self.mag_dev),
            F::Treatment => self.treatment_type.to_string(),
            F::AfX => fmt_double(self.af_x),
            F::AfY => fmt_double(self.af_y),
            F::AfZ => fmt_double(self.af_z),
            F::Temperature => fmt_double(self.temperature),
            F::IrmField => fmt_double(self.irm_field),
            F::ArmField => fmt_double(self.arm_field),
            F::ArmAxis => self.arm_axis.to_string(),
            F::Alpha95 => fmt_double(self.alpha95),
            F::PpSelected => self.selected.to_string(),
            F::PpAnchorPca => self.pca_anchored.to_string(),
            F::PpHidden => self.hidden.to_string(),
            F::PpOnCircle => self.on_circle.to_string(),
            F::PpInPca => self.in_pca.to_string(),
            F::VirtMagnetization => fmt_double(self.intensity()),
            F::VirtDeclination => moment_component(|m| m.dec_deg()),
            F::VirtInclination => moment_component(|m| m.inc_deg()),
            F::VirtSampleHade => fmt_double(self.sample_hade()),
            F::VirtFormStrike => fmt_double(self.formation_strike()),
        }
    }

    /// Values of all persisted fields, in native column order
    pub fn real_values(&self) -> Vec<String> {
        TreatmentStepField::real_fields()
            .map(|field| self.value(field))
            .collect()
    }

    /// Set a field from its string form.
    ///
    /// Numeric values are multiplied by `factor` before storing. A value that
    /// cannot be parsed for the field's kind is an error and leaves the step
    /// unchanged. `NA` in a moment component leaves the moment untouched, and
    /// `NA`, `null` or an empty string clears the depth. The computed
    /// magnetization, declination and inclination fields are not settable
    /// and are ignored.
    pub fn set_value(&mut self, field: TreatmentStepField, value: &str, factor: f64) -> Result<()> {
        use TreatmentStepField as F;
        let trimmed = value.trim();
        let parse_double = || -> Result<f64> {
            trimmed
                .parse::<f64>()
                .map(|v| v * factor)
                .map_err(|_| Error::field_value(field.name(), value))
        };
        let parse_int = || -> Result<i32> {
            trimmed
                .parse::<i32>()
                .map_err(|_| Error::field_value(field.name(), value))
        };
        let parse_bool = || trimmed.eq_ignore_ascii_case("true");

        match field {
            F::XMoment | F::YMoment | F::ZMoment if trimmed.eq_ignore_ascii_case("NA") => {}
            F::XMoment => self.moment = Some(self.moment_or_origin().with_x(parse_double()?)),
            F::YMoment => self.moment = Some(self.moment_or_origin().with_y(parse_double()?)),
            F::ZMoment => self.moment = Some(self.moment_or_origin().with_z(parse_double()?)),
            F::DiscreteId => self.discrete_id = value.to_string(),
            F::Depth => {
                self.depth = match trimmed {
                    "" | "NA" | "null" => None,
                    _ => Some(value.to_string()),
                }
            }
            F::Timestamp => self.timestamp = value.to_string(),
            F::RunNumber => self.run_number = parse_int()?,
            F::SlotNumber => self.slot_number = parse_int()?,
            F::MeasType => self.measurement_type = trimmed.parse()?,
            F::Treatment => self.treatment_type = trimmed.parse()?,
            F::ArmAxis => self.arm_axis = ArmAxis::from_name(trimmed),
            F::MagSus => self.mag_sus = parse_double()?,
            F::Volume => self.volume = parse_double()?,
            F::Area => self.area = parse_double()?,
            F::SampleAz => self.sample_az = parse_double()?,
            F::SampleDip => self.sample_dip = parse_double()?,
            F::FormAz => self.formation_az = parse_double()?,
            F::FormDip => self.formation_dip = parse_double()?,
            F::MagDev => self.mag_dev = parse_double()?,
            F::AfX => self.af_x = parse_double()?,
            F::AfY => self.af_y = parse_double()?,
            F::AfZ => self.af_z = parse_double()?,
            F::Temperature => self.temperature = parse_double()?,
            F::IrmField => self.irm_field = parse_double()?,
            F::ArmField => self.arm_field = parse_double()?,
            F::Alpha95 => self.alpha95 = parse_double()?,
            F::PpSelected => self.selected = parse_bool(),
            F::PpAnchorPca => self.pca_anchored = parse_bool(),
            F::PpHidden => self.hidden = parse_bool(),
            F::PpOnCircle => self.on_circle = parse_bool(),
            F::PpInPca => self.in_pca = parse_bool(),
            F::VirtSampleHade => self.set_sample_hade(parse_double()?),
            F::VirtFormStrike => self.set_formation_strike(parse_double()?),
            F::VirtMagnetization | F::VirtDeclination | F::VirtInclination => {}
        }
        Ok(())
    }

    /// Like [`set_value`](Self::set_value), but substitutes the field's
    /// default value when the supplied one cannot be parsed.
    pub fn set_value_or_default(&mut self, field: TreatmentStepField, value: &str, factor: f64) {
        if let Err(e) = self.set_value(field, value, factor) {
            warn!("{}; using default '{}'", e, field.default_value());
            // Defaults are already in canonical units
            if let Err(e) = self.set_value(field, field.default_value(), 1.0) {
                warn!("Default for {} not applicable: {}", field, e);
            }
        }
    }

    /// Build a step from parallel lists of fields and values
    pub fn from_values(fields: &[TreatmentStepField], values: &[&str]) -> Result<Self> {
        let mut step = Self::new();
        for (field, value) in fields.iter().zip(values) {
            step.set_value(*field, value, 1.0)?;
        }
        Ok(step)
    }

    fn moment_or_origin(&self) -> Vec3 {
        self.moment.unwrap_or(Vec3::ORIGIN)
    }
}

/// Format a double so that parsing it back yields the same value
fn fmt_double(value: f64) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_af_step(x: f64, y: f64, z: f64) -> TreatmentStep {
        TreatmentStep {
            treatment_type: TreatmentType::DegaussXyz,
            af_x: x,
            af_y: y,
            af_z: z,
            ..TreatmentStep::default()
        }
    }

    #[test]
    fn test_defaults() {
        let step = TreatmentStep::new();
        assert_eq!(step.discrete_id, "UNSET");
        assert_eq!(step.measurement_type, MeasurementType::Unset);
        assert_eq!(step.treatment_type, TreatmentType::Unknown);
        assert!(step.af_x.is_nan());
        assert_eq!(step.volume, 10.8);
        assert_eq!(step.area, 4.0);
        assert_eq!(step.run_number, -1);
        assert!(step.pca_anchored);
        assert!(!step.has_moment());
    }

    #[test]
    fn test_treatment_level_three_axis() {
        assert_eq!(create_af_step(0.0, 0.02, 0.03).treatment_level(), 0.02);
        assert_eq!(create_af_step(f64::NAN, f64::NAN, 0.05).treatment_level(), 0.05);
        assert_eq!(create_af_step(0.0, 0.0, 0.0).treatment_level(), 0.0);
    }

    #[test]
    fn test_treatment_level_other_types() {
        let mut step = TreatmentStep {
            treatment_type: TreatmentType::Thermal,
            temperature: 350.0,
            ..TreatmentStep::default()
        };
        assert_eq!(step.treatment_level(), 350.0);
        assert_eq!(step.formatted_treatment_level(), "350");
        step.treatment_type = TreatmentType::Arm;
        step.af_z = 0.08;
        assert_eq!(step.treatment_level(), 0.08);
        assert_eq!(step.formatted_treatment_level(), "80");
        step.treatment_type = TreatmentType::None;
        assert_eq!(step.treatment_level(), 0.0);
    }

    #[test]
    fn test_hade_and_strike() {
        let mut step = TreatmentStep::new();
        step.set_sample_hade(30.0);
        assert_eq!(step.sample_dip, 60.0);
        assert_eq!(step.sample_hade(), 30.0);
        step.formation_az = 45.0;
        assert_eq!(step.formation_strike(), 315.0);
        step.set_formation_strike(300.0);
        assert_eq!(step.formation_az, 30.0);
    }

    #[test]
    fn test_id_or_depth() {
        let mut step = TreatmentStep {
            discrete_id: "CK-3".to_string(),
            depth: Some("1.25".to_string()),
            measurement_type: MeasurementType::Discrete,
            ..TreatmentStep::default()
        };
        assert_eq!(step.id_or_depth(), "CK-3");
        step.measurement_type = MeasurementType::Continuous;
        assert_eq!(step.id_or_depth(), "1.25");
        assert_eq!(step.depth_value(), Some(1.25));
    }

    #[test]
    fn test_mag_sus_only() {
        let mut step = TreatmentStep::new();
        assert!(!step.is_mag_sus_only());
        step.mag_sus = 1e-4;
        assert!(step.is_mag_sus_only());
        step.moment = Some(Vec3::new(1.0, 0.0, 0.0));
        assert!(!step.is_mag_sus_only());
    }

    #[test]
    fn test_set_value_with_factor() {
        let mut step = TreatmentStep::new();
        step.set_value(TreatmentStepField::AfX, " 20 ", 0.001).unwrap();
        step.set_value(TreatmentStepField::YMoment, "2.5", 1.0).unwrap();
        step.set_value(TreatmentStepField::Treatment, "THERMAL", 1.0).unwrap();
        step.set_value(TreatmentStepField::PpHidden, "TRUE", 1.0).unwrap();
        step.set_value(TreatmentStepField::RunNumber, "17", 1.0).unwrap();
        assert_eq!(step.af_x, 0.02);
        assert_eq!(step.moment, Some(Vec3::new(0.0, 2.5, 0.0)));
        assert_eq!(step.treatment_type, TreatmentType::Thermal);
        assert!(step.hidden);
        assert_eq!(step.run_number, 17);
    }

    #[test]
    fn test_set_value_rejects_bad_values() {
        let mut step = TreatmentStep::new();
        assert!(step.set_value(TreatmentStepField::AfX, "wibble", 1.0).is_err());
        assert!(step.af_x.is_nan());
        assert!(step.set_value(TreatmentStepField::Treatment, "BAKED", 1.0).is_err());
        assert!(step.set_value(TreatmentStepField::SlotNumber, "1.5", 1.0).is_err());
    }

    #[test]
    fn test_set_value_or_default_falls_back() {
        let mut step = TreatmentStep::new();
        step.set_value_or_default(TreatmentStepField::Temperature, "hot", 1.0);
        assert_eq!(step.temperature, 0.0);
        step.set_value_or_default(TreatmentStepField::MeasType, "core", 1.0);
        assert_eq!(step.measurement_type, MeasurementType::Continuous);
    }

    #[test]
    fn test_absent_values_read_as_na() {
        let mut step = TreatmentStep::new();
        assert_eq!(step.value(TreatmentStepField::XMoment), "NA");
        assert_eq!(step.value(TreatmentStepField::Depth), "NA");
        step.set_value(TreatmentStepField::ZMoment, "NA", 1.0).unwrap();
        assert!(step.moment.is_none());
        step.set_value(TreatmentStepField::Depth, "null", 1.0).unwrap();
        assert!(step.depth.is_none());
    }

    #[test]
    fn test_value_round_trip_through_set_value() {
        let original = TreatmentStep {
            discrete_id: "S1".to_string(),
            measurement_type: MeasurementType::Discrete,
            treatment_type: TreatmentType::Irm,
            irm_field: 0.3,
            moment: Some(Vec3::new(1.5e-5, -2.25e-7, 3.0)),
            sample_az: 123.4,
            alpha95: 2.5,
            ..TreatmentStep::default()
        };
        let mut copy = TreatmentStep::new();
        for field in TreatmentStepField::real_fields() {
            copy.set_value(field, &original.value(field), 1.0).unwrap();
        }
        assert_eq!(copy.discrete_id, original.discrete_id);
        assert_eq!(copy.moment, original.moment);
        assert_eq!(copy.irm_field, original.irm_field);
        assert_eq!(copy.sample_az, original.sample_az);
        assert_eq!(copy.alpha95, original.alpha95);
        assert!(copy.af_x.is_nan());
    }

    #[test]
    fn test_corrected_moments() {
        let step = TreatmentStep {
            moment: Some(Vec3::new(0.0, 0.0, 1.0)),
            sample_az: 0.0,
            sample_dip: 0.0,
            formation_az: 0.0,
            formation_dip: 0.0,
            ..TreatmentStep::default()
        };
        let geographic = step.sample_corrected_moment().unwrap();
        assert!(geographic.approx_eq(&Vec3::new(1.0, 0.0, 0.0), 1e-12));
        let tectonic = step.formation_corrected_moment().unwrap();
        assert!(tectonic.approx_eq(&geographic, 1e-12));
    }
}
