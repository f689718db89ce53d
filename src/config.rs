//! Configuration management and validation.
//!
//! Provides the settings a user can supply for a load run (file type,
//! 2G instrument settings, default treatment and measurement types,
//! orientation convention, custom tabular format) and turns them into the
//! open [`LoadOptions`] map consumed by the loaders.

use crate::app::models::{MeasurementType, TreatmentType, Vec3};
use crate::app::services::file_loaders::{FileType, LoadOptions, OptionValue, Protocol};
use crate::app::services::orientation::OrientationParameters;
use crate::app::services::tabular::FileFormat;
use crate::constants::option_keys;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Global configuration for a load run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// File type to use for every input; guessed per file when absent
    pub file_type: Option<FileType>,

    /// 2G measurement protocol
    pub protocol: Option<Protocol>,

    /// 2G sensor lengths in cm as `[x, y, z]`
    pub sensor_lengths: Option<[f64; 3]>,

    /// Read 2G moments from the polar columns
    pub use_polar_moment: bool,

    /// Treatment type for formats that don't record one
    pub treatment_type: Option<TreatmentType>,

    /// Measurement type for formats that don't record one
    pub measurement_type: Option<MeasurementType>,

    /// Orientation parameters as `P1,P2,P3,P4`
    pub orientation: Option<String>,

    /// Path of a `key=value` custom tabular format definition
    pub format_path: Option<PathBuf>,
}

impl LoaderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force a file type instead of guessing from extensions
    pub fn with_file_type(mut self, file_type: FileType) -> Self {
        self.file_type = Some(file_type);
        self
    }

    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = Some(protocol);
        self
    }

    pub fn with_sensor_lengths(mut self, lengths: [f64; 3]) -> Self {
        self.sensor_lengths = Some(lengths);
        self
    }

    /// Read 2G moments from declination, inclination and intensity
    pub fn with_polar_moment(mut self) -> Self {
        self.use_polar_moment = true;
        self
    }

    pub fn with_treatment_type(mut self, treatment_type: TreatmentType) -> Self {
        self.treatment_type = Some(treatment_type);
        self
    }

    pub fn with_measurement_type(mut self, measurement_type: MeasurementType) -> Self {
        self.measurement_type = Some(measurement_type);
        self
    }

    pub fn with_orientation(mut self, orientation: impl Into<String>) -> Self {
        self.orientation = Some(orientation.into());
        self
    }

    /// Use a custom tabular format definition; implies the custom tabular file type
    pub fn with_format_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.format_path = Some(path.into());
        self
    }

    /// The file type to load with, if one is fixed
    pub fn effective_file_type(&self) -> Option<FileType> {
        match (self.file_type, &self.format_path) {
            (None, Some(_)) => Some(FileType::CustomTabular),
            (file_type, _) => file_type,
        }
    }

    /// Check the configuration for values no loader could use
    pub fn validate(&self) -> Result<()> {
        if let Some(lengths) = self.sensor_lengths
            && lengths.iter().any(|l| !l.is_finite() || *l <= 0.0)
        {
            return Err(Error::configuration(format!(
                "Sensor lengths must be positive, got {:?}",
                lengths
            )));
        }

        if let Some(orientation) = &self.orientation {
            orientation.parse::<OrientationParameters>()?;
        }

        match (self.effective_file_type(), &self.format_path) {
            (Some(FileType::CustomTabular), None) => Err(Error::configuration(
                "The custom-tabular file type needs a format definition",
            )),
            (Some(file_type), Some(_)) if file_type != FileType::CustomTabular => {
                Err(Error::configuration(format!(
                    "A format definition can't be used with file type {}",
                    file_type
                )))
            }
            _ => Ok(()),
        }
    }

    /// Build the load options map, reading the format definition if one is set
    pub fn to_load_options(&self) -> Result<LoadOptions> {
        self.validate()?;
        let mut options = LoadOptions::new();

        if let Some(protocol) = self.protocol {
            options.insert(option_keys::PROTOCOL, OptionValue::Protocol(protocol));
        }
        if let Some([x, y, z]) = self.sensor_lengths {
            options.insert(option_keys::SENSOR_LENGTHS, OptionValue::Vector(Vec3::new(x, y, z)));
        }
        if self.use_polar_moment {
            options.insert(option_keys::USE_POLAR_MOMENT, OptionValue::Bool(true));
        }
        if let Some(treatment_type) = self.treatment_type {
            options.insert(option_keys::TREATMENT_TYPE, OptionValue::TreatmentType(treatment_type));
        }
        if let Some(measurement_type) = self.measurement_type {
            options.insert(
                option_keys::MEASUREMENT_TYPE,
                OptionValue::MeasurementType(measurement_type),
            );
        }
        if let Some(orientation) = &self.orientation {
            options.insert(
                option_keys::ORIENTATION,
                OptionValue::Orientation(orientation.parse()?),
            );
        }
        if let Some(path) = &self.format_path {
            let text = std::fs::read_to_string(path).map_err(|e| {
                Error::io(format!("Failed to read format definition {}", path.display()), e)
            })?;
            let format = FileFormat::from_prefs_text(&text)?;
            debug!("Custom format from {}: {:?}", path.display(), format);
            options.insert(option_keys::FORMAT, OptionValue::Format(Box::new(format)));
        }

        Ok(options)
    }
}
