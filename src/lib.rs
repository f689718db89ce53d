//! Palaeomagnetic Ingestion Library
//!
//! A Rust library for reading palaeomagnetic laboratory measurement files from
//! many instruments and programs into one canonical record type.
//!
//! This library provides tools for:
//! - Parsing 2G, PuffinPlot (v2/v3), ZPlot, PMD, IAPD, JR6, UC Davis, Caltech
//!   and AGICO AMS files, plus user-defined tabular formats
//! - Normalizing instrument orientation conventions into a single canonical one
//! - Collecting per-file diagnostics instead of failing on bad input
//! - Writing the native tab-delimited PuffinPlot format for exact round-trips

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod file_loaders;
        pub mod orientation;
        pub mod tabular;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{MeasurementType, TreatmentStep, TreatmentStepField, TreatmentType, Vec3};
pub use app::services::file_loaders::{FileType, LoadOptions, LoadedData, load_file, load_files};
pub use app::services::orientation::{OrientationParameters, VectorAndOrientations};
pub use config::LoaderConfig;

/// Result type alias for the ingestion library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for caller-side failures.
///
/// Malformed input files never produce one of these: loaders report bad data
/// as diagnostics on [`LoadedData`]. An `Error` signals a defect in how the
/// library was called (bad options, impossible parameters) or a failure in
/// the surrounding tooling.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Load option missing or of the wrong kind
    #[error("Invalid option '{option}': {message}")]
    InvalidOption { option: String, message: String },

    /// Orientation parameter outside {3, 6, 9, 12} or {0, 90}
    #[error("Invalid orientation parameter: {value}")]
    OrientationParameter { value: String },

    /// Value cannot be stored in a treatment step field
    #[error("Invalid value '{value}' for field {field}")]
    FieldValue { field: String, value: String },

    /// Unknown field name or column heading
    #[error("Unknown field: {name}")]
    UnknownField { name: String },

    /// Invalid custom file format definition
    #[error("File format error: {message}")]
    FileFormat { message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Directory traversal error
    #[error("Directory traversal error: {message}")]
    DirectoryTraversal {
        message: String,
        #[source]
        source: walkdir::Error,
    },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create an invalid option error
    pub fn invalid_option(option: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOption {
            option: option.into(),
            message: message.into(),
        }
    }

    /// Create an orientation parameter error
    pub fn orientation_parameter(value: impl Into<String>) -> Self {
        Self::OrientationParameter {
            value: value.into(),
        }
    }

    /// Create a field value error
    pub fn field_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::FieldValue {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an unknown field error
    pub fn unknown_field(name: impl Into<String>) -> Self {
        Self::UnknownField { name: name.into() }
    }

    /// Create a file format error
    pub fn file_format(message: impl Into<String>) -> Self {
        Self::FileFormat {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a directory traversal error
    pub fn directory_traversal(message: impl Into<String>, source: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: message.into(),
            source,
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}

impl From<walkdir::Error> for Error {
    fn from(error: walkdir::Error) -> Self {
        Self::DirectoryTraversal {
            message: "Directory traversal failed".to_string(),
            source: error,
        }
    }
}
