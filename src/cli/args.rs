//! Command-line argument definitions for the palaeomagnetic file loader
//!
//! This module defines the CLI interface using the clap derive API. Loader
//! settings shared by every loading command live in [`LoaderArgs`] and are
//! converted into a [`LoaderConfig`].

use crate::app::models::{MeasurementType, TreatmentType};
use crate::app::services::file_loaders::{FileType, Protocol};
use crate::app::services::orientation::OrientationParameters;
use crate::config::LoaderConfig;
use crate::{Error, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;

/// CLI arguments for the palaeomagnetic file loader
///
/// Reads laboratory measurement files from many magnetometers and programs
/// into a single canonical record type, reporting problems per file.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "palaeomag-ingest",
    version,
    about = "Load palaeomagnetic measurement files and convert them to PuffinPlot format",
    long_about = "Reads 2G, PuffinPlot, ZPlot, PMD, IAPD, JR6, UC Davis, Caltech and AGICO AMS \
                  files, or any tabular file described by a custom format definition. \
                  Orientation conventions are normalized and every problem found in the input \
                  is reported as a diagnostic instead of aborting the run."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Load files and print a summary with diagnostics
    Load(LoadArgs),
    /// Load files and write the result as a PuffinPlot (.ppl) file
    Convert(ConvertArgs),
    /// List supported file formats and their options
    Formats,
}

/// Arguments for the load command
#[derive(Debug, Clone, Parser)]
pub struct LoadArgs {
    /// Files, directories or glob patterns to load
    #[arg(value_name = "PATHS", required = true)]
    pub paths: Vec<String>,

    #[command(flatten)]
    pub loader: LoaderArgs,

    #[command(flatten)]
    pub logging: LoggingArgs,
}

/// Arguments for the convert command
#[derive(Debug, Clone, Parser)]
pub struct ConvertArgs {
    /// Files, directories or glob patterns to load
    #[arg(value_name = "PATHS", required = true)]
    pub paths: Vec<String>,

    /// PuffinPlot file to write
    #[arg(short = 'o', long = "output", value_name = "FILE", help = "PuffinPlot file to write")]
    pub output: PathBuf,

    #[command(flatten)]
    pub loader: LoaderArgs,

    #[command(flatten)]
    pub logging: LoggingArgs,
}

/// Loader settings shared by the loading commands
#[derive(Debug, Clone, Default, clap::Args)]
pub struct LoaderArgs {
    /// File type for every input
    ///
    /// If not specified, the type is guessed from each file's extension.
    /// Run the `formats` command for the list of names.
    #[arg(short = 't', long = "type", value_name = "TYPE", help = "File type for every input")]
    pub file_type: Option<FileType>,

    /// 2G measurement protocol
    #[arg(
        long = "protocol",
        value_name = "PROTOCOL",
        help = "2G measurement protocol (NORMAL, TRAY_NORMAL, NORMAL_TRAY, ...)"
    )]
    pub protocol: Option<Protocol>,

    /// 2G sensor lengths in cm
    ///
    /// Needed to deconvolve continuous 2G measurements. Specify as x,y,z.
    #[arg(long = "sensor-lengths", value_name = "X,Y,Z", help = "2G sensor lengths in cm")]
    pub sensor_lengths: Option<SensorLengths>,

    /// Read 2G moments from declination, inclination and intensity
    #[arg(long = "polar-moment", help = "Read 2G moments from the polar columns")]
    pub polar_moment: bool,

    /// Treatment type for formats that don't record one
    #[arg(long = "treatment", value_name = "TYPE", help = "Treatment type (DEGAUSS_XYZ, THERMAL, ...)")]
    pub treatment: Option<TreatmentType>,

    /// Measurement type for formats that don't record one
    #[arg(long = "measurement", value_name = "TYPE", help = "Measurement type (DISCRETE or CONTINUOUS)")]
    pub measurement: Option<MeasurementType>,

    /// Orientation parameters of the input files
    #[arg(
        long = "orientation",
        value_name = "P1,P2,P3,P4",
        help = "Orientation parameters, e.g. 12,90,12,0"
    )]
    pub orientation: Option<OrientationParameters>,

    /// Custom tabular format definition
    ///
    /// A file of `fileformat.*=value` lines describing the column layout.
    /// Implies `--type custom-tabular`.
    #[arg(long = "format", value_name = "FILE", help = "Custom tabular format definition file")]
    pub format: Option<PathBuf>,
}

/// Logging verbosity flags
#[derive(Debug, Clone, Default, clap::Args)]
pub struct LoggingArgs {
    /// Show per-file parsing details
    #[arg(short = 'v', long = "verbose", help = "Show per-file parsing details")]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(short = 'q', long = "quiet", help = "Only show warnings and errors", conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Wrapper for parsing comma-separated sensor lengths
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorLengths(pub [f64; 3]);

impl FromStr for SensorLengths {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let values: Vec<f64> = s
            .split(',')
            .map(|part| {
                part.trim().parse::<f64>().map_err(|_| {
                    Error::configuration(format!("Invalid sensor length '{}'", part.trim()))
                })
            })
            .collect::<Result<_>>()?;

        match values.as_slice() {
            [x, y, z] => Ok(SensorLengths([*x, *y, *z])),
            _ => Err(Error::configuration(format!(
                "Sensor lengths must be three values x,y,z, got '{}'",
                s
            ))),
        }
    }
}

impl LoaderArgs {
    /// Build the loader configuration these flags describe
    pub fn to_config(&self) -> LoaderConfig {
        LoaderConfig {
            file_type: self.file_type,
            protocol: self.protocol,
            sensor_lengths: self.sensor_lengths.map(|l| l.0),
            use_polar_moment: self.polar_moment,
            treatment_type: self.treatment,
            measurement_type: self.measurement,
            orientation: self.orientation.map(|o| o.to_string()),
            format_path: self.format.clone(),
        }
    }
}

impl LoggingArgs {
    /// Determine the log level from the verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "warn"
        } else if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_command_parsing() {
        let args = Args::try_parse_from([
            "palaeomag-ingest",
            "load",
            "data/*.dat",
            "extra.ppl",
            "--type",
            "two-gee",
            "--protocol",
            "TRAY_NORMAL",
            "--sensor-lengths",
            "4.09, 4.16, 6.67",
            "--polar-moment",
            "--orientation",
            "12,0,12,90",
            "-v",
        ])
        .unwrap();

        let Some(Commands::Load(load)) = args.command else {
            panic!("expected load command");
        };
        assert_eq!(load.paths, vec!["data/*.dat", "extra.ppl"]);
        assert_eq!(load.loader.file_type, Some(FileType::TwoGee));
        assert_eq!(load.loader.protocol, Some(Protocol::TrayNormal));
        assert_eq!(load.loader.sensor_lengths, Some(SensorLengths([4.09, 4.16, 6.67])));
        assert!(load.loader.polar_moment);
        assert_eq!(load.logging.get_log_level(), "debug");

        let config = load.loader.to_config();
        assert_eq!(config.orientation.as_deref(), Some("12,0,12,90"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_convert_requires_output() {
        assert!(Args::try_parse_from(["palaeomag-ingest", "convert", "a.jr6"]).is_err());
        let args =
            Args::try_parse_from(["palaeomag-ingest", "convert", "a.jr6", "-o", "out.ppl", "-q"])
                .unwrap();
        let Some(Commands::Convert(convert)) = args.command else {
            panic!("expected convert command");
        };
        assert_eq!(convert.output, PathBuf::from("out.ppl"));
        assert_eq!(convert.logging.get_log_level(), "warn");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(Args::try_parse_from(["palaeomag-ingest", "load", "x", "--type", "spinner"]).is_err());
        assert!(
            Args::try_parse_from(["palaeomag-ingest", "load", "x", "--orientation", "1,2,3,4"])
                .is_err()
        );
        assert!(Args::try_parse_from(["palaeomag-ingest", "load", "x", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_sensor_lengths_parsing() {
        assert_eq!("1,2,3".parse::<SensorLengths>().unwrap(), SensorLengths([1.0, 2.0, 3.0]));
        assert!("1,2".parse::<SensorLengths>().is_err());
        assert!("1,two,3".parse::<SensorLengths>().is_err());
    }

    #[test]
    fn test_default_log_level() {
        assert_eq!(LoggingArgs::default().get_log_level(), "info");
    }
}
