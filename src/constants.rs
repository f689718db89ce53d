//! Application constants for palaeomagnetic file ingestion
//!
//! This module contains unit conversion factors, default values, option
//! identifiers and per-format limits used throughout the loaders.

// =============================================================================
// Units and Defaults
// =============================================================================

/// Multiplier from a cgs magnetization in gauss (emu/cm³) to A/m
pub const GAUSS_TO_AM: f64 = 1000.0;

/// Divisor from a field strength in oersted to tesla
pub const OERSTED_PER_TESLA: f64 = 10_000.0;

/// Default discrete sample volume in cm³ (overridden by a Volume column)
pub const DEFAULT_VOLUME: f64 = 10.8;

/// Default continuous core cross-sectional area in cm² (overridden by an Area column)
pub const DEFAULT_AREA: f64 = 4.0;

/// Placeholder for unset string identifiers
pub const UNSET: &str = "UNSET";

// =============================================================================
// Load Option Identifiers
// =============================================================================

/// Keys of the open load-options map
pub mod option_keys {
    /// 2G measurement protocol (tray/normal/y-flip sequences)
    pub const PROTOCOL: &str = "protocol";

    /// 2G sensor lengths as an x,y,z vector
    pub const SENSOR_LENGTHS: &str = "sensor_lengths";

    /// Read 2G moments from the polar columns instead of x/y/z
    pub const USE_POLAR_MOMENT: &str = "use_polar_moment";

    /// Treatment type for formats that don't record it
    pub const TREATMENT_TYPE: &str = "treatment_type";

    /// Measurement type for formats that don't record it
    pub const MEASUREMENT_TYPE: &str = "measurement_type";

    /// Orientation parameters P1,P2,P3,P4
    pub const ORIENTATION: &str = "orientation";

    /// Custom tabular file format definition
    pub const FORMAT: &str = "format";
}

// =============================================================================
// Per-format Limits
// =============================================================================

/// Diagnostic ceilings: a file is abandoned once this many line errors accrue
pub mod line_error_limits {
    pub const TWOGEE: usize = 10;
    pub const PPL: usize = 10;
    pub const ZPLOT: usize = 5;
    pub const PMD: usize = 5;
    pub const JR6: usize = 5;
    pub const UC_DAVIS: usize = 3;
    pub const CALTECH: usize = 3;
}

// =============================================================================
// Format Markers
// =============================================================================

/// First-line prefix of the native PuffinPlot format
pub const PPL_HEADER_PREFIX: &str = "PuffinPlot file. Version";

/// Version written by the Ppl writer
pub const PPL_WRITE_VERSION: u32 = 3;

/// First-line prefix of a ZPlot file
pub const ZPLOT_MAGIC: &str = "File Name:";

/// PMD comment line marking a JR6-derived file (consistency check is skipped)
pub const PMD_JR6_COMMENT: &str = "JR6 file";

/// PMD consistency-check tolerance for declinations and inclinations (degrees)
pub const PMD_ANGLE_TOLERANCE: f64 = 0.3;

/// PMD consistency-check tolerance for magnetization (fraction of larger value)
pub const PMD_MAGNITUDE_TOLERANCE: f64 = 0.01;

/// IAPD α95 value (degrees) at and above which a warning is issued
pub const IAPD_HIGH_ALPHA95: f64 = 5.0;

// =============================================================================
// CLI
// =============================================================================

/// Number of input files from which the CLI shows a progress bar
pub const PROGRESS_BAR_THRESHOLD: usize = 10;
