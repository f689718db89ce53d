//! Generic tabular import
//!
//! Files with no dedicated loader can still be read if the user describes
//! them: which column holds which [`TreatmentStepField`](crate::TreatmentStepField),
//! how many header lines to skip, how columns are separated, and which units
//! moments and fields are recorded in. A [`FileFormat`] holds that description
//! and is passed to [`TabularLoader`] through the `format` load option.
//!
//! ## Components
//!
//! - [`file_format`] - Format definition, line parsing and persistence as a preferences map
//! - [`loader`] - [`FileLoader`](crate::app::services::file_loaders::FileLoader) for custom formats

pub mod file_format;
pub mod loader;

#[cfg(test)]
mod tests;

pub use file_format::{FieldUnit, FileFormat, MomentUnit};
pub use loader::TabularLoader;
