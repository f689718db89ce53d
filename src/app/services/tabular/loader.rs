//! Loader for files described by a user-supplied [`FileFormat`]

use super::FileFormat;
use crate::app::services::file_loaders::encoding::{TextEncoding, decode, split_lines};
use crate::app::services::file_loaders::{FileLoader, LoadOptions, LoadedData, OptionDefinition, OptionKind};
use crate::constants::option_keys;
use crate::{Error, Result};
use tracing::debug;

fn format_option() -> OptionDefinition {
    OptionDefinition::required(
        option_keys::FORMAT,
        "Column mapping and layout of the file",
        OptionKind::Format,
    )
}

/// Reads custom tabular files; the `format` option is required
#[derive(Debug, Default, Clone, Copy)]
pub struct TabularLoader;

impl FileLoader for TabularLoader {
    fn option_definitions(&self) -> Vec<OptionDefinition> {
        vec![format_option()]
    }

    fn read_bytes(&self, bytes: &[u8], file_name: &str, options: &LoadOptions) -> Result<LoadedData> {
        let value = format_option().value(options)?;
        let format = value
            .as_ref()
            .and_then(|v| v.as_format())
            .ok_or_else(|| Error::invalid_option(option_keys::FORMAT, "no file format supplied"))?;
        read_text(&decode(bytes, TextEncoding::Default), file_name, format)
    }
}

fn read_text(text: &str, file_name: &str, format: &FileFormat) -> Result<LoadedData> {
    let lines = split_lines(text);
    if lines.is_empty() {
        return Ok(LoadedData::from_message(format!("{} is empty", file_name)));
    }
    let mut data = LoadedData::new();
    if !format.specifies_direction() {
        data.add_message(format!(
            "The format for {} specifies no moment direction: moments set to zero",
            file_name
        ));
    } else if !format.specifies_full_vector() {
        data.add_message(format!(
            "The format for {} specifies no intensity: using unit intensity",
            file_name
        ));
    }
    let steps = format.read_lines(&lines)?;
    debug!("Read {} custom tabular lines from {}", steps.len(), file_name);
    steps.into_iter().for_each(|step| data.add_step(step));
    Ok(data)
}
