//! Formats command implementation
//!
//! Lists every supported file type with the options its loader reads.

use crate::app::services::file_loaders::{FileType, OptionDefinition};
use colored::*;

/// Describe one option as `identifier (kind, default value)`
pub fn describe_option(definition: &OptionDefinition) -> String {
    let qualifier = match (&definition.default, definition.required) {
        (_, true) => "required".to_string(),
        (Some(default), false) => format!("default {}", default),
        (None, false) => "no default".to_string(),
    };
    format!(
        "{} ({}, {}): {}",
        definition.identifier, definition.kind, qualifier, definition.description
    )
}

/// Run the formats command
pub fn run_formats() {
    println!("{}", "Supported file formats:".bright_green().bold());
    for file_type in FileType::ALL {
        println!(
            "\n  {}  {}",
            file_type.name().bright_yellow().bold(),
            file_type.description()
        );
        for definition in file_type.loader().option_definitions() {
            println!("      {} {}", "option".bright_cyan(), describe_option(&definition));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_required_option() {
        let definitions = FileType::CustomTabular.loader().option_definitions();
        assert_eq!(definitions.len(), 1);
        let text = describe_option(&definitions[0]);
        assert!(text.starts_with("format (file format, required)"));
    }

    #[test]
    fn test_describe_defaulted_option() {
        let definitions = FileType::Ams.loader().option_definitions();
        assert_eq!(
            describe_option(&definitions[0]),
            "orientation (orientation parameters, default 12,0,12,90): Orientation parameters used in the file"
        );
    }
}
