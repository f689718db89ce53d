//! Supported input file types

use super::FileLoader;
use super::ams::AmsLoader;
use super::caltech::CaltechLoader;
use super::iapd::IapdLoader;
use super::jr6::Jr6Loader;
use super::pmd::PmdLoader;
use super::ppl::PplLoader;
use super::twogee::TwoGeeLoader;
use super::ucdavis::UcDavisLoader;
use super::zplot::ZplotLoader;
use crate::app::services::tabular::TabularLoader;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// A file format with a dedicated loader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileType {
    TwoGee,
    Zplot,
    Ppl,
    Caltech,
    Iapd,
    Pmd,
    Jr6,
    UcDavis,
    Ams,
    CustomTabular,
}

impl FileType {
    pub const ALL: [FileType; 10] = [
        FileType::TwoGee,
        FileType::Zplot,
        FileType::Ppl,
        FileType::Caltech,
        FileType::Iapd,
        FileType::Pmd,
        FileType::Jr6,
        FileType::UcDavis,
        FileType::Ams,
        FileType::CustomTabular,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FileType::TwoGee => "two-gee",
            FileType::Zplot => "zplot",
            FileType::Ppl => "ppl",
            FileType::Caltech => "caltech",
            FileType::Iapd => "iapd",
            FileType::Pmd => "pmd",
            FileType::Jr6 => "jr6",
            FileType::UcDavis => "uc-davis",
            FileType::Ams => "ams",
            FileType::CustomTabular => "custom-tabular",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            FileType::TwoGee => "2G Enterprises magnetometer ASCII export (.dat)",
            FileType::Zplot => "ZPlot data file (.txt)",
            FileType::Ppl => "PuffinPlot native tab-delimited file (.ppl)",
            FileType::Caltech => "Caltech/CIT sample manifest (.sam)",
            FileType::Iapd => "IAPD single-sample file (.iapd)",
            FileType::Pmd => "PMD fixed-width file (.pmd)",
            FileType::Jr6 => "AGICO JR6 spinner file (.jr6)",
            FileType::UcDavis => "UC Davis long-core file",
            FileType::Ams => "AGICO AMS ASC export (.asc)",
            FileType::CustomTabular => "User-defined tabular format",
        }
    }

    /// Guess a file's type from its extension
    pub fn guess(path: &Path) -> Option<FileType> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "dat" => Some(FileType::TwoGee),
            "txt" => Some(FileType::Zplot),
            "ppl" => Some(FileType::Ppl),
            "sam" => Some(FileType::Caltech),
            "iapd" => Some(FileType::Iapd),
            "pmd" => Some(FileType::Pmd),
            "jr6" => Some(FileType::Jr6),
            "asc" => Some(FileType::Ams),
            _ => None,
        }
    }

    /// The loader that reads this type
    pub fn loader(self) -> Box<dyn FileLoader> {
        match self {
            FileType::TwoGee => Box::new(TwoGeeLoader),
            FileType::Zplot => Box::new(ZplotLoader),
            FileType::Ppl => Box::new(PplLoader),
            FileType::Caltech => Box::new(CaltechLoader),
            FileType::Iapd => Box::new(IapdLoader),
            FileType::Pmd => Box::new(PmdLoader),
            FileType::Jr6 => Box::new(Jr6Loader),
            FileType::UcDavis => Box::new(UcDavisLoader),
            FileType::Ams => Box::new(AmsLoader),
            FileType::CustomTabular => Box::new(TabularLoader),
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FileType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        FileType::ALL
            .into_iter()
            .find(|t| t.name() == normalized)
            .ok_or_else(|| Error::configuration(format!("Unknown file type '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_by_extension() {
        assert_eq!(FileType::guess(Path::new("run/ABC.DAT")), Some(FileType::TwoGee));
        assert_eq!(FileType::guess(Path::new("a.sam")), Some(FileType::Caltech));
        assert_eq!(FileType::guess(Path::new("a.asc")), Some(FileType::Ams));
        assert_eq!(FileType::guess(Path::new("a.jr6")), Some(FileType::Jr6));
        assert_eq!(FileType::guess(Path::new("a.csv")), None);
        assert_eq!(FileType::guess(Path::new("README")), None);
    }

    #[test]
    fn test_names_parse_back() {
        for file_type in FileType::ALL {
            assert_eq!(file_type.name().parse::<FileType>().unwrap(), file_type);
        }
        assert_eq!("UC_DAVIS".parse::<FileType>().unwrap(), FileType::UcDavis);
        assert!("spinner".parse::<FileType>().is_err());
    }
}
