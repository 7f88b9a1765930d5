//! Readers for planner inputs and writers for planned models.

mod demes;
mod schedule;
mod table;

pub use demes::{DemesDeme, DemesEpoch, DemesGraph};
pub use schedule::SplitScheduleWriter;
pub use table::{DemeTable, TableError};

#[derive(Debug)]
pub enum ExportError {
    IoError(std::io::Error),
    CsvError(csv::Error),
    YamlError(serde_yaml::Error),
    UnknownDeme(String),
}

impl std::error::Error for ExportError {}

impl std::fmt::Display for ExportError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::IoError(error) => write!(formatter, "IO error: {}", error),
            ExportError::CsvError(error) => write!(formatter, "CSV error: {}", error),
            ExportError::YamlError(error) => write!(formatter, "YAML error: {}", error),
            ExportError::UnknownDeme(name) => write!(formatter, "Unknown deme: {}", name),
        }
    }
}
