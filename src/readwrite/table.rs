use derive_more::Deref;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::core::LeafDeme;

/// Demes and their effective sizes, one `name;initial_size` record per line.
#[derive(Debug, Clone, PartialEq, Deref)]
pub struct DemeTable(Vec<LeafDeme>);

#[derive(Debug)]
pub enum TableError {
    IoError(std::io::Error),
    CsvError(csv::Error),
}

impl std::error::Error for TableError {}

impl std::fmt::Display for TableError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TableError::IoError(error) => write!(formatter, "IO error: {}", error),
            TableError::CsvError(error) => write!(formatter, "CSV error: {}", error),
        }
    }
}

impl DemeTable {
    pub fn read(path: &Path) -> Result<Self, TableError> {
        let mut reader = BufReader::new(File::open(path).map_err(TableError::IoError)?);
        Self::from_reader(&mut reader)
    }

    pub fn from_reader(reader: &mut dyn std::io::Read) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .trim(csv::Trim::All)
            .from_reader(reader);

        let table: Vec<LeafDeme> = reader
            .deserialize()
            .collect::<Result<Vec<LeafDeme>, csv::Error>>()
            .map_err(TableError::CsvError)?;

        Ok(Self(table))
    }

    pub fn into_leaves(self) -> Vec<LeafDeme> {
        self.0
    }
}
