use serde::Serialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::ExportError;
use crate::core::DemographySink;

#[derive(Serialize)]
struct SplitRecord<'a> {
    time: f64,
    ancestral: &'a str,
    derived: String,
}

/// Writes the split events of a model as `time;ancestral;derived` records, with the derived deme
/// names joined by `,`.
pub struct SplitScheduleWriter<W: Write> {
    writer: csv::Writer<W>,
    names: HashSet<String>,
}

impl SplitScheduleWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> Result<Self, ExportError> {
        let file = File::create(path).map_err(ExportError::IoError)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> SplitScheduleWriter<W> {
    pub fn new(writer: W) -> Result<Self, ExportError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b';')
            .has_headers(false)
            .from_writer(writer);
        writer
            .write_record(["time", "ancestral", "derived"])
            .map_err(ExportError::CsvError)?;
        Ok(Self {
            writer,
            names: HashSet::new(),
        })
    }

    /// Flush and return the underlying writer.
    pub fn finish(self) -> Result<W, ExportError> {
        self.writer
            .into_inner()
            .map_err(|error| {
                let error = error.error();
                ExportError::IoError(std::io::Error::new(error.kind(), error.to_string()))
            })
    }
}

impl<W: Write> DemographySink for SplitScheduleWriter<W> {
    type Error = ExportError;

    fn add_population(&mut self, name: &str, _initial_size: f64) -> Result<(), ExportError> {
        self.names.insert(name.to_string());
        Ok(())
    }

    fn add_population_split(
        &mut self,
        time: f64,
        derived: &[&str],
        ancestral: &str,
    ) -> Result<(), ExportError> {
        if let Some(name) = std::iter::once(&ancestral)
            .chain(derived)
            .find(|name| !self.names.contains(**name))
        {
            return Err(ExportError::UnknownDeme(name.to_string()));
        }

        self.writer
            .serialize(SplitRecord {
                time,
                ancestral,
                derived: derived.join(","),
            })
            .map_err(ExportError::CsvError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::Planner;

    #[test]
    fn write_schedule() {
        let model = Planner::new(2).plan_uniform(3, 2., 10.).unwrap();
        let mut writer = SplitScheduleWriter::new(Vec::new()).unwrap();
        model.apply(&mut writer).unwrap();
        let buffer = writer.finish().unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            "time;ancestral;derived\n11.0;anc_0_0;p0,p1\n12.0;ancestral;anc_0_0,p2\n"
        );
    }

    #[test]
    fn unknown_deme() {
        let mut writer = SplitScheduleWriter::new(Vec::new()).unwrap();
        writer.add_population("a", 1.).unwrap();
        assert!(matches!(
            writer.add_population_split(1., &["a"], "b"),
            Err(ExportError::UnknownDeme(_))
        ));
        writer.add_population("b", 1.).unwrap();
        assert!(matches!(
            writer.add_population_split(1., &["c"], "b"),
            Err(ExportError::UnknownDeme(_))
        ));
    }
}
