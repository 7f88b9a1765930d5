//! Export of planned models as demes graphs.
//!
//! The demes format is understood by `msprime.Demography.from_demes`. Every deme has a single
//! constant-size epoch. Going backwards in time, a deme ends when it is created by a merge and
//! starts when it merges into its ancestor. The root starts at infinity.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;

use super::ExportError;
use crate::core::{DemographicModel, DemographySink};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DemesGraph {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub time_units: String,
    pub demes: Vec<DemesDeme>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DemesDeme {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ancestors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
    pub epochs: Vec<DemesEpoch>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DemesEpoch {
    pub start_size: f64,
    pub end_time: f64,
}

impl std::fmt::Display for DemesGraph {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let yaml = serde_yaml::to_string(self).map_err(|_| std::fmt::Error)?;
        write!(formatter, "{}", yaml)
    }
}

impl DemesGraph {
    pub fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
            time_units: "generations".to_string(),
            demes: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Build the graph of `model`, listing every ancestor before its descendants.
    pub fn from_model(model: &DemographicModel, description: &str) -> Result<Self, ExportError> {
        let mut graph = Self::new(description);
        model.apply(&mut graph)?;

        // ancestral demes are created after the demes merging into them
        graph.demes.reverse();
        graph.index = graph
            .demes
            .iter()
            .enumerate()
            .map(|(index, deme)| (deme.name.clone(), index))
            .collect();
        Ok(graph)
    }

    pub fn get(&self, name: &str) -> Option<&DemesDeme> {
        match self.index.get(name) {
            Some(&index) => self.demes.get(index),
            None => self.demes.iter().find(|deme| deme.name == name),
        }
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut DemesDeme, ExportError> {
        let index = *self
            .index
            .get(name)
            .ok_or_else(|| ExportError::UnknownDeme(name.to_string()))?;
        Ok(&mut self.demes[index])
    }

    pub fn write(&self, writer: &mut dyn std::io::Write) -> Result<(), ExportError> {
        serde_yaml::to_writer(writer, self).map_err(ExportError::YamlError)
    }

    pub fn read(reader: &mut dyn std::io::Read) -> Result<DemesGraph, ExportError> {
        serde_yaml::from_reader(reader).map_err(ExportError::YamlError)
    }

    pub fn write_to_file(&self, filename: &str) -> Result<(), ExportError> {
        let file = fs::File::create(filename).map_err(ExportError::IoError)?;
        let mut writer = std::io::BufWriter::new(file);
        self.write(&mut writer)
    }

    pub fn read_from_file(filename: &str) -> Result<DemesGraph, ExportError> {
        let file = fs::File::open(filename).map_err(ExportError::IoError)?;
        let mut reader = std::io::BufReader::new(file);
        Self::read(&mut reader)
    }
}

impl DemographySink for DemesGraph {
    type Error = ExportError;

    fn add_population(&mut self, name: &str, initial_size: f64) -> Result<(), ExportError> {
        self.index.insert(name.to_string(), self.demes.len());
        self.demes.push(DemesDeme {
            name: name.to_string(),
            ancestors: Vec::new(),
            start_time: None,
            epochs: vec![DemesEpoch {
                start_size: initial_size,
                end_time: 0.,
            }],
        });
        Ok(())
    }

    fn add_population_split(
        &mut self,
        time: f64,
        derived: &[&str],
        ancestral: &str,
    ) -> Result<(), ExportError> {
        for epoch in self.get_mut(ancestral)?.epochs.iter_mut() {
            epoch.end_time = time;
        }
        for name in derived {
            let deme = self.get_mut(name)?;
            deme.ancestors = vec![ancestral.to_string()];
            deme.start_time = Some(time);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::Planner;

    #[test]
    fn graph_from_model() {
        let model = Planner::new(2).plan_uniform(3, 2., 10.).unwrap();
        let graph = DemesGraph::from_model(&model, "three demes").unwrap();

        let names: Vec<&str> = graph.demes.iter().map(|deme| deme.name.as_str()).collect();
        assert_eq!(names, vec!["ancestral", "anc_0_0", "p2", "p1", "p0"]);

        let root = graph.get("ancestral").unwrap();
        assert!(root.ancestors.is_empty());
        assert_eq!(root.start_time, None);
        assert_eq!(
            root.epochs,
            vec![DemesEpoch {
                start_size: 6.,
                end_time: 12.
            }]
        );

        let intermediate = graph.get("anc_0_0").unwrap();
        assert_eq!(intermediate.ancestors, vec!["ancestral".to_string()]);
        assert_eq!(intermediate.start_time, Some(12.));
        assert_eq!(intermediate.epochs[0].end_time, 11.);

        let promoted = graph.get("p2").unwrap();
        assert_eq!(promoted.start_time, Some(12.));
        assert_eq!(promoted.epochs[0].end_time, 0.);

        let leaf = graph.get("p0").unwrap();
        assert_eq!(leaf.ancestors, vec!["anc_0_0".to_string()]);
        assert_eq!(leaf.start_time, Some(11.));
    }

    #[test]
    fn ancestors_listed_first() {
        let model = Planner::new(3).plan_uniform(40, 1., 0.).unwrap();
        let graph = DemesGraph::from_model(&model, "").unwrap();
        for (index, deme) in graph.demes.iter().enumerate() {
            for ancestor in &deme.ancestors {
                let position = graph.demes.iter().position(|d| &d.name == ancestor);
                assert!(position.unwrap() < index);
            }
        }
    }

    #[test]
    fn read_write() {
        let model = Planner::new(2).plan_uniform(5, 1.5, 3.).unwrap();
        let graph = DemesGraph::from_model(&model, "round trip").unwrap();
        let mut output = vec![];
        graph.write(&mut output).unwrap();

        let yaml = String::from_utf8(output.clone()).unwrap();
        assert!(yaml.starts_with("description: round trip\ntime_units: generations\n"));

        let read = DemesGraph::read(&mut &output[..]).unwrap();
        assert_eq!(read.demes, graph.demes);
        assert_eq!(
            read.get("p4").unwrap().ancestors,
            graph.get("p4").unwrap().ancestors
        );
    }

    #[test]
    fn unknown_deme() {
        let mut graph = DemesGraph::new("");
        graph.add_population("a", 1.).unwrap();
        assert!(matches!(
            graph.add_population_split(1., &["a"], "b"),
            Err(ExportError::UnknownDeme(_))
        ));
    }
}
