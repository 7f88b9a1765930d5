//! Settings module.

use serde::{Deserialize, Serialize};
use std::fs;

use super::leaves::LeafSource;
use crate::planner::{
    DEFAULT_ANCESTRAL_NAME, DEFAULT_FAN_IN_LIMIT, DEFAULT_INTERMEDIATE_PREFIX, Planner,
    SingletonPolicy,
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Settings {
    /// The largest number of demes merged into one ancestor by a single event.
    #[serde(default = "default_fan_in_limit")]
    pub fan_in_limit: usize,

    /// The time at which all lineages of the forward simulation have coalesced.
    pub base_time: f64,

    /// The time between two consecutive merge events.
    #[serde(default = "default_tick")]
    pub tick: f64,

    #[serde(default)]
    pub singleton_policy: SingletonPolicy,

    /// The name of the root deme.
    #[serde(default = "default_ancestral_name")]
    pub ancestral_name: String,

    /// The prefix of intermediate ancestral demes.
    #[serde(default = "default_intermediate_prefix")]
    pub intermediate_prefix: String,

    /// The demes present at the end of the forward simulation.
    pub leaves: LeafSource,
}

fn default_fan_in_limit() -> usize {
    DEFAULT_FAN_IN_LIMIT
}

fn default_tick() -> f64 {
    1.
}

fn default_ancestral_name() -> String {
    DEFAULT_ANCESTRAL_NAME.to_string()
}

fn default_intermediate_prefix() -> String {
    DEFAULT_INTERMEDIATE_PREFIX.to_string()
}

#[derive(Debug)]
pub enum SettingsError {
    IoError(std::io::Error),
    YamlError(serde_yaml::Error),
}

impl std::error::Error for SettingsError {}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::IoError(error) => write!(formatter, "IO error: {}", error),
            SettingsError::YamlError(error) => write!(formatter, "YAML error: {}", error),
        }
    }
}

impl std::fmt::Display for Settings {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let yaml = serde_yaml::to_string(self).map_err(|_| std::fmt::Error)?;
        write!(formatter, "{}", yaml)
    }
}

impl Settings {
    pub fn new(base_time: f64, leaves: LeafSource) -> Self {
        Self {
            fan_in_limit: default_fan_in_limit(),
            base_time,
            tick: default_tick(),
            singleton_policy: SingletonPolicy::default(),
            ancestral_name: default_ancestral_name(),
            intermediate_prefix: default_intermediate_prefix(),
            leaves,
        }
    }

    pub fn planner(&self) -> Planner {
        Planner::new(self.fan_in_limit)
            .with_tick(self.tick)
            .with_singleton_policy(self.singleton_policy)
            .with_ancestral_name(self.ancestral_name.as_str())
            .with_intermediate_prefix(self.intermediate_prefix.as_str())
    }

    pub fn write(&self, writer: &mut dyn std::io::Write) -> Result<(), SettingsError> {
        serde_yaml::to_writer(writer, self).map_err(SettingsError::YamlError)
    }

    pub fn read(reader: &mut dyn std::io::Read) -> Result<Settings, SettingsError> {
        serde_yaml::from_reader(reader).map_err(SettingsError::YamlError)
    }

    pub fn write_to_file(&self, filename: &str) -> Result<(), SettingsError> {
        let file = fs::File::create(filename).map_err(SettingsError::IoError)?;
        let mut writer = std::io::BufWriter::new(file);
        self.write(&mut writer)
    }

    pub fn read_from_file(filename: &str) -> Result<Settings, SettingsError> {
        let file = fs::File::open(filename).map_err(SettingsError::IoError)?;
        let mut reader = std::io::BufReader::new(file);
        Self::read(&mut reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_settings() -> Settings {
        Settings {
            fan_in_limit: 10,
            base_time: 250.,
            tick: 0.5,
            singleton_policy: SingletonPolicy::Merge,
            ancestral_name: "root".to_string(),
            intermediate_prefix: "node".to_string(),
            leaves: LeafSource::Grid {
                l1: 10,
                l2: 10,
                effective_size: 10.,
            },
        }
    }

    #[test]
    fn read_write() {
        let settings = grid_settings();
        let mut output = vec![];
        settings.write(&mut output).unwrap();
        let settings2 = Settings::read(&mut &output[..]).unwrap();
        assert_eq!(settings, settings2);
    }

    #[test]
    fn read_write_file() {
        let tmp_dir = std::env::temp_dir().join("demerge_test_settings.yaml");
        let path = tmp_dir.to_str().unwrap();
        let settings = Settings::new(
            3.,
            LeafSource::Table {
                path: "demes.csv".to_string(),
            },
        );
        settings.write_to_file(path).unwrap();
        let read_settings = Settings::read_from_file(path).unwrap();
        assert_eq!(read_settings, settings);
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn defaults() {
        let content = r#"base_time: 5.0
leaves: !grid
  l1: 2
  l2: 3
  effective_size: 4.0
"#;
        let settings = Settings::read(&mut content.as_bytes()).unwrap();
        assert_eq!(settings.fan_in_limit, 99);
        assert_eq!(settings.tick, 1.);
        assert_eq!(settings.singleton_policy, SingletonPolicy::Promote);
        assert_eq!(settings.ancestral_name, "ancestral");
        assert_eq!(settings.intermediate_prefix, "anc");
        assert_eq!(
            settings.leaves,
            LeafSource::Grid {
                l1: 2,
                l2: 3,
                effective_size: 4.
            }
        );
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            Settings::read_from_file("/nonexistent/demerge/settings.yaml"),
            Err(SettingsError::IoError(_))
        ));
    }

    #[test]
    fn planner_from_settings() {
        let planner = grid_settings().planner();
        assert_eq!(planner.fan_in_limit(), 10);
        assert_eq!(planner.tick(), 0.5);
        assert_eq!(planner.singleton_policy(), SingletonPolicy::Merge);
        assert_eq!(planner.ancestral_name(), "root");
        assert_eq!(planner.intermediate_prefix(), "node");
    }
}
