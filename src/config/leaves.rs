use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::LeafDeme;
use crate::planner::Planner;
use crate::readwrite::{DemeTable, TableError};

/// Where the leaf demes of the planned model come from.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum LeafSource {
    /// A `l1` x `l2` lattice of demes of equal size, named `p0`, `p1`, ... in row-major order.
    Grid {
        l1: usize,
        l2: usize,
        effective_size: f64,
    },
    /// A deme table, relative paths are resolved against the settings file.
    Table { path: String },
}

#[derive(Debug)]
pub enum LeafError {
    GridError(String),
    TableError(TableError),
}

impl std::error::Error for LeafError {}

impl std::fmt::Display for LeafError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeafError::GridError(message) => write!(formatter, "Grid error: {}", message),
            LeafError::TableError(error) => write!(formatter, "Table error: {}", error),
        }
    }
}

impl LeafSource {
    pub fn load(&self, settings_dir: Option<&Path>) -> Result<Vec<LeafDeme>, LeafError> {
        match self {
            LeafSource::Grid {
                l1,
                l2,
                effective_size,
            } => {
                let n_demes = l1.checked_mul(*l2).ok_or_else(|| {
                    LeafError::GridError(format!("a {l1} x {l2} grid has too many demes"))
                })?;
                Ok(Planner::uniform_leaves(n_demes, *effective_size))
            }
            LeafSource::Table { path } => {
                let path = settings_dir
                    .unwrap_or_else(|| Path::new("./"))
                    .join(path);
                Ok(DemeTable::read(&path)
                    .map_err(LeafError::TableError)?
                    .into_leaves())
            }
        }
    }

    /// Summed effective size of all leaves, if known without reading files.
    pub fn total_size(&self) -> Option<f64> {
        match self {
            LeafSource::Grid {
                l1,
                l2,
                effective_size,
            } => l1
                .checked_mul(*l2)
                .map(|n_demes| n_demes as f64 * effective_size),
            LeafSource::Table { .. } => None,
        }
    }
}
