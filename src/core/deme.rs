use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

use super::time::EventTime;

/// Index of a deme inside a [`DemographicModel`](super::DemographicModel).
#[derive(Clone, Copy, Debug, Display, From, Into, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DemeId(usize);

impl DemeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A deme as supplied by the forward simulation output, before any merging.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LeafDeme {
    pub name: String,
    pub initial_size: f64,
}

impl LeafDeme {
    pub fn new(name: impl Into<String>, initial_size: f64) -> Self {
        Self {
            name: name.into(),
            initial_size,
        }
    }
}

/// A deme of the planned model.
///
/// A deme exists from `created_at` (the present for leaves) until `merged_at`, when it merges
/// into `ancestor`. The root has neither a merge time nor an ancestor.
#[derive(Debug, Clone, PartialEq)]
pub struct Deme {
    name: String,
    initial_size: f64,
    level: usize,
    created_at: Option<EventTime>,
    merged_at: Option<EventTime>,
    ancestor: Option<DemeId>,
}

impl Deme {
    pub(crate) fn leaf(leaf: &LeafDeme) -> Self {
        Self {
            name: leaf.name.clone(),
            initial_size: leaf.initial_size,
            level: 0,
            created_at: None,
            merged_at: None,
            ancestor: None,
        }
    }

    pub(crate) fn ancestral(
        name: String,
        initial_size: f64,
        level: usize,
        time: EventTime,
    ) -> Self {
        Self {
            name,
            initial_size,
            level,
            created_at: Some(time),
            merged_at: None,
            ancestor: None,
        }
    }

    pub(crate) fn merge_into(&mut self, ancestor: DemeId, time: EventTime) {
        self.ancestor = Some(ancestor);
        self.merged_at = Some(time);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn initial_size(&self) -> f64 {
        self.initial_size
    }

    /// Number of merge levels between this deme and the leaves.
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn created_at(&self) -> Option<EventTime> {
        self.created_at
    }

    pub fn merged_at(&self) -> Option<EventTime> {
        self.merged_at
    }

    pub fn ancestor(&self) -> Option<DemeId> {
        self.ancestor
    }

    pub fn is_leaf(&self) -> bool {
        self.created_at.is_none()
    }

    pub fn is_root(&self) -> bool {
        self.ancestor.is_none()
    }
}
