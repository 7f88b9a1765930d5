use super::deme::DemeId;
use super::time::EventTime;

/// All `derived` demes merge into `ancestral` at `time`, going backwards in time.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeEvent {
    time: EventTime,
    level: usize,
    group: usize,
    derived: Vec<DemeId>,
    ancestral: DemeId,
}

impl MergeEvent {
    pub(crate) fn new(
        time: EventTime,
        level: usize,
        group: usize,
        derived: Vec<DemeId>,
        ancestral: DemeId,
    ) -> Self {
        Self {
            time,
            level,
            group,
            derived,
            ancestral,
        }
    }

    pub fn time(&self) -> EventTime {
        self.time
    }

    pub fn level(&self) -> usize {
        self.level
    }

    /// Index of the group within its level.
    pub fn group(&self) -> usize {
        self.group
    }

    pub fn derived(&self) -> &[DemeId] {
        &self.derived
    }

    pub fn ancestral(&self) -> DemeId {
        self.ancestral
    }
}
