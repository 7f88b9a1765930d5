//! Hierarchical population merge planner.
//!
//! The ancestral simulator can only merge a limited number of populations in a single split
//! event. To join an arbitrary number of leaf demes into one ancestral population, the planner
//! merges contiguous groups of at most `fan_in_limit` demes into intermediate ancestors, level by
//! level, until a single root remains.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::ops::Range;

use crate::core::{Deme, DemeId, DemographicModel, EventTime, LeafDeme, MergeEvent, TimeScale};
use crate::errors::{PlannerError, Result};

/// Largest number of populations the ancestral simulator merges in one split.
pub const DEFAULT_FAN_IN_LIMIT: usize = 99;
pub const DEFAULT_ANCESTRAL_NAME: &str = "ancestral";
pub const DEFAULT_INTERMEDIATE_PREFIX: &str = "anc";

/// What to do with the last group of a level when it holds a single deme.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SingletonPolicy {
    /// Carry the deme to the next level unchanged.
    #[default]
    Promote,
    /// Merge the deme alone into a fresh ancestor.
    Merge,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Planner {
    fan_in_limit: usize,
    tick: f64,
    singleton_policy: SingletonPolicy,
    ancestral_name: String,
    intermediate_prefix: String,
}

impl Default for Planner {
    fn default() -> Self {
        Self::new(DEFAULT_FAN_IN_LIMIT)
    }
}

impl Planner {
    pub fn new(fan_in_limit: usize) -> Self {
        Self {
            fan_in_limit,
            tick: 1.,
            singleton_policy: SingletonPolicy::default(),
            ancestral_name: DEFAULT_ANCESTRAL_NAME.to_string(),
            intermediate_prefix: DEFAULT_INTERMEDIATE_PREFIX.to_string(),
        }
    }

    /// Time between two consecutive merge events.
    pub fn with_tick(mut self, tick: f64) -> Self {
        self.tick = tick;
        self
    }

    pub fn with_singleton_policy(mut self, singleton_policy: SingletonPolicy) -> Self {
        self.singleton_policy = singleton_policy;
        self
    }

    pub fn with_ancestral_name(mut self, ancestral_name: impl Into<String>) -> Self {
        self.ancestral_name = ancestral_name.into();
        self
    }

    pub fn with_intermediate_prefix(mut self, intermediate_prefix: impl Into<String>) -> Self {
        self.intermediate_prefix = intermediate_prefix.into();
        self
    }

    pub fn fan_in_limit(&self) -> usize {
        self.fan_in_limit
    }

    pub fn tick(&self) -> f64 {
        self.tick
    }

    pub fn singleton_policy(&self) -> SingletonPolicy {
        self.singleton_policy
    }

    pub fn ancestral_name(&self) -> &str {
        &self.ancestral_name
    }

    pub fn intermediate_prefix(&self) -> &str {
        &self.intermediate_prefix
    }

    /// Number of levels needed to merge `n_demes` demes.
    pub fn levels_for(&self, n_demes: usize) -> usize {
        self.level_widths(n_demes).count()
    }

    /// Number of merge events needed for `n_demes` demes.
    pub fn events_for(&self, n_demes: usize) -> usize {
        self.level_widths(n_demes)
            .map(|width| {
                let groups = width.div_ceil(self.fan_in_limit);
                if self.promotes_last_group(width) {
                    groups - 1
                } else {
                    groups
                }
            })
            .sum()
    }

    /// Number of demes entering each level.
    fn level_widths(&self, n_demes: usize) -> impl Iterator<Item = usize> {
        let limit = self.fan_in_limit;
        std::iter::successors(Some(n_demes), move |&width| {
            (limit >= 2).then(|| width.div_ceil(limit))
        })
        .take_while(move |&width| width > 1 && limit >= 2)
    }

    fn promotes_last_group(&self, width: usize) -> bool {
        self.singleton_policy == SingletonPolicy::Promote
            && width > self.fan_in_limit
            && width % self.fan_in_limit == 1
    }

    fn intermediate_name(&self, level: usize, group: usize) -> String {
        format!("{}_{}_{}", self.intermediate_prefix, level, group)
    }

    /// `n_demes` demes of equal size named `p0`, `p1`, ...
    pub fn uniform_leaves(n_demes: usize, initial_size: f64) -> Vec<LeafDeme> {
        (0..n_demes)
            .map(|index| LeafDeme::new(format!("p{index}"), initial_size))
            .collect()
    }

    /// Plan the merge of `n_demes` demes of equal size, see [`Planner::uniform_leaves`].
    pub fn plan_uniform(
        &self,
        n_demes: usize,
        initial_size: f64,
        base_time: f64,
    ) -> Result<DemographicModel> {
        self.plan(&Self::uniform_leaves(n_demes, initial_size), base_time)
    }

    fn check_configuration(&self) -> Result<()> {
        if self.fan_in_limit < 2 {
            return Err(PlannerError::InvalidInput(format!(
                "fan-in limit must be at least 2, got {}",
                self.fan_in_limit
            )));
        }
        if self.ancestral_name.is_empty() || self.intermediate_prefix.is_empty() {
            return Err(PlannerError::InvalidInput(
                "ancestral name and intermediate prefix must not be empty".to_string(),
            ));
        }
        if self.is_reserved(&self.ancestral_name) {
            return Err(PlannerError::InvalidInput(format!(
                "ancestral name `{}` collides with intermediate prefix `{}`",
                self.ancestral_name, self.intermediate_prefix
            )));
        }
        Ok(())
    }

    fn is_reserved(&self, name: &str) -> bool {
        name.strip_prefix(self.intermediate_prefix.as_str())
            .is_some_and(|rest| rest.starts_with('_'))
    }

    fn check_leaves(&self, leaves: &[LeafDeme]) -> Result<()> {
        if leaves.is_empty() {
            return Err(PlannerError::InvalidInput(
                "at least one deme is required".to_string(),
            ));
        }

        if let Some(leaf) = leaves
            .iter()
            .find(|leaf| !leaf.initial_size.is_finite() || leaf.initial_size <= 0.)
        {
            return Err(PlannerError::InvalidInput(format!(
                "deme `{}` has invalid effective size {}",
                leaf.name, leaf.initial_size
            )));
        }

        if leaves.iter().any(|leaf| leaf.name.is_empty()) {
            return Err(PlannerError::InvalidInput(
                "deme names must not be empty".to_string(),
            ));
        }

        if let Some(name) = leaves.iter().map(|leaf| leaf.name.as_str()).duplicates().next() {
            return Err(PlannerError::InvalidInput(format!(
                "deme name `{name}` is used more than once"
            )));
        }

        if let Some(leaf) = leaves
            .iter()
            .find(|leaf| leaf.name == self.ancestral_name || self.is_reserved(&leaf.name))
        {
            return Err(PlannerError::InvalidInput(format!(
                "deme name `{}` is reserved for ancestral demes",
                leaf.name
            )));
        }

        Ok(())
    }

    /// Summed effective size of the leaves in `span`.
    ///
    /// Equal sizes are multiplied out, so the root of `n` demes of size `rho` has size `n * rho`
    /// regardless of how the levels group them.
    fn span_size(leaves: &[LeafDeme], span: &Range<usize>, uniform_size: Option<f64>) -> f64 {
        match uniform_size {
            Some(size) => span.len() as f64 * size,
            None => leaves[span.clone()].iter().map(|leaf| leaf.initial_size).sum(),
        }
    }

    /// Build the merge hierarchy for `leaves`, whose lineages all coalesce by `base_time`.
    ///
    /// A single leaf is returned as the root of a model without events.
    pub fn plan(&self, leaves: &[LeafDeme], base_time: f64) -> Result<DemographicModel> {
        self.check_configuration()?;
        self.check_leaves(leaves)?;
        let n_events = self.events_for(leaves.len());
        let time_scale = TimeScale::new(base_time, self.tick, n_events as u64)?;

        log::info!(
            "Planning merge of {} demes with fan-in limit {} over {} levels...",
            leaves.len(),
            self.fan_in_limit,
            self.levels_for(leaves.len())
        );

        let mut demes: Vec<Deme> = leaves.iter().map(Deme::leaf).collect();
        // groups are contiguous, so every deme descends from a contiguous run of leaves
        let mut spans: Vec<Range<usize>> =
            (0..leaves.len()).map(|index| index..index + 1).collect();
        let uniform_size = leaves
            .iter()
            .map(|leaf| leaf.initial_size)
            .all_equal_value()
            .ok();
        let mut events: Vec<MergeEvent> = Vec::with_capacity(n_events);
        let mut current: Vec<DemeId> = (0..demes.len()).map(DemeId::from).collect();
        let mut time = EventTime::first();
        let mut level = 0;

        while current.len() > 1 {
            let is_last_level = current.len() <= self.fan_in_limit;
            let mut next: Vec<DemeId> =
                Vec::with_capacity(current.len().div_ceil(self.fan_in_limit));

            for (group, chunk) in current.chunks(self.fan_in_limit).enumerate() {
                if chunk.len() == 1 && self.singleton_policy == SingletonPolicy::Promote {
                    log::trace!(
                        "Promoting {} to level {}",
                        demes[chunk[0].index()].name(),
                        level + 1
                    );
                    next.push(chunk[0]);
                    continue;
                }

                let ancestral = DemeId::from(demes.len());
                let name = if is_last_level {
                    self.ancestral_name.clone()
                } else {
                    self.intermediate_name(level, group)
                };
                let span = spans[chunk[0].index()].start..spans[chunk[chunk.len() - 1].index()].end;
                let initial_size = Self::span_size(leaves, &span, uniform_size);

                log::trace!(
                    "Merging {} demes into {} ({}) at {}",
                    chunk.len(),
                    name,
                    initial_size,
                    time
                );

                for id in chunk {
                    demes[id.index()].merge_into(ancestral, time);
                }
                demes.push(Deme::ancestral(name, initial_size, level + 1, time));
                spans.push(span);
                events.push(MergeEvent::new(time, level, group, chunk.to_vec(), ancestral));
                next.push(ancestral);
                time = time.next();
            }

            log::debug!(
                "Level {} merged {} demes into {}",
                level,
                current.len(),
                next.len()
            );
            current = next;
            level += 1;
        }

        let model = DemographicModel::new(demes, events, current[0], level, time_scale);
        model.validate(self.fan_in_limit)?;

        log::info!(
            "Planned {} merge events, root `{}` has effective size {}",
            model.events().len(),
            model.root_deme().name(),
            model.root_deme().initial_size()
        );
        Ok(model)
    }
}
