//! The finished demographic model handed to the ancestral simulation.

use std::ops::Index;

use itertools::Itertools;

use super::deme::{Deme, DemeId};
use super::event::MergeEvent;
use super::sink::DemographySink;
use super::time::TimeScale;
use crate::errors::{PlannerError, Result};

/// Demes and the chronologically ordered merge events connecting them.
///
/// Leaf demes come first, in the order they were supplied, followed by the ancestral demes in
/// the order they were created.
#[derive(Debug, Clone, PartialEq)]
pub struct DemographicModel {
    demes: Vec<Deme>,
    events: Vec<MergeEvent>,
    root: DemeId,
    levels: usize,
    time_scale: TimeScale,
}

impl DemographicModel {
    pub(crate) fn new(
        demes: Vec<Deme>,
        events: Vec<MergeEvent>,
        root: DemeId,
        levels: usize,
        time_scale: TimeScale,
    ) -> Self {
        Self {
            demes,
            events,
            root,
            levels,
            time_scale,
        }
    }

    pub fn demes(&self) -> &[Deme] {
        &self.demes
    }

    pub fn events(&self) -> &[MergeEvent] {
        &self.events
    }

    pub fn deme(&self, id: DemeId) -> Option<&Deme> {
        self.demes.get(id.index())
    }

    pub fn find(&self, name: &str) -> Option<DemeId> {
        self.demes
            .iter()
            .position(|deme| deme.name() == name)
            .map(DemeId::from)
    }

    pub fn root(&self) -> DemeId {
        self.root
    }

    pub fn root_deme(&self) -> &Deme {
        &self[self.root]
    }

    /// Number of merge levels between the leaves and the root.
    pub fn levels(&self) -> usize {
        self.levels
    }

    pub fn time_scale(&self) -> &TimeScale {
        &self.time_scale
    }

    pub fn leaves(&self) -> impl Iterator<Item = &Deme> {
        self.demes.iter().filter(|deme| deme.is_leaf())
    }

    /// Events of a single level, in group order.
    pub fn level_events(&self, level: usize) -> impl Iterator<Item = &MergeEvent> {
        self.events.iter().filter(move |event| event.level() == level)
    }

    /// Numeric time of an event on the simulator's time axis.
    pub fn event_time(&self, event: &MergeEvent) -> f64 {
        self.time_scale.resolve(event.time())
    }

    /// All demes from `id` up to and including the root.
    pub fn lineage(&self, id: DemeId) -> Vec<DemeId> {
        let mut lineage = vec![id];
        let mut current = id;
        while let Some(ancestor) = self.deme(current).and_then(Deme::ancestor) {
            lineage.push(ancestor);
            current = ancestor;
        }
        lineage
    }

    /// Feed all populations, then all splits in chronological order, into `sink`.
    pub fn apply<S: DemographySink>(&self, sink: &mut S) -> std::result::Result<(), S::Error> {
        for deme in &self.demes {
            sink.add_population(deme.name(), deme.initial_size())?;
        }
        for event in &self.events {
            let derived: Vec<&str> = event.derived().iter().map(|&id| self[id].name()).collect();
            sink.add_population_split(
                self.event_time(event),
                &derived,
                self[event.ancestral()].name(),
            )?;
        }
        Ok(())
    }

    /// Check every structural invariant of the model.
    ///
    /// A model built by the planner always passes, an error here means the planner is broken.
    pub fn validate(&self, fan_in_limit: usize) -> Result<()> {
        if self.deme(self.root).is_none() {
            return Err(PlannerError::MalformedModel(format!(
                "root {} is not a deme of the model",
                self.root
            )));
        }

        if let Some(name) = self.demes.iter().map(Deme::name).duplicates().next() {
            return Err(PlannerError::MalformedModel(format!(
                "deme name `{name}` is used more than once"
            )));
        }

        let mut outgoing = vec![0usize; self.demes.len()];
        for (index, (previous, event)) in std::iter::once(None)
            .chain(self.events.iter().map(Some))
            .zip(self.events.iter())
            .enumerate()
        {
            if event.derived().len() > fan_in_limit {
                return Err(PlannerError::FanInViolation {
                    event: index,
                    derived: event.derived().len(),
                    limit: fan_in_limit,
                });
            }
            if event.derived().is_empty() {
                return Err(PlannerError::MalformedModel(format!(
                    "event {index} has no derived demes"
                )));
            }

            if let Some(previous) = previous {
                if previous.time() >= event.time()
                    || self.event_time(previous) >= self.event_time(event)
                {
                    return Err(PlannerError::TimeCollision {
                        first: previous.time(),
                        second: event.time(),
                    });
                }
                if previous.level() > event.level() {
                    return Err(PlannerError::MalformedModel(format!(
                        "event {index} at level {} follows level {}",
                        event.level(),
                        previous.level()
                    )));
                }
            }

            let ancestral = self.deme(event.ancestral()).ok_or_else(|| {
                PlannerError::malformed_deme(event.ancestral(), "does not exist")
            })?;
            if ancestral.created_at() != Some(event.time()) {
                return Err(PlannerError::malformed_deme(
                    event.ancestral(),
                    "is not created by the event that merges into it",
                ));
            }
            if ancestral.level() != event.level() + 1 {
                return Err(PlannerError::malformed_deme(
                    event.ancestral(),
                    "is not one level above the event that creates it",
                ));
            }

            for &id in event.derived() {
                let deme = self
                    .deme(id)
                    .ok_or_else(|| PlannerError::malformed_deme(id, "does not exist"))?;
                if deme
                    .created_at()
                    .is_some_and(|created| created >= event.time())
                {
                    return Err(PlannerError::malformed_deme(id, "merges before it exists"));
                }
                if deme.level() > event.level() {
                    return Err(PlannerError::malformed_deme(id, "merges below its own level"));
                }
                if deme.merged_at() != Some(event.time())
                    || deme.ancestor() != Some(event.ancestral())
                {
                    return Err(PlannerError::malformed_deme(
                        id,
                        "disagrees with the event it merges in",
                    ));
                }
                outgoing[id.index()] += 1;
            }
        }

        for (index, &count) in outgoing.iter().enumerate() {
            let id = DemeId::from(index);
            match (count, id == self.root) {
                (0, true) | (1, false) => {}
                (0, false) => return Err(PlannerError::malformed_deme(id, "never merges")),
                (_, true) => return Err(PlannerError::malformed_deme(id, "is the root but merges")),
                (_, false) => {
                    return Err(PlannerError::malformed_deme(id, "merges more than once"));
                }
            }
        }

        Ok(())
    }
}

impl Index<DemeId> for DemographicModel {
    type Output = Deme;

    fn index(&self, id: DemeId) -> &Self::Output {
        &self.demes[id.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EventTime, LeafDeme};

    /// Two leaves `a` and `b` merging into `root` at the first tick.
    fn cherry() -> (Vec<Deme>, Vec<MergeEvent>) {
        let time = EventTime::first();
        let root = DemeId::from(2);
        let mut a = Deme::leaf(&LeafDeme::new("a", 1.));
        let mut b = Deme::leaf(&LeafDeme::new("b", 2.));
        a.merge_into(root, time);
        b.merge_into(root, time);
        let demes = vec![a, b, Deme::ancestral("root".to_string(), 3., 1, time)];
        let events = vec![MergeEvent::new(
            time,
            0,
            0,
            vec![DemeId::from(0), DemeId::from(1)],
            root,
        )];
        (demes, events)
    }

    fn model(demes: Vec<Deme>, events: Vec<MergeEvent>) -> DemographicModel {
        let scale = TimeScale::new(10., 1., events.len() as u64).unwrap();
        DemographicModel::new(demes, events, DemeId::from(2), 1, scale)
    }

    #[derive(Default)]
    struct Recorder {
        populations: Vec<(String, f64)>,
        splits: Vec<(f64, Vec<String>, String)>,
    }

    impl DemographySink for Recorder {
        type Error = ();

        fn add_population(&mut self, name: &str, initial_size: f64) -> std::result::Result<(), ()> {
            self.populations.push((name.to_string(), initial_size));
            Ok(())
        }

        fn add_population_split(
            &mut self,
            time: f64,
            derived: &[&str],
            ancestral: &str,
        ) -> std::result::Result<(), ()> {
            self.splits.push((
                time,
                derived.iter().map(|name| name.to_string()).collect(),
                ancestral.to_string(),
            ));
            Ok(())
        }
    }

    #[test]
    fn valid_cherry() {
        let (demes, events) = cherry();
        let model = model(demes, events);
        assert!(model.validate(2).is_ok());
        assert_eq!(model.find("b"), Some(DemeId::from(1)));
        assert_eq!(model.root_deme().name(), "root");
        assert_eq!(
            model.lineage(DemeId::from(0)),
            vec![DemeId::from(0), DemeId::from(2)]
        );
        assert_eq!(model.leaves().count(), 2);
    }

    #[test]
    fn fan_in_violation() {
        let (demes, events) = cherry();
        let model = model(demes, events);
        assert_eq!(
            model.validate(1),
            Err(PlannerError::FanInViolation {
                event: 0,
                derived: 2,
                limit: 1
            })
        );
    }

    #[test]
    fn time_collision() {
        let (mut demes, mut events) = cherry();
        let time = EventTime::first();
        let extra = DemeId::from(3);
        demes.push(Deme::ancestral("extra".to_string(), 3., 1, time));
        events.push(MergeEvent::new(time, 0, 1, vec![DemeId::from(1)], extra));
        let model = model(demes, events);
        assert_eq!(
            model.validate(2),
            Err(PlannerError::TimeCollision {
                first: time,
                second: time
            })
        );
    }

    #[test]
    fn unmerged_deme() {
        let (mut demes, events) = cherry();
        demes.push(Deme::leaf(&LeafDeme::new("c", 1.)));
        let model = model(demes, events);
        assert!(matches!(
            model.validate(2),
            Err(PlannerError::MalformedModel(_))
        ));
    }

    #[test]
    fn duplicate_names() {
        let (mut demes, events) = cherry();
        demes[1] = {
            let mut b = Deme::leaf(&LeafDeme::new("a", 2.));
            b.merge_into(DemeId::from(2), EventTime::first());
            b
        };
        let model = model(demes, events);
        assert!(matches!(
            model.validate(2),
            Err(PlannerError::MalformedModel(_))
        ));
    }

    #[test]
    fn ancestral_level_mismatch() {
        let (mut demes, events) = cherry();
        demes[2] = Deme::ancestral("root".to_string(), 3., 0, EventTime::first());
        let model = model(demes, events);
        assert!(matches!(
            model.validate(2),
            Err(PlannerError::MalformedModel(_))
        ));
    }

    #[test]
    fn derived_above_event_level() {
        let first = EventTime::first();
        let second = first.next();
        let root = DemeId::from(2);
        let mid = DemeId::from(3);
        let mut a = Deme::leaf(&LeafDeme::new("a", 1.));
        let mut b = Deme::leaf(&LeafDeme::new("b", 2.));
        let mut middle = Deme::ancestral("mid".to_string(), 1., 1, first);
        a.merge_into(mid, first);
        middle.merge_into(root, second);
        b.merge_into(root, second);
        let demes = vec![a, b, Deme::ancestral("root".to_string(), 3., 1, second), middle];
        let events = vec![
            MergeEvent::new(first, 0, 0, vec![DemeId::from(0)], mid),
            MergeEvent::new(second, 0, 1, vec![mid, DemeId::from(1)], root),
        ];
        let model = model(demes, events);
        assert_eq!(
            model.validate(2),
            Err(PlannerError::malformed_deme(mid, "merges below its own level"))
        );
    }

    #[test]
    fn apply_to_sink() {
        let (demes, events) = cherry();
        let model = model(demes, events);
        let mut recorder = Recorder::default();
        model.apply(&mut recorder).unwrap();
        assert_eq!(
            recorder.populations,
            vec![
                ("a".to_string(), 1.),
                ("b".to_string(), 2.),
                ("root".to_string(), 3.)
            ]
        );
        assert_eq!(
            recorder.splits,
            vec![(
                11.,
                vec!["a".to_string(), "b".to_string()],
                "root".to_string()
            )]
        );
    }
}
