//! Logical event times.
//!
//! Merge events are ordered by an integer tick instead of by floating point time. Ticks are
//! handed out by a single counter, so no two events can share a time. A [`TimeScale`] maps
//! ticks onto the numeric time axis of the ancestral simulator.

use derive_more::Display;

use crate::errors::{PlannerError, Result};

#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display("t{_0}")]
pub struct EventTime(u64);

impl EventTime {
    pub(crate) fn first() -> Self {
        Self(1)
    }

    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn ticks(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeScale {
    base_time: f64,
    tick: f64,
}

impl TimeScale {
    /// Creates a time scale whose first event happens one `tick` after `base_time`.
    ///
    /// `max_ticks` is the number of events the scale has to resolve. Every one of them must land
    /// on a distinct floating point value, otherwise the scale is rejected.
    pub fn new(base_time: f64, tick: f64, max_ticks: u64) -> Result<Self> {
        if !base_time.is_finite() || base_time < 0. {
            return Err(PlannerError::InvalidInput(format!(
                "base time must be finite and non-negative, got {base_time}"
            )));
        }
        if !tick.is_finite() || tick <= 0. {
            return Err(PlannerError::InvalidInput(format!(
                "tick must be finite and positive, got {tick}"
            )));
        }

        let scale = Self { base_time, tick };

        // rounding to the float grid is uneven, so every consecutive pair has to be checked
        let collision = (1..=max_ticks)
            .map(|ticks| scale.resolve(EventTime(ticks)))
            .try_fold(base_time, |previous, time| {
                (time > previous && time.is_finite()).then_some(time)
            })
            .is_none();
        if collision {
            return Err(PlannerError::InvalidInput(format!(
                "tick {tick} cannot separate {max_ticks} events after base time {base_time}"
            )));
        }

        Ok(scale)
    }

    pub fn base_time(&self) -> f64 {
        self.base_time
    }

    pub fn tick(&self) -> f64 {
        self.tick
    }

    pub fn resolve(&self, time: EventTime) -> f64 {
        self.base_time + self.tick * time.0 as f64
    }
}
