//! All errors that can occur while planning a demographic model.

use std::fmt;

use crate::core::{DemeId, EventTime};

pub type Result<T> = std::result::Result<T, PlannerError>;

#[derive(Clone, Debug, PartialEq)]
pub enum PlannerError {
    /// The planner inputs cannot produce a valid model. Raised before any event is built.
    InvalidInput(String),
    /// A merge event combines more demes than the fan-in limit allows.
    FanInViolation {
        event: usize,
        derived: usize,
        limit: usize,
    },
    /// Two merge events resolve to the same time, or appear out of order.
    TimeCollision { first: EventTime, second: EventTime },
    /// Any other broken model invariant.
    MalformedModel(String),
}

impl PlannerError {
    pub(crate) fn malformed_deme(id: DemeId, message: &str) -> Self {
        PlannerError::MalformedModel(format!("deme {id} {message}"))
    }
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlannerError::InvalidInput(message) => write!(f, "InvalidInput: {}", message),
            PlannerError::FanInViolation {
                event,
                derived,
                limit,
            } => write!(
                f,
                "FanInViolation: event {} merges {} demes (limit {})",
                event, derived, limit
            ),
            PlannerError::TimeCollision { first, second } => write!(
                f,
                "TimeCollision: event at {} is not before event at {}",
                first, second
            ),
            PlannerError::MalformedModel(message) => write!(f, "MalformedModel: {}", message),
        }
    }
}

impl std::error::Error for PlannerError {}
