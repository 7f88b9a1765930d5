//! Planning of demographic models that join the demes of a forward simulation into a single
//! ancestral population, for recapitation with an ancestral coalescent simulator.

pub mod args;
pub mod config;
pub mod core;
pub mod errors;
pub mod planner;
pub mod readwrite;
pub mod runner;

pub use crate::core::{DemographicModel, DemographySink, LeafDeme};
pub use crate::errors::{PlannerError, Result};
pub use crate::planner::{Planner, SingletonPolicy};
