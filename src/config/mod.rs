//! Configuration data structures for planner setups.

mod leaves;
mod settings;

pub use leaves::{LeafError, LeafSource};
pub use settings::{Settings, SettingsError};
