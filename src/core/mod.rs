//! This module contains the core datatypes of the library.

mod deme;
mod event;
mod model;
mod sink;
mod time;

pub use deme::{Deme, DemeId, LeafDeme};
pub use event::MergeEvent;
pub use model::DemographicModel;
pub use sink::DemographySink;
pub use time::{EventTime, TimeScale};
