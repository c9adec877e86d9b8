//! Contests, intermediates and points tallies.
//!
//! - `ContestDefinition` / `ContestRegistry` - configured rewards, read-only during recalculation
//! - `ContestResults` - bonus and tally maps produced by each recalculation

mod definition;
mod points;

pub use definition::*;
pub use points::*;
