//! Rider data model.
//!
//! - `RiderEntry` - one registered bib and its lap/time state
//! - `RiderStatus` - the fixed did-not-finish vocabulary
//! - `RiderTable` - ordered, bib-keyed collection with explicit reordering

mod entry;
mod status;
mod table;

pub use entry::*;
pub use status::*;
pub use table::*;
