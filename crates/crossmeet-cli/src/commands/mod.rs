//! CLI command implementations.
//!
//! This module contains the implementation of each CLI command.

pub mod adjust;
pub mod comment;
pub mod places;
pub mod replay;
pub mod results;
pub mod startlist;
pub mod status;
pub mod tally;
pub mod watch;

use std::path::Path;

use anyhow::{Context, Result};
use crossmeet_core::export::export_to_file;
use crossmeet_core::{EventFile, Meet};

/// Load the event file into a settled meet.
pub fn load_meet(path: &str) -> Result<Meet> {
    let event = EventFile::load(path).with_context(|| format!("loading event {}", path))?;
    Ok(Meet::from_event(event))
}

pub fn save_meet(meet: &Meet, path: &str) -> Result<()> {
    meet.to_event_file()
        .save(path)
        .with_context(|| format!("saving event {}", path))?;
    eprintln!("Saved: {}", path);
    Ok(())
}

/// Write to `output` if given, else stdout.
pub fn emit(content: &str, output: Option<&str>) -> Result<()> {
    match output {
        Some(path) => {
            export_to_file(Path::new(path), content)?;
            eprintln!("Exported to: {}", path);
        }
        None => println!("{}", content),
    }
    Ok(())
}
