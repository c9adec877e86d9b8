//! Places command: set the finish order and save.

use anyhow::{Result, bail};
use crossmeet_core::Error;

use crate::cli::OutputFormat;

use super::{load_meet, results, save_meet};

pub fn run(event: &str, places: &str) -> Result<()> {
    let meet = load_meet(event)?;

    match meet.set_places(places) {
        Ok(()) => {}
        Err(Error::PlacesRejected { violations }) => {
            for violation in &violations {
                eprintln!("  {}", violation);
            }
            bail!("places rejected ({} problems)", violations.len());
        }
        Err(e) => return Err(e.into()),
    }

    meet.tick();
    save_meet(&meet, event)?;
    println!("{}", results::render(&meet, None, OutputFormat::Console)?);
    Ok(())
}
