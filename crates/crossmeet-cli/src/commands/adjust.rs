//! Adjust command: manual bunch, start offset, bonus and penalty edits.

use anyhow::{Context, Result, bail};
use crossmeet_core::Meet;
use crossmeet_core::time::{format_elapsed, parse_optional_duration};

use super::{load_meet, save_meet};

/// Requested edits; `None` leaves a field as it is.
#[derive(Debug, Default, Clone, Copy)]
pub struct Changes<'a> {
    pub bunch: Option<&'a str>,
    pub offset: Option<&'a str>,
    pub bonus: Option<&'a str>,
    pub penalty: Option<&'a str>,
}

impl Changes<'_> {
    fn is_empty(&self) -> bool {
        self.bunch.is_none() && self.offset.is_none() && self.bonus.is_none() && self.penalty.is_none()
    }
}

pub fn run(event: &str, bib: &str, changes: Changes<'_>) -> Result<()> {
    if changes.is_empty() {
        bail!("nothing to adjust: pass --bunch, --offset, --bonus or --penalty");
    }
    let meet = load_meet(event)?;
    apply(&meet, bib, changes)?;
    meet.tick();
    save_meet(&meet, event)?;

    if let Some(rider) = meet.snapshot().rider(bib) {
        let place = if rider.place.is_empty() {
            "-"
        } else {
            rider.place.as_str()
        };
        let bunch = rider.bunch.map(format_elapsed).unwrap_or_default();
        println!("{}: place {} laps {} time {}", rider.bib, place, rider.laps, bunch);
    }
    Ok(())
}

fn apply(meet: &Meet, bib: &str, changes: Changes<'_>) -> Result<()> {
    if let Some(value) = changes.bunch {
        let bunch = parse_optional_duration(value).context("--bunch")?;
        meet.set_manual_bunch(bib, bunch)?;
    }
    if let Some(value) = changes.offset {
        let offset = parse_optional_duration(value).context("--offset")?;
        meet.set_start_offset(bib, offset)?;
    }
    if let Some(value) = changes.bonus {
        let bonus = parse_optional_duration(value).context("--bonus")?;
        meet.set_bonus(bib, bonus)?;
    }
    if let Some(value) = changes.penalty {
        let penalty = parse_optional_duration(value).context("--penalty")?;
        meet.set_penalty(bib, penalty)?;
    }
    Ok(())
}
