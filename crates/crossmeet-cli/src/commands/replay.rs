//! Replay command: run a recorded decoder log through the event.

use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result};
use crossmeet_core::ClockState;
use crossmeet_core::decoder::read_events;
use crossmeet_core::time::parse_tod;
use tracing::{debug, info};

use crate::cli::OutputFormat;

use super::{load_meet, results, save_meet};

pub fn run(
    event: &str,
    log: &str,
    start: Option<&str>,
    save: bool,
    category: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let meet = load_meet(event)?;
    let file = File::open(log).with_context(|| format!("opening decoder log {}", log))?;
    let events = read_events(BufReader::new(file))?;
    info!("Replaying {} decoder events from {}", events.len(), log);

    let clock = meet.clock();
    if let Some(start) = start {
        let t = parse_tod(start)?;
        if clock.state != ClockState::ArmStart {
            meet.arm_start()?;
        }
        meet.start(t)?;
    } else if clock.state == ClockState::Idle {
        debug!("Arming start for the log's start trigger");
        meet.arm_start()?;
    }

    for event in events {
        meet.handle_event(event);
    }
    meet.tick();

    if save {
        save_meet(&meet, event)?;
    }
    println!("{}", results::render(&meet, category, format)?);
    Ok(())
}
