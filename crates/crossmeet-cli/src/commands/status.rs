//! Status commands: mass status change and return to race.

use anyhow::Result;

use super::{load_meet, save_meet};

pub fn run(event: &str, code: &str, bibs: &[String]) -> Result<()> {
    let meet = load_meet(event)?;
    let bibs: Vec<&str> = bibs.iter().map(String::as_str).collect();
    let changed = meet.set_status(&bibs, code)?;
    meet.tick();
    save_meet(&meet, event)?;
    println!("{} riders set to {:?}", changed, code);
    Ok(())
}

pub fn return_to_race(event: &str, bibs: &[String]) -> Result<()> {
    let meet = load_meet(event)?;
    let bibs: Vec<&str> = bibs.iter().map(String::as_str).collect();
    let returned = meet.return_to_race(&bibs)?;
    meet.tick();
    save_meet(&meet, event)?;
    println!("{} riders returned to the race", returned);
    Ok(())
}
