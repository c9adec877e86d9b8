//! Comment command.

use anyhow::{Result, bail};

use super::{load_meet, save_meet};

pub fn run(event: &str, text: &str) -> Result<()> {
    let meet = load_meet(event)?;
    if !meet.add_comment(text) {
        bail!("comment is empty");
    }
    meet.tick();
    save_meet(&meet, event)?;
    println!("{} comments recorded", meet.snapshot().comments.len());
    Ok(())
}
