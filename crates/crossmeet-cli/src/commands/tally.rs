//! Tally command.

use anyhow::{Result, bail};
use crossmeet_core::export::{format_standings_console, format_standings_tsv};
use serde_json::json;

use crate::cli::OutputFormat;

use super::load_meet;

pub fn run(event: &str, name: Option<&str>, format: OutputFormat) -> Result<()> {
    let meet = load_meet(event)?;
    let names = match name {
        Some(name) => vec![name.to_string()],
        None => meet.tallies(),
    };
    if names.is_empty() {
        bail!("no tallies configured");
    }

    let mut documents = Vec::new();
    for name in &names {
        let Some(standings) = meet.standings(name) else {
            bail!("unknown tally: {}", name);
        };
        match format {
            OutputFormat::Console => println!("{}", format_standings_console(name, &standings)),
            OutputFormat::Tsv => println!("{}", format_standings_tsv(&standings)),
            OutputFormat::Json => documents.push(json!({ "tally": name, "standings": standings })),
        }
    }
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&documents)?);
    }
    Ok(())
}
