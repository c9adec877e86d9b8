//! Start list command.

use anyhow::Result;
use crossmeet_core::export::{format_startlist_tsv, startlist};

use crate::cli::OutputFormat;

use super::{emit, load_meet};

pub fn run(event: &str, format: OutputFormat, output: Option<&str>) -> Result<()> {
    let meet = load_meet(event)?;
    let entries = startlist(&meet.snapshot());

    let content = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&entries)?,
        OutputFormat::Console | OutputFormat::Tsv => format_startlist_tsv(&entries),
    };
    emit(&content, output)
}
