//! Export formats for results, startlists and tallies.

mod console;
mod results;

pub use console::{format_results_console, format_standings_console, format_summary_console};
pub use results::{
    CategorySummary, ResultLine, ResultRecord, StartlistEntry, category_results,
    category_summary, result_records, startlist,
};

use std::fs;
use std::path::Path;

use serde_json::{Value as JsonValue, json};

use crate::contest::TallyStanding;
use crate::error::Result;
use crate::state::RaceSnapshot;
use crate::time::format_elapsed;

pub fn format_results_tsv_header() -> String {
    [
        "Rank", "Bib", "Name", "Categories", "Info", "Laps", "Time", "Bonus", "Penalty",
    ]
    .join("\t")
}

pub fn format_results_tsv_row(line: &ResultLine) -> String {
    let values = [
        line.rank.map(|r| r.to_string()).unwrap_or_default(),
        line.bib.clone(),
        line.name.clone(),
        line.categories.clone(),
        line.info.clone(),
        line.laps.to_string(),
        line.time_label(),
        line.bonus.map(format_elapsed).unwrap_or_default(),
        line.penalty.map(format_elapsed).unwrap_or_default(),
    ];
    values.join("\t")
}

/// Header plus one row per result line.
pub fn format_results_tsv(lines: &[ResultLine]) -> String {
    let mut output = format_results_tsv_header();
    for line in lines {
        output.push('\n');
        output.push_str(&format_results_tsv_row(line));
    }
    output
}

pub fn format_startlist_tsv(entries: &[StartlistEntry]) -> String {
    let mut output = ["Bib", "Name", "Categories", "Status"].join("\t");
    for entry in entries {
        output.push('\n');
        output.push_str(
            &[
                entry.bib.as_str(),
                entry.name.as_str(),
                entry.categories.as_str(),
                entry.status.as_str(),
            ]
            .join("\t"),
        );
    }
    output
}

pub fn format_standings_tsv(standings: &[TallyStanding]) -> String {
    let mut output = ["Rank", "Bib", "Points", "Wins"].join("\t");
    for s in standings {
        output.push_str(&format!(
            "\n{}\t{}\t{}\t{}",
            s.rank,
            s.bib,
            s.points,
            s.countback.get(0)
        ));
    }
    output
}

/// JSON document describing a result list and the state it came from.
pub fn format_results_json(
    snapshot: &RaceSnapshot,
    category: Option<&str>,
    lines: &[ResultLine],
) -> JsonValue {
    json!({
        "category": category,
        "status": snapshot.status.as_str(),
        "start": snapshot.clock.start,
        "finish": snapshot.clock.finish,
        "results": lines,
        "summary": category_summary(snapshot, category),
        "comments": snapshot.comments,
    })
}

/// Write `contents` to `path`, creating parent directories as needed.
pub fn export_to_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}
