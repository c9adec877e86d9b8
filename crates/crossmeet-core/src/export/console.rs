//! Console output formatting with colored display

use std::fmt::Write as _;

use owo_colors::OwoColorize;

use crate::contest::TallyStanding;
use crate::rider::RiderStatus;
use crate::state::RaceStatus;

use super::{CategorySummary, ResultLine};

/// Format a result list as a boxed console table.
pub fn format_results_console(title: &str, status: RaceStatus, lines: &[ResultLine]) -> String {
    let mut output = String::new();
    let border = "━".repeat(64);
    let border_dim = border.dimmed();

    let _ = writeln!(output, "{}", border_dim);
    let _ = writeln!(
        output,
        "  {} [{}]",
        title.bold(),
        format_colored_status(status)
    );
    let _ = writeln!(output, "{}", border_dim);

    for line in lines {
        let rank = line.rank.map(|r| format!("{r}.")).unwrap_or_default();
        let info = format_colored_info(&line.info);
        let _ = writeln!(
            output,
            "  {:>4} {:>5}  {:<24} {:>3}  {:>10}  {}",
            rank,
            line.bib,
            truncate(&line.name, 24),
            line.laps,
            line.time_label(),
            info
        );
    }
    let _ = write!(output, "{}", border_dim);
    output
}

/// Format tally standings for the console.
pub fn format_standings_console(tally: &str, standings: &[TallyStanding]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "  {}", tally.bold());
    for s in standings {
        let points = if s.rank == 1 {
            s.points.green().to_string()
        } else {
            s.points.to_string()
        };
        let _ = writeln!(
            output,
            "  {:>4} {:>5}  {:>4} pts  ({} wins)",
            format!("{}.", s.rank),
            s.bib,
            points,
            s.countback.get(0)
        );
    }
    output
}

/// Rider counts and commissaires' decisions printed under a result.
pub fn format_summary_console(summary: &CategorySummary, comments: &[String]) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "  Number of starters: {}", summary.starters);
    if summary.out_of_time > 0 {
        let _ = writeln!(
            output,
            "  Riders finishing out of time limits: {}",
            summary.out_of_time
        );
    }
    if summary.abandoned > 0 {
        let _ = writeln!(output, "  Riders abandoning the race: {}", summary.abandoned);
    }
    if !comments.is_empty() {
        let _ = writeln!(output, "  {}", "Decisions of the commissaires".bold());
        for comment in comments {
            let _ = writeln!(output, "    {}", comment);
        }
    }
    output
}

fn format_colored_status(status: RaceStatus) -> String {
    let name = status.as_str();
    match status {
        RaceStatus::PreRace => name.dimmed().to_string(),
        RaceStatus::Virtual => name.yellow().to_string(),
        RaceStatus::Provisional => name.cyan().to_string(),
        RaceStatus::Final => name.green().bold().to_string(),
    }
}

fn format_colored_info(info: &str) -> String {
    match RiderStatus::from_code(info) {
        Some(RiderStatus::Dsq) => info.red().bold().to_string(),
        Some(RiderStatus::Dnf | RiderStatus::Otl) => info.red().to_string(),
        Some(RiderStatus::Wd | RiderStatus::Dns) => info.dimmed().to_string(),
        None => info.to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
