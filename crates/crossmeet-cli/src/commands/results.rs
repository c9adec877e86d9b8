//! Results command.

use anyhow::Result;
use crossmeet_core::Meet;
use crossmeet_core::export::{
    category_summary, format_results_console, format_results_json, format_results_tsv,
    format_summary_console,
};

use crate::cli::OutputFormat;

use super::{emit, load_meet};

pub fn run(
    event: &str,
    category: Option<&str>,
    format: OutputFormat,
    output: Option<&str>,
) -> Result<()> {
    let meet = load_meet(event)?;
    let content = render(&meet, category, format)?;
    emit(&content, output)
}

/// Render settled results for one category or the whole field.
pub fn render(meet: &Meet, category: Option<&str>, format: OutputFormat) -> Result<String> {
    let snapshot = meet.snapshot();
    let lines = meet.get_results(category);
    let content = match format {
        OutputFormat::Console => {
            let title = match category {
                Some(cat) => meet
                    .categories()
                    .get(cat)
                    .map(|info| info.title.clone())
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| cat.to_string()),
                None => meet.title().to_string(),
            };
            let summary = category_summary(&snapshot, category);
            format!(
                "{}\n{}",
                format_results_console(&title, snapshot.status, &lines),
                format_summary_console(&summary, &snapshot.comments)
            )
        }
        OutputFormat::Tsv => format_results_tsv(&lines),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&format_results_json(&snapshot, category, &lines))?
        }
    };
    Ok(content)
}
