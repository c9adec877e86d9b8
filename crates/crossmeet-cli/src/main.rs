mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Args, Command};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("crossmeet=info,crossmeet_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let event = args.event.as_str();
    match args.command {
        Command::Replay {
            log,
            start,
            save,
            category,
            format,
        } => commands::replay::run(
            event,
            &log,
            start.as_deref(),
            save,
            category.as_deref(),
            format,
        ),
        Command::Watch { arm, start } => commands::watch::run(event, arm, start.as_deref()),
        Command::Results {
            category,
            format,
            output,
        } => commands::results::run(event, category.as_deref(), format, output.as_deref()),
        Command::Startlist { format, output } => {
            commands::startlist::run(event, format, output.as_deref())
        }
        Command::Places { places } => commands::places::run(event, &places),
        Command::Status { code, bibs } => commands::status::run(event, &code, &bibs),
        Command::Return { bibs } => commands::status::return_to_race(event, &bibs),
        Command::Comment { text } => commands::comment::run(event, &text),
        Command::Adjust {
            bib,
            bunch,
            offset,
            bonus,
            penalty,
        } => commands::adjust::run(
            event,
            &bib,
            commands::adjust::Changes {
                bunch: bunch.as_deref(),
                offset: offset.as_deref(),
                bonus: bonus.as_deref(),
                penalty: penalty.as_deref(),
            },
        ),
        Command::Tally { name, format } => commands::tally::run(event, name.as_deref(), format),
    }
}
