//! CLI argument definitions for crossmeet.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "crossmeet")]
#[command(about = "Cyclocross race timing and results", version)]
pub struct Args {
    /// Event file (JSON)
    #[arg(short, long, value_name = "FILE", default_value = "event.json", env = "CROSSMEET_EVENT")]
    pub event: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Replay a decoder log against the event
    Replay {
        /// Decoder log (TIME<TAB>TAG[<TAB>CHANNEL] per line)
        log: String,
        /// Start the race at this time of day instead of waiting for a start trigger
        #[arg(long)]
        start: Option<String>,
        /// Write the updated event back to the event file
        #[arg(long)]
        save: bool,
        /// Category to show (default: whole field)
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long, value_enum, default_value = "console")]
        format: OutputFormat,
    },
    /// Time a live race from decoder lines on stdin
    Watch {
        /// Arm the start so the decoder's start trigger starts the race
        #[arg(long)]
        arm: bool,
        /// Start the race immediately at this time of day
        #[arg(long, conflicts_with = "arm")]
        start: Option<String>,
    },
    /// Show results
    Results {
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long, value_enum, default_value = "console")]
        format: OutputFormat,
        /// Output file path
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Show the start list
    Startlist {
        #[arg(short, long, value_enum, default_value = "tsv")]
        format: OutputFormat,
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Set finish places, e.g. "12 7-31 4"
    Places {
        places: String,
    },
    /// Apply a status code (dnf, dns, ...) to riders
    Status {
        code: String,
        #[arg(required = true)]
        bibs: Vec<String>,
    },
    /// Return withdrawn riders to the race
    Return {
        #[arg(required = true)]
        bibs: Vec<String>,
    },
    /// Record a commissaires' decision
    Comment {
        text: String,
    },
    /// Adjust one rider's times (values in seconds or M:SS, "none" clears)
    Adjust {
        bib: String,
        /// Manual bunch time override
        #[arg(long)]
        bunch: Option<String>,
        /// Start offset from the gun
        #[arg(long)]
        offset: Option<String>,
        #[arg(long)]
        bonus: Option<String>,
        #[arg(long)]
        penalty: Option<String>,
    },
    /// Show points tally standings
    Tally {
        /// Tally name (default: all tallies)
        name: Option<String>,
        #[arg(short, long, value_enum, default_value = "console")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Console,
    Tsv,
    Json,
}
