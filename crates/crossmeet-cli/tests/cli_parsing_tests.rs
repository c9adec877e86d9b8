//! CLI argument parsing tests.
//!
//! These tests verify that command-line arguments are parsed correctly
//! without actually executing the commands (which would need an event file).

use clap::Parser;

// Re-create Args structure for testing since it's not publicly exported
#[derive(Parser)]
#[command(name = "crossmeet")]
struct Args {
    #[arg(short, long, default_value = "event.json")]
    event: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    Replay {
        log: String,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        save: bool,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long, value_enum, default_value = "console")]
        format: OutputFormat,
    },
    Watch {
        #[arg(long)]
        arm: bool,
        #[arg(long, conflicts_with = "arm")]
        start: Option<String>,
    },
    Results {
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long, value_enum, default_value = "console")]
        format: OutputFormat,
        #[arg(short, long)]
        output: Option<String>,
    },
    Places {
        places: String,
    },
    Status {
        code: String,
        #[arg(required = true)]
        bibs: Vec<String>,
    },
    Return {
        #[arg(required = true)]
        bibs: Vec<String>,
    },
    Comment {
        text: String,
    },
    Adjust {
        bib: String,
        #[arg(long)]
        bunch: Option<String>,
        #[arg(long)]
        offset: Option<String>,
        #[arg(long)]
        bonus: Option<String>,
        #[arg(long)]
        penalty: Option<String>,
    },
    Tally {
        name: Option<String>,
        #[arg(short, long, value_enum, default_value = "console")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Console,
    Tsv,
    Json,
}

#[test]
fn test_subcommand_required() {
    assert!(Args::try_parse_from(["crossmeet"]).is_err());
}

#[test]
fn test_parse_replay_defaults() {
    let args = Args::try_parse_from(["crossmeet", "replay", "decoder.log"]).unwrap();
    assert_eq!(args.event, "event.json");
    match args.command {
        Command::Replay {
            log,
            start,
            save,
            category,
            format,
        } => {
            assert_eq!(log, "decoder.log");
            assert!(start.is_none());
            assert!(!save);
            assert!(category.is_none());
            assert_eq!(format, OutputFormat::Console);
        }
        _ => panic!("Expected Replay command"),
    }
}

#[test]
fn test_parse_replay_with_options() {
    let args = Args::try_parse_from([
        "crossmeet",
        "--event",
        "round3.json",
        "replay",
        "decoder.log",
        "--start",
        "10:00:00",
        "--save",
        "-c",
        "ELITE",
        "-f",
        "json",
    ])
    .unwrap();
    assert_eq!(args.event, "round3.json");
    match args.command {
        Command::Replay {
            start,
            save,
            category,
            format,
            ..
        } => {
            assert_eq!(start.as_deref(), Some("10:00:00"));
            assert!(save);
            assert_eq!(category.as_deref(), Some("ELITE"));
            assert_eq!(format, OutputFormat::Json);
        }
        _ => panic!("Expected Replay command"),
    }
}

#[test]
fn test_watch_arm_conflicts_with_start() {
    assert!(Args::try_parse_from(["crossmeet", "watch", "--arm"]).is_ok());
    assert!(Args::try_parse_from(["crossmeet", "watch", "--arm", "--start", "10:00:00"]).is_err());
}

#[test]
fn test_parse_results_tsv_output() {
    let args = Args::try_parse_from([
        "crossmeet", "results", "--format", "tsv", "-o", "out/results.tsv",
    ])
    .unwrap();
    match args.command {
        Command::Results {
            category,
            format,
            output,
        } => {
            assert!(category.is_none());
            assert_eq!(format, OutputFormat::Tsv);
            assert_eq!(output.as_deref(), Some("out/results.tsv"));
        }
        _ => panic!("Expected Results command"),
    }
}

#[test]
fn test_parse_places_single_argument() {
    let args = Args::try_parse_from(["crossmeet", "places", "3 1-2 4"]).unwrap();
    match args.command {
        Command::Places { places } => assert_eq!(places, "3 1-2 4"),
        _ => panic!("Expected Places command"),
    }
}

#[test]
fn test_parse_status_needs_bibs() {
    assert!(Args::try_parse_from(["crossmeet", "status", "dnf"]).is_err());
    let args = Args::try_parse_from(["crossmeet", "status", "dnf", "12", "40"]).unwrap();
    match args.command {
        Command::Status { code, bibs } => {
            assert_eq!(code, "dnf");
            assert_eq!(bibs, ["12", "40"]);
        }
        _ => panic!("Expected Status command"),
    }
}

#[test]
fn test_parse_return_and_comment() {
    assert!(Args::try_parse_from(["crossmeet", "return"]).is_err());
    let args = Args::try_parse_from(["crossmeet", "return", "12", "40"]).unwrap();
    match args.command {
        Command::Return { bibs } => assert_eq!(bibs, ["12", "40"]),
        _ => panic!("Expected Return command"),
    }

    let args =
        Args::try_parse_from(["crossmeet", "comment", "Bib 12 relegated to last"]).unwrap();
    match args.command {
        Command::Comment { text } => assert_eq!(text, "Bib 12 relegated to last"),
        _ => panic!("Expected Comment command"),
    }
}

#[test]
fn test_parse_tally_invalid_format() {
    assert!(Args::try_parse_from(["crossmeet", "tally", "-f", "xml"]).is_err());
    let args = Args::try_parse_from(["crossmeet", "tally", "series"]).unwrap();
    match args.command {
        Command::Tally { name, format } => {
            assert_eq!(name.as_deref(), Some("series"));
            assert_eq!(format, OutputFormat::Console);
        }
        _ => panic!("Expected Tally command"),
    }
}

#[test]
fn test_parse_adjust() {
    let args = Args::try_parse_from([
        "crossmeet", "adjust", "12", "--bunch", "48:10", "--penalty", "none",
    ])
    .unwrap();
    match args.command {
        Command::Adjust {
            bib,
            bunch,
            offset,
            bonus,
            penalty,
        } => {
            assert_eq!(bib, "12");
            assert_eq!(bunch.as_deref(), Some("48:10"));
            assert!(offset.is_none());
            assert!(bonus.is_none());
            assert_eq!(penalty.as_deref(), Some("none"));
        }
        _ => panic!("Expected Adjust command"),
    }
}
