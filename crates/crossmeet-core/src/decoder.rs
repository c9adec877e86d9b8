//! Decoder line protocol.
//!
//! Each line is `TIME<TAB>TAG[<TAB>CHANNEL]`. The reserved start-trigger tag
//! marks the start gun and lines starting with `#` carry decoder status text.
//! Blank lines are skipped by the reader.

use std::io::BufRead;
use std::sync::mpsc::Sender;

use chrono::NaiveTime;
use tracing::{debug, warn};

use crate::config::decoder::{START_TRIGGER_TAG, STATUS_PREFIX};
use crate::error::{Error, Result};
use crate::time::parse_tod;

#[derive(Debug, Clone, PartialEq)]
pub enum DecoderEvent {
    Passing {
        bib: String,
        time: NaiveTime,
        channel: Option<String>,
    },
    StartTrigger {
        time: NaiveTime,
    },
    Status(String),
}

impl DecoderEvent {
    /// Parse one non-blank decoder line.
    pub fn parse_line(line: &str) -> Result<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if let Some(status) = line.strip_prefix(STATUS_PREFIX) {
            return Ok(Self::Status(status.trim().to_string()));
        }

        let mut fields = line.split('\t').map(str::trim);
        let (Some(time), Some(tag)) = (fields.next(), fields.next()) else {
            return Err(Error::InvalidEvent(line.to_string()));
        };
        if tag.is_empty() {
            return Err(Error::InvalidEvent(line.to_string()));
        }
        let time = parse_tod(time)?;
        let channel = fields.next().filter(|c| !c.is_empty()).map(str::to_string);

        if tag.eq_ignore_ascii_case(START_TRIGGER_TAG) {
            Ok(Self::StartTrigger { time })
        } else {
            Ok(Self::Passing {
                bib: tag.to_string(),
                time,
                channel,
            })
        }
    }

    /// Render back to a decoder line.
    pub fn to_line(&self) -> String {
        match self {
            Self::Passing {
                bib,
                time,
                channel: Some(channel),
            } => format!("{}\t{}\t{}", time.format("%H:%M:%S%.3f"), bib, channel),
            Self::Passing { bib, time, .. } => format!("{}\t{}", time.format("%H:%M:%S%.3f"), bib),
            Self::StartTrigger { time } => {
                format!("{}\t{}", time.format("%H:%M:%S%.3f"), START_TRIGGER_TAG)
            }
            Self::Status(text) => format!("{}{}", STATUS_PREFIX, text),
        }
    }
}

/// Parse every line of `reader`, skipping blanks and logging bad lines.
pub fn read_events<R: BufRead>(reader: R) -> Result<Vec<DecoderEvent>> {
    let mut events = Vec::new();
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match DecoderEvent::parse_line(&line) {
            Ok(event) => events.push(event),
            Err(e) => warn!("Line {}: {}", number + 1, e),
        }
    }
    Ok(events)
}

/// Forward decoder lines from `reader` to `tx` until EOF or the receiver hangs up.
pub fn pump_events<R: BufRead>(reader: R, tx: &Sender<DecoderEvent>) -> Result<usize> {
    let mut sent = 0;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event = match DecoderEvent::parse_line(&line) {
            Ok(event) => event,
            Err(e) => {
                warn!("Bad decoder line: {}", e);
                continue;
            }
        };
        if tx.send(event).is_err() {
            debug!("Event receiver closed");
            break;
        }
        sent += 1;
    }
    Ok(sent)
}
