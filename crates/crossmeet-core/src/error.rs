use thiserror::Error;

use crate::clock::ClockState;
use crate::places::PlacesViolation;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid time value: {0}")]
    InvalidTime(String),

    #[error("Invalid decoder event: {0}")]
    InvalidEvent(String),

    #[error("Places rejected: {}", format_violations(.violations))]
    PlacesRejected { violations: Vec<PlacesViolation> },

    #[error("Rider not found: {0}")]
    UnknownRider(String),

    #[error("Duplicate rider: {0}")]
    DuplicateRider(String),

    #[error("Invalid clock transition: {from:?} -> {to:?}")]
    InvalidTransition { from: ClockState, to: ClockState },

    #[error("Config parse error: {0}")]
    ConfigParseError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

fn format_violations(violations: &[PlacesViolation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
