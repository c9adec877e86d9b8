use chrono::{NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};

use super::RiderStatus;
use crate::time::serde_secs_opt;

/// A single registered rider.
///
/// `place`, `bunch` and `on_current_lap` are derived and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiderEntry {
    pub bib: String,
    #[serde(default)]
    pub name: String,
    /// Space-separated category tags; the first one is the primary category
    #[serde(default)]
    pub categories: String,
    /// Status or free comment code
    #[serde(default)]
    pub comment: String,
    #[serde(default = "default_in_race")]
    pub in_race: bool,
    #[serde(skip)]
    pub place: String,
    #[serde(default)]
    pub laps: u32,
    #[serde(default)]
    pub finish: Option<NaiveTime>,
    #[serde(skip)]
    pub bunch: Option<TimeDelta>,
    #[serde(default, with = "serde_secs_opt")]
    pub manual_bunch: Option<TimeDelta>,
    #[serde(default, with = "serde_secs_opt")]
    pub start_offset: Option<TimeDelta>,
    #[serde(default, with = "serde_secs_opt")]
    pub bonus: Option<TimeDelta>,
    #[serde(default, with = "serde_secs_opt")]
    pub penalty: Option<TimeDelta>,
    #[serde(default)]
    pub passings: Vec<NaiveTime>,
    #[serde(skip)]
    pub on_current_lap: bool,
}

fn default_in_race() -> bool {
    true
}

impl RiderEntry {
    pub fn new(bib: impl Into<String>, name: impl Into<String>, categories: impl Into<String>) -> Self {
        Self {
            bib: bib.into(),
            name: name.into(),
            categories: categories.into(),
            comment: String::new(),
            in_race: true,
            place: String::new(),
            laps: 0,
            finish: None,
            bunch: None,
            manual_bunch: None,
            start_offset: None,
            bonus: None,
            penalty: None,
            passings: Vec::new(),
            on_current_lap: false,
        }
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.split_whitespace()
    }

    pub fn primary_category(&self) -> Option<&str> {
        self.categories().next()
    }

    pub fn in_category(&self, category: &str) -> bool {
        self.categories().any(|c| c.eq_ignore_ascii_case(category))
    }

    pub fn status(&self) -> Option<RiderStatus> {
        RiderStatus::from_code(&self.comment)
    }

    /// True once the rider carries a did-not-finish style status.
    pub fn is_terminal(&self) -> bool {
        self.status().is_some()
    }

    pub fn last_passing(&self) -> Option<NaiveTime> {
        self.passings.last().copied()
    }

    /// Numeric finish place, if placed.
    pub fn rank(&self) -> Option<u32> {
        self.place.parse().ok()
    }

    /// Finish time, falling back to the most recent passing.
    pub fn timing_point(&self) -> Option<NaiveTime> {
        self.finish.or_else(|| self.last_passing())
    }

    /// Apply a status code, withdrawing the rider for terminal codes.
    pub fn set_status(&mut self, code: &str) {
        self.comment = code.trim().to_string();
        self.in_race = !self.is_terminal();
    }
}

/// Sort key ordering bibs numerically where possible (`"2" < "10" < "10a" < "x"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct BibKey(u64, String);

impl BibKey {
    pub fn new(bib: &str) -> Self {
        let digits: String = bib.chars().take_while(|c| c.is_ascii_digit()).collect();
        let number = digits.parse().unwrap_or(u64::MAX);
        Self(number, bib.to_ascii_lowercase())
    }
}
