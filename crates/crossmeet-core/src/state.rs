//! Race state owned by the meet controller.

use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::clock::RaceClock;
use crate::contest::{ContestRegistry, ContestResults};
use crate::rider::{RiderEntry, RiderTable};

/// Derived status of the result set.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, IntoStaticStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RaceStatus {
    /// No timing activity yet
    #[default]
    PreRace,
    /// Riders on course, nobody placed
    Virtual,
    Provisional,
    Final,
}

impl RaceStatus {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

impl std::fmt::Display for RaceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything the passing processor and recalculation passes operate on.
#[derive(Debug, Clone, Default)]
pub struct RaceState {
    pub riders: RiderTable,
    pub clock: RaceClock,
    /// Finish places string
    pub places: String,
    pub contests: ContestRegistry,
    /// Produced by recalculation
    pub contest_results: ContestResults,
    pub status: RaceStatus,
    /// Commissaires' decisions, in the order they were made
    pub comments: Vec<String>,
}

impl RaceState {
    pub fn new(riders: RiderTable, clock: RaceClock) -> Self {
        Self {
            riders,
            clock,
            ..Default::default()
        }
    }

    pub fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            riders: self.riders.clone(),
            places: self.places.clone(),
        }
    }

    pub fn restore(&mut self, checkpoint: Checkpoint) {
        self.riders = checkpoint.riders;
        self.places = checkpoint.places;
    }

    /// Read-only copy for exporters and other consumers.
    pub fn snapshot(&self) -> RaceSnapshot {
        RaceSnapshot {
            riders: self.riders.as_slice().to_vec(),
            clock: self.clock.clone(),
            places: self.places.clone(),
            status: self.status,
            contest_results: self.contest_results.clone(),
            comments: self.comments.clone(),
        }
    }
}

/// Settled results as seen by consumers; riders are in result order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RaceSnapshot {
    pub riders: Vec<RiderEntry>,
    pub clock: RaceClock,
    pub places: String,
    pub status: RaceStatus,
    pub contest_results: ContestResults,
    pub comments: Vec<String>,
}

impl RaceSnapshot {
    pub fn rider(&self, bib: &str) -> Option<&RiderEntry> {
        self.riders.iter().find(|r| r.bib == bib)
    }
}

/// Undo point taken before destructive edits.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    riders: RiderTable,
    places: String,
}
