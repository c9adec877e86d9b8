//! Finish-place strings.
//!
//! A places string lists bibs in finish order separated by whitespace.
//! Bibs joined with `-` form a dead heat and share a rank, and the ranks they
//! occupy are used up: `"3 1-2 4"` ranks bib 4 fourth. An `x` holds a rank
//! for a rider not yet identified.

use std::collections::HashSet;

use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::rider::RiderTable;

/// Stands in for an unidentified rider in a places string.
pub const PLACEHOLDER: &str = "x";

/// Problems found in a places string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlacesViolation {
    #[error("duplicate bib {bib}")]
    Duplicate { bib: String },

    #[error("unknown bib {bib}")]
    UnknownBib { bib: String },

    #[error("bib {bib} is not in the race ({status})")]
    Withdrawn { bib: String, status: String },
}

/// Bibs in finish order with their ranks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedPlaces {
    entries: Vec<(String, u32)>,
}

impl RankedPlaces {
    pub fn rank(&self, bib: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(b, _)| b == bib)
            .map(|(_, rank)| *rank)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(b, r)| (b.as_str(), *r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn groups(places: &str) -> impl Iterator<Item = Vec<&str>> {
    places.split_whitespace().map(|group| {
        group
            .split('-')
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .collect()
    })
}

/// Rank every bib in `places`. Repeated bibs keep their first rank.
pub fn parse_and_rank(places: &str) -> RankedPlaces {
    rank_with(places, |_| true)
}

/// Finish ranks for riders still in the race.
///
/// Withdrawn riders listed in `places` get no rank and do not use one up, so
/// the riders behind them move up. Bibs missing from `riders` keep their slot.
pub fn rank_finish(places: &str, riders: &RiderTable) -> RankedPlaces {
    rank_with(places, |bib| match riders.get(bib) {
        Some(rider) if !rider.in_race => {
            warn!("Withdrawn rider {} in finish places", bib);
            false
        }
        _ => true,
    })
}

fn rank_with<F>(places: &str, mut ranks: F) -> RankedPlaces
where
    F: FnMut(&str) -> bool,
{
    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    let mut taken = 0u32;

    for group in groups(places) {
        let rank = taken + 1;
        for bib in group {
            if bib.eq_ignore_ascii_case(PLACEHOLDER) {
                taken += 1;
                continue;
            }
            if !seen.insert(bib) {
                warn!("Duplicate bib {} in places, ignoring repeat", bib);
                continue;
            }
            if ranks(bib) {
                entries.push((bib.to_string(), rank));
                taken += 1;
            }
        }
    }

    RankedPlaces { entries }
}

/// Check `places` against the rider table.
///
/// With `require_in_race`, withdrawn riders may not be placed.
pub fn validate(places: &str, riders: &RiderTable, require_in_race: bool) -> Vec<PlacesViolation> {
    let mut seen = HashSet::new();
    let mut violations = Vec::new();

    for bib in groups(places).flatten() {
        if bib.eq_ignore_ascii_case(PLACEHOLDER) {
            continue;
        }
        if !seen.insert(bib) {
            violations.push(PlacesViolation::Duplicate {
                bib: bib.to_string(),
            });
            continue;
        }
        match riders.get(bib) {
            None => violations.push(PlacesViolation::UnknownBib {
                bib: bib.to_string(),
            }),
            Some(rider) if require_in_race && !rider.in_race => {
                violations.push(PlacesViolation::Withdrawn {
                    bib: bib.to_string(),
                    status: if rider.comment.is_empty() {
                        "withdrawn".to_string()
                    } else {
                        rider.comment.clone()
                    },
                })
            }
            Some(_) => {}
        }
    }

    for violation in &violations {
        warn!("Places: {}", violation);
    }
    violations
}

/// Canonical spacing: single spaces between groups, no empty bibs.
pub fn normalize(places: &str) -> String {
    groups(places)
        .filter(|g| !g.is_empty())
        .map(|g| g.join("-"))
        .collect::<Vec<_>>()
        .join(" ")
}
