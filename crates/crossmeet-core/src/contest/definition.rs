use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::places::{RankedPlaces, parse_and_rank};
use crate::registry::WarnOnce;
use crate::rider::{BibKey, RiderStatus, RiderTable};
use crate::time::serde_secs_vec;

/// Where a contest takes its placings from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ContestSource {
    /// The finish line places
    Finish,
    /// Every registered rider
    StartList,
    /// Riders who took the start
    Starters,
    /// A named intermediate sprint or climb
    Intermediate(String),
    /// Finish places of one category
    CategoryFinish(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContestDefinition {
    pub name: String,
    pub source: ContestSource,
    #[serde(default)]
    pub tally: Option<String>,
    #[serde(default, with = "serde_secs_vec")]
    pub bonuses: Vec<TimeDelta>,
    #[serde(default)]
    pub points: Vec<u32>,
    /// Award `bonuses[0]` / `points[0]` to every rider in the source
    #[serde(default)]
    pub all_in_source: bool,
    /// Countback slot for climb-style contests
    #[serde(default)]
    pub category: Option<usize>,
}

impl ContestDefinition {
    pub fn new(name: impl Into<String>, source: ContestSource) -> Self {
        Self {
            name: name.into(),
            source,
            tally: None,
            bonuses: Vec::new(),
            points: Vec::new(),
            all_in_source: false,
            category: None,
        }
    }

    /// Finish contests only count outright wins back. A climb scored on the
    /// finish line counts back like any other climb.
    pub fn counts_wins_only(&self) -> bool {
        match self.source {
            ContestSource::CategoryFinish(_) => true,
            ContestSource::Finish => self.category.is_none(),
            _ => false,
        }
    }
}

/// A recorded intermediate: its places string in crossing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Intermediate {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub places: String,
}

/// Configured contests and intermediates.
#[derive(Debug, Default)]
pub struct ContestRegistry {
    contests: Vec<ContestDefinition>,
    intermediates: Vec<Intermediate>,
    warned: WarnOnce,
}

impl Clone for ContestRegistry {
    fn clone(&self) -> Self {
        Self::new(self.contests.clone(), self.intermediates.clone())
    }
}

impl ContestRegistry {
    pub fn new(contests: Vec<ContestDefinition>, intermediates: Vec<Intermediate>) -> Self {
        Self {
            contests,
            intermediates,
            warned: WarnOnce::default(),
        }
    }

    pub fn contests(&self) -> &[ContestDefinition] {
        &self.contests
    }

    pub fn intermediates(&self) -> &[Intermediate] {
        &self.intermediates
    }

    pub fn intermediate(&self, id: &str) -> Option<&Intermediate> {
        self.intermediates.iter().find(|i| i.id == id)
    }

    /// Record places for an intermediate, creating it if needed.
    pub fn set_intermediate_places(&mut self, id: &str, places: &str) {
        match self.intermediates.iter_mut().find(|i| i.id == id) {
            Some(inter) => inter.places = places.to_string(),
            None => self.intermediates.push(Intermediate {
                id: id.to_string(),
                title: String::new(),
                places: places.to_string(),
            }),
        }
    }

    /// Distinct tally names, in definition order.
    pub fn tallies(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for tally in self.contests.iter().filter_map(|c| c.tally.as_deref()) {
            if !names.contains(&tally) {
                names.push(tally);
            }
        }
        names
    }

    /// Resolve a contest's source into ranked bibs.
    pub fn resolve_source(
        &self,
        contest: &ContestDefinition,
        riders: &RiderTable,
        finish: &RankedPlaces,
    ) -> Vec<(String, u32)> {
        match &contest.source {
            ContestSource::Finish => finish.iter().map(|(b, r)| (b.to_string(), r)).collect(),
            ContestSource::StartList => sequential(riders.iter().map(|r| r.bib.as_str())),
            ContestSource::Starters => sequential(
                riders
                    .iter()
                    .filter(|r| r.status() != Some(RiderStatus::Dns))
                    .map(|r| r.bib.as_str()),
            ),
            ContestSource::Intermediate(id) => match self.intermediate(id) {
                Some(inter) => parse_and_rank(&inter.places)
                    .iter()
                    .map(|(b, r)| (b.to_string(), r))
                    .collect(),
                None => {
                    if self.warned.first(id) {
                        warn!(
                            "Contest {} refers to unknown intermediate {}",
                            contest.name, id
                        );
                    }
                    Vec::new()
                }
            },
            ContestSource::CategoryFinish(category) => rerank(
                finish
                    .iter()
                    .filter(|(bib, _)| riders.get(bib).is_some_and(|r| r.in_category(category))),
            ),
        }
    }
}

/// Rank bibs one after another in bib order.
fn sequential<'a>(bibs: impl Iterator<Item = &'a str>) -> Vec<(String, u32)> {
    let mut bibs: Vec<&str> = bibs.collect();
    bibs.sort_by_key(|b| BibKey::new(b));
    bibs.into_iter()
        .zip(1..)
        .map(|(b, rank)| (b.to_string(), rank))
        .collect()
}

/// Re-rank a filtered subset, keeping dead heats together.
fn rerank<'a>(ranked: impl Iterator<Item = (&'a str, u32)>) -> Vec<(String, u32)> {
    let mut out: Vec<(String, u32)> = Vec::new();
    let mut last: Option<(u32, u32)> = None;
    for (bib, original) in ranked {
        let rank = match last {
            Some((prev_original, prev_rank)) if prev_original == original => prev_rank,
            _ => out.len() as u32 + 1,
        };
        last = Some((original, rank));
        out.push((bib.to_string(), rank));
    }
    out
}
