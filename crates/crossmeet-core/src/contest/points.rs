use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::TimeDelta;
use serde::Serialize;
use tracing::{debug, warn};

use super::ContestDefinition;
use crate::config::contest::COUNTBACK_SIZE;
use crate::rider::BibKey;

/// Per-rank win counts used to split riders level on points.
///
/// Compared lexicographically: more wins in an earlier slot ranks higher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Countback(pub [u32; COUNTBACK_SIZE]);

impl Default for Countback {
    fn default() -> Self {
        Self([0; COUNTBACK_SIZE])
    }
}

impl Countback {
    pub fn increment(&mut self, slot: usize) {
        let slot = slot.min(COUNTBACK_SIZE - 1);
        self.0[slot] += 1;
    }

    pub fn get(&self, slot: usize) -> u32 {
        self.0.get(slot).copied().unwrap_or(0)
    }
}

/// Accumulated points for one tally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TallyTable {
    pub points: HashMap<String, u32>,
    pub countback: HashMap<String, Countback>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TallyStanding {
    pub rank: u32,
    pub bib: String,
    pub points: u32,
    pub countback: Countback,
}

impl TallyTable {
    pub fn points(&self, bib: &str) -> u32 {
        self.points.get(bib).copied().unwrap_or(0)
    }

    /// Standings by points, then countback, then bib.
    ///
    /// Riders level on both points and countback share a rank.
    pub fn standings(&self) -> Vec<TallyStanding> {
        let mut rows: Vec<(&String, u32, Countback)> = self
            .points
            .iter()
            .map(|(bib, pts)| {
                (
                    bib,
                    *pts,
                    self.countback.get(bib).copied().unwrap_or_default(),
                )
            })
            .collect();
        rows.sort_by_key(|(bib, pts, cb)| (Reverse(*pts), Reverse(*cb), BibKey::new(bib)));

        let mut standings: Vec<TallyStanding> = Vec::with_capacity(rows.len());
        for (i, (bib, points, countback)) in rows.into_iter().enumerate() {
            let rank = match standings.last() {
                Some(prev) if prev.points == points && prev.countback == countback => prev.rank,
                _ => i as u32 + 1,
            };
            standings.push(TallyStanding {
                rank,
                bib: bib.clone(),
                points,
                countback,
            });
        }
        standings
    }
}

/// Bonus and tally maps produced by one recalculation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContestResults {
    pub bonuses: HashMap<String, TimeDelta>,
    pub tallies: BTreeMap<String, TallyTable>,
}

impl ContestResults {
    pub fn clear(&mut self) {
        self.bonuses.clear();
        self.tallies.clear();
    }

    pub fn bonus(&self, bib: &str) -> Option<TimeDelta> {
        self.bonuses.get(bib).copied()
    }

    pub fn tally(&self, name: &str) -> Option<&TallyTable> {
        self.tallies.get(name)
    }

    /// Award a contest's bonuses and points over its ranked bibs.
    pub fn assign_places(&mut self, contest: &ContestDefinition, ranked: &[(String, u32)]) {
        let mut awarded: HashSet<&str> = HashSet::new();

        for (bib, rank) in ranked {
            if !awarded.insert(bib.as_str()) {
                warn!("Contest {}: duplicate bib {} ignored", contest.name, bib);
                continue;
            }
            let index = if contest.all_in_source {
                0
            } else {
                (*rank as usize).saturating_sub(1)
            };

            if let Some(bonus) = contest.bonuses.get(index)
                && *bonus > TimeDelta::zero()
            {
                *self.bonuses.entry(bib.clone()).or_insert_with(TimeDelta::zero) += *bonus;
            }

            let Some(tally) = &contest.tally else {
                continue;
            };
            let table = self.tallies.entry(tally.clone()).or_default();
            if let Some(points) = contest.points.get(index) {
                *table.points.entry(bib.clone()).or_insert(0) += points;
                debug!("{}: {} +{} pts ({})", tally, bib, points, contest.name);
            }

            if contest.all_in_source {
                continue;
            }
            // placings past the points vector still count back
            let countback = table.countback.entry(bib.clone()).or_default();
            if contest.counts_wins_only() {
                if *rank == 1 {
                    countback.increment(0);
                }
            } else if let Some(category) = contest.category {
                // climbs count category wins only
                if *rank == 1 {
                    countback.increment(category);
                }
            } else {
                countback.increment(*rank as usize);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contest::ContestSource;

    fn ranked(items: &[(&str, u32)]) -> Vec<(String, u32)> {
        items.iter().map(|(b, r)| (b.to_string(), *r)).collect()
    }

    fn sprint(points: Vec<u32>) -> ContestDefinition {
        let mut c = ContestDefinition::new("sprint", ContestSource::Intermediate("s1".into()));
        c.tally = Some("points".into());
        c.points = points;
        c
    }

    #[test]
    fn test_points_indexed_by_rank() {
        let mut results = ContestResults::default();
        results.assign_places(&sprint(vec![5, 3]), &ranked(&[("7", 1), ("8", 2), ("9", 3)]));
        let tally = results.tally("points").unwrap();
        assert_eq!(tally.points("7"), 5);
        assert_eq!(tally.points("8"), 3);
        assert_eq!(tally.points("9"), 0);
        assert!(!tally.points.contains_key("9"));
    }

    #[test]
    fn test_dead_heat_shares_award() {
        let mut results = ContestResults::default();
        results.assign_places(&sprint(vec![5, 3, 1]), &ranked(&[("7", 1), ("8", 1), ("9", 3)]));
        let tally = results.tally("points").unwrap();
        assert_eq!(tally.points("7"), 5);
        assert_eq!(tally.points("8"), 5);
        assert_eq!(tally.points("9"), 1);
    }

    #[test]
    fn test_all_in_source_uniform_award() {
        let mut contest = ContestDefinition::new("lap", ContestSource::StartList);
        contest.all_in_source = true;
        contest.bonuses = vec![TimeDelta::seconds(2), TimeDelta::seconds(1)];
        let mut results = ContestResults::default();
        results.assign_places(&contest, &ranked(&[("1", 1), ("2", 2), ("3", 3)]));
        assert!(
            ["1", "2", "3"]
                .iter()
                .all(|b| results.bonus(b) == Some(TimeDelta::seconds(2)))
        );
    }

    #[test]
    fn test_duplicate_bib_ignored() {
        let mut results = ContestResults::default();
        results.assign_places(&sprint(vec![5, 3]), &ranked(&[("7", 1), ("7", 2)]));
        assert_eq!(results.tally("points").unwrap().points("7"), 5);
    }

    #[test]
    fn test_finish_countback_counts_wins_only() {
        let mut contest = ContestDefinition::new("finish", ContestSource::Finish);
        contest.tally = Some("points".into());
        contest.points = vec![10, 8];
        let mut results = ContestResults::default();
        results.assign_places(&contest, &ranked(&[("1", 1), ("2", 2)]));
        let tally = results.tally("points").unwrap();
        assert_eq!(tally.countback["1"].get(0), 1);
        assert_eq!(tally.countback["2"], Countback::default());
    }

    #[test]
    fn test_countback_breaks_points_tie() {
        let mut results = ContestResults::default();
        // bib 8 wins one sprint, bib 7 takes two seconds: both on 6 points
        results.assign_places(&sprint(vec![6, 3]), &ranked(&[("8", 1)]));
        results.assign_places(&sprint(vec![6, 3]), &ranked(&[("9", 1), ("7", 2)]));
        results.assign_places(&sprint(vec![6, 3]), &ranked(&[("9", 1), ("7", 2)]));

        let standings = results.tally("points").unwrap().standings();
        let order: Vec<_> = standings.iter().map(|s| s.bib.as_str()).collect();
        assert_eq!(order, ["9", "8", "7"]);
        assert_eq!(standings[1].points, standings[2].points);
        assert_eq!(standings[2].rank, 3);
    }

    #[test]
    fn test_climb_category_slot() {
        let mut contest = ContestDefinition::new("kom", ContestSource::Intermediate("k1".into()));
        contest.tally = Some("kom".into());
        contest.points = vec![3, 2, 1];
        contest.category = Some(2);
        let mut results = ContestResults::default();
        results.assign_places(&contest, &ranked(&[("1", 1), ("2", 2)]));
        let tally = results.tally("kom").unwrap();
        assert_eq!(tally.countback["1"].get(2), 1);
        assert_eq!(tally.countback["2"].get(2), 0);
        assert_eq!(tally.countback["2"], Countback::default());
    }

    #[test]
    fn test_countback_beyond_points_vector() {
        let mut results = ContestResults::default();
        results.assign_places(&sprint(vec![5]), &ranked(&[("7", 1), ("8", 2), ("9", 3)]));
        let tally = results.tally("points").unwrap();
        assert_eq!(tally.points("8"), 0);
        assert_eq!(tally.countback["8"].get(2), 1);
        assert_eq!(tally.countback["9"].get(3), 1);
    }

    #[test]
    fn test_climb_on_finish_line_counts_category_wins() {
        let mut contest = ContestDefinition::new("summit finish", ContestSource::Finish);
        contest.tally = Some("kom".into());
        contest.points = vec![6, 4];
        contest.category = Some(1);
        let mut results = ContestResults::default();
        results.assign_places(&contest, &ranked(&[("3", 1), ("4", 2)]));
        let tally = results.tally("kom").unwrap();
        assert_eq!(tally.countback["3"].get(1), 1);
        assert_eq!(tally.countback["3"].get(0), 0);
        assert_eq!(tally.countback["4"], Countback::default());
    }
}
