//! Read-only projections of a settled snapshot.

use chrono::TimeDelta;
use serde::Serialize;

use crate::recalc::rider_offset;
use crate::registry::CategoryRegistry;
use crate::rider::{BibKey, RiderEntry, RiderStatus};
use crate::state::RaceSnapshot;
use crate::time::{format_elapsed, serde_secs_opt};

/// One line of a category (or overall) result list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultLine {
    /// Category rank; `None` for unplaced or withdrawn riders
    pub rank: Option<u32>,
    pub bib: String,
    pub name: String,
    pub categories: String,
    /// Status code or comment
    pub info: String,
    pub in_race: bool,
    pub laps: u32,
    #[serde(with = "serde_secs_opt")]
    pub elapsed: Option<TimeDelta>,
    /// Down on the category leader at the same lap count
    #[serde(with = "serde_secs_opt")]
    pub gap: Option<TimeDelta>,
    pub laps_down: u32,
    #[serde(with = "serde_secs_opt")]
    pub bonus: Option<TimeDelta>,
    #[serde(with = "serde_secs_opt")]
    pub penalty: Option<TimeDelta>,
}

impl ResultLine {
    /// Printed time column: leader time, `+gap`, `s.t.` or `-N laps`.
    pub fn time_label(&self) -> String {
        if !self.in_race {
            return String::new();
        }
        if self.laps_down > 0 {
            let unit = if self.laps_down == 1 { "lap" } else { "laps" };
            return format!("-{} {}", self.laps_down, unit);
        }
        match (self.gap, self.elapsed) {
            (Some(gap), _) if gap > TimeDelta::zero() => format!("+{}", format_elapsed(gap)),
            (Some(_), _) => "s.t.".to_string(),
            (None, Some(elapsed)) => format_elapsed(elapsed),
            (None, None) => String::new(),
        }
    }
}

/// Flat record for downstream scoring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRecord {
    pub rank: Option<u32>,
    pub bib: String,
    #[serde(with = "serde_secs_opt")]
    pub elapsed: Option<TimeDelta>,
    #[serde(with = "serde_secs_opt")]
    pub bonus: Option<TimeDelta>,
    #[serde(with = "serde_secs_opt")]
    pub penalty: Option<TimeDelta>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartlistEntry {
    pub bib: String,
    pub name: String,
    pub categories: String,
    pub status: String,
}

/// Head counts under a category result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub riders: u32,
    pub starters: u32,
    /// Timed at the finish or given a manual bunch
    pub finished: u32,
    pub abandoned: u32,
    pub out_of_time: u32,
}

impl CategorySummary {
    /// Starters not yet finished or withdrawn.
    pub fn unaccounted(&self) -> u32 {
        self.starters
            .saturating_sub(self.finished + self.abandoned + self.out_of_time)
    }
}

/// Count riders in `category` (or the whole field) by outcome.
///
/// Withdrawn riders without a recognised code count as abandoned.
pub fn category_summary(snapshot: &RaceSnapshot, category: Option<&str>) -> CategorySummary {
    let mut summary = CategorySummary::default();
    let mut dns = 0;
    for rider in snapshot
        .riders
        .iter()
        .filter(|r| category.is_none_or(|c| r.in_category(c)))
    {
        summary.riders += 1;
        if rider.in_race {
            if rider.bunch.is_some() && (rider.finish.is_some() || rider.manual_bunch.is_some()) {
                summary.finished += 1;
            }
            continue;
        }
        match rider.status() {
            Some(RiderStatus::Dns) => dns += 1,
            Some(RiderStatus::Otl) => summary.out_of_time += 1,
            _ => summary.abandoned += 1,
        }
    }
    summary.starters = summary.riders - dns;
    summary
}

/// Rider bonus plus any contest bonus.
fn total_bonus(snapshot: &RaceSnapshot, rider: &RiderEntry) -> Option<TimeDelta> {
    match (rider.bonus, snapshot.contest_results.bonus(&rider.bib)) {
        (Some(a), Some(b)) => Some(a + b),
        (a, b) => a.or(b),
    }
}

/// Results for `category`, or the whole field when `None`.
///
/// Category ranks are renumbered within the category and riders sharing an
/// overall place share the category rank. Elapsed times are measured from
/// the category start.
pub fn category_results(
    snapshot: &RaceSnapshot,
    category: Option<&str>,
    registry: &dyn CategoryRegistry,
) -> Vec<ResultLine> {
    let cat_offset = category
        .and_then(|c| registry.lookup_category_start_offset(c))
        .unwrap_or_else(TimeDelta::zero);

    let mut lines = Vec::new();
    let mut placed = 0u32;
    let mut last_place: Option<(u32, u32)> = None;
    // (laps, elapsed, bunch) of the first timed rider
    let mut leader: Option<(u32, Option<TimeDelta>, Option<TimeDelta>)> = None;

    let riders = snapshot
        .riders
        .iter()
        .filter(|r| category.is_none_or(|c| r.in_category(c)));

    for rider in riders {
        let mut line = ResultLine {
            rank: None,
            bib: rider.bib.clone(),
            name: rider.name.clone(),
            categories: rider.categories.clone(),
            info: rider.comment.clone(),
            in_race: rider.in_race,
            laps: rider.laps,
            elapsed: None,
            gap: None,
            laps_down: 0,
            bonus: total_bonus(snapshot, rider),
            penalty: rider.penalty,
        };

        if rider.in_race {
            line.elapsed = match category {
                Some(_) => rider.bunch.map(|bunch| {
                    let own = rider_offset(rider, registry);
                    bunch + own - rider.start_offset.unwrap_or(cat_offset)
                }),
                None => rider.bunch,
            };

            if let Some(overall) = rider.rank() {
                let rank = match last_place {
                    Some((prev, rank)) if prev == overall => rank,
                    _ => placed + 1,
                };
                placed += 1;
                last_place = Some((overall, rank));
                line.rank = Some(rank);
            }

            match leader {
                None => leader = Some((rider.laps, line.elapsed, rider.bunch)),
                Some((laps, lead_time, lead_bunch)) => {
                    // last seen before the leader crossed: still out on the leader's lap
                    let on_course = rider
                        .bunch
                        .zip(lead_bunch)
                        .is_some_and(|(bunch, lead)| bunch < lead);
                    let laps_done = rider.laps + u32::from(on_course);
                    if laps_done < laps {
                        line.laps_down = laps - laps_done;
                    } else if !on_course {
                        line.gap = line.elapsed.zip(lead_time).map(|(t, lead)| t - lead);
                    }
                }
            }
        }
        lines.push(line);
    }
    lines
}

/// (rank, bib, elapsed, bonus, penalty) in result order.
pub fn result_records(snapshot: &RaceSnapshot) -> impl Iterator<Item = ResultRecord> + '_ {
    snapshot.riders.iter().map(|rider| ResultRecord {
        rank: rider.rank().filter(|_| rider.in_race),
        bib: rider.bib.clone(),
        elapsed: rider.bunch.filter(|_| rider.in_race),
        bonus: total_bonus(snapshot, rider),
        penalty: rider.penalty,
    })
}

/// Every registered rider in bib order.
pub fn startlist(snapshot: &RaceSnapshot) -> Vec<StartlistEntry> {
    let mut riders: Vec<&RiderEntry> = snapshot.riders.iter().collect();
    riders.sort_by_cached_key(|r| BibKey::new(&r.bib));
    riders
        .into_iter()
        .map(|r| StartlistEntry {
            bib: r.bib.clone(),
            name: r.name.clone(),
            categories: r.categories.clone(),
            status: r.comment.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{CategoryInfo, CategoryTable};

    fn rider(bib: &str, cat: &str, place: &str, laps: u32, bunch: Option<i64>) -> RiderEntry {
        let mut r = RiderEntry::new(bib, format!("Rider {bib}"), cat);
        r.place = place.into();
        r.laps = laps;
        r.bunch = bunch.map(TimeDelta::seconds);
        r
    }

    fn snapshot(riders: Vec<RiderEntry>) -> RaceSnapshot {
        RaceSnapshot {
            riders,
            ..Default::default()
        }
    }

    #[test]
    fn test_category_ranks_and_dead_heat() {
        let snap = snapshot(vec![
            rider("1", "ELITE", "1", 5, Some(3000)),
            rider("2", "U23", "2", 5, Some(3005)),
            rider("3", "ELITE", "3", 5, Some(3010)),
            rider("4", "ELITE", "3", 5, Some(3010)),
            rider("5", "ELITE", "5", 5, Some(3020)),
        ]);
        let lines = category_results(&snap, Some("elite"), &CategoryTable::new());
        let ranks: Vec<_> = lines.iter().map(|l| (l.bib.as_str(), l.rank)).collect();
        assert_eq!(
            ranks,
            [("1", Some(1)), ("3", Some(2)), ("4", Some(2)), ("5", Some(4))]
        );
        assert_eq!(lines[1].time_label(), "+0:10");
        assert_eq!(lines[0].time_label(), "50:00");
    }

    #[test]
    fn test_lapped_riders_marked() {
        let snap = snapshot(vec![
            rider("1", "A", "1", 5, Some(3000)),
            rider("2", "A", "2", 4, Some(3050)),
            rider("3", "A", "", 2, Some(3200)),
        ]);
        let lines = category_results(&snap, None, &CategoryTable::new());
        assert_eq!(lines[1].laps_down, 1);
        assert_eq!(lines[1].time_label(), "-1 lap");
        assert_eq!(lines[2].time_label(), "-3 laps");
        assert_eq!(lines[2].rank, None);
    }

    #[test]
    fn test_rider_still_on_leaders_lap_not_lapped() {
        let snap = snapshot(vec![
            rider("1", "A", "", 3, Some(1440)),
            rider("2", "A", "", 2, Some(980)),
            rider("3", "A", "", 1, Some(700)),
        ]);
        let lines = category_results(&snap, None, &CategoryTable::new());
        assert_eq!(lines[1].laps_down, 0);
        assert_eq!(lines[1].gap, None);
        assert_eq!(lines[1].time_label(), "16:20");
        // seen before the leader crossed, but a full lap further back
        assert_eq!(lines[2].time_label(), "-1 lap");
    }

    #[test]
    fn test_category_summary_counts() {
        let mut finished = rider("1", "A", "1", 5, Some(3000));
        finished.finish = Some(chrono::NaiveTime::from_hms_opt(10, 50, 0).unwrap());
        let mut manual = rider("2", "A", "2", 5, Some(3010));
        manual.manual_bunch = Some(TimeDelta::seconds(3010));
        let on_course = rider("3", "A", "", 4, Some(2500));
        let mut dnf = rider("4", "A", "", 2, None);
        dnf.set_status("dnf");
        let mut pulled = rider("5", "A", "", 3, None);
        pulled.set_status("hd");
        let mut dns = rider("6", "A", "", 0, None);
        dns.set_status("dns");
        let other = rider("7", "B", "", 5, Some(3000));

        let snap = snapshot(vec![finished, manual, on_course, dnf, pulled, dns, other]);
        let summary = category_summary(&snap, Some("a"));
        assert_eq!(
            summary,
            CategorySummary {
                riders: 6,
                starters: 5,
                finished: 2,
                abandoned: 1,
                out_of_time: 1,
            }
        );
        assert_eq!(summary.unaccounted(), 1);
        assert_eq!(category_summary(&snap, None).riders, 7);
    }

    #[test]
    fn test_category_offset_applied() {
        let mut reg = CategoryTable::new();
        reg.insert(
            "JUNIOR",
            CategoryInfo {
                start_offset: Some(TimeDelta::seconds(60)),
                ..Default::default()
            },
        );
        // Raced primarily as MASTER (no offset) but also scored in JUNIOR.
        let snap = snapshot(vec![rider("7", "MASTER JUNIOR", "1", 4, Some(2460))]);
        let lines = category_results(&snap, Some("JUNIOR"), &reg);
        assert_eq!(lines[0].elapsed, Some(TimeDelta::seconds(2400)));
    }

    #[test]
    fn test_withdrawn_riders_have_no_rank_or_time() {
        let mut out = rider("9", "A", "", 3, Some(100));
        out.set_status("dnf");
        let snap = snapshot(vec![rider("1", "A", "1", 5, Some(3000)), out]);
        let lines = category_results(&snap, Some("A"), &CategoryTable::new());
        assert_eq!(lines[1].info, "dnf");
        assert_eq!(lines[1].elapsed, None);
        assert_eq!(lines[1].time_label(), "");

        let records: Vec<_> = result_records(&snap).collect();
        assert_eq!(records[1].rank, None);
        assert_eq!(records[1].elapsed, None);
    }

    #[test]
    fn test_records_combine_bonuses() {
        let mut a = rider("1", "A", "1", 5, Some(3000));
        a.bonus = Some(TimeDelta::seconds(5));
        let mut snap = snapshot(vec![a]);
        snap.contest_results
            .bonuses
            .insert("1".into(), TimeDelta::seconds(10));
        let records: Vec<_> = result_records(&snap).collect();
        assert_eq!(records[0].rank, Some(1));
        assert_eq!(records[0].bonus, Some(TimeDelta::seconds(15)));
    }

    #[test]
    fn test_startlist_bib_order() {
        let mut dns = rider("2", "A", "", 0, None);
        dns.set_status("dns");
        let snap = snapshot(vec![
            rider("10", "A", "", 0, None),
            dns,
            rider("1", "B", "", 0, None),
        ]);
        let list = startlist(&snap);
        let bibs: Vec<_> = list.iter().map(|e| e.bib.as_str()).collect();
        assert_eq!(bibs, ["1", "2", "10"]);
        assert_eq!(list[1].status, "dns");
    }
}
