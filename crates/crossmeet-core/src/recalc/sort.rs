//! Sort keys for the rough and final result orders.
//!
//! Keys are plain structs with derived ordering, compared field by field in
//! declaration order.

use std::cmp::{Ordering, Reverse};

use chrono::{NaiveTime, TimeDelta};

use crate::rider::{BibKey, RiderEntry, RiderTable};

/// Orders present values ascending with missing values last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Last<T>(pub Option<T>);

impl<T: Ord> PartialOrd for Last<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: Ord> Ord for Last<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (&self.0, &other.0) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Order used before bunch times exist.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RoughKey {
    withdrawn: bool,
    place: Last<u32>,
    laps: Reverse<u32>,
    finish: Last<NaiveTime>,
    last_passing: Last<NaiveTime>,
    bib: BibKey,
}

impl RoughKey {
    pub fn new(rider: &RiderEntry) -> Self {
        Self {
            withdrawn: !rider.in_race,
            place: Last(rider.rank()),
            laps: Reverse(rider.laps),
            finish: Last(rider.finish),
            last_passing: Last(rider.last_passing()),
            bib: BibKey::new(&rider.bib),
        }
    }
}

/// Result order. Withdrawn riders fall through to status precedence and bib.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct FinalKey {
    withdrawn: bool,
    place: Last<u32>,
    laps: Reverse<u32>,
    bunch: Last<TimeDelta>,
    /// Crossing order inside a bunch
    crossed: Last<NaiveTime>,
    status: u8,
    bib: BibKey,
}

impl FinalKey {
    pub fn new(rider: &RiderEntry) -> Self {
        if rider.in_race {
            Self {
                withdrawn: false,
                place: Last(rider.rank()),
                laps: Reverse(rider.laps),
                bunch: Last(rider.bunch),
                crossed: Last(rider.timing_point()),
                status: 0,
                bib: BibKey::new(&rider.bib),
            }
        } else {
            Self {
                withdrawn: true,
                place: Last(None),
                laps: Reverse(0),
                bunch: Last(None),
                crossed: Last(None),
                status: rider.status().map_or(u8::MAX, |s| s.precedence()),
                bib: BibKey::new(&rider.bib),
            }
        }
    }
}

pub fn rough_sort(riders: &mut RiderTable) {
    riders.sort_by(|a, b| RoughKey::new(a).cmp(&RoughKey::new(b)));
}

pub fn final_sort(riders: &mut RiderTable) {
    riders.sort_by(|a, b| FinalKey::new(a).cmp(&FinalKey::new(b)));
}
