//! Bunch time assignment.

use chrono::{NaiveTime, TimeDelta};
use tracing::{debug, warn};

use crate::registry::CategoryRegistry;
use crate::rider::RiderEntry;
use crate::state::RaceState;
use crate::time::truncate_secs;

/// Start offset for a rider: their own, else their primary category's.
pub fn rider_offset(rider: &RiderEntry, registry: &dyn CategoryRegistry) -> TimeDelta {
    rider
        .start_offset
        .or_else(|| {
            rider
                .primary_category()
                .and_then(|c| registry.lookup_category_start_offset(c))
        })
        .unwrap_or_else(TimeDelta::zero)
}

/// Assign bunch times walking riders in their current order.
///
/// A rider crossing at or after the rider before, and less than
/// `gap_threshold` behind, shares that rider's bunch time, so a group chains
/// together. A manual bunch sets the time carried to the next rider but not
/// the measured crossing it is compared against. Placed riders with no time
/// data carry the previous bunch forward. The earliest finish seen becomes
/// the race finish.
pub fn compute_bunches(
    state: &mut RaceState,
    registry: &dyn CategoryRegistry,
    gap_threshold: TimeDelta,
) {
    let RaceState { riders, clock, .. } = state;
    let start = clock.start;

    let mut prev_elapsed: Option<TimeDelta> = None;
    let mut prev_bunch: Option<TimeDelta> = None;
    let mut first_finish: Option<NaiveTime> = None;

    for rider in riders.iter_mut() {
        rider.bunch = None;
        if !rider.in_race {
            continue;
        }

        if let Some(manual) = rider.manual_bunch {
            rider.bunch = Some(manual);
            prev_bunch = Some(manual);
            continue;
        }

        let elapsed = match (rider.timing_point(), start) {
            (Some(t), Some(start)) => {
                let elapsed = t - start - rider_offset(rider, registry);
                if elapsed < TimeDelta::zero() {
                    warn!("{}: time {} before start, ignoring", rider.bib, t);
                    None
                } else {
                    Some(elapsed)
                }
            }
            _ => None,
        };

        match elapsed {
            Some(elapsed) => {
                let bunch = match (prev_elapsed, prev_bunch) {
                    (Some(prev), Some(bunch))
                        if elapsed >= prev && elapsed - prev < gap_threshold =>
                    {
                        bunch
                    }
                    _ => truncate_secs(elapsed),
                };
                rider.bunch = Some(bunch);
                prev_elapsed = Some(elapsed);
                prev_bunch = Some(bunch);

                if let Some(finish) = rider.finish {
                    first_finish = Some(first_finish.map_or(finish, |f| f.min(finish)));
                }
            }
            None if !rider.place.is_empty() => {
                rider.bunch = prev_bunch;
                debug!("{}: placed without time, carrying bunch", rider.bib);
            }
            None => {}
        }
    }

    if let Some(finish) = first_finish
        && clock.finish != Some(finish)
    {
        debug!("Race finish adjusted to {}", finish);
        clock.finish = Some(finish);
    }
}
