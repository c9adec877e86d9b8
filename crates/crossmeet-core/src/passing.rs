//! Lap accounting for transponder and manual passings.
//!
//! Passings only mutate rider lap/time fields and the lap clock. They never
//! recalculate results; callers mark the meet dirty from the outcome.

use chrono::{NaiveTime, TimeDelta};
use tracing::{debug, info, warn};

use crate::clock::ClockState;
use crate::registry::CategoryRegistry;
use crate::rider::{RiderEntry, RiderTable};
use crate::state::RaceState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Clock is idle, ready or armed for start
    ClockNotRunning,
    UnknownRider,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// First passing arrived sooner than a minimum lap after the start
    TooEarly { elapsed: TimeDelta },
    /// Passing arrived sooner than a minimum lap after the previous one
    ShortLap { lap: TimeDelta },
}

/// What a passing did to the race state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassingOutcome {
    Ignored(IgnoreReason),
    Rejected(RejectReason),
    /// Stored in the rider's history without changing laps
    Recorded,
    Lap {
        laps: u32,
        /// Rider is on the leader's lap
        seen: bool,
        /// The clock armed a new lap
        new_lap: bool,
    },
    Finished {
        laps: u32,
    },
    DuplicateFinish,
}

impl PassingOutcome {
    /// True if results need recalculating.
    pub fn is_dirty(&self) -> bool {
        matches!(self, Self::Lap { .. } | Self::Finished { .. })
    }

    /// True if the announcer should be told about this rider.
    pub fn is_seen(&self) -> bool {
        matches!(self, Self::Lap { seen: true, .. } | Self::Finished { .. })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PassingProcessor {
    /// Auto-add unknown riders while the race is timing
    pub club_mode: bool,
}

impl PassingProcessor {
    pub fn new(club_mode: bool) -> Self {
        Self { club_mode }
    }

    /// Apply one passing of `bib` at `t`.
    pub fn on_passing(
        &self,
        state: &mut RaceState,
        registry: &dyn CategoryRegistry,
        bib: &str,
        t: NaiveTime,
    ) -> PassingOutcome {
        if matches!(
            state.clock.state,
            ClockState::Idle | ClockState::Ready | ClockState::ArmStart
        ) {
            debug!("Passing {} @ {} ignored: clock {}", bib, t, state.clock.state);
            return PassingOutcome::Ignored(IgnoreReason::ClockNotRunning);
        }

        if !state.riders.contains(bib) && !self.admit_unknown(state, bib) {
            return PassingOutcome::Ignored(IgnoreReason::UnknownRider);
        }

        let RaceState { riders, clock, .. } = state;
        let Some(rider) = riders.get_mut(bib) else {
            return PassingOutcome::Ignored(IgnoreReason::UnknownRider);
        };

        let category = rider.primary_category().map(str::to_string);
        let offset = rider
            .start_offset
            .or_else(|| {
                category
                    .as_deref()
                    .and_then(|c| registry.lookup_category_start_offset(c))
            })
            .unwrap_or_else(TimeDelta::zero);
        let Some(elapsed) = clock.elapsed(t, offset) else {
            return PassingOutcome::Ignored(IgnoreReason::ClockNotRunning);
        };

        match rider.last_passing() {
            None if elapsed < clock.early_pass_limit() => {
                warn!("Rejected {} @ {}: too early ({}s)", bib, t, elapsed.num_seconds());
                return PassingOutcome::Rejected(RejectReason::TooEarly { elapsed });
            }
            Some(last) if clock.min_lap.is_some_and(|min| t - last < min) => {
                let lap = t - last;
                warn!("Rejected {} @ {}: short lap ({}s)", bib, t, lap.num_seconds());
                return PassingOutcome::Rejected(RejectReason::ShortLap { lap });
            }
            _ => {}
        }
        rider.passings.push(t);

        let target = category
            .as_deref()
            .and_then(|c| registry.lookup_category_target_laps(c));
        let finish_lap = clock.state == ClockState::ArmFinish
            || target.is_some_and(|n| rider.laps + 1 >= n);

        if finish_lap {
            if clock.finish.is_none() {
                clock.finish = Some(t);
            }
            if rider.finish.is_some() {
                warn!("Duplicate finish for {} @ {} ignored", bib, t);
                return PassingOutcome::DuplicateFinish;
            }
            if rider.is_terminal() {
                debug!("{} ({}) crossed the finish", bib, rider.comment);
                return PassingOutcome::Recorded;
            }
            rider.finish = Some(t);
            rider.laps += 1;
            if clock.lap_finish.is_none() {
                clock.record_lap(t);
            }
            info!("Finish: {} @ {} ({} laps)", bib, t, rider.laps);
            return PassingOutcome::Finished { laps: rider.laps };
        }

        if clock.state != ClockState::Running || rider.is_terminal() || rider.finish.is_some() {
            return PassingOutcome::Recorded;
        }

        let cur = clock.cur_lap;
        let laps = rider.laps as i32;
        let armed = clock.lap_finish.is_some();
        let leader = if armed { laps == cur } else { laps == cur - 1 };

        if leader {
            if armed {
                clock.advance_lap();
            }
            clock.record_lap(t);
            clear_current_lap(riders);
            let Some(rider) = riders.get_mut(bib) else {
                return PassingOutcome::Recorded;
            };
            rider.laps = clock.cur_lap.max(0) as u32;
            rider.on_current_lap = true;
            info!("Lap {}: {} leads @ {}", clock.cur_lap, bib, t);
            return PassingOutcome::Lap {
                laps: rider.laps,
                seen: true,
                new_lap: true,
            };
        }

        rider.laps += 1;
        let seen = armed && rider.laps as i32 == cur;
        if seen {
            rider.on_current_lap = true;
        }
        debug!("{} lap {} @ {}", bib, rider.laps, t);
        PassingOutcome::Lap {
            laps: rider.laps,
            seen,
            new_lap: false,
        }
    }

    fn admit_unknown(&self, state: &mut RaceState, bib: &str) -> bool {
        if !self.club_mode || !state.clock.is_timing() {
            warn!("Passing for unknown rider {} ignored", bib);
            return false;
        }
        info!("Adding unknown rider {} (club mode)", bib);
        state.riders.add(RiderEntry::new(bib, "", "")).is_ok()
    }
}

fn clear_current_lap(riders: &mut RiderTable) {
    for rider in riders.iter_mut() {
        rider.on_current_lap = false;
    }
}
