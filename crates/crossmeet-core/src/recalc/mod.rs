//! Result recalculation.
//!
//! Six passes turn raw lap/time state into official results:
//! 1. reset derived fields
//! 2. rank the finish places and award contests
//! 3. rough sort
//! 4. bunch times
//! 5. final sort
//! 6. race status
//!
//! At most one recalculation runs at a time. A request that finds one in
//! flight is skipped, not queued.

mod bunch;
mod sort;

pub use bunch::{compute_bunches, rider_offset};
pub use sort::{FinalKey, Last, RoughKey, final_sort, rough_sort};

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::TimeDelta;
use tracing::{debug, info, warn};

use crate::clock::ClockState;
use crate::config::MeetConfig;
use crate::places::{parse_and_rank, rank_finish};
use crate::registry::CategoryRegistry;
use crate::state::{RaceSnapshot, RaceState, RaceStatus};

/// Non-blocking single-flight guard.
#[derive(Debug, Default)]
pub struct SingleFlight {
    busy: AtomicBool,
}

/// Held for the duration of one flight; releases on drop.
#[derive(Debug)]
pub struct FlightGuard<'a> {
    busy: &'a AtomicBool,
}

impl SingleFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the flight, or `None` if one is already running.
    pub fn try_begin(&self) -> Option<FlightGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| FlightGuard { busy: &self.busy })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecalcOutcome {
    Settled(Box<RaceSnapshot>),
    /// Another recalculation was in flight
    Skipped,
}

impl RecalcOutcome {
    pub fn snapshot(self) -> Option<RaceSnapshot> {
        match self {
            Self::Settled(snapshot) => Some(*snapshot),
            Self::Skipped => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }
}

/// Settings the passes read from the meet configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    pub gap_threshold: TimeDelta,
    pub provisional_placed: usize,
    pub small_field: usize,
}

impl From<&MeetConfig> for EngineSettings {
    fn from(config: &MeetConfig) -> Self {
        Self {
            gap_threshold: config.gap_threshold,
            provisional_placed: config.provisional_placed,
            small_field: config.small_field,
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self::from(&MeetConfig::default())
    }
}

#[derive(Debug, Default)]
pub struct RecalculateEngine {
    settings: EngineSettings,
    flight: SingleFlight,
}

impl RecalculateEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            flight: SingleFlight::new(),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn flight(&self) -> &SingleFlight {
        &self.flight
    }

    /// Recalculate `state` unless a recalculation is already running.
    pub fn recalculate(
        &self,
        state: &Mutex<RaceState>,
        registry: &dyn CategoryRegistry,
    ) -> RecalcOutcome {
        let Some(_guard) = self.flight.try_begin() else {
            info!("Recalculate already in progress, skipping");
            return RecalcOutcome::Skipped;
        };
        let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
        self.run_passes(&mut state, registry);
        RecalcOutcome::Settled(Box::new(state.snapshot()))
    }

    /// Run all six passes on `state`.
    pub fn run_passes(&self, state: &mut RaceState, registry: &dyn CategoryRegistry) {
        reset(state);
        assign_places(state);
        rough_sort(&mut state.riders);
        compute_bunches(state, registry, self.settings.gap_threshold);
        final_sort(&mut state.riders);
        state.status = derive_status(state, &self.settings);
        debug!(
            "Recalculated {} riders: {}",
            state.riders.len(),
            state.status
        );
    }
}

/// Pass 1: clear places and contest maps.
fn reset(state: &mut RaceState) {
    for rider in state.riders.iter_mut() {
        rider.place.clear();
    }
    state.contest_results.clear();
}

/// Pass 2: write finish ranks and award every contest.
///
/// Contests see the places string as recorded, withdrawn riders included.
fn assign_places(state: &mut RaceState) {
    for (bib, rank) in rank_finish(&state.places, &state.riders).iter() {
        match state.riders.get_mut(bib) {
            Some(rider) => rider.place = rank.to_string(),
            None => warn!("Placed bib {} not in rider table", bib),
        }
    }

    let finish = parse_and_rank(&state.places);

    let RaceState {
        riders,
        contests,
        contest_results,
        ..
    } = state;
    for contest in contests.contests() {
        let ranked = contests.resolve_source(contest, riders, &finish);
        contest_results.assign_places(contest, &ranked);
    }
}

/// Pass 6: classify the result set.
fn derive_status(state: &RaceState, settings: &EngineSettings) -> RaceStatus {
    let total = state.riders.len();
    let mut placed = 0;
    let mut handled = 0;
    for rider in state.riders.iter() {
        if rider.in_race && !rider.place.is_empty() {
            placed += 1;
        }
        if rider.finish.is_some() || !rider.in_race {
            handled += 1;
        }
    }

    if !state.clock.has_started() && placed == 0 {
        RaceStatus::PreRace
    } else if state.clock.state == ClockState::Finished
        || (total > 0 && handled == total)
    {
        RaceStatus::Final
    } else if placed >= settings.provisional_placed
        || (placed > 0 && total < settings.small_field)
    {
        RaceStatus::Provisional
    } else {
        RaceStatus::Virtual
    }
}
