//! Meet controller.
//!
//! `Meet` owns the race state and is the only thing that mutates it.
//! Passings and edits mark the meet dirty; a periodic tick recalculates.

mod edits;
mod event_loop;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveTime;
use tracing::{debug, info, warn};

use crate::announce::{Announcer, NullAnnouncer};
use crate::clock::{ClockState, RaceClock};
use crate::config::MeetConfig;
use crate::contest::TallyStanding;
use crate::decoder::DecoderEvent;
use crate::error::{Error, Result};
use crate::export::{ResultLine, category_results};
use crate::passing::{PassingOutcome, PassingProcessor};
use crate::places::{normalize, validate};
use crate::recalc::{EngineSettings, RecalcOutcome, RecalculateEngine};
use crate::registry::CategoryTable;
use crate::state::{Checkpoint, RaceSnapshot, RaceState};
use crate::storage::EventFile;

pub struct Meet {
    title: String,
    config: MeetConfig,
    state: Mutex<RaceState>,
    categories: CategoryTable,
    engine: RecalculateEngine,
    processor: PassingProcessor,
    dirty: AtomicBool,
    undo: Mutex<Option<Checkpoint>>,
    settled: Mutex<RaceSnapshot>,
    announcer: Box<dyn Announcer>,
}

impl Meet {
    pub fn new(
        title: impl Into<String>,
        mut state: RaceState,
        categories: CategoryTable,
        config: MeetConfig,
    ) -> Self {
        if let Some(min_lap) = config.min_lap {
            state.clock.min_lap = Some(min_lap);
        }
        let engine = RecalculateEngine::new(EngineSettings::from(&config));
        engine.run_passes(&mut state, &categories);
        let settled = state.snapshot();

        Self {
            title: title.into(),
            processor: PassingProcessor::new(config.club_mode),
            config,
            state: Mutex::new(state),
            categories,
            engine,
            dirty: AtomicBool::new(false),
            undo: Mutex::new(None),
            settled: Mutex::new(settled),
            announcer: Box::new(NullAnnouncer),
        }
    }

    pub fn from_event(event: EventFile) -> Self {
        let title = event.title.clone();
        let (state, categories, config) = event.into_parts();
        Self::new(title, state, categories, config)
    }

    pub fn with_announcer(mut self, announcer: Box<dyn Announcer>) -> Self {
        self.announcer = announcer;
        self
    }

    /// Persistent view of the current state.
    pub fn to_event_file(&self) -> EventFile {
        let state = self.lock_state();
        EventFile::from_parts(&self.title, &state, &self.categories, &self.config)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn config(&self) -> &MeetConfig {
        &self.config
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    pub fn engine(&self) -> &RecalculateEngine {
        &self.engine
    }

    pub fn clock(&self) -> RaceClock {
        self.lock_state().clock.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }

    fn lock_state(&self) -> MutexGuard<'_, RaceState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn notify_clock(&self, clock: &RaceClock) {
        self.announcer
            .clock_update(clock.state, clock.cur_lap, clock.on_lap);
    }

    // ---- timing input ----

    /// Apply one passing. Results are not recalculated until the next tick.
    pub fn on_passing(&self, bib: &str, t: NaiveTime) -> PassingOutcome {
        let mut state = self.lock_state();
        let outcome = self
            .processor
            .on_passing(&mut state, &self.categories, bib, t);

        if outcome.is_dirty() {
            self.mark_dirty();
        }
        if let PassingOutcome::Lap { new_lap: true, .. } = outcome {
            self.notify_clock(&state.clock);
        }
        match outcome {
            PassingOutcome::Lap {
                laps, seen: true, ..
            }
            | PassingOutcome::Finished { laps } => self.announcer.rider_seen(bib, laps, t),
            _ => {}
        }
        outcome
    }

    /// Manual trigger: the listed bibs all crossed at `t`.
    pub fn on_manual_trigger<'a>(
        &self,
        bibs: impl IntoIterator<Item = &'a str>,
        t: NaiveTime,
    ) -> Vec<PassingOutcome> {
        bibs.into_iter()
            .map(|bib| {
                debug!("Manual passing {} @ {}", bib, t);
                self.on_passing(bib, t)
            })
            .collect()
    }

    /// Dispatch a decoder event.
    pub fn handle_event(&self, event: DecoderEvent) {
        match event {
            DecoderEvent::Passing { bib, time, channel } => {
                if let Some(channel) = channel {
                    debug!("Passing {} on {}", bib, channel);
                }
                self.on_passing(&bib, time);
            }
            DecoderEvent::StartTrigger { time } => {
                if self.clock().state != ClockState::ArmStart {
                    debug!("Start trigger @ {} ignored: not armed", time);
                    return;
                }
                if let Err(e) = self.start(time) {
                    warn!("Start trigger failed: {}", e);
                }
            }
            DecoderEvent::Status(text) => info!("Decoder: {}", text),
        }
    }

    // ---- clock commands ----

    fn clock_command<F>(&self, command: F) -> Result<()>
    where
        F: FnOnce(&mut RaceClock) -> Result<()>,
    {
        let mut state = self.lock_state();
        command(&mut state.clock)?;
        self.notify_clock(&state.clock);
        self.mark_dirty();
        Ok(())
    }

    /// Mark the field ready on the line.
    pub fn ready(&self) -> Result<()> {
        self.clock_command(RaceClock::ready)
    }

    pub fn arm_start(&self) -> Result<()> {
        self.clock_command(RaceClock::arm_start)
    }

    pub fn start(&self, t: NaiveTime) -> Result<()> {
        self.clock_command(|clock| clock.start(t))
    }

    pub fn arm_finish(&self) -> Result<()> {
        self.clock_command(RaceClock::arm_finish)
    }

    pub fn disarm_finish(&self) -> Result<()> {
        self.clock_command(RaceClock::disarm_finish)
    }

    pub fn finish(&self) -> Result<()> {
        self.clock_command(RaceClock::set_finished)
    }

    /// Return the clock to idle and clear all rider timing.
    pub fn reset(&self) {
        let mut state = self.lock_state();
        for rider in state.riders.iter_mut() {
            rider.laps = 0;
            rider.finish = None;
            rider.passings.clear();
            rider.on_current_lap = false;
        }
        state.places.clear();
        state.clock.reset();
        info!("Race reset");
        self.notify_clock(&state.clock);
        self.mark_dirty();
    }

    // ---- places and undo ----

    /// Replace the finish places.
    ///
    /// Rejected strings leave the current places untouched.
    pub fn set_places(&self, places: &str) -> Result<()> {
        let mut state = self.lock_state();
        let violations = validate(places, &state.riders, true);
        if !violations.is_empty() {
            return Err(Error::PlacesRejected { violations });
        }
        self.store_checkpoint(state.checkpoint());
        state.places = normalize(places);
        debug!("Places set: {}", state.places);
        self.mark_dirty();
        Ok(())
    }

    pub fn places(&self) -> String {
        self.lock_state().places.clone()
    }

    /// Take an undo point, replacing any previous one.
    pub fn checkpoint(&self) {
        let checkpoint = self.lock_state().checkpoint();
        self.store_checkpoint(checkpoint);
    }

    fn store_checkpoint(&self, checkpoint: Checkpoint) {
        *self.undo.lock().unwrap_or_else(|e| e.into_inner()) = Some(checkpoint);
    }

    /// Restore the last checkpoint. Returns false if there is none.
    pub fn undo(&self) -> bool {
        let checkpoint = self.undo.lock().unwrap_or_else(|e| e.into_inner()).take();
        let Some(checkpoint) = checkpoint else {
            debug!("Nothing to undo");
            return false;
        };
        self.lock_state().restore(checkpoint);
        info!("Restored checkpoint");
        self.mark_dirty();
        true
    }

    // ---- results ----

    /// Recalculate now unless a recalculation is already running.
    pub fn recalculate(&self) -> RecalcOutcome {
        let outcome = self.engine.recalculate(&self.state, &self.categories);
        if let RecalcOutcome::Settled(snapshot) = &outcome {
            *self.settled.lock().unwrap_or_else(|e| e.into_inner()) = (**snapshot).clone();
        }
        outcome
    }

    /// Recalculate if dirty. A skipped run leaves the meet dirty for the next tick.
    pub fn tick(&self) -> Option<RecalcOutcome> {
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return None;
        }
        let outcome = self.recalculate();
        if outcome.is_skipped() {
            self.mark_dirty();
        }
        Some(outcome)
    }

    /// Last settled results.
    pub fn snapshot(&self) -> RaceSnapshot {
        self.settled
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Ranked results for one category, or the whole field.
    pub fn get_results(&self, category: Option<&str>) -> Vec<ResultLine> {
        category_results(&self.snapshot(), category, &self.categories)
    }

    /// Standings for a named tally, if configured.
    pub fn standings(&self, tally: &str) -> Option<Vec<TallyStanding>> {
        let configured = self.tallies().iter().any(|t| t == tally);
        let settled = self.settled.lock().unwrap_or_else(|e| e.into_inner());
        match settled.contest_results.tally(tally) {
            Some(table) => Some(table.standings()),
            None if configured => Some(Vec::new()),
            None => None,
        }
    }

    /// Configured tally names.
    pub fn tallies(&self) -> Vec<String> {
        self.lock_state()
            .contests
            .tallies()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}
