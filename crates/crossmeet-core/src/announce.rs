//! Announcer and scoreboard notifications.

use chrono::NaiveTime;
use tracing::info;

use crate::clock::ClockState;

/// Sink for push notifications raised while processing passings.
pub trait Announcer: Send + Sync {
    /// A rider was seen on the leader's lap or crossed the finish.
    fn rider_seen(&self, bib: &str, laps: u32, time: NaiveTime);

    /// Clock state or lap counters changed.
    fn clock_update(&self, _state: ClockState, _cur_lap: i32, _on_lap: i32) {}
}

/// Discards all notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAnnouncer;

impl Announcer for NullAnnouncer {
    fn rider_seen(&self, _bib: &str, _laps: u32, _time: NaiveTime) {}
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAnnouncer;

impl Announcer for LogAnnouncer {
    fn rider_seen(&self, bib: &str, laps: u32, time: NaiveTime) {
        info!("Seen: {} lap {} @ {}", bib, laps, time);
    }

    fn clock_update(&self, state: ClockState, cur_lap: i32, on_lap: i32) {
        info!("Clock {}: lap {} (racing lap {})", state, cur_lap, on_lap);
    }
}
