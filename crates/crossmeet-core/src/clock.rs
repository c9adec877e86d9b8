//! Race clock and lap arming.

use chrono::{NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use tracing::{debug, info, warn};

use crate::config::timing;
use crate::error::{Error, Result};
use crate::time::serde_secs_opt;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ClockState {
    #[default]
    Idle,
    Ready,
    ArmStart,
    Running,
    ArmFinish,
    Finished,
}

impl std::fmt::Display for ClockState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name: &'static str = self.into();
        write!(f, "{}", name)
    }
}

/// Race clock
///
/// ## State Transition Rules
///
/// Valid transitions:
/// - Idle -> Ready | ArmStart
/// - Ready -> ArmStart | Idle
/// - ArmStart -> Running (start trigger) | Idle (disarm)
/// - Running -> ArmFinish
/// - ArmFinish -> Running (disarm) | Finished
/// - Finished -> ArmFinish (reopen)
/// - any -> Idle through `reset`
///
/// `cur_lap` is -1 until the start, then counts the leader's completed laps
/// and only increases. `on_lap` is the lap being raced and never exceeds
/// `cur_lap + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceClock {
    pub state: ClockState,
    pub start: Option<NaiveTime>,
    pub finish: Option<NaiveTime>,
    pub lap_start: Option<NaiveTime>,
    pub lap_finish: Option<NaiveTime>,
    /// Shortest accepted lap; unset disables the short-lap check
    #[serde(with = "serde_secs_opt")]
    pub min_lap: Option<TimeDelta>,
    pub cur_lap: i32,
    pub on_lap: i32,
    /// Overall target lap count, when set by the commissaire
    pub total_laps: Option<u32>,
}

impl Default for RaceClock {
    fn default() -> Self {
        Self {
            state: ClockState::Idle,
            start: None,
            finish: None,
            lap_start: None,
            lap_finish: None,
            min_lap: None,
            cur_lap: -1,
            on_lap: 0,
            total_laps: None,
        }
    }
}

impl RaceClock {
    pub fn new(min_lap: Option<TimeDelta>) -> Self {
        Self {
            min_lap,
            ..Default::default()
        }
    }

    /// Check if a state transition is valid
    pub fn is_valid_transition(from: ClockState, to: ClockState) -> bool {
        if from == to {
            return true;
        }

        matches!(
            (from, to),
            (ClockState::Idle, ClockState::Ready | ClockState::ArmStart)
                | (ClockState::Ready, ClockState::ArmStart | ClockState::Idle)
                | (ClockState::ArmStart, ClockState::Running | ClockState::Idle)
                | (ClockState::Running, ClockState::ArmFinish)
                | (ClockState::ArmFinish, ClockState::Running | ClockState::Finished)
                | (ClockState::Finished, ClockState::ArmFinish)
        )
    }

    fn transition(&mut self, to: ClockState) -> Result<()> {
        if !Self::is_valid_transition(self.state, to) {
            warn!(
                "Invalid clock transition: {:?} -> {:?}, keeping {:?}",
                self.state, to, self.state
            );
            return Err(Error::InvalidTransition {
                from: self.state,
                to,
            });
        }
        debug!("Clock: {:?} -> {:?}", self.state, to);
        self.state = to;
        Ok(())
    }

    pub fn ready(&mut self) -> Result<()> {
        self.transition(ClockState::Ready)
    }

    pub fn arm_start(&mut self) -> Result<()> {
        self.transition(ClockState::ArmStart)
    }

    /// Start the race at `t`; this arms the first lap.
    pub fn start(&mut self, t: NaiveTime) -> Result<()> {
        self.transition(ClockState::Running)?;
        self.start = Some(t);
        self.lap_start = Some(t);
        self.lap_finish = None;
        self.finish = None;
        self.cur_lap = 1;
        self.on_lap = 1;
        info!("Race started at {}", t);
        Ok(())
    }

    pub fn arm_finish(&mut self) -> Result<()> {
        self.transition(ClockState::ArmFinish)
    }

    pub fn disarm_finish(&mut self) -> Result<()> {
        if self.state != ClockState::ArmFinish {
            return Err(Error::InvalidTransition {
                from: self.state,
                to: ClockState::Running,
            });
        }
        self.transition(ClockState::Running)
    }

    pub fn set_finished(&mut self) -> Result<()> {
        self.transition(ClockState::Finished)
    }

    /// Return to idle and clear all timing, keeping the minimum lap.
    pub fn reset(&mut self) {
        *self = Self::new(self.min_lap);
        info!("Clock reset");
    }

    /// True while passings count as laps.
    pub fn is_timing(&self) -> bool {
        matches!(self.state, ClockState::Running | ClockState::ArmFinish)
    }

    /// True once there has been any timing activity.
    pub fn has_started(&self) -> bool {
        self.start.is_some()
    }

    /// Shortest elapsed time accepted for a rider's first passing.
    pub fn early_pass_limit(&self) -> TimeDelta {
        self.min_lap.unwrap_or(timing::EARLY_PASS_LIMIT)
    }

    /// Time since the start, less `offset`.
    pub fn elapsed(&self, t: NaiveTime, offset: TimeDelta) -> Option<TimeDelta> {
        self.start.map(|start| t - start - offset)
    }

    /// Record `t` as the first crossing of the current lap.
    pub fn record_lap(&mut self, t: NaiveTime) {
        self.lap_start = self.lap_finish.or(self.start);
        self.lap_finish = Some(t);
        self.on_lap = self.cur_lap + 1;
        debug!("Lap {} recorded at {}", self.cur_lap, t);
    }

    /// Advance to the next lap ahead of `record_lap`.
    ///
    /// Never counts past `total_laps` when one is set.
    pub fn advance_lap(&mut self) {
        self.cur_lap += 1;
        if let Some(total) = self.total_laps
            && self.cur_lap > total as i32
        {
            warn!("Lap {} past race total {}", self.cur_lap, total);
            self.cur_lap = total as i32;
        }
    }

    /// Current lap time (lap start to lap finish).
    pub fn lap_time(&self) -> Option<TimeDelta> {
        match (self.lap_start, self.lap_finish) {
            (Some(s), Some(f)) => Some(f - s),
            _ => None,
        }
    }
}
