//! Meet configuration and engine constants.
//!
//! This module contains:
//! - `MeetConfig` - per-event engine settings stored in the event file
//! - Timing, status, contest and decoder constants

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::time::{serde_secs, serde_secs_opt};

/// Timing thresholds.
pub mod timing {
    use chrono::TimeDelta;

    /// First passings sooner than this after the start are spurious reads,
    /// unless the event configures a minimum lap.
    pub const EARLY_PASS_LIMIT: TimeDelta = TimeDelta::minutes(1);

    /// Riders crossing less than this after the rider ahead share a bunch time.
    ///
    /// Wider than a road finish to absorb transponder read jitter on a lap course.
    pub const BUNCH_GAP_THRESHOLD: TimeDelta = TimeDelta::milliseconds(2120);

    /// Interval between recalculation ticks on the event loop.
    pub const TICK_INTERVAL_MS: u64 = 500;
}

/// Race status derivation.
pub mod status {
    /// Placed riders needed before results are provisional.
    pub const PROVISIONAL_PLACED: usize = 10;

    /// Fields smaller than this are provisional as soon as anyone is placed.
    pub const SMALL_FIELD: usize = 20;
}

/// Contest points.
pub mod contest {
    /// Slots in a countback array (slot 0 counts finish-line wins).
    pub const COUNTBACK_SIZE: usize = 16;
}

/// Decoder line protocol.
pub mod decoder {
    /// Reserved transponder tag that signals the start gun.
    pub const START_TRIGGER_TAG: &str = "trig";

    /// Prefix marking a decoder status message.
    pub const STATUS_PREFIX: char = '#';
}

/// Engine settings carried in the event file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeetConfig {
    /// Bunch grouping threshold.
    #[serde(with = "serde_secs")]
    pub gap_threshold: TimeDelta,
    /// Event loop tick interval in milliseconds.
    pub tick_interval_ms: u64,
    /// Auto-add riders seen on course that are not in the rider table.
    pub club_mode: bool,
    pub provisional_placed: usize,
    pub small_field: usize,
    /// Overrides the clock's minimum lap when set.
    #[serde(with = "serde_secs_opt")]
    pub min_lap: Option<TimeDelta>,
}

impl Default for MeetConfig {
    fn default() -> Self {
        Self {
            gap_threshold: timing::BUNCH_GAP_THRESHOLD,
            tick_interval_ms: timing::TICK_INTERVAL_MS,
            club_mode: false,
            provisional_placed: status::PROVISIONAL_PLACED,
            small_field: status::SMALL_FIELD,
            min_lap: None,
        }
    }
}

impl MeetConfig {
    /// Reject settings the engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.gap_threshold < TimeDelta::zero() {
            return Err(Error::ConfigParseError(format!(
                "gap_threshold must not be negative ({}s)",
                self.gap_threshold.num_seconds()
            )));
        }
        if self.provisional_placed == 0 {
            return Err(Error::ConfigParseError(
                "provisional_placed must be at least 1".into(),
            ));
        }
        if self.min_lap.is_some_and(|m| m <= TimeDelta::zero()) {
            return Err(Error::ConfigParseError("min_lap must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_constants() {
        assert_eq!(timing::EARLY_PASS_LIMIT.num_seconds(), 60);
        assert_eq!(timing::BUNCH_GAP_THRESHOLD, TimeDelta::milliseconds(2120));
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config: MeetConfig = serde_json::from_str(r#"{"club_mode": true}"#).unwrap();
        assert!(config.club_mode);
        assert_eq!(config.gap_threshold, timing::BUNCH_GAP_THRESHOLD);
        assert_eq!(config.small_field, status::SMALL_FIELD);
        assert!(config.min_lap.is_none());
    }

    #[test]
    fn test_config_durations_as_seconds() {
        let config: MeetConfig =
            serde_json::from_str(r#"{"gap_threshold": 1.5, "min_lap": 45}"#).unwrap();
        assert_eq!(config.gap_threshold, TimeDelta::milliseconds(1500));
        assert_eq!(config.min_lap, Some(TimeDelta::seconds(45)));
    }

    #[test]
    fn test_validate() {
        assert!(MeetConfig::default().validate().is_ok());

        let config = MeetConfig {
            provisional_placed: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::ConfigParseError(_))));

        let config = MeetConfig {
            min_lap: Some(TimeDelta::zero()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
