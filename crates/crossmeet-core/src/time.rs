//! Time-of-day and elapsed time helpers.
//!
//! Passings are recorded as time-of-day (`NaiveTime`); elapsed times and
//! offsets are `TimeDelta`. Event files store durations as seconds.

use chrono::{NaiveTime, TimeDelta};

use crate::error::{Error, Result};

/// Parse a time of day in `HH:MM:SS[.fff]` or `MM:SS[.fff]` form.
pub fn parse_tod(value: &str) -> Result<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(&format!("00:{value}"), "%H:%M:%S%.f"))
        .map_err(|_| Error::InvalidTime(value.to_string()))
}

/// Parse a duration given as plain seconds (`"12.5"`) or `M:SS[.f]`.
pub fn parse_duration(value: &str) -> Result<TimeDelta> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<f64>() {
        return Ok(from_secs_f64(secs));
    }
    let mut total = 0.0;
    for part in value.split(':') {
        let part: f64 = part
            .parse()
            .map_err(|_| Error::InvalidTime(value.to_string()))?;
        total = total * 60.0 + part;
    }
    Ok(from_secs_f64(total))
}

/// Like `parse_duration`, but `none` or an empty value clears.
pub fn parse_optional_duration(value: &str) -> Result<Option<TimeDelta>> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    parse_duration(value).map(Some)
}

pub fn from_secs_f64(secs: f64) -> TimeDelta {
    TimeDelta::milliseconds((secs * 1000.0).round() as i64)
}

pub fn to_secs_f64(delta: TimeDelta) -> f64 {
    delta.num_milliseconds() as f64 / 1000.0
}

/// Drop the fractional part, as results sheets do.
pub fn truncate_secs(delta: TimeDelta) -> TimeDelta {
    TimeDelta::seconds(delta.num_seconds())
}

/// Format an elapsed time as `h:mm:ss` or `m:ss`.
pub fn format_elapsed(delta: TimeDelta) -> String {
    let sign = if delta < TimeDelta::zero() { "-" } else { "" };
    let total = delta.num_seconds().abs();
    let (h, m, s) = (total / 3600, (total / 60) % 60, total % 60);
    if h > 0 {
        format!("{sign}{h}:{m:02}:{s:02}")
    } else {
        format!("{sign}{m}:{s:02}")
    }
}

/// Serde adapter storing a `TimeDelta` as seconds.
pub mod serde_secs {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(delta: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(super::to_secs_f64(*delta))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Ok(super::from_secs_f64(secs))
    }
}

/// Serde adapter storing an optional `TimeDelta` as seconds.
pub mod serde_secs_opt {
    use chrono::TimeDelta;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        delta: &Option<TimeDelta>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match delta {
            Some(d) => serializer.serialize_some(&super::to_secs_f64(*d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<TimeDelta>, D::Error> {
        let secs = Option::<f64>::deserialize(deserializer)?;
        Ok(secs.map(super::from_secs_f64))
    }
}

/// Serde adapter storing a list of `TimeDelta` as seconds.
pub mod serde_secs_vec {
    use chrono::TimeDelta;
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(deltas: &[TimeDelta], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(deltas.len()))?;
        for delta in deltas {
            seq.serialize_element(&super::to_secs_f64(*delta))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<TimeDelta>, D::Error> {
        let secs = Vec::<f64>::deserialize(deserializer)?;
        Ok(secs.into_iter().map(super::from_secs_f64).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tod() {
        let t = parse_tod("10:30:05.25").unwrap();
        assert_eq!(t, NaiveTime::from_hms_milli_opt(10, 30, 5, 250).unwrap());

        let t = parse_tod("10:30:05").unwrap();
        assert_eq!(t, NaiveTime::from_hms_opt(10, 30, 5).unwrap());

        let t = parse_tod("04:12.5").unwrap();
        assert_eq!(t, NaiveTime::from_hms_milli_opt(0, 4, 12, 500).unwrap());

        assert!(parse_tod("not a time").is_err());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30").unwrap(), TimeDelta::seconds(30));
        assert_eq!(parse_duration("1:30").unwrap(), TimeDelta::seconds(90));
        assert_eq!(parse_duration("2.5").unwrap(), TimeDelta::milliseconds(2500));
        assert!(parse_duration("x:10").is_err());
        assert_eq!(
            parse_optional_duration("0:20").unwrap(),
            Some(TimeDelta::seconds(20))
        );
        assert_eq!(parse_optional_duration("None").unwrap(), None);
    }

    #[test]
    fn test_truncate_secs() {
        assert_eq!(
            truncate_secs(TimeDelta::milliseconds(61_999)),
            TimeDelta::seconds(61)
        );
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(TimeDelta::seconds(65)), "1:05");
        assert_eq!(format_elapsed(TimeDelta::seconds(3725)), "1:02:05");
        assert_eq!(format_elapsed(TimeDelta::seconds(-5)), "-0:05");
    }
}
