//! Timestamp — accept-date decoding in a configured timezone.
//!
//! The proxy logs local wall-clock time without an offset, so the zone the
//! proxy runs in has to be supplied from outside.

use std::fmt;
use std::str::FromStr;

use chrono::{FixedOffset, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::model::DecodeError;

/// `DD/Mon/YYYY:HH:MM:SS.mmm`
pub const TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S%.3f";

const TIMESTAMP_LEN: usize = 24;

/// Timezone the proxy writes its log timestamps in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LogTimezone {
    /// Host local time (the proxy's default)
    #[default]
    Local,
    Utc,
    Fixed(FixedOffset),
    /// IANA zone such as `Europe/Warsaw`, daylight saving included
    Named(Tz),
}

impl LogTimezone {
    /// Resolve a local wall-clock time to microseconds since the epoch.
    pub fn to_micros(&self, naive: &NaiveDateTime) -> i64 {
        match self {
            LogTimezone::Local => resolve(&chrono::Local, naive),
            LogTimezone::Utc => resolve(&Utc, naive),
            LogTimezone::Fixed(offset) => resolve(offset, naive),
            LogTimezone::Named(tz) => resolve(tz, naive),
        }
    }
}

fn resolve<Tz: TimeZone>(tz: &Tz, naive: &NaiveDateTime) -> i64 {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(dt) => dt.timestamp_micros(),
        // DST fold: the first occurrence wins
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp_micros(),
        // DST gap: shift by the offset in effect at that instant
        LocalResult::None => {
            let offset = tz.offset_from_utc_datetime(naive).fix();
            let shifted = *naive - TimeDelta::seconds(i64::from(offset.local_minus_utc()));
            shifted.and_utc().timestamp_micros()
        }
    }
}

/// Every numeric part is zero-padded; chrono alone would accept `3/Jul`.
fn has_fixed_width(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == TIMESTAMP_LEN
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 | 6 => *b == b'/',
            3..=5 => b.is_ascii_alphabetic(),
            11 | 14 | 17 => *b == b':',
            20 => *b == b'.',
            _ => b.is_ascii_digit(),
        })
}

/// Decode an accept-date field into microseconds since the Unix epoch.
pub fn decode_timestamp(value: &str, tz: &LogTimezone) -> Result<i64, DecodeError> {
    let invalid = |reason: String| DecodeError::Timestamp {
        value: value.to_string(),
        reason,
    };

    if !has_fixed_width(value) {
        return Err(invalid("expected DD/Mon/YYYY:HH:MM:SS.mmm".to_string()));
    }
    let naive = NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map_err(|e| invalid(e.to_string()))?;
    Ok(tz.to_micros(&naive))
}

impl FromStr for LogTimezone {
    type Err = String;

    /// Accepts `local`, `utc` (or `z`), fixed offsets such as `+02:00` and
    /// IANA names such as `Europe/Warsaw`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_ascii_lowercase().as_str() {
            "local" | "" => Ok(LogTimezone::Local),
            "utc" | "z" => Ok(LogTimezone::Utc),
            _ if s.starts_with(['+', '-']) => s
                .parse::<FixedOffset>()
                .map(LogTimezone::Fixed)
                .map_err(|e| format!("invalid timezone {:?}: {}", s, e)),
            _ => s
                .parse::<Tz>()
                .map(LogTimezone::Named)
                .map_err(|e| format!("invalid timezone {:?}: {}", s, e)),
        }
    }
}

impl fmt::Display for LogTimezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogTimezone::Local => f.write_str("local"),
            LogTimezone::Utc => f.write_str("utc"),
            LogTimezone::Fixed(offset) => write!(f, "{}", offset),
            LogTimezone::Named(tz) => f.write_str(tz.name()),
        }
    }
}

impl TryFrom<String> for LogTimezone {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LogTimezone> for String {
    fn from(tz: LogTimezone) -> Self {
        tz.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utc() {
        let ts = decode_timestamp("23/Jul/2015:13:49:11.933", &LogTimezone::Utc).unwrap();
        assert_eq!(ts, 1_437_659_351_933_000);

        let ts = decode_timestamp("03/Jul/2015:13:49:11.933", &LogTimezone::Utc).unwrap();
        assert_eq!(ts, 1_435_931_351_933_000);
    }

    #[test]
    fn test_twenty_days_apart() {
        let late = decode_timestamp("23/Jul/2015:13:49:11.933", &LogTimezone::Utc).unwrap();
        let early = decode_timestamp("03/Jul/2015:13:49:11.933", &LogTimezone::Utc).unwrap();
        assert_eq!(late - early, 20 * 86_400 * 1_000_000);
    }

    #[test]
    fn test_decode_fixed_offset() {
        let tz: LogTimezone = "+02:00".parse().unwrap();
        let ts = decode_timestamp("23/Jul/2015:13:49:11.933", &tz).unwrap();
        assert_eq!(ts, 1_437_652_151_933_000);
    }

    #[test]
    fn test_zero_offset_matches_utc() {
        let tz = LogTimezone::Fixed(FixedOffset::east_opt(0).unwrap());
        let fixed = decode_timestamp("01/Jan/2020:00:00:00.000", &tz).unwrap();
        let utc = decode_timestamp("01/Jan/2020:00:00:00.000", &LogTimezone::Utc).unwrap();
        assert_eq!(fixed, utc);
    }

    #[test]
    fn test_invalid_timestamp() {
        for bad in [
            "23/Jul/2015 13:49:11.933",
            "23/Jly/2015:13:49:11.933",
            "2015-07-23T13:49:11.933Z",
            "3/Jul/2015:13:49:11.933",
            "23/Jul/2015:1:49:11.933",
            "23/Jul/2015:13:49:11.9330",
            "",
        ] {
            let err = decode_timestamp(bad, &LogTimezone::Utc).unwrap_err();
            assert!(matches!(err, DecodeError::Timestamp { .. }), "{bad}: {err:?}");
        }
    }

    #[test]
    fn test_parse_timezone_names() {
        assert_eq!("local".parse::<LogTimezone>().unwrap(), LogTimezone::Local);
        assert_eq!("UTC".parse::<LogTimezone>().unwrap(), LogTimezone::Utc);
        assert_eq!(
            "-05:00".parse::<LogTimezone>().unwrap(),
            LogTimezone::Fixed(FixedOffset::west_opt(5 * 3600).unwrap())
        );
        assert_eq!(
            "Europe/Warsaw".parse::<LogTimezone>().unwrap(),
            LogTimezone::Named(Tz::Europe__Warsaw)
        );
        assert!("Europe/Nowhere".parse::<LogTimezone>().is_err());
        assert!("+25:00".parse::<LogTimezone>().is_err());
    }

    #[test]
    fn test_named_zone_follows_daylight_saving() {
        let tz: LogTimezone = "Europe/Warsaw".parse().unwrap();

        // CEST, UTC+2
        let summer = decode_timestamp("23/Jul/2015:13:49:11.933", &tz).unwrap();
        assert_eq!(summer, 1_437_652_151_933_000);

        // CET, UTC+1
        let winter = decode_timestamp("23/Jan/2015:13:49:11.933", &tz).unwrap();
        assert_eq!(winter, 1_422_017_351_933_000);
    }

    #[test]
    fn test_named_zone_fold_takes_earliest() {
        let tz = LogTimezone::Named(Tz::Europe__Warsaw);
        // 02:30 happens twice on 25/Oct/2015; the CEST one comes first
        let ts = decode_timestamp("25/Oct/2015:02:30:00.000", &tz).unwrap();
        assert_eq!(ts, 1_445_733_000_000_000);
    }

    #[test]
    fn test_timezone_serde() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            tz: LogTimezone,
        }

        let w: Wrapper = toml::from_str("tz = \"+01:00\"").unwrap();
        assert_eq!(w.tz, LogTimezone::Fixed(FixedOffset::east_opt(3600).unwrap()));
        assert_eq!(serde_json::to_string(&Wrapper { tz: LogTimezone::Utc }).unwrap(), r#"{"tz":"utc"}"#);

        let w: Wrapper = toml::from_str("tz = \"America/New_York\"").unwrap();
        assert_eq!(w.tz, LogTimezone::Named(Tz::America__New_York));
        assert_eq!(serde_json::to_string(&w).unwrap(), r#"{"tz":"America/New_York"}"#);
    }
}
