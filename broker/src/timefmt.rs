//! Wire timestamp format
//!
//! Clients report their time as UTF-8 text in a fixed layout:
//! `Mon, 02 Jan 2006 15:04:05 MST` (RFC1123 with a named zone). The broker
//! never does arithmetic on the value, it only relays it, so the zone
//! abbreviation is kept verbatim and reformatting a parsed value reproduces
//! the input byte-for-byte.

use std::fmt;

use chrono::{NaiveDateTime, Timelike, Utc};
use thiserror::Error;

/// Everything in the layout except the trailing zone abbreviation.
const DATETIME_FORMAT: &str = "%a, %d %b %Y %H:%M:%S";

/// Errors from parsing a wire timestamp
#[derive(Debug, Error)]
pub enum TimeParseError {
    #[error("missing zone abbreviation")]
    MissingZone,

    #[error("bad zone abbreviation {0:?}")]
    BadZone(String),

    #[error("{0}")]
    Layout(#[from] chrono::ParseError),
}

/// A timestamp as it travels over the wire: a wall-clock date-time plus the
/// zone abbreviation it was reported with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireTime {
    local: NaiveDateTime,
    zone: String,
}

impl WireTime {
    /// Parse a timestamp in the wire layout.
    ///
    /// The weekday must agree with the calendar date; the zone must be a
    /// 2-5 letter uppercase abbreviation.
    pub fn parse(s: &str) -> Result<Self, TimeParseError> {
        let (datetime, zone) = s.rsplit_once(' ').ok_or(TimeParseError::MissingZone)?;
        if !(2..=5).contains(&zone.len()) || !zone.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(TimeParseError::BadZone(zone.to_string()));
        }
        let local = NaiveDateTime::parse_from_str(datetime, DATETIME_FORMAT)?;
        Ok(Self {
            local,
            zone: zone.to_string(),
        })
    }

    /// The current time, reported in UTC.
    pub fn now_utc() -> Self {
        let now = Utc::now().naive_utc();
        // The layout has whole-second resolution.
        let local = now.with_nanosecond(0).unwrap_or(now);
        Self {
            local,
            zone: "UTC".to_string(),
        }
    }
}

impl fmt::Display for WireTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.local.format(DATETIME_FORMAT), self.zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: &str = "Mon, 02 Jan 2006 15:04:05 MST";

    #[test]
    fn test_parse_reference_layout() {
        let ts = WireTime::parse(REFERENCE).unwrap();
        assert_eq!(ts.zone, "MST");
        assert_eq!(ts.local.to_string(), "2006-01-02 15:04:05");
    }

    #[test]
    fn test_format_round_trip_is_stable() {
        let ts = WireTime::parse(REFERENCE).unwrap();
        assert_eq!(ts.to_string(), REFERENCE);

        // And once more through the parser.
        let again = WireTime::parse(&ts.to_string()).unwrap();
        assert_eq!(again, ts);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            WireTime::parse("not-a-time"),
            Err(TimeParseError::MissingZone)
        ));
    }

    #[test]
    fn test_parse_rejects_wrong_weekday() {
        // 2006-01-02 was a Monday.
        let err = WireTime::parse("Tue, 02 Jan 2006 15:04:05 MST");
        assert!(matches!(err, Err(TimeParseError::Layout(_))));
    }

    #[test]
    fn test_parse_rejects_bad_zone() {
        assert!(matches!(
            WireTime::parse("Mon, 02 Jan 2006 15:04:05 mst"),
            Err(TimeParseError::BadZone(_))
        ));
        assert!(matches!(
            WireTime::parse("Mon, 02 Jan 2006 15:04:05 X"),
            Err(TimeParseError::BadZone(_))
        ));
    }

    #[test]
    fn test_four_letter_zone_accepted() {
        let ts = WireTime::parse("Sun, 30 Jul 2023 08:09:10 CEST").unwrap();
        assert_eq!(ts.to_string(), "Sun, 30 Jul 2023 08:09:10 CEST");
    }

    #[test]
    fn test_now_utc_round_trips() {
        let now = WireTime::now_utc();
        let parsed = WireTime::parse(&now.to_string()).unwrap();
        assert_eq!(parsed, now);
    }
}
