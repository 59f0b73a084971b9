//! Clock-of-day arithmetic for scheduling.
//!
//! Two textual forms exist at the API boundary: a 12-hour display form with a
//! trailing meridiem marker ("9:30 am") and the canonical 24-hour `HH:MM`
//! form used for storage and comparison. `ClockTime` is the single internal
//! representation; both forms parse into it and both render from it.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed clock time: {input:?}")]
pub struct MalformedTimeError {
    pub input: String,
}

/// A time of day, stored as minutes since midnight (always `< 1440`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClockTime {
    minutes: u16,
}

fn meridiem_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(am|pm)\s*$").expect("meridiem regex"))
}

impl ClockTime {
    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self { minutes })
    }

    pub fn from_hm(hour: u16, minute: u16) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Some(Self {
            minutes: hour * 60 + minute,
        })
    }

    pub fn minutes_from_midnight(self) -> u16 {
        self.minutes
    }

    pub fn hour(self) -> u16 {
        self.minutes / 60
    }

    pub fn minute(self) -> u16 {
        self.minutes % 60
    }

    /// Step forward; `None` once the day boundary is crossed.
    pub fn checked_add(self, minutes: u16) -> Option<Self> {
        Self::from_minutes(self.minutes.checked_add(minutes)?)
    }

    /// Parse either textual form. A case-insensitive meridiem suffix selects
    /// the 12-hour reading ("12:xx am" is hour 0, "12:xx pm" is hour 12);
    /// anything else must be canonical 24-hour `HH:MM`. Unlike a best-effort
    /// pass-through, unparsable text is an error.
    pub fn parse(text: &str) -> Result<Self, MalformedTimeError> {
        let malformed = || MalformedTimeError {
            input: text.to_string(),
        };
        let trimmed = text.trim();

        if let Some(marker) = meridiem_suffix().find(trimmed) {
            let is_pm = marker.as_str().trim().eq_ignore_ascii_case("pm");
            let clock_part = trimmed[..marker.start()].trim();
            let (hour, minute) = split_hm(clock_part).ok_or_else(malformed)?;
            if !(1..=12).contains(&hour) || minute > 59 {
                return Err(malformed());
            }
            let hour24 = match (hour, is_pm) {
                (12, false) => 0,
                (12, true) => 12,
                (h, true) => h + 12,
                (h, false) => h,
            };
            return Self::from_hm(hour24, minute).ok_or_else(malformed);
        }

        let (hour, minute) = split_hm(trimmed).ok_or_else(malformed)?;
        Self::from_hm(hour, minute).ok_or_else(malformed)
    }

    /// Render the 12-hour display form: no leading zero on the hour,
    /// zero-padded minutes, lowercase meridiem.
    pub fn to_12_hour(self) -> String {
        let meridiem = if self.minutes < MINUTES_PER_DAY / 2 {
            "am"
        } else {
            "pm"
        };
        let hour = match self.hour() % 12 {
            0 => 12,
            h => h,
        };
        format!("{}:{:02} {}", hour, self.minute(), meridiem)
    }
}

fn split_hm(text: &str) -> Option<(u16, u16)> {
    let (hour, minute) = text.split_once(':')?;
    Some((hour.parse().ok()?, minute.parse().ok()?))
}

impl fmt::Display for ClockTime {
    /// Canonical zero-padded 24-hour `HH:MM`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        ClockTime::parse(&text).map_err(de::Error::custom)
    }
}
