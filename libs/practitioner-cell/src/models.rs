use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_database::DbError;
use shared_models::error::AppError;
use shared_utils::clock::{ClockTime, MalformedTimeError};

/// Weekday of a recurring availability window. Serialized as the full name
/// ("Monday") — the form callers submit and the store keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Sunday,
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|day| day.name() == name)
    }

    pub fn from_date(date: NaiveDate) -> Self {
        match date.weekday() {
            Weekday::Sun => DayOfWeek::Sunday,
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "Sunday",
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
        }
    }

    /// Position in the week, Sunday = 0. Used to keep windows in weekday
    /// order when assembling a record.
    pub fn index(self) -> u8 {
        match self {
            DayOfWeek::Sunday => 0,
            DayOfWeek::Monday => 1,
            DayOfWeek::Tuesday => 2,
            DayOfWeek::Wednesday => 3,
            DayOfWeek::Thursday => 4,
            DayOfWeek::Friday => 5,
            DayOfWeek::Saturday => 6,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One declared interval of availability on a weekday. At most one window
/// per weekday per practitioner; the store's unique index on
/// `(practitioner_id, day_of_week)` enforces this against concurrent writers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityWindow {
    pub day_of_week: DayOfWeek,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

/// A practitioner's full availability record: one slot duration applied
/// uniformly to every window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyAvailability {
    pub practitioner_id: Uuid,
    pub slot_duration_minutes: u16,
    pub windows: Vec<AvailabilityWindow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAvailabilityRequest {
    pub slot_duration: u16,
    pub windows: Vec<AvailabilityWindow>,
}

/// Availability rendered for API responses: stored canonical times shown in
/// the 12-hour display form.
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityDisplay {
    pub practitioner_id: Uuid,
    pub slot_duration_minutes: u16,
    pub windows: Vec<WindowDisplay>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WindowDisplay {
    pub day_of_week: DayOfWeek,
    pub start_time: String,
    pub end_time: String,
}

impl From<&WeeklyAvailability> for AvailabilityDisplay {
    fn from(availability: &WeeklyAvailability) -> Self {
        Self {
            practitioner_id: availability.practitioner_id,
            slot_duration_minutes: availability.slot_duration_minutes,
            windows: availability
                .windows
                .iter()
                .map(|window| WindowDisplay {
                    day_of_week: window.day_of_week,
                    start_time: window.start_time.to_12_hour(),
                    end_time: window.end_time.to_12_hour(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
}

/// Result of a slot listing. An empty day is a normal outcome, not an error;
/// `reason` says which kind of empty it is.
#[derive(Debug, Clone, Serialize)]
pub struct OpenSlots {
    pub slots: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SlotsEmptyReason>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotsEmptyReason {
    NoAvailabilityRecord,
    NoWindowsDeclared,
    NoWindowForDay,
}

impl SlotsEmptyReason {
    pub fn message(self) -> &'static str {
        match self {
            SlotsEmptyReason::NoAvailabilityRecord => {
                "No availability has been published for this practitioner"
            }
            SlotsEmptyReason::NoWindowsDeclared => "No availability data found",
            SlotsEmptyReason::NoWindowForDay => {
                "The practitioner is not available on the selected day"
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum AvailabilityError {
    #[error("slot duration must be a positive number of minutes")]
    InvalidSlotDuration,

    #[error("start time must be before end time for {0}")]
    WindowOrder(DayOfWeek),

    #[error(transparent)]
    MalformedTime(#[from] MalformedTimeError),

    #[error("no availability declared for practitioner {0}")]
    NotFound(Uuid),

    #[error("store error: {0}")]
    Database(String),
}

impl From<DbError> for AvailabilityError {
    fn from(err: DbError) -> Self {
        AvailabilityError::Database(err.to_string())
    }
}

impl From<AvailabilityError> for AppError {
    fn from(err: AvailabilityError) -> Self {
        match err {
            AvailabilityError::InvalidSlotDuration
            | AvailabilityError::WindowOrder(_)
            | AvailabilityError::MalformedTime(_) => AppError::Validation(err.to_string()),
            AvailabilityError::NotFound(_) => AppError::NotFound(err.to_string()),
            AvailabilityError::Database(msg) => AppError::Database(msg),
        }
    }
}
