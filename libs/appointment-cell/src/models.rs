use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use practitioner_cell::models::DayOfWeek;
use shared_database::DbError;
use shared_models::error::AppError;
use shared_utils::clock::{ClockTime, MalformedTimeError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub practitioner_id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub age: i32,
    pub phone_number: String,
    /// Normalized calendar date: the stored/query key.
    pub date: NaiveDate,
    /// The caller's original free-form date text, kept for display only.
    pub date_display: String,
    /// Canonical slot start.
    pub time: ClockTime,
    pub status: AppointmentStatus,
    pub paid: bool,
    #[serde(default)]
    pub payment_intent_id: Option<String>,
}

/// Booking only ever produces `Booked`; the other variants are the
/// extension point for post-visit bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Booked,
    Completed,
    NoShow,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Booked => write!(f, "Booked"),
            AppointmentStatus::Completed => write!(f, "Completed"),
            AppointmentStatus::NoShow => write!(f, "NoShow"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentRequest {
    pub practitioner_id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub age: i32,
    pub phone_number: String,
    /// Free-form "Weekday, Month Day, Year" text, e.g.
    /// "Monday, August 10, 2026".
    pub date: String,
    /// 12-hour or canonical 24-hour clock text.
    pub time: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttachPaymentIntentRequest {
    pub intent_id: String,
}

/// Webhook body in the payment provider's shape.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentCallback {
    pub transaction: CallbackTransaction,
    pub intention: CallbackIntention,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackTransaction {
    pub success: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackIntention {
    pub id: String,
}

/// A booking-request date, decomposed and normalized at the boundary. The
/// constructed `NaiveDate` is authoritative from here on; the weekday token
/// must agree with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDate {
    pub day_of_week: DayOfWeek,
    pub date: NaiveDate,
    pub display: String,
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn month_number(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|month| *month == name)
        .map(|index| index as u32 + 1)
}

impl BookingDate {
    pub fn parse(text: &str) -> Result<Self, AppointmentError> {
        let parts: Vec<&str> = text.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(AppointmentError::InvalidDateFormat(text.to_string()));
        }

        let day_of_week = DayOfWeek::from_name(parts[0])
            .ok_or_else(|| AppointmentError::InvalidDayOfWeek(parts[0].to_string()))?;

        let mut month_day = parts[1].split_whitespace();
        let (Some(month_name), Some(day_text), None) =
            (month_day.next(), month_day.next(), month_day.next())
        else {
            return Err(AppointmentError::InvalidDate(text.to_string()));
        };

        let month = month_number(month_name)
            .ok_or_else(|| AppointmentError::InvalidDate(text.to_string()))?;
        let day: u32 = day_text
            .parse()
            .map_err(|_| AppointmentError::InvalidDate(text.to_string()))?;
        let year: i32 = parts[2]
            .parse()
            .map_err(|_| AppointmentError::InvalidDate(text.to_string()))?;

        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| AppointmentError::InvalidDate(text.to_string()))?;

        if DayOfWeek::from_date(date) != day_of_week {
            return Err(AppointmentError::InvalidDayOfWeek(parts[0].to_string()));
        }

        Ok(Self {
            day_of_week,
            date,
            display: text.to_string(),
        })
    }
}

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("invalid date format: expected \"Weekday, Month Day, Year\", got {0:?}")]
    InvalidDateFormat(String),

    #[error("invalid day of the week: {0:?}")]
    InvalidDayOfWeek(String),

    #[error("invalid calendar date: {0:?}")]
    InvalidDate(String),

    #[error(transparent)]
    MalformedTime(#[from] MalformedTimeError),

    #[error("no availability declared for practitioner {0}")]
    AvailabilityNotFound(Uuid),

    #[error("the selected time is outside the available time slots")]
    TimeOutsideAvailability,

    #[error("the selected time is already booked")]
    SlotAlreadyBooked,

    #[error("the selected time was taken by a concurrent booking")]
    ConsistencyConflict,

    #[error("appointment not found")]
    NotFound,

    #[error("store error: {0}")]
    Database(String),
}

impl From<DbError> for AppointmentError {
    fn from(err: DbError) -> Self {
        AppointmentError::Database(err.to_string())
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::InvalidDateFormat(_)
            | AppointmentError::InvalidDayOfWeek(_)
            | AppointmentError::InvalidDate(_)
            | AppointmentError::MalformedTime(_)
            | AppointmentError::TimeOutsideAvailability => AppError::BadRequest(err.to_string()),
            AppointmentError::AvailabilityNotFound(_) | AppointmentError::NotFound => {
                AppError::NotFound(err.to_string())
            }
            AppointmentError::SlotAlreadyBooked | AppointmentError::ConsistencyConflict => {
                AppError::Conflict(err.to_string())
            }
            AppointmentError::Database(msg) => AppError::Database(msg),
        }
    }
}
