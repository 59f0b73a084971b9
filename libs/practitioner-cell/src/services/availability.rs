use chrono::NaiveDate;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_utils::clock::ClockTime;

use crate::models::{
    AvailabilityDisplay, AvailabilityError, AvailabilityWindow, DayOfWeek, OpenSlots,
    SlotsEmptyReason, SubmitAvailabilityRequest, WeeklyAvailability,
};
use crate::services::slots::SlotGrid;

#[derive(Debug, Serialize, Deserialize)]
struct AvailabilityRow {
    practitioner_id: Uuid,
    slot_duration_minutes: u16,
}

#[derive(Debug, Serialize, Deserialize)]
struct WindowRow {
    practitioner_id: Uuid,
    day_of_week: DayOfWeek,
    start_time: ClockTime,
    end_time: ClockTime,
}

#[derive(Debug, Deserialize)]
struct BookedTime {
    time: ClockTime,
}

pub struct AvailabilityService {
    supabase: SupabaseClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Publish or amend a practitioner's weekly availability. Each submitted
    /// window replaces the stored window for its weekday; the store's
    /// `(practitioner_id, day_of_week)` conflict target is what guarantees
    /// one window per weekday, not a scan over the record.
    pub async fn upsert_availability(
        &self,
        practitioner_id: Uuid,
        request: SubmitAvailabilityRequest,
        auth_token: &str,
    ) -> Result<AvailabilityDisplay, AvailabilityError> {
        debug!("Upserting availability for practitioner {}", practitioner_id);

        if request.slot_duration == 0 {
            return Err(AvailabilityError::InvalidSlotDuration);
        }
        for window in &request.windows {
            if window.start_time >= window.end_time {
                return Err(AvailabilityError::WindowOrder(window.day_of_week));
            }
        }

        let record = AvailabilityRow {
            practitioner_id,
            slot_duration_minutes: request.slot_duration,
        };
        let _: Vec<AvailabilityRow> = self
            .supabase
            .upsert(
                "practitioner_availability",
                "practitioner_id",
                Some(auth_token),
                json!([record]),
            )
            .await?;

        if !request.windows.is_empty() {
            let rows: Vec<WindowRow> = request
                .windows
                .iter()
                .map(|window| WindowRow {
                    practitioner_id,
                    day_of_week: window.day_of_week,
                    start_time: window.start_time,
                    end_time: window.end_time,
                })
                .collect();
            let _: Vec<WindowRow> = self
                .supabase
                .upsert(
                    "availability_windows",
                    "practitioner_id,day_of_week",
                    Some(auth_token),
                    serde_json::to_value(rows)
                        .map_err(|e| AvailabilityError::Database(e.to_string()))?,
                )
                .await?;
        }

        // Re-read so the response carries the whole record, not just the
        // days this submission touched.
        let stored = self
            .get_availability(practitioner_id, auth_token)
            .await?;

        debug!(
            "Availability stored for practitioner {} ({} windows)",
            practitioner_id,
            stored.windows.len()
        );
        Ok(AvailabilityDisplay::from(&stored))
    }

    pub async fn get_availability(
        &self,
        practitioner_id: Uuid,
        auth_token: &str,
    ) -> Result<WeeklyAvailability, AvailabilityError> {
        self.load_availability(practitioner_id, auth_token)
            .await?
            .ok_or(AvailabilityError::NotFound(practitioner_id))
    }

    /// List the open slot start times for one calendar date, in the 12-hour
    /// display form. Nothing-to-show outcomes come back as an empty list
    /// with a reason rather than an error.
    pub async fn open_slots(
        &self,
        practitioner_id: Uuid,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<OpenSlots, AvailabilityError> {
        debug!(
            "Listing open slots for practitioner {} on {}",
            practitioner_id, date
        );

        let Some(availability) = self.load_availability(practitioner_id, auth_token).await? else {
            return Ok(OpenSlots {
                slots: vec![],
                reason: Some(SlotsEmptyReason::NoAvailabilityRecord),
            });
        };

        if availability.windows.is_empty() {
            return Ok(OpenSlots {
                slots: vec![],
                reason: Some(SlotsEmptyReason::NoWindowsDeclared),
            });
        }

        let day = DayOfWeek::from_date(date);
        let grid = SlotGrid::for_day(&availability, day);
        if grid.has_no_windows() {
            return Ok(OpenSlots {
                slots: vec![],
                reason: Some(SlotsEmptyReason::NoWindowForDay),
            });
        }

        let booked = self
            .booked_times(practitioner_id, date, auth_token)
            .await?;

        let slots: Vec<String> = grid
            .starts()
            .filter(|time| !booked.contains(time))
            .map(|time| time.to_12_hour())
            .collect();

        debug!("Found {} open slots", slots.len());
        Ok(OpenSlots {
            slots,
            reason: None,
        })
    }

    async fn load_availability(
        &self,
        practitioner_id: Uuid,
        auth_token: &str,
    ) -> Result<Option<WeeklyAvailability>, AvailabilityError> {
        let path = format!(
            "/rest/v1/practitioner_availability?practitioner_id=eq.{}",
            practitioner_id
        );
        let records: Vec<AvailabilityRow> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let Some(record) = records.into_iter().next() else {
            return Ok(None);
        };

        let path = format!(
            "/rest/v1/availability_windows?practitioner_id=eq.{}",
            practitioner_id
        );
        let rows: Vec<WindowRow> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let mut windows: Vec<AvailabilityWindow> = rows
            .into_iter()
            .map(|row| AvailabilityWindow {
                day_of_week: row.day_of_week,
                start_time: row.start_time,
                end_time: row.end_time,
            })
            .collect();
        windows.sort_by_key(|window| window.day_of_week.index());

        Ok(Some(WeeklyAvailability {
            practitioner_id: record.practitioner_id,
            slot_duration_minutes: record.slot_duration_minutes,
            windows,
        }))
    }

    async fn booked_times(
        &self,
        practitioner_id: Uuid,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<Vec<ClockTime>, AvailabilityError> {
        let path = format!(
            "/rest/v1/appointments?practitioner_id=eq.{}&date=eq.{}&select=time",
            practitioner_id, date
        );
        let rows: Vec<BookedTime> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(rows.into_iter().map(|row| row.time).collect())
    }
}
