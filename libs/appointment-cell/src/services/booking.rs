use reqwest::Method;
use serde_json::{json, Value};
use tracing::{info, warn};

use practitioner_cell::models::AvailabilityError;
use practitioner_cell::services::{AvailabilityService, SlotGrid};
use shared_config::AppConfig;
use shared_database::{DbError, SupabaseClient};
use shared_utils::clock::ClockTime;

use crate::models::{Appointment, AppointmentError, BookAppointmentRequest, BookingDate};

pub struct BookingService {
    supabase: SupabaseClient,
    availability: AvailabilityService,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            availability: AvailabilityService::new(config),
        }
    }

    /// Validate and create one appointment. Single-shot: every failure is a
    /// terminal outcome for this request, nothing is retried.
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        info!(
            "Booking appointment for patient {} with practitioner {}",
            request.patient_id, request.practitioner_id
        );

        let booking_date = BookingDate::parse(&request.date)?;

        let availability = self
            .availability
            .get_availability(request.practitioner_id, auth_token)
            .await
            .map_err(|err| match err {
                AvailabilityError::NotFound(id) => AppointmentError::AvailabilityNotFound(id),
                other => AppointmentError::Database(other.to_string()),
            })?;

        let time = ClockTime::parse(&request.time)?;

        // The set of bookable times is exactly the set the slot listing
        // advertises: in-window but non-grid-aligned times are rejected.
        let grid = SlotGrid::for_day(&availability, booking_date.day_of_week);
        if !grid.contains(time) {
            return Err(AppointmentError::TimeOutsideAvailability);
        }

        // Advisory pre-check for the friendly error; the store's unique
        // index on (practitioner_id, date, time) is what actually closes
        // the race at create time.
        if self
            .slot_taken(&request, &booking_date, time, auth_token)
            .await?
        {
            return Err(AppointmentError::SlotAlreadyBooked);
        }

        // The store function inserts the appointment and appends its id to
        // both parties' appointment lists in one transaction.
        let created: Appointment = self
            .supabase
            .rpc(
                "book_appointment",
                Some(auth_token),
                json!({
                    "p_practitioner_id": request.practitioner_id,
                    "p_patient_id": request.patient_id,
                    "p_patient_name": request.patient_name,
                    "p_age": request.age,
                    "p_phone_number": request.phone_number,
                    "p_date": booking_date.date,
                    "p_date_display": booking_date.display,
                    "p_time": time,
                }),
            )
            .await
            .map_err(|err| match err {
                DbError::Conflict(msg) => {
                    warn!(
                        "Concurrent booking lost the race for practitioner {} at {} {}: {}",
                        request.practitioner_id, booking_date.date, time, msg
                    );
                    AppointmentError::ConsistencyConflict
                }
                other => AppointmentError::Database(other.to_string()),
            })?;

        info!("Appointment {} booked successfully", created.id);
        Ok(created)
    }

    async fn slot_taken(
        &self,
        request: &BookAppointmentRequest,
        booking_date: &BookingDate,
        time: ClockTime,
        auth_token: &str,
    ) -> Result<bool, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?practitioner_id=eq.{}&date=eq.{}&time=eq.{}",
            request.practitioner_id, booking_date.date, time
        );
        let existing: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(!existing.is_empty())
    }
}
