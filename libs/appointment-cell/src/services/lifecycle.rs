use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::models::{Appointment, AppointmentError};

pub struct LifecycleService {
    supabase: SupabaseClient,
}

impl LifecycleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: Option<&str>,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let result: Vec<Appointment> = self
            .supabase
            .request(Method::GET, &path, auth_token, None)
            .await?;

        result
            .into_iter()
            .next()
            .ok_or(AppointmentError::NotFound)
    }

    /// Cancel an appointment. The store function retracts the id from the
    /// practitioner's and patient's appointment lists and deletes the record
    /// in one transaction, so a failure leaves everything untouched.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        debug!("Cancelling appointment {}", appointment_id);

        // Resolve the id first so an unknown appointment is reported as
        // not-found rather than a silent zero-row delete.
        let appointment = self.get_appointment(appointment_id, Some(auth_token)).await?;

        let removed: i64 = self
            .supabase
            .rpc(
                "cancel_appointment",
                Some(auth_token),
                json!({ "p_appointment_id": appointment_id }),
            )
            .await?;

        if removed == 0 {
            return Err(AppointmentError::NotFound);
        }

        info!(
            "Appointment {} cancelled (practitioner {}, patient {})",
            appointment_id, appointment.practitioner_id, appointment.patient_id
        );
        Ok(())
    }

    pub async fn list_for_practitioner(
        &self,
        practitioner_id: Uuid,
        date: Option<NaiveDate>,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let mut path = format!(
            "/rest/v1/appointments?practitioner_id=eq.{}&order=date.asc,time.asc",
            practitioner_id
        );
        if let Some(date) = date {
            path.push_str(&format!("&date=eq.{}", date));
        }

        let appointments: Vec<Appointment> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(appointments)
    }

    pub async fn list_for_patient(
        &self,
        patient_id: Uuid,
        date: Option<NaiveDate>,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let mut path = format!(
            "/rest/v1/appointments?patient_id=eq.{}&order=date.asc,time.asc",
            patient_id
        );
        if let Some(date) = date {
            path.push_str(&format!("&date=eq.{}", date));
        }

        let appointments: Vec<Appointment> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        Ok(appointments)
    }

    /// Stash the opaque provider intent id on an appointment so the later
    /// webhook can find it.
    pub async fn attach_payment_intent(
        &self,
        appointment_id: Uuid,
        intent_id: &str,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!(
            "Attaching payment intent to appointment {}",
            appointment_id
        );

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let updated = self
            .patch_returning(&path, json!({ "payment_intent_id": intent_id }), Some(auth_token))
            .await?;

        updated
            .into_iter()
            .next()
            .ok_or(AppointmentError::NotFound)
    }

    /// Payment-provider callback: flip `paid` on the appointment carrying
    /// this intent id.
    pub async fn mark_paid(
        &self,
        intent_id: &str,
        auth_token: Option<&str>,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Marking appointment paid for intent {}", intent_id);

        let path = format!(
            "/rest/v1/appointments?payment_intent_id=eq.{}",
            intent_id
        );
        let updated = self
            .patch_returning(&path, json!({ "paid": true }), auth_token)
            .await?;

        let appointment = updated
            .into_iter()
            .next()
            .ok_or(AppointmentError::NotFound)?;

        info!("Appointment {} marked paid", appointment.id);
        Ok(appointment)
    }

    async fn patch_returning(
        &self,
        path: &str,
        body: serde_json::Value,
        auth_token: Option<&str>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Prefer",
            HeaderValue::from_static("return=representation"),
        );

        let updated: Vec<Appointment> = self
            .supabase
            .request_with_headers(Method::PATCH, path, auth_token, Some(body), Some(headers))
            .await?;

        Ok(updated)
    }
}
