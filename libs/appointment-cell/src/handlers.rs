use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    Json,
};
use axum_extra::TypedHeader;
use headers::{authorization::Bearer, Authorization};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{
    AttachPaymentIntentRequest, BookAppointmentRequest, ListQuery, PaymentCallback,
};
use crate::services::{BookingService, LifecycleService};

#[axum::debug_handler]
pub async fn book_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    // A patient can only book for themselves.
    if request.patient_id.to_string() != user.id {
        return Err(AppError::Auth(
            "Not authorized to book an appointment for this patient".to_string(),
        ));
    }

    let service = BookingService::new(&config);
    let appointment = service.book_appointment(request, auth.token()).await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Appointment booked successfully",
        "appointment": appointment,
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = LifecycleService::new(&config);
    service
        .cancel_appointment(appointment_id, auth.token())
        .await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Appointment canceled successfully",
    })))
}

#[axum::debug_handler]
pub async fn practitioner_appointments(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(practitioner_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let service = LifecycleService::new(&config);
    let appointments = service
        .list_for_practitioner(practitioner_id, query.date, auth.token())
        .await?;

    Ok(Json(json!({
        "status": "success",
        "appointments": appointments,
    })))
}

#[axum::debug_handler]
pub async fn patient_appointments(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(patient_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let service = LifecycleService::new(&config);
    let appointments = service
        .list_for_patient(patient_id, query.date, auth.token())
        .await?;

    Ok(Json(json!({
        "status": "success",
        "appointments": appointments,
    })))
}

#[axum::debug_handler]
pub async fn attach_payment_intent(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<AttachPaymentIntentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = LifecycleService::new(&config);
    let appointment = service
        .attach_payment_intent(appointment_id, &request.intent_id, auth.token())
        .await?;

    Ok(Json(json!({
        "status": "success",
        "appointment": appointment,
    })))
}

/// Payment-provider webhook. The provider does not carry our bearer token,
/// so this handler sits outside the auth layer and trusts only the intent id
/// correlation.
#[axum::debug_handler]
pub async fn payment_callback(
    State(config): State<Arc<AppConfig>>,
    Json(callback): Json<PaymentCallback>,
) -> Result<Json<Value>, AppError> {
    if !callback.transaction.success {
        // Unsuccessful attempts are acknowledged without touching anything.
        return Ok(Json(json!({ "status": "success" })));
    }

    let service = LifecycleService::new(&config);
    service.mark_paid(&callback.intention.id, None).await?;

    Ok(Json(json!({ "status": "success" })))
}
