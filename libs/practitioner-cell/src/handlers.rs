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

use crate::models::{AvailabilityDisplay, SlotsQuery, SubmitAvailabilityRequest};
use crate::services::AvailabilityService;

#[axum::debug_handler]
pub async fn submit_availability(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(request): Json<SubmitAvailabilityRequest>,
) -> Result<Json<Value>, AppError> {
    if !user.is_practitioner() {
        return Err(AppError::Auth(
            "Only practitioners can publish availability".to_string(),
        ));
    }
    let practitioner_id = caller_id(&user)?;

    let service = AvailabilityService::new(&config);
    let stored = service
        .upsert_availability(practitioner_id, request, auth.token())
        .await?;

    Ok(Json(json!({
        "status": "success",
        "message": "Availability slots added successfully",
        "availability": stored,
    })))
}

#[axum::debug_handler]
pub async fn get_availability(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(practitioner_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&config);
    let availability = service
        .get_availability(practitioner_id, auth.token())
        .await?;

    Ok(Json(json!({
        "status": "success",
        "availability": AvailabilityDisplay::from(&availability),
    })))
}

#[axum::debug_handler]
pub async fn open_slots(
    State(config): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(_user): Extension<User>,
    Path(practitioner_id): Path<Uuid>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&config);
    let open = service
        .open_slots(practitioner_id, query.date, auth.token())
        .await?;

    let message = match open.reason {
        Some(reason) => reason.message().to_string(),
        None => format!("Available time slots for {}", query.date),
    };

    Ok(Json(json!({
        "status": "success",
        "available_slots": open.slots,
        "message": message,
    })))
}

fn caller_id(user: &User) -> Result<Uuid, AppError> {
    Uuid::parse_str(&user.id)
        .map_err(|_| AppError::Auth("Caller identity is not a valid id".to_string()))
}
