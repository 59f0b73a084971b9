use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", post(handlers::book_appointment))
        .route("/{appointment_id}/cancel", post(handlers::cancel_appointment))
        .route(
            "/{appointment_id}/payment-intent",
            post(handlers::attach_payment_intent),
        )
        .route(
            "/practitioners/{practitioner_id}",
            get(handlers::practitioner_appointments),
        )
        .route("/patients/{patient_id}", get(handlers::patient_appointments))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}

/// The provider webhook is the one surface left outside the auth layer.
pub fn payment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/callback", post(handlers::payment_callback))
        .with_state(state)
}
