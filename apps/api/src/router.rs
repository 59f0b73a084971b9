use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::{appointment_routes, payment_routes};
use practitioner_cell::router::practitioner_routes;
use shared_config::AppConfig;

pub fn create_router(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/", get(|| async { "Carelink API is running!" }))
        .nest("/practitioners", practitioner_routes(state.clone()))
        .nest("/appointments", appointment_routes(state.clone()))
        .nest("/payments", payment_routes(state))
}
