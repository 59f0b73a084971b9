use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::auth_middleware;

use crate::handlers;

pub fn practitioner_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/availability", post(handlers::submit_availability))
        .route(
            "/availability/{practitioner_id}",
            get(handlers::get_availability),
        )
        .route("/{practitioner_id}/slots", get(handlers::open_slots))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
