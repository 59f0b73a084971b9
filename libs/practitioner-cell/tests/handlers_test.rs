// libs/practitioner-cell/tests/handlers_test.rs

use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use axum_extra::TypedHeader;
use chrono::NaiveDate;
use headers::{authorization::Bearer, Authorization};
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use practitioner_cell::handlers;
use practitioner_cell::models::*;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::clock::ClockTime;
use shared_utils::test_utils::{TestConfig, TestUser};

fn auth_header() -> TypedHeader<Authorization<Bearer>> {
    TypedHeader(Authorization::bearer("test-token").unwrap())
}

fn user_extension(user: &TestUser) -> Extension<User> {
    Extension(user.to_user())
}

#[tokio::test]
async fn patients_cannot_publish_availability() {
    let config = TestConfig::default().to_arc();
    let patient = TestUser::patient("pat@example.com");

    let request = SubmitAvailabilityRequest {
        slot_duration: 30,
        windows: vec![],
    };

    let result = handlers::submit_availability(
        State(config),
        auth_header(),
        user_extension(&patient),
        Json(request),
    )
    .await;

    assert!(matches!(result, Err(AppError::Auth(_))));
}

#[tokio::test]
async fn open_slots_handler_reports_reason_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/practitioner_availability"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let config = TestConfig::with_store_url(&server.uri()).to_arc();
    let patient = TestUser::patient("pat@example.com");

    let Json(body) = handlers::open_slots(
        State(config),
        auth_header(),
        user_extension(&patient),
        Path(Uuid::new_v4()),
        Query(SlotsQuery {
            date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(body["status"], "success");
    assert_eq!(body["available_slots"], json!([]));
    assert_eq!(
        body["message"],
        "No availability has been published for this practitioner"
    );
}

#[tokio::test]
async fn submit_availability_handler_round_trips_windows() {
    let server = MockServer::start().await;
    let practitioner = TestUser::practitioner("doc@example.com");
    let practitioner_id = Uuid::parse_str(&practitioner.id).unwrap();

    Mock::given(method("POST"))
        .and(path("/rest/v1/practitioner_availability"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "practitioner_id": practitioner_id,
            "slot_duration_minutes": 20,
        }])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/availability_windows"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "practitioner_id": practitioner_id,
            "day_of_week": "Tuesday",
            "start_time": "08:00",
            "end_time": "12:00",
        }])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/practitioner_availability"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "practitioner_id": practitioner_id,
            "slot_duration_minutes": 20,
        }])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/availability_windows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "practitioner_id": practitioner_id,
            "day_of_week": "Tuesday",
            "start_time": "08:00",
            "end_time": "12:00",
        }])))
        .mount(&server)
        .await;

    let config = TestConfig::with_store_url(&server.uri()).to_arc();
    let request = SubmitAvailabilityRequest {
        slot_duration: 20,
        windows: vec![AvailabilityWindow {
            day_of_week: DayOfWeek::Tuesday,
            start_time: ClockTime::parse("8:00 am").unwrap(),
            end_time: ClockTime::parse("12:00 pm").unwrap(),
        }],
    };

    let Json(body) = handlers::submit_availability(
        State(config),
        auth_header(),
        user_extension(&practitioner),
        Json(request),
    )
    .await
    .unwrap();

    assert_eq!(body["status"], "success");
    assert_eq!(body["availability"]["windows"][0]["start_time"], "8:00 am");
    assert_eq!(body["availability"]["windows"][0]["end_time"], "12:00 pm");
}
