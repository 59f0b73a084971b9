// libs/practitioner-cell/tests/availability_test.rs

use assert_matches::assert_matches;
use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use practitioner_cell::models::*;
use practitioner_cell::services::AvailabilityService;
use shared_config::AppConfig;
use shared_utils::clock::ClockTime;
use shared_utils::test_utils::TestConfig;

const TOKEN: &str = "test-token";

fn config_for(server: &MockServer) -> AppConfig {
    TestConfig::with_store_url(&server.uri()).to_app_config()
}

fn window(day: DayOfWeek, start: &str, end: &str) -> AvailabilityWindow {
    AvailabilityWindow {
        day_of_week: day,
        start_time: ClockTime::parse(start).unwrap(),
        end_time: ClockTime::parse(end).unwrap(),
    }
}

fn availability_row(practitioner_id: Uuid, slot_duration: u16) -> serde_json::Value {
    json!({
        "practitioner_id": practitioner_id,
        "slot_duration_minutes": slot_duration,
    })
}

fn window_row(practitioner_id: Uuid, day: &str, start: &str, end: &str) -> serde_json::Value {
    json!({
        "practitioner_id": practitioner_id,
        "day_of_week": day,
        "start_time": start,
        "end_time": end,
    })
}

async fn mock_stored_record(
    server: &MockServer,
    practitioner_id: Uuid,
    slot_duration: u16,
    windows: Vec<serde_json::Value>,
) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/practitioner_availability"))
        .and(query_param(
            "practitioner_id",
            format!("eq.{}", practitioner_id),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            availability_row(practitioner_id, slot_duration)
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/availability_windows"))
        .and(query_param(
            "practitioner_id",
            format!("eq.{}", practitioner_id),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(windows)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn upsert_persists_and_renders_display_times() {
    let server = MockServer::start().await;
    let practitioner_id = Uuid::new_v4();

    Mock::given(method("POST"))
        .and(path("/rest/v1/practitioner_availability"))
        .and(query_param("on_conflict", "practitioner_id"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            availability_row(practitioner_id, 30)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/availability_windows"))
        .and(query_param("on_conflict", "practitioner_id,day_of_week"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            window_row(practitioner_id, "Monday", "09:00", "17:00")
        ])))
        .expect(1)
        .mount(&server)
        .await;

    mock_stored_record(
        &server,
        practitioner_id,
        30,
        vec![window_row(practitioner_id, "Monday", "09:00", "17:00")],
    )
    .await;

    let service = AvailabilityService::new(&config_for(&server));
    let request = SubmitAvailabilityRequest {
        slot_duration: 30,
        windows: vec![window(DayOfWeek::Monday, "9:00 am", "5:00 pm")],
    };

    let stored = service
        .upsert_availability(practitioner_id, request, TOKEN)
        .await
        .unwrap();

    assert_eq!(stored.slot_duration_minutes, 30);
    assert_eq!(stored.windows.len(), 1);
    assert_eq!(stored.windows[0].start_time, "9:00 am");
    assert_eq!(stored.windows[0].end_time, "5:00 pm");
}

#[tokio::test]
async fn upsert_rejects_zero_slot_duration() {
    let server = MockServer::start().await;
    let service = AvailabilityService::new(&config_for(&server));

    let request = SubmitAvailabilityRequest {
        slot_duration: 0,
        windows: vec![window(DayOfWeek::Monday, "09:00", "17:00")],
    };

    let result = service
        .upsert_availability(Uuid::new_v4(), request, TOKEN)
        .await;
    assert_matches!(result, Err(AvailabilityError::InvalidSlotDuration));
}

#[tokio::test]
async fn upsert_rejects_inverted_window() {
    let server = MockServer::start().await;
    let service = AvailabilityService::new(&config_for(&server));

    let request = SubmitAvailabilityRequest {
        slot_duration: 30,
        windows: vec![window(DayOfWeek::Friday, "17:00", "09:00")],
    };

    let result = service
        .upsert_availability(Uuid::new_v4(), request, TOKEN)
        .await;
    assert_matches!(
        result,
        Err(AvailabilityError::WindowOrder(DayOfWeek::Friday))
    );
}

#[tokio::test]
async fn get_availability_reports_missing_record() {
    let server = MockServer::start().await;
    let practitioner_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/practitioner_availability"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let service = AvailabilityService::new(&config_for(&server));
    let result = service.get_availability(practitioner_id, TOKEN).await;

    assert_matches!(result, Err(AvailabilityError::NotFound(id)) if id == practitioner_id);
}

#[tokio::test]
async fn open_slots_without_record_is_empty_with_reason() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/practitioner_availability"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let service = AvailabilityService::new(&config_for(&server));
    // 2026-08-10 is a Monday.
    let date = NaiveDate::from_ymd_opt(2026, 8, 10).unwrap();
    let open = service
        .open_slots(Uuid::new_v4(), date, TOKEN)
        .await
        .unwrap();

    assert!(open.slots.is_empty());
    assert_eq!(open.reason, Some(SlotsEmptyReason::NoAvailabilityRecord));
}

#[tokio::test]
async fn open_slots_without_windows_is_empty_with_reason() {
    let server = MockServer::start().await;
    let practitioner_id = Uuid::new_v4();

    mock_stored_record(&server, practitioner_id, 30, vec![]).await;

    let service = AvailabilityService::new(&config_for(&server));
    let date = NaiveDate::from_ymd_opt(2026, 8, 10).unwrap();
    let open = service
        .open_slots(practitioner_id, date, TOKEN)
        .await
        .unwrap();

    assert!(open.slots.is_empty());
    assert_eq!(open.reason, Some(SlotsEmptyReason::NoWindowsDeclared));
}

#[tokio::test]
async fn open_slots_for_an_off_day_is_empty_with_reason() {
    let server = MockServer::start().await;
    let practitioner_id = Uuid::new_v4();

    mock_stored_record(
        &server,
        practitioner_id,
        30,
        vec![window_row(practitioner_id, "Monday", "09:00", "17:00")],
    )
    .await;

    let service = AvailabilityService::new(&config_for(&server));
    // 2026-08-11 is a Tuesday.
    let date = NaiveDate::from_ymd_opt(2026, 8, 11).unwrap();
    let open = service
        .open_slots(practitioner_id, date, TOKEN)
        .await
        .unwrap();

    assert!(open.slots.is_empty());
    assert_eq!(open.reason, Some(SlotsEmptyReason::NoWindowForDay));
}

#[tokio::test]
async fn open_slots_lists_grid_minus_booked() {
    let server = MockServer::start().await;
    let practitioner_id = Uuid::new_v4();

    mock_stored_record(
        &server,
        practitioner_id,
        30,
        vec![window_row(practitioner_id, "Monday", "09:00", "10:30")],
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("date", "eq.2026-08-10"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "time": "09:30" }])),
        )
        .mount(&server)
        .await;

    let service = AvailabilityService::new(&config_for(&server));
    let date = NaiveDate::from_ymd_opt(2026, 8, 10).unwrap();
    let open = service
        .open_slots(practitioner_id, date, TOKEN)
        .await
        .unwrap();

    assert_eq!(open.slots, vec!["9:00 am", "10:00 am"]);
    assert_eq!(open.reason, None);
}
