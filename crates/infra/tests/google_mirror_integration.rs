//! Integration tests for the Google Calendar mirror against a mock API.

mod support;

use std::sync::Arc;

use busysync_core::CalendarMirror;
use busysync_domain::{BackendError, EventId, SlotDuration};
use busysync_infra::google::{GoogleCalendarMirror, StaticAccessToken};
use serde_json::json;
use support::{http_client, local, window};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EVENTS_PATH: &str = "/calendars/busy-calendar/events";

fn mirror(server: &MockServer) -> GoogleCalendarMirror {
    GoogleCalendarMirror::new(
        http_client(),
        Arc::new(StaticAccessToken::new("ya29.test")),
        server.uri(),
        "busy-calendar",
        "med busy",
    )
}

fn managed(id: &str, start: &str) -> serde_json::Value {
    json!({
        "id": id,
        "summary": "med busy",
        "description": "med busy",
        "start": { "dateTime": start }
    })
}

#[tokio::test]
async fn lists_managed_events_across_pages() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [managed("evt-3", "2024-02-20T08:00:00+02:00")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .and(header("authorization", "Bearer ya29.test"))
        .and(query_param("singleEvents", "true"))
        .and(query_param("showDeleted", "false"))
        .and(query_param("timeMin", "2024-02-18T22:00:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                managed("evt-1", "2024-02-19T15:30:00Z"),
                {
                    "id": "dentist",
                    "summary": "Dentist",
                    "start": { "dateTime": "2024-02-19T10:00:00Z" }
                },
                {
                    "id": "evt-2",
                    "summary": "med busy",
                    "description": "  med busy\n",
                    "start": { "dateTime": "2024-02-19T16:00:00Z" }
                },
                // Started before the window; returned because it ends inside it.
                managed("evt-early", "2024-02-18T21:30:00Z")
            ],
            "nextPageToken": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let events = mirror(&server).list_managed_events(&window(7)).await.unwrap();

    let listed: Vec<_> = events.iter().map(|e| (e.id.as_str(), e.slot)).collect();
    assert_eq!(
        listed,
        vec![
            ("evt-1", local(19, 17, 30)),
            ("evt-2", local(19, 18, 0)),
            ("evt-3", local(20, 8, 0)),
        ]
    );
}

#[tokio::test]
async fn managed_all_day_event_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": "evt-all-day",
                "description": "med busy",
                "start": { "date": "2024-02-19" }
            }]
        })))
        .mount(&server)
        .await;

    let err = mirror(&server).list_managed_events(&window(7)).await.unwrap_err();
    assert!(matches!(
        err,
        BackendError::InvalidEvent { ref id, .. } if id.as_str() == "evt-all-day"
    ));
}

#[tokio::test]
async fn list_failure_is_a_list_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("insufficient permissions"))
        .mount(&server)
        .await;

    let err = mirror(&server).list_managed_events(&window(7)).await.unwrap_err();
    match err {
        BackendError::List { message } => assert!(message.contains("insufficient permissions")),
        other => panic!("expected list error, got {other:?}"),
    }
}

#[tokio::test]
async fn creates_marked_event_for_slot() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(EVENTS_PATH))
        .and(header("authorization", "Bearer ya29.test"))
        .and(body_partial_json(json!({
            "summary": "med busy",
            "description": "med busy",
            "start": { "dateTime": "2024-02-19T15:30:00Z" },
            "end": { "dateTime": "2024-02-19T16:00:00Z" },
            "organizer": { "displayName": "Auto booking" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "created-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let id = mirror(&server)
        .create_event(local(19, 17, 30), SlotDuration::from_minutes(30))
        .await
        .unwrap();
    assert_eq!(id, EventId::new("created-1"));
}

#[tokio::test]
async fn failed_create_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(EVENTS_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let slot = local(19, 17, 30);
    let err = mirror(&server).create_event(slot, SlotDuration::from_minutes(30)).await.unwrap_err();
    assert!(matches!(err, BackendError::Create { slot: s, .. } if s == slot));
}

#[tokio::test]
async fn delete_of_vanished_event_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("{EVENTS_PATH}/evt-gone")))
        .respond_with(ResponseTemplate::new(410))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{EVENTS_PATH}/evt-1")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let mirror = mirror(&server);
    mirror.delete_event(&EventId::new("evt-1")).await.unwrap();

    let err = mirror.delete_event(&EventId::new("evt-gone")).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn server_errors_on_delete_are_retried_then_reported() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("{EVENTS_PATH}/evt-1")))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend error"))
        .expect(2)
        .mount(&server)
        .await;

    let err = mirror(&server).delete_event(&EventId::new("evt-1")).await.unwrap_err();
    match err {
        BackendError::Delete { id, slot, message } => {
            assert_eq!(id.as_str(), "evt-1");
            assert_eq!(slot, None);
            assert!(message.contains("backend error"));
        }
        other => panic!("expected delete error, got {other:?}"),
    }
}
