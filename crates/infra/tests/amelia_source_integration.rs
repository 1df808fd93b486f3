//! Integration tests for the Amelia busy-slot source against a mock site.

mod support;

use busysync_core::BusySlotSource;
use busysync_domain::{AmeliaSourceConfig, SlotSet, SourceError};
use busysync_infra::AmeliaBusySlotSource;
use serde_json::json;
use support::{http_client, local, window};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SLOTS_PATH: &str = "/wp-admin/admin-ajax.php";

fn source(server: &MockServer) -> AmeliaBusySlotSource {
    AmeliaBusySlotSource::new(
        http_client(),
        AmeliaSourceConfig {
            base_url: server.uri(),
            service_id: 13,
            service_duration_secs: 1800,
            provider_ids: vec![23, 24],
            months_load: 1,
            success_marker: "Successfully".to_string(),
        },
    )
}

fn occupied_entry() -> serde_json::Value {
    json!([[23, null, 0, 13]])
}

#[tokio::test]
async fn occupied_slots_inside_window_are_busy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SLOTS_PATH))
        .and(query_param("action", "wpamelia_api"))
        .and(query_param("call", "/slots"))
        .and(query_param("serviceId", "13"))
        .and(query_param("serviceDuration", "1800"))
        .and(query_param("providerIds", "23,24"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Successfully retrieved slots",
            "data": {
                "available": { "2024-02-19": { "19:00": [[23, null]] } },
                "occupied": {
                    "2024-02-19": { "17:30": occupied_entry(), "18:00": occupied_entry() },
                    "2024-02-20": { "08:00": occupied_entry() },
                    "2024-03-04": { "17:30": occupied_entry() }
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let busy = source(&server).fetch_busy_slots(&window(7)).await.unwrap();

    let expected: SlotSet =
        [local(19, 17, 30), local(19, 18, 0), local(20, 8, 0)].into_iter().collect();
    assert_eq!(busy, expected);
}

#[tokio::test]
async fn php_empty_array_means_no_occupied_slots() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SLOTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Successfully retrieved slots",
            "data": { "available": [], "occupied": [] }
        })))
        .mount(&server)
        .await;

    let busy = source(&server).fetch_busy_slots(&window(7)).await.unwrap();
    assert!(busy.is_empty());
}

#[tokio::test]
async fn missing_success_marker_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SLOTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Could not retrieve slots",
            "data": null
        })))
        .mount(&server)
        .await;

    let err = source(&server).fetch_busy_slots(&window(7)).await.unwrap_err();
    assert!(matches!(err, SourceError::Rejected(ref msg) if msg.contains("Could not retrieve")));
}

#[tokio::test]
async fn malformed_occupied_time_is_invalid_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SLOTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Successfully retrieved slots",
            "data": { "occupied": { "2024-02-19": { "half past five": occupied_entry() } } }
        })))
        .mount(&server)
        .await;

    let err = source(&server).fetch_busy_slots(&window(7)).await.unwrap_err();
    assert!(matches!(err, SourceError::InvalidPayload(_)));
}

#[tokio::test]
async fn persistent_server_error_is_unexpected_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SLOTS_PATH))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .expect(2)
        .mount(&server)
        .await;

    let err = source(&server).fetch_busy_slots(&window(7)).await.unwrap_err();
    assert!(matches!(err, SourceError::UnexpectedStatus { status: 502, .. }));
}
