//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files.

use std::io::Write;

use busysync_domain::{CalendarCredentials, LogFormat, SourceConfig, SyncError};
use busysync_infra::config;
use chrono::Weekday;
use tempfile::NamedTempFile;

fn write_with_extension(contents: &str, extension: &str) -> (NamedTempFile, std::path::PathBuf) {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");

    let path = temp_file.path().with_extension(extension);
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");
    (temp_file, path)
}

#[test]
fn test_load_portal_config_from_toml_file() {
    let toml_content = r#"
        [reconcile]
        timezone = "Europe/Bucharest"
        days = 7
        event_duration_minutes = 30

        [scheduler]
        cron_expression = "0 */5 * * * *"

        [calendar]
        calendar_id = "busy@group.calendar.google.com"
        ownership_marker = "med busy"

        [calendar.credentials]
        kind = "refresh_token"
        client_id = "client.apps.googleusercontent.com"
        client_secret = "shh"
        refresh_token = "1//refresh"

        [logging]
        level = "debug"
        format = "json"

        [source]
        kind = "portal"
        base_url = "https://portal.example/"
        specialty_id = 6
        doctor_code = "AAT"

        [[source.schedule]]
        weekday = "Mon"
        start = "17:30"
        end = "20:00"
        slot_minutes = 30

        [[source.schedule]]
        weekday = "Tue"
        start = "08:00"
        end = "10:30"
        slot_minutes = 30
    "#;

    let (_temp, path) = write_with_extension(toml_content, "toml");

    let result = config::load_from_file(Some(path.clone()));
    assert!(result.is_ok(), "Failed to load config from TOML file: {:?}", result.err());
    let config = result.unwrap();
    config.validate().expect("loaded config should validate");

    assert_eq!(config.reconcile.timezone().unwrap(), chrono_tz::Europe::Bucharest);
    assert_eq!(config.scheduler.cron_expression, "0 */5 * * * *");
    assert_eq!(config.logging.format, LogFormat::Json);
    assert!(matches!(
        config.calendar.credentials,
        Some(CalendarCredentials::RefreshToken { ref token_url, .. })
            if token_url == "https://oauth2.googleapis.com/token"
    ));

    match config.source {
        SourceConfig::Portal(portal) => {
            assert_eq!(portal.hospital_connection, "ConnectionHM");
            assert!(portal.include_more_days);
            assert_eq!(portal.schedule.for_weekday(Weekday::Mon).count(), 1);
            assert_eq!(portal.schedule.for_weekday(Weekday::Wed).count(), 0);
        }
        other => panic!("expected portal source, got {other:?}"),
    }

    std::fs::remove_file(path).ok();
}

#[test]
fn test_load_amelia_config_from_json_file() {
    let json_content = r#"{
        "calendar": {
            "calendar_id": "busy@group.calendar.google.com",
            "credentials": { "kind": "access_token", "token": "ya29.file" }
        },
        "source": {
            "kind": "amelia",
            "base_url": "https://clinic.example/",
            "provider_ids": [23]
        }
    }"#;

    let (_temp, path) = write_with_extension(json_content, "json");

    let config = config::load_from_file(Some(path.clone())).expect("JSON config should load");
    config.validate().expect("loaded config should validate");

    assert_eq!(config.reconcile.days, 7);
    assert_eq!(config.calendar.api_base_url, "https://www.googleapis.com/calendar/v3");
    assert!(matches!(config.source, SourceConfig::Amelia(ref a) if a.provider_ids == vec![23]));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_invalid_toml_is_config_error() {
    let (_temp, path) = write_with_extension("[calendar\ncalendar_id = ", "toml");

    let err = config::load_from_file(Some(path.clone())).unwrap_err();
    assert!(matches!(err, SyncError::Config(ref msg) if msg.contains("TOML")));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_unknown_source_kind_is_config_error() {
    let toml_content = r#"
        [calendar]
        calendar_id = "c"
        [source]
        kind = "doctolib"
        base_url = "https://example.com/"
    "#;
    let (_temp, path) = write_with_extension(toml_content, "toml");

    let err = config::load_from_file(Some(path.clone())).unwrap_err();
    assert!(matches!(err, SyncError::Config(_)));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_unsupported_extension_is_rejected() {
    let (_temp, path) = write_with_extension("calendar: {}", "yaml");

    let err = config::load_from_file(Some(path.clone())).unwrap_err();
    assert!(matches!(err, SyncError::Config(ref msg) if msg.contains("Unsupported")));

    std::fs::remove_file(path).ok();
}

#[test]
fn test_shipped_example_config_is_valid() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../busysync.example.toml");

    let config = config::load_from_file(Some(path)).expect("example config should parse");
    config.validate().expect("example config should validate");

    match config.source {
        SourceConfig::Portal(portal) => {
            for weekday in [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri] {
                assert_eq!(portal.schedule.for_weekday(weekday).count(), 1, "{weekday}");
            }
            assert_eq!(portal.schedule.for_weekday(Weekday::Sat).count(), 0);
        }
        other => panic!("expected portal source, got {other:?}"),
    }
}
