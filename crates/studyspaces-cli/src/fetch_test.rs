use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use studyspaces_core::FacilityStatus;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn encoded_list() -> String {
    let facilities = serde_json::json!([
        {
            "name": "Waidner-Spahr Library",
            "coords": [40.2028, -77.1975],
            "status": "Open",
            "distance": 0.12,
            "rating": 4.6
        },
        {
            "name": "Kline Center",
            "coords": [40.2051, -77.1939],
            "status": "Closed",
            "distance": null
        }
    ]);
    STANDARD.encode(serde_json::to_vec(&facilities).unwrap())
}

fn envelope(data: &str) -> serde_json::Value {
    serde_json::json!({
        "data": data,
        "meta": { "request_id": "req-1", "timestamp": "2024-01-01T10:30:00Z" }
    })
}

fn client(server: &MockServer) -> BuildingsClient {
    BuildingsClient::new(&server.uri(), Some("test-token".to_owned()), 5).expect("client")
}

#[test]
fn decode_payload_reads_base64_list() {
    let facilities = decode_payload(&envelope(&encoded_list())).unwrap();
    assert_eq!(facilities.len(), 2);
    assert_eq!(facilities[0].name, "Waidner-Spahr Library");
    assert_eq!(facilities[0].status, FacilityStatus::Open);
    assert_eq!(facilities[1].distance, None);
}

#[test]
fn decode_payload_requires_data_string() {
    let body = serde_json::json!({ "data": [1, 2, 3] });
    assert!(matches!(decode_payload(&body), Err(FetchError::MissingData)));
}

#[test]
fn decode_payload_rejects_bad_base64() {
    assert!(matches!(
        decode_payload(&envelope("%%% not base64 %%%")),
        Err(FetchError::Decode(_))
    ));
}

#[test]
fn decode_payload_rejects_non_list_json() {
    let data = STANDARD.encode(br#"{"name": "not a list"}"#);
    assert!(matches!(
        decode_payload(&envelope(&data)),
        Err(FetchError::Json(_))
    ));
}

#[tokio::test]
async fn retry_fixed_stops_after_success() {
    let calls = Arc::new(AtomicU32::new(0));
    let c = Arc::clone(&calls);
    let result = retry_fixed(2, Duration::ZERO, || {
        let c = Arc::clone(&c);
        async move {
            let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt < 2 {
                Err("transient".to_owned())
            } else {
                Ok(attempt)
            }
        }
    })
    .await;
    assert_eq!(result, Ok(2));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn retry_fixed_gives_up_after_one_plus_retries() {
    let calls = Arc::new(AtomicU32::new(0));
    let c = Arc::clone(&calls);
    let result: Result<(), String> = retry_fixed(2, Duration::ZERO, || {
        let c = Arc::clone(&c);
        async move {
            c.fetch_add(1, Ordering::SeqCst);
            Err("down".to_owned())
        }
    })
    .await;
    assert_eq!(result, Err("down".to_owned()));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn total_attempts_saturates() {
    assert_eq!(total_attempts(0), 1);
    assert_eq!(total_attempts(2), 3);
    assert_eq!(total_attempts(u32::MAX), u32::MAX);
}

#[tokio::test]
async fn fetch_once_sends_location_and_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/buildings"))
        .and(query_param("lat", "40.2"))
        .and(query_param("lng", "-77.19"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(&encoded_list())))
        .expect(1)
        .mount(&server)
        .await;

    let facilities = client(&server)
        .fetch_once(Some(Coordinates::new(40.2, -77.19)))
        .await
        .expect("fetch should succeed");
    assert_eq!(facilities.len(), 2);
}

#[tokio::test]
async fn fetch_once_maps_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/buildings"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client(&server).fetch_once(None).await;
    assert!(
        matches!(result, Err(FetchError::Status(s)) if s == StatusCode::UNAUTHORIZED),
        "expected 401 status error, got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_buildings_recovers_after_a_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/buildings"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/buildings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(&encoded_list())))
        .expect(1)
        .mount(&server)
        .await;

    let facilities = fetch_buildings(&client(&server), None, 2, Duration::ZERO).await;
    assert_eq!(facilities.len(), 2);
}

#[tokio::test]
async fn fetch_buildings_returns_empty_after_all_attempts_fail() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/buildings"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let facilities = fetch_buildings(&client(&server), None, 2, Duration::ZERO).await;
    assert!(facilities.is_empty());
}
