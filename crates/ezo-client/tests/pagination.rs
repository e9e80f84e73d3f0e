//! Paged listing behavior against a mock API.

mod common;

use common::{TOKEN, client_for, query_pairs, requests};
use ezo_client::{EzoClient, EzoError, Listing};
use ezo_config::EzoConfig;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_page(server: &MockServer, page: u64, body: Value) {
    Mock::given(method("GET"))
        .and(path("/checklists.api"))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn concatenates_pages_in_server_order() {
    let server = MockServer::start().await;
    mount_page(&server, 1, json!({"checklists": [{"id": 1}, {"id": 2}], "total_pages": 3})).await;
    mount_page(&server, 2, json!({"checklists": [{"id": 3}], "total_pages": 3})).await;
    mount_page(&server, 3, json!({"checklists": [{"id": 4}, {"id": 5}], "total_pages": 3})).await;

    let checklists = client_for(&server).get_checklists().await.unwrap();

    let ids: Vec<u64> = checklists.iter().map(|c| c["id"].as_u64().unwrap()).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);

    let pages: Vec<String> = requests(&server)
        .await
        .iter()
        .flat_map(query_pairs)
        .filter(|(k, _)| k == "page")
        .map(|(_, v)| v)
        .collect();
    assert_eq!(pages, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn single_page_issues_exactly_one_request() {
    let server = MockServer::start().await;
    mount_page(&server, 1, json!({"checklists": [{"id": 1}], "total_pages": 1})).await;

    let checklists = client_for(&server).get_checklists().await.unwrap();

    assert_eq!(checklists.len(), 1);
    assert_eq!(requests(&server).await.len(), 1);
}

#[tokio::test]
async fn float_total_pages_still_walks_every_page() {
    let server = MockServer::start().await;
    mount_page(&server, 1, json!({"checklists": [{"id": 1}], "total_pages": 2.0})).await;
    mount_page(&server, 2, json!({"checklists": [{"id": 2}], "total_pages": 2.0})).await;

    let checklists = client_for(&server).get_checklists().await.unwrap();

    assert_eq!(checklists, vec![json!({"id": 1}), json!({"id": 2})]);
}

#[tokio::test]
async fn missing_total_pages_is_treated_as_last_page() {
    let server = MockServer::start().await;
    mount_page(&server, 1, json!({"checklists": [{"id": 1}, {"id": 2}]})).await;

    let checklists = client_for(&server).get_checklists().await.unwrap();

    assert_eq!(checklists.len(), 2);
    assert_eq!(requests(&server).await.len(), 1);
}

#[tokio::test]
async fn zero_pages_yields_empty_result() {
    let server = MockServer::start().await;
    mount_page(&server, 1, json!({"checklists": [], "total_pages": 0})).await;

    let checklists = client_for(&server).get_checklists().await.unwrap();

    assert!(checklists.is_empty());
}

#[tokio::test]
async fn missing_field_fails_without_reading_further_pages() {
    let server = MockServer::start().await;
    mount_page(&server, 1, json!({"error": "nope", "total_pages": 2})).await;
    Mock::given(method("GET"))
        .and(path("/checklists.api"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"checklists": []})))
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server).get_checklists().await.unwrap_err();

    assert!(matches!(err, EzoError::Protocol { field: "checklists", .. }));
    assert_eq!(requests(&server).await.len(), 1);
}

#[tokio::test]
async fn non_success_page_keeps_earlier_records() {
    let server = MockServer::start().await;
    mount_page(&server, 1, json!({"checklists": [{"id": 1}, {"id": 2}], "total_pages": 3})).await;
    Mock::given(method("GET"))
        .and(path("/checklists.api"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client_for(&server).get_checklists().await.unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert_eq!(err.partial(), Some(&json!([{"id": 1}, {"id": 2}])));
    match err {
        EzoError::Status { body, operation, .. } => {
            assert_eq!(body, "maintenance");
            assert_eq!(operation, "get checklists");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn wrong_field_shape_is_a_protocol_error() {
    let server = MockServer::start().await;
    mount_page(&server, 1, json!({"checklists": "none", "total_pages": 1})).await;

    let err = client_for(&server).get_checklists().await.unwrap_err();

    assert!(matches!(err, EzoError::Protocol { .. }));
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/checklists.api"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server).get_checklists().await.unwrap_err();

    assert!(matches!(err, EzoError::Decode { .. }));
}

#[tokio::test]
async fn every_page_carries_the_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/checklists.api"))
        .and(header("Authorization", format!("Bearer {TOKEN}").as_str()))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"checklists": [1], "total_pages": 2})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/checklists.api"))
        .and(header("Authorization", format!("Bearer {TOKEN}").as_str()))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"checklists": [2], "total_pages": 2})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let checklists = client_for(&server).get_checklists().await.unwrap();

    assert_eq!(checklists, vec![json!(1), json!(2)]);
}

#[tokio::test]
async fn generic_listing_pages_any_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/members.api"))
        .and(query_param("filter", "active"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"members": [{"id": 8}], "total_pages": 1})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let listing = Listing::new("get members", "members.api", "members").param("filter", "active");
    let members: Vec<Value> = client_for(&server).fetch_all(&listing).await.unwrap();

    assert_eq!(members, vec![json!({"id": 8})]);
}

#[tokio::test]
async fn connection_failure_is_a_transport_error() {
    // Port 9 (discard) is closed on test machines; the connect fails fast.
    let client = EzoClient::new(EzoConfig::new("http://127.0.0.1:9", TOKEN)).unwrap();

    let err = client.get_checklists().await.unwrap_err();

    assert!(matches!(err, EzoError::Transport { operation: "get checklists", .. }));
    assert!(err.partial().is_none());
}
