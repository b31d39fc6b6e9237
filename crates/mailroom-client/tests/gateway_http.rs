//! HTTP gateway integration tests
//!
//! Runs `MailroomClient` against a wiremock backend speaking the read API:
//! - list/stats decoding
//! - query parameter shaping
//! - error taxonomy (server, not found, network, decode)

use mailroom_client::{
    ClientConfig, ClientError, EmailStatus, MailroomClient, RecordGateway, RecordListOptions,
    StatusFilter,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> MailroomClient {
    MailroomClient::new(ClientConfig {
        base_url: server.uri(),
        timeout_secs: 5,
    })
    .expect("client builds")
}

fn email(id: &str, status: &str, subject: &str) -> serde_json::Value {
    json!({
        "id": id,
        "sender": "customer@example.com",
        "subject": subject,
        "body": "hello",
        "status": status,
        "complexity": "low",
        "sentiment": "neutral",
        "ai_response": "Thanks for reaching out.",
        "confidence": 0.91,
        "created_at": "2024-05-02T08:15:00"
    })
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_list_records_default_query_omits_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/emails"))
        .and(query_param_is_missing("status"))
        .and(query_param_is_missing("search"))
        .and(query_param("limit", "100"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "emails": [email("a", "NEW", "Invoice #1"), email("b", "CLOSED", "Thanks")],
            "total": 7
        })))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = client_for(&server)
        .list_records(&RecordListOptions::default())
        .await
        .unwrap();

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.total, 7);
    assert_eq!(snapshot.records[0].status, EmailStatus::New);
    assert_eq!(snapshot.records[1].subject, "Thanks");
}

#[tokio::test]
async fn test_list_records_sends_status_and_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/emails"))
        .and(query_param("status", "ESCALATED"))
        .and(query_param("search", "refund now"))
        .and(query_param("limit", "25"))
        .and(query_param("offset", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "emails": [email("c", "ESCALATED", "Refund now!")],
            "total": 51
        })))
        .expect(1)
        .mount(&server)
        .await;

    let options = RecordListOptions {
        status: StatusFilter::Only(EmailStatus::Escalated),
        search: "refund now".to_string(),
        limit: 25,
        offset: 50,
    };
    let snapshot = client_for(&server).list_records(&options).await.unwrap();

    assert_eq!(snapshot.total, 51);
    assert_eq!(snapshot.records[0].id, "c");
}

// =============================================================================
// Aggregate and single record
// =============================================================================

#[tokio::test]
async fn test_fetch_aggregate_through_gateway_trait() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/emails/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 5, "new": 2, "processed": 1,
            "needs_operator": 1, "escalated": 1, "closed": 0
        })))
        .mount(&server)
        .await;

    let gateway: Box<dyn RecordGateway> = Box::new(client_for(&server));
    let stats = gateway.fetch_aggregate().await.unwrap();

    assert_eq!(stats.total, 5);
    assert_eq!(stats.count(StatusFilter::Only(EmailStatus::New)), 2);
}

#[tokio::test]
async fn test_get_record_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/emails/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "detail": "Email not found"
        })))
        .mount(&server)
        .await;

    let err = client_for(&server).get_record("missing").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(ref id) if id == "missing"));
}

#[tokio::test]
async fn test_get_record_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/emails/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(email("abc", "PROCESSED", "Hi")))
        .mount(&server)
        .await;

    let record = client_for(&server).get_record("abc").await.unwrap();
    assert_eq!(record.status, EmailStatus::Processed);
    assert_eq!(record.confidence, Some(0.91));
}

#[tokio::test]
async fn test_health_probe() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok", "service": "email-ai-backend"
        })))
        .mount(&server)
        .await;

    assert!(client_for(&server).health().await.unwrap());
}

// =============================================================================
// Error taxonomy
// =============================================================================

#[tokio::test]
async fn test_server_error_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/emails/stats"))
        .respond_with(ResponseTemplate::new(503).set_body_string("database unavailable"))
        .mount(&server)
        .await;

    let err = client_for(&server).fetch_aggregate().await.unwrap_err();
    match err {
        ClientError::Server { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "database unavailable");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_list_endpoint_is_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/emails"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such route"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .list_records(&RecordListOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Server { status: 404, .. }));
}

#[tokio::test]
async fn test_undecodable_body_is_json_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy login</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .list_records(&RecordListOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "decode");
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    // Reserve a free port, then release it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = MailroomClient::new(ClientConfig {
        base_url: format!("http://127.0.0.1:{port}"),
        timeout_secs: 2,
    })
    .unwrap();

    let err = client.fetch_aggregate().await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
}
