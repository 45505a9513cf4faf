//! Wire contract of the HTTP transport, checked against a mock server.

#![cfg(feature = "http")]

use std::sync::Arc;
use std::time::Duration;

use neo4j_rest::{props, ClientConfig, Error, HttpTransport, IndexKind, NodeId, RestClient};
use pretty_assertions::assert_eq;
use serde_json::{json, Value as Json};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn root_document(base: &str) -> Json {
    json!({
        "node": format!("{base}/db/data/node"),
        "node_index": format!("{base}/db/data/index/node"),
        "relationship_index": format!("{base}/db/data/index/relationship"),
        "relationship_types": format!("{base}/db/data/relationship/types"),
        "extensions_info": format!("{base}/db/data/ext"),
        "batch": format!("{base}/db/data/batch"),
        "neo4j_version": "1.8.2",
    })
}

async fn mount_root(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/db/data/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(root_document(&server.uri())))
        .mount(server)
        .await;
}

fn client(server: &MockServer) -> RestClient<HttpTransport> {
    RestClient::connect(ClientConfig::from_url(&server.uri()).unwrap()).unwrap()
}

// ============================================================================
// Requests
// ============================================================================

#[tokio::test]
async fn test_create_node_sends_json() {
    let server = MockServer::start().await;
    mount_root(&server).await;
    let base = server.uri();
    Mock::given(method("POST"))
        .and(path("/db/data/node"))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"name": "Ada"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "self": format!("{base}/db/data/node/7"),
            "data": {"name": "Ada"},
        })))
        .expect(1)
        .mount(&server)
        .await;

    let node = client(&server).create_node(props([("name", "Ada")])).await.unwrap();
    assert_eq!(node.id, NodeId(7));
}

#[tokio::test]
async fn test_query_is_encoded() {
    let server = MockServer::start().await;
    mount_root(&server).await;
    Mock::given(method("GET"))
        .and(path("/db/data/index/node/my%20people"))
        .and(|req: &wiremock::Request| req.url.query() == Some("name%3AWil%2A%20AND%20town%3ABedrock"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let hits = client(&server)
        .find_by_query(IndexKind::Node, "my people", "name:Wil* AND town:Bedrock")
        .await
        .unwrap();
    assert!(hits.is_empty());
}

// ============================================================================
// Responses
// ============================================================================

#[tokio::test]
async fn test_malformed_root() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/db/data/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"node": 5})))
        .mount(&server)
        .await;

    let err = client(&server).service_root().await.unwrap_err();
    assert!(matches!(err, Error::MalformedServiceRoot(_)), "{err:?}");
}

#[tokio::test]
async fn test_id_mismatch_is_consistency_violation() {
    let server = MockServer::start().await;
    mount_root(&server).await;
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path("/db/data/node/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "self": format!("{base}/db/data/node/2"),
            "data": {},
        })))
        .mount(&server)
        .await;

    let err = client(&server).get_node(NodeId(1)).await.unwrap_err();
    assert!(matches!(err, Error::ConsistencyViolation(_)), "{err:?}");
}

#[tokio::test]
async fn test_non_json_body() {
    let server = MockServer::start().await;
    mount_root(&server).await;
    Mock::given(method("GET"))
        .and(path("/db/data/node/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client(&server).get_node(NodeId(1)).await.unwrap_err();
    assert!(matches!(err, Error::MalformedResponse(_)), "{err:?}");
}

#[tokio::test]
async fn test_error_message_is_kept() {
    let server = MockServer::start().await;
    mount_root(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/db/data/node/1"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "Node [1] has relationships",
            "exception": "OperationFailureException",
        })))
        .mount(&server)
        .await;

    match client(&server).delete_node(NodeId(1)).await {
        Err(Error::UnexpectedStatus { status, message, .. }) => {
            assert_eq!(status, 409);
            assert_eq!(message.as_deref(), Some("Node [1] has relationships"));
        }
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}

// ============================================================================
// Service root
// ============================================================================

#[tokio::test]
async fn test_concurrent_root_resolution_single_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/db/data/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(root_document(&server.uri()))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let (a, b) = tokio::join!(client.service_root(), client.service_root());
    assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
}

#[tokio::test]
async fn test_unreachable_server() {
    let config = ClientConfig::from_url("http://127.0.0.1:1")
        .unwrap()
        .with_timeout(Duration::from_secs(2));
    let client = RestClient::connect(config).unwrap();
    let err = client.service_root().await.unwrap_err();
    assert!(matches!(err, Error::ServiceUnreachable(_)), "{err:?}");
}
