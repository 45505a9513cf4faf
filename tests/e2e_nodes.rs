//! End-to-end node tests against the in-memory transport.
//!
//! Each test drives `RestClient` through service root discovery and the
//! node resources, then checks what the server state looks like.

use neo4j_rest::{props, Error, NodeId, PropertyMap, RestClient, Value};
use pretty_assertions::assert_eq;

// ============================================================================
// 1. Round-trip, delete, NotFound
// ============================================================================

#[tokio::test]
async fn test_wilma_barney_lifecycle() {
    let client = RestClient::open_memory();
    let properties = props([("wife", "Wilma"), ("friend", "Barney")]);

    let fred = client.create_node(properties.clone()).await.unwrap();
    assert_eq!(fred.properties, properties);

    let fetched = client.get_node(fred.id).await.unwrap();
    assert_eq!(fetched.id, fred.id);
    assert_eq!(fetched.properties, properties);
    assert_eq!(fetched.uri, fred.uri);

    client.delete_node(fred.id).await.unwrap();

    let err = client.get_node(fred.id).await.unwrap_err();
    assert!(err.is_not_found(), "expected NotFound, got {err:?}");
    assert_eq!(client.transport().node_count(), 0);
}

// ============================================================================
// 2. Property shapes survive the wire
// ============================================================================

#[tokio::test]
async fn test_property_values_round_trip() {
    let client = RestClient::open_memory();
    let mut properties = PropertyMap::new();
    properties.insert("name".into(), Value::from("Ada"));
    properties.insert("born".into(), Value::Int(1815));
    properties.insert("height".into(), Value::Float(1.65));
    properties.insert("alive".into(), Value::Bool(false));
    properties.insert("langs".into(), Value::from(vec!["en", "fr"]));

    let node = client.create_node(properties.clone()).await.unwrap();
    assert_eq!(client.get_node(node.id).await.unwrap().properties, properties);
    assert_eq!(client.get_properties(node.id).await.unwrap(), properties);
}

#[tokio::test]
async fn test_empty_node() {
    let client = RestClient::open_memory();
    let node = client.create_empty_node().await.unwrap();
    assert!(node.properties.is_empty());
    assert!(client.get_node(node.id).await.unwrap().properties.is_empty());
}

#[tokio::test]
async fn test_ids_are_distinct() {
    let client = RestClient::open_memory();
    let a = client.create_empty_node().await.unwrap();
    let b = client.create_empty_node().await.unwrap();
    assert_ne!(a.id, b.id);
    assert_ne!(a.uri, b.uri);
}

// ============================================================================
// 3. Failure statuses
// ============================================================================

#[tokio::test]
async fn test_delete_connected_node_conflicts() {
    let client = RestClient::open_memory();
    let a = client.create_empty_node().await.unwrap();
    let b = client.create_empty_node().await.unwrap();
    let rel = client
        .create_relationship(a.id, b.id, "KNOWS", PropertyMap::new())
        .await
        .unwrap();

    let err = client.delete_node(a.id).await.unwrap_err();
    assert!(matches!(err, Error::UnexpectedStatus { status: 409, .. }), "{err:?}");
    assert_eq!(err.status(), Some(409));

    client.delete_relationship(rel.id).await.unwrap();
    client.delete_node(a.id).await.unwrap();
}

#[tokio::test]
async fn test_get_never_created() {
    let client = RestClient::open_memory();
    let err = client.get_node(NodeId(12345)).await.unwrap_err();
    assert!(err.is_not_found());
}
