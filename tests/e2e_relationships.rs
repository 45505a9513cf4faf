//! End-to-end relationship and property tests against the in-memory transport.

use neo4j_rest::{props, Direction, Error, PropertyMap, RelId, RestClient, Value};
use pretty_assertions::assert_eq;

// ============================================================================
// 1. Create and fetch
// ============================================================================

#[tokio::test]
async fn test_edge_with_properties() {
    let client = RestClient::open_memory();
    let a = client.create_empty_node().await.unwrap();
    let b = client.create_empty_node().await.unwrap();

    let rel = client
        .create_relationship(a.id, b.id, "edge", props([("k", "v")]))
        .await
        .unwrap();
    let fetched = client.get_relationship(rel.id).await.unwrap();

    assert_eq!(fetched.rel_type, "edge");
    assert_eq!(fetched.get("k"), Some(&Value::from("v")));
    assert_eq!((fetched.src, fetched.dst), (a.id, b.id));
    assert_eq!(fetched.other_node(a.id), Some(b.id));
}

#[tokio::test]
async fn test_missing_end_node() {
    let client = RestClient::open_memory();
    let a = client.create_empty_node().await.unwrap();
    let err = client
        .create_relationship(a.id, neo4j_rest::NodeId(404), "edge", PropertyMap::new())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_delete_then_not_found() {
    let client = RestClient::open_memory();
    let a = client.create_empty_node().await.unwrap();
    let rel = client.create_relationship(a.id, a.id, "SELF", PropertyMap::new()).await.unwrap();

    client.delete_relationship(rel.id).await.unwrap();
    assert!(client.get_relationship(rel.id).await.unwrap_err().is_not_found());
    assert!(matches!(
        client.delete_relationship(RelId(999)).await,
        Err(Error::UnexpectedStatus { status: 404, .. })
    ));
}

// ============================================================================
// 2. Directional listing
// ============================================================================

#[tokio::test]
async fn test_listing_by_direction() {
    let client = RestClient::open_memory();
    let hub = client.create_empty_node().await.unwrap();
    let x = client.create_empty_node().await.unwrap();
    let y = client.create_empty_node().await.unwrap();

    let out1 = client.create_relationship(hub.id, x.id, "LINKS", PropertyMap::new()).await.unwrap();
    let out2 = client.create_relationship(hub.id, y.id, "LINKS", PropertyMap::new()).await.unwrap();
    let inc = client.create_relationship(y.id, hub.id, "LINKS", PropertyMap::new()).await.unwrap();

    let outgoing = client.outgoing_relationships(hub.id).await.unwrap();
    assert_eq!(outgoing.iter().map(|r| r.id).collect::<Vec<_>>(), vec![out1.id, out2.id]);

    let incoming = client.relationships_of(hub.id, "incoming".parse().unwrap()).await.unwrap();
    assert_eq!(incoming, vec![inc]);

    assert!(client.incoming_relationships(x.id).await.unwrap().len() == 1);
}

#[tokio::test]
async fn test_invalid_direction_string() {
    for bad in ["all", "both", "IN ", "sideways"] {
        assert!(matches!(bad.parse::<Direction>(), Err(Error::InvalidArgument(_))), "{bad}");
    }
}

// ============================================================================
// 3. Properties on relationships
// ============================================================================

#[tokio::test]
async fn test_set_properties_replaces() {
    let client = RestClient::open_memory();
    let a = client.create_empty_node().await.unwrap();
    let b = client.create_empty_node().await.unwrap();
    let rel = client
        .create_relationship(a.id, b.id, "edge", props([("old", true), ("k", false)]))
        .await
        .unwrap();

    client.set_properties(rel.id, props([("x", 1)])).await.unwrap();

    assert_eq!(client.get_properties(rel.id).await.unwrap(), props([("x", 1)]));
    assert_eq!(client.get_relationship(rel.id).await.unwrap().properties, props([("x", 1)]));
}

#[tokio::test]
async fn test_single_property_on_relationship() {
    let client = RestClient::open_memory();
    let a = client.create_empty_node().await.unwrap();
    let rel = client.create_relationship(a.id, a.id, "edge", PropertyMap::new()).await.unwrap();

    client.set_property(rel.id, "weight", 0.5).await.unwrap();
    assert_eq!(client.get_property(rel.id, "weight").await.unwrap(), Value::Float(0.5));

    client.delete_property(rel.id, "weight").await.unwrap();
    assert!(client.get_properties(rel.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_types_listed_once() {
    let client = RestClient::open_memory();
    let a = client.create_empty_node().await.unwrap();
    for t in ["KNOWS", "KNOWS", "LOVES"] {
        client.create_relationship(a.id, a.id, t, PropertyMap::new()).await.unwrap();
    }
    assert_eq!(client.relationship_types().await.unwrap(), vec!["KNOWS", "LOVES"]);
}
