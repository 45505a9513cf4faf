//! Node in the property graph.

use serde::{Deserialize, Serialize};
use super::{PropertyMap, Value};
use crate::uri::id_from_uri;
use crate::Result;

/// Node identifier, derived from the trailing segment of the node's URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Derive the id from a node URI such as `http://host/db/data/node/42`.
    pub fn from_uri(uri: &str) -> Result<Self> {
        id_from_uri(uri).map(NodeId)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self { NodeId(id) }
}

/// A node as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// The node's self URI (its external identity).
    pub uri: String,
    pub properties: PropertyMap,
}

impl Node {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}
