//! Legacy (explicit) index types.

use serde::{Deserialize, Serialize};

use crate::model::{NodeId, PropertyMap, RelId};

/// Which index collection an operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexKind {
    /// `<root>/index/node`
    Node,
    /// `<root>/index/relationship`
    Relationship,
}

impl IndexKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IndexKind::Node => "node",
            IndexKind::Relationship => "relationship",
        }
    }
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named index and the configuration it was created with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexInfo {
    pub name: String,
    pub kind: IndexKind,
    /// URI template for entries, e.g. `.../index/node/favorites/{key}/{value}`.
    pub template: Option<String>,
    /// Everything else the server reports (`provider`, `type`, ...).
    pub config: serde_json::Map<String, serde_json::Value>,
}

impl IndexInfo {
    pub fn provider(&self) -> Option<&str> {
        self.config.get("provider").and_then(|v| v.as_str())
    }

    pub fn is_fulltext(&self) -> bool {
        self.config.get("type").and_then(|v| v.as_str()) == Some("fulltext")
    }
}

/// An entity summary returned by an index lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexHit {
    /// Id derived from the entity's self URI.
    pub id: u64,
    pub uri: String,
    pub properties: PropertyMap,
    /// URI of the index entry that produced this hit, when the server reports it.
    pub indexed: Option<String>,
}

impl IndexHit {
    pub fn node_id(&self) -> NodeId { NodeId(self.id) }
    pub fn rel_id(&self) -> RelId { RelId(self.id) }
}
