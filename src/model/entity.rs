//! Addressing a node or relationship uniformly.

use serde::{Deserialize, Serialize};
use super::{NodeId, RelId};

/// A node or relationship, as the target of a property sub-resource call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityRef {
    Node(NodeId),
    Relationship(RelId),
}

impl EntityRef {
    pub fn id(self) -> u64 {
        match self {
            EntityRef::Node(id) => id.0,
            EntityRef::Relationship(id) => id.0,
        }
    }
}

impl From<NodeId> for EntityRef {
    fn from(id: NodeId) -> Self { EntityRef::Node(id) }
}

impl From<RelId> for EntityRef {
    fn from(id: RelId) -> Self { EntityRef::Relationship(id) }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityRef::Node(id) => write!(f, "node {id}"),
            EntityRef::Relationship(id) => write!(f, "relationship {id}"),
        }
    }
}
