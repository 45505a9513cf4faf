//! Relationship (edge) in the property graph.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use super::{NodeId, PropertyMap, Value};
use crate::uri::id_from_uri;
use crate::{Error, Result};

/// Relationship identifier, derived from the trailing segment of its URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelId(pub u64);

impl RelId {
    /// Derive the id from a relationship URI such as `http://host/db/data/relationship/9`.
    pub fn from_uri(uri: &str) -> Result<Self> {
        id_from_uri(uri).map(RelId)
    }
}

impl std::fmt::Display for RelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RelId {
    fn from(id: u64) -> Self { RelId(id) }
}

/// Direction of a node's relationship listing.
///
/// Only the two directions the directional sub-resources expose are
/// representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Outgoing,
    Incoming,
}

impl Direction {
    /// Path segment under `<node>/<id>/relationships/`.
    pub fn as_segment(self) -> &'static str {
        match self {
            Direction::Outgoing => "out",
            Direction::Incoming => "in",
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "out" | "outgoing" => Ok(Direction::Outgoing),
            "in" | "incoming" => Ok(Direction::Incoming),
            other => Err(Error::InvalidArgument(format!(
                "direction must be \"in\" or \"out\", got {other:?}"
            ))),
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_segment())
    }
}

/// A relationship (directed edge) as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RelId,
    /// The relationship's self URI.
    pub uri: String,
    pub src: NodeId,
    pub dst: NodeId,
    pub rel_type: String,
    pub properties: PropertyMap,
}

impl Relationship {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    /// The "other" end of the relationship from the given node.
    pub fn other_node(&self, from: NodeId) -> Option<NodeId> {
        if from == self.src { Some(self.dst) }
        else if from == self.dst { Some(self.src) }
        else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_parsing() {
        assert_eq!("in".parse::<Direction>().unwrap(), Direction::Incoming);
        assert_eq!("outgoing".parse::<Direction>().unwrap(), Direction::Outgoing);
        assert!(matches!("all".parse::<Direction>(), Err(Error::InvalidArgument(_))));
        assert!(matches!("".parse::<Direction>(), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_other_node() {
        let rel = Relationship {
            id: RelId(1),
            uri: "http://localhost:7474/db/data/relationship/1".into(),
            src: NodeId(2),
            dst: NodeId(3),
            rel_type: "KNOWS".into(),
            properties: PropertyMap::new(),
        };
        assert_eq!(rel.other_node(NodeId(2)), Some(NodeId(3)));
        assert_eq!(rel.other_node(NodeId(3)), Some(NodeId(2)));
        assert_eq!(rel.other_node(NodeId(9)), None);
    }
}
