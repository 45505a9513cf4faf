//! The discovered service root of a server.

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::index::IndexKind;
use crate::{Error, Result};

const TYPES_SUFFIX: &str = "/types";

/// Absolute base URIs advertised by `GET /db/data/`.
///
/// Resolved once per client and never refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRoot {
    /// Node collection, e.g. `http://localhost:7474/db/data/node`.
    pub node: String,
    /// Relationship collection, derived from `relationship_types`.
    pub relationship: String,
    pub relationship_types: String,
    pub node_index: String,
    pub relationship_index: String,
    pub reference_node: Option<String>,
    pub extensions_info: Option<String>,
    pub batch: Option<String>,
    /// Query endpoint.
    pub cypher: Option<String>,
    pub neo4j_version: Option<String>,
}

impl ServiceRoot {
    /// Validate a root document and derive the relationship base.
    pub fn from_document(doc: &Json) -> Result<Self> {
        let obj = doc.as_object().ok_or_else(|| {
            Error::MalformedServiceRoot(format!("expected a JSON object, got {doc}"))
        })?;

        let required = |key: &str| -> Result<String> {
            match obj.get(key) {
                Some(Json::String(s)) if !s.is_empty() => Ok(s.clone()),
                Some(other) => Err(Error::MalformedServiceRoot(format!(
                    "field '{key}' must be a non-empty string, got {other}"
                ))),
                None => Err(Error::MalformedServiceRoot(format!("missing field '{key}'"))),
            }
        };
        let optional = |key: &str| -> Result<Option<String>> {
            match obj.get(key) {
                None | Some(Json::Null) => Ok(None),
                Some(Json::String(s)) => Ok(Some(s.clone())),
                Some(other) => Err(Error::MalformedServiceRoot(format!(
                    "field '{key}' must be a string, got {other}"
                ))),
            }
        };

        let relationship_types = required("relationship_types")?;
        let relationship = relationship_types
            .strip_suffix(TYPES_SUFFIX)
            .filter(|base| !base.is_empty())
            .ok_or_else(|| Error::MalformedServiceRoot(format!(
                "relationship_types '{relationship_types}' does not end in '{TYPES_SUFFIX}'"
            )))?
            .to_string();

        Ok(Self {
            node: required("node")?,
            relationship,
            relationship_types,
            node_index: required("node_index")?,
            relationship_index: required("relationship_index")?,
            reference_node: optional("reference_node")?,
            extensions_info: optional("extensions_info")?,
            batch: optional("batch")?,
            cypher: optional("cypher")?,
            neo4j_version: optional("neo4j_version")?,
        })
    }

    /// Base URI of the node or relationship index collection.
    pub fn index_base(&self, kind: IndexKind) -> &str {
        match kind {
            IndexKind::Node => &self.node_index,
            IndexKind::Relationship => &self.relationship_index,
        }
    }
}
