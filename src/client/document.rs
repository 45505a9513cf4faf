//! Decoding of entity and index documents.

use serde::Deserialize;
use serde_json::Value as Json;

use crate::index::{IndexHit, IndexInfo, IndexKind};
use crate::model::{Node, NodeId, PropertyMap, RelId, Relationship};
use crate::uri::id_from_uri;
use crate::{Error, Result};

/// The fields shared by node and relationship documents.
#[derive(Debug, Deserialize)]
struct EntityDocument {
    #[serde(rename = "self")]
    self_uri: String,
    #[serde(default)]
    data: Option<PropertyMap>,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
    #[serde(default, rename = "type")]
    rel_type: Option<String>,
    #[serde(default)]
    indexed: Option<String>,
}

fn entity_document(what: &str, doc: Json) -> Result<EntityDocument> {
    serde_json::from_value(doc)
        .map_err(|e| Error::MalformedResponse(format!("invalid {what} document: {e}")))
}

pub(crate) fn decode_node(doc: Json) -> Result<Node> {
    let doc = entity_document("node", doc)?;
    Ok(Node {
        id: NodeId::from_uri(&doc.self_uri)?,
        uri: doc.self_uri,
        properties: doc.data.unwrap_or_default(),
    })
}

pub(crate) fn decode_relationship(doc: Json) -> Result<Relationship> {
    let doc = entity_document("relationship", doc)?;
    let missing = |field: &str| {
        Error::MalformedResponse(format!("relationship {} has no '{field}'", doc.self_uri))
    };
    let src = NodeId::from_uri(doc.start.as_deref().ok_or_else(|| missing("start"))?)?;
    let dst = NodeId::from_uri(doc.end.as_deref().ok_or_else(|| missing("end"))?)?;
    let rel_type = doc.rel_type.clone().ok_or_else(|| missing("type"))?;
    Ok(Relationship {
        id: RelId::from_uri(&doc.self_uri)?,
        uri: doc.self_uri,
        src,
        dst,
        rel_type,
        properties: doc.data.unwrap_or_default(),
    })
}

pub(crate) fn decode_hit(doc: Json) -> Result<IndexHit> {
    let doc = entity_document("index hit", doc)?;
    Ok(IndexHit {
        id: id_from_uri(&doc.self_uri)?,
        uri: doc.self_uri,
        properties: doc.data.unwrap_or_default(),
        indexed: doc.indexed,
    })
}

pub(crate) fn decode_hits(docs: Vec<Json>) -> Result<Vec<IndexHit>> {
    docs.into_iter().map(decode_hit).collect()
}

/// The id an index entry refers to: the `indexed` entry URI when present,
/// the entity's self URI otherwise.
pub(crate) fn indexed_id(doc: Json) -> Result<u64> {
    let doc = entity_document("index entry", doc)?;
    id_from_uri(doc.indexed.as_deref().unwrap_or(&doc.self_uri))
}

/// An index description as returned by create/list: the `template` plus
/// whatever configuration the provider reports.
pub(crate) fn decode_index(kind: IndexKind, name: &str, doc: Json) -> Result<IndexInfo> {
    let Json::Object(mut config) = doc else {
        return Err(Error::MalformedResponse(format!(
            "index '{name}' description is not an object: {doc}"
        )));
    };
    let template = match config.remove("template") {
        None | Some(Json::Null) => None,
        Some(Json::String(t)) => Some(t),
        Some(other) => {
            return Err(Error::MalformedResponse(format!(
                "index '{name}' template is not a string: {other}"
            )));
        }
    };
    Ok(IndexInfo { name: name.to_string(), kind, template, config })
}
