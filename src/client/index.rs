//! Legacy index resources: `<index>/{node,relationship}/<name>[/<key>/<value>]`.

use serde_json::{json, Map, Value as Json};
use tracing::warn;

use super::document::{decode_hits, decode_index, indexed_id};
use super::{check_value, require_non_empty, RestClient};
use crate::index::{IndexHit, IndexInfo, IndexKind};
use crate::model::{EntityRef, NodeId, RelId, Value};
use crate::transport::{Method, Request, Transport};
use crate::uri::{encode_query, join};
use crate::{Error, Result};

fn index_kind(entity: EntityRef) -> IndexKind {
    match entity {
        EntityRef::Node(_) => IndexKind::Node,
        EntityRef::Relationship(_) => IndexKind::Relationship,
    }
}

/// Index values end up as path segments, so only scalars are allowed.
fn value_segment(key: &str, value: &Value) -> Result<String> {
    check_value(key, value)?;
    match value.to_path_segment() {
        Some(segment) if value.is_scalar() => Ok(segment),
        _ => Err(Error::InvalidArgument(format!(
            "index value for '{key}' must be a string, number or boolean, got {}",
            value.type_name()
        ))),
    }
}

impl<T: Transport> RestClient<T> {
    async fn index_uri(&self, kind: IndexKind, segments: &[&str]) -> Result<String> {
        let root = self.service_root().await?;
        Ok(join(root.index_base(kind), segments))
    }

    // ========================================================================
    // Index collection
    // ========================================================================

    /// Create (or reconfigure) a named index. `config` is a provider
    /// configuration object such as `{"type": "fulltext"}`, or null.
    pub async fn create_index(&self, kind: IndexKind, name: &str, config: Json) -> Result<IndexInfo> {
        require_non_empty("index name", name)?;
        let mut body = Map::new();
        body.insert("name".into(), Json::String(name.to_string()));
        match config {
            Json::Null => {}
            Json::Object(_) => {
                body.insert("config".into(), config);
            }
            other => {
                return Err(Error::InvalidArgument(format!("index config must be an object, got {other}")));
            }
        }

        let uri = self.index_uri(kind, &[]).await?;
        let reply = self.call(Request::new(Method::Post, uri).with_body(Json::Object(body)), &[201]).await?;
        decode_index(kind, name, reply.json()?)
    }

    pub async fn delete_index(&self, kind: IndexKind, name: &str) -> Result<()> {
        require_non_empty("index name", name)?;
        let uri = self.index_uri(kind, &[name]).await?;
        self.call(Request::new(Method::Delete, uri), &[204]).await?;
        Ok(())
    }

    /// Every index of `kind`, sorted by name.
    pub async fn list_indexes(&self, kind: IndexKind) -> Result<Vec<IndexInfo>> {
        let uri = self.index_uri(kind, &[]).await?;
        let reply = self.call(Request::new(Method::Get, uri), &[200, 204]).await?;
        if reply.status == 204 {
            return Ok(Vec::new());
        }

        let Json::Object(listing) = reply.json()? else {
            return Err(Error::MalformedResponse(format!("{kind} index listing is not an object")));
        };
        let mut indexes = listing
            .into_iter()
            .map(|(name, doc)| decode_index(kind, &name, doc))
            .collect::<Result<Vec<_>>>()?;
        indexes.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(indexes)
    }

    // ========================================================================
    // Entries
    // ========================================================================

    /// Index `entity` under `key`/`value` in the index `name` of the
    /// matching kind. The server creates the index if needed.
    ///
    /// Returns the entity the new entry refers to.
    pub async fn add_to_index(
        &self,
        name: &str,
        entity: impl Into<EntityRef>,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<EntityRef> {
        let entity = entity.into();
        let value = value.into();
        require_non_empty("index name", name)?;
        require_non_empty("index key", key)?;
        value_segment(key, &value)?;

        let root = self.service_root().await?;
        let kind = index_kind(entity);
        let uri = join(root.index_base(kind), &[name]);
        let body = json!({
            "key": key,
            "value": Json::from(value),
            "uri": Self::entity_uri(&root, entity),
        });
        let reply = self.call(Request::new(Method::Post, uri).with_body(body), &[201]).await?;
        let id = indexed_id(reply.json()?)?;

        let indexed = match entity {
            EntityRef::Node(_) => EntityRef::Node(NodeId(id)),
            EntityRef::Relationship(_) => EntityRef::Relationship(RelId(id)),
        };
        if indexed != entity {
            warn!(%entity, %indexed, index = name, "index entry refers to another entity");
            return Err(Error::ConsistencyViolation(format!(
                "indexed {entity} in '{name}' but the entry refers to {indexed}"
            )));
        }
        Ok(indexed)
    }

    /// Remove the entries for `entity` from index `name`: all of them, those
    /// under `key`, or only `key`/`value`. A value without a key is rejected.
    pub async fn remove_index_entries(
        &self,
        name: &str,
        entity: impl Into<EntityRef>,
        key: Option<&str>,
        value: Option<&Value>,
    ) -> Result<()> {
        let entity = entity.into();
        require_non_empty("index name", name)?;
        let id = entity.id().to_string();
        let mut segments = vec![name];

        let value_text = match (key, value) {
            (None, Some(_)) => {
                return Err(Error::InvalidArgument("an index value requires a key".into()));
            }
            (Some(key), value) => {
                require_non_empty("index key", key)?;
                value.map(|v| value_segment(key, v)).transpose()?
            }
            (None, None) => None,
        };
        if let Some(key) = key {
            segments.push(key);
        }
        if let Some(value) = value_text.as_deref() {
            segments.push(value);
        }
        segments.push(&id);

        let uri = self.index_uri(index_kind(entity), &segments).await?;
        self.call(Request::new(Method::Delete, uri), &[204]).await?;
        Ok(())
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// Entities indexed under exactly `key`/`value`.
    pub async fn find_exact(
        &self,
        kind: IndexKind,
        name: &str,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<Vec<IndexHit>> {
        require_non_empty("index name", name)?;
        require_non_empty("index key", key)?;
        let value = value_segment(key, &value.into())?;

        let uri = self.index_uri(kind, &[name, key, &value]).await?;
        decode_hits(self.call(Request::new(Method::Get, uri), &[200]).await?.array()?)
    }

    /// Entities matching a provider query such as `name:Wil*`.
    pub async fn find_by_query(&self, kind: IndexKind, name: &str, query: &str) -> Result<Vec<IndexHit>> {
        require_non_empty("index name", name)?;
        require_non_empty("index query", query)?;

        let uri = format!("{}?{}", self.index_uri(kind, &[name]).await?, encode_query(query));
        decode_hits(self.call(Request::new(Method::Get, uri), &[200]).await?.array()?)
    }
}
