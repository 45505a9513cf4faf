//! In-memory transport.
//!
//! This is the reference implementation of `Transport`. Instead of talking
//! to a server it answers requests itself, simulating the REST resource tree
//! over HashMaps protected by RwLock.
//!
//! ## Behaviour
//!
//! - Documents mirror the server's shape: `self`, `data`, `start`, `end`,
//!   `type`, `indexed`, plus the sub-resource URIs.
//! - Deleting a node that still has relationships answers 409.
//! - Deleting an entity leaves its index entries in place; lookups skip
//!   entries whose entity is gone.
//! - Index queries understand whitespace-separated `key:value` terms
//!   (all must match), a trailing `*` for prefix matches, and `*:*`.
//!
//! ## Limitations
//!
//! - **Per-collection locks**: node creation/deletion and relationship
//!   creation serialize on the adjacency lock; other multi-step mutations
//!   are not atomic.
//! - **No cypher, batch or extensions**: those URIs are advertised by the
//!   root document but answer 404.
//!
//! Use this transport for:
//! - Testing client code without a running server
//! - Counting requests (`request_count`, `root_fetches`)
//! - Simulating an unreachable server (`set_offline`)

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use parking_lot::RwLock;
use async_trait::async_trait;
use serde_json::{json, Map, Value as Json};

use crate::index::IndexKind;
use crate::model::{PropertyMap, Value};
use crate::uri::{encode_segment, id_from_uri};
use super::{Method, Request, Response, Transport, TransportError};

/// Host the memory transport answers for unless told otherwise.
pub const DEFAULT_HOST: &str = "memory.local";
/// Base URL the memory transport answers for unless told otherwise.
pub const DEFAULT_BASE_URL: &str = "http://memory.local:7474";

const DATA_PATH: &str = "/db/data";
const SERVER_VERSION: &str = "1.8";

// ============================================================================
// MemoryTransport
// ============================================================================

/// In-process simulation of the REST resource tree.
///
/// Cloning is cheap and clones share state, so a test can keep a handle
/// for inspection while the client owns another.
#[derive(Clone)]
pub struct MemoryTransport {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    base: String,
    nodes: RwLock<HashMap<u64, PropertyMap>>,
    relationships: RwLock<HashMap<u64, StoredRel>>,
    /// node_id → list of relationship IDs
    adjacency: RwLock<HashMap<u64, Vec<u64>>>,
    indexes: RwLock<HashMap<(IndexKind, String), StoredIndex>>,
    next_node_id: AtomicU64,
    next_rel_id: AtomicU64,
    requests: AtomicU64,
    root_fetches: AtomicU64,
    offline: AtomicBool,
}

struct StoredRel {
    src: u64,
    dst: u64,
    rel_type: String,
    properties: PropertyMap,
}

struct StoredIndex {
    config: Map<String, Json>,
    entries: Vec<IndexEntry>,
}

#[derive(PartialEq)]
struct IndexEntry {
    key: String,
    value: String,
    id: u64,
}

#[derive(Clone, Copy)]
enum Collection {
    Node,
    Relationship,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Answer for `base` (scheme://host:port) instead of [`DEFAULT_BASE_URL`].
    pub fn with_base_url(base: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                base: base.into().trim_end_matches('/').to_string(),
                nodes: RwLock::new(HashMap::new()),
                relationships: RwLock::new(HashMap::new()),
                adjacency: RwLock::new(HashMap::new()),
                indexes: RwLock::new(HashMap::new()),
                next_node_id: AtomicU64::new(1),
                next_rel_id: AtomicU64::new(1),
                requests: AtomicU64::new(0),
                root_fetches: AtomicU64::new(0),
                offline: AtomicBool::new(false),
            }),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.inner.base
    }

    /// Total requests received, including failed ones.
    pub fn request_count(&self) -> u64 {
        self.inner.requests.load(Ordering::SeqCst)
    }

    /// How many times the service root document was served.
    pub fn root_fetches(&self) -> u64 {
        self.inner.root_fetches.load(Ordering::SeqCst)
    }

    /// While offline every request fails at the transport level.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    pub fn node_count(&self) -> usize {
        self.inner.nodes.read().len()
    }

    pub fn relationship_count(&self) -> usize {
        self.inner.relationships.read().len()
    }

    // ========================================================================
    // URIs and documents
    // ========================================================================

    fn data_uri(&self) -> String {
        format!("{}{DATA_PATH}", self.inner.base)
    }

    fn node_uri(&self, id: u64) -> String {
        format!("{}/node/{id}", self.data_uri())
    }

    fn rel_uri(&self, id: u64) -> String {
        format!("{}/relationship/{id}", self.data_uri())
    }

    fn index_uri(&self, kind: IndexKind) -> String {
        format!("{}/index/{kind}", self.data_uri())
    }

    fn root_document(&self) -> Json {
        let data = self.data_uri();
        json!({
            "extensions": {},
            "node": format!("{data}/node"),
            "node_index": format!("{data}/index/node"),
            "relationship_index": format!("{data}/index/relationship"),
            "extensions_info": format!("{data}/ext"),
            "relationship_types": format!("{data}/relationship/types"),
            "batch": format!("{data}/batch"),
            "cypher": format!("{data}/cypher"),
            "neo4j_version": SERVER_VERSION,
        })
    }

    fn node_document(&self, id: u64, props: &PropertyMap) -> Json {
        let uri = self.node_uri(id);
        json!({
            "self": uri,
            "data": props_json(props),
            "properties": format!("{uri}/properties"),
            "property": format!("{uri}/properties/{{key}}"),
            "create_relationship": format!("{uri}/relationships"),
            "all_relationships": format!("{uri}/relationships/all"),
            "incoming_relationships": format!("{uri}/relationships/in"),
            "outgoing_relationships": format!("{uri}/relationships/out"),
        })
    }

    fn relationship_document(&self, id: u64, rel: &StoredRel) -> Json {
        let uri = self.rel_uri(id);
        json!({
            "self": uri,
            "start": self.node_uri(rel.src),
            "end": self.node_uri(rel.dst),
            "type": rel.rel_type,
            "data": props_json(&rel.properties),
            "properties": format!("{uri}/properties"),
            "property": format!("{uri}/properties/{{key}}"),
        })
    }

    fn entity_document(&self, kind: IndexKind, id: u64) -> Option<Json> {
        match kind {
            IndexKind::Node => self.inner.nodes.read().get(&id).map(|p| self.node_document(id, p)),
            IndexKind::Relationship => self.inner.relationships.read()
                .get(&id)
                .map(|r| self.relationship_document(id, r)),
        }
    }

    fn index_document(&self, kind: IndexKind, name: &str, config: &Map<String, Json>) -> Json {
        let mut doc = config.clone();
        doc.insert(
            "template".into(),
            Json::String(format!("{}/{}/{{key}}/{{value}}", self.index_uri(kind), encode_segment(name))),
        );
        Json::Object(doc)
    }

    // ========================================================================
    // Routing
    // ========================================================================

    fn route(&self, request: &Request) -> Response {
        let data = self.data_uri();
        let Some(rest) = request.uri.strip_prefix(&data) else {
            return error(404, "NotFoundException", format!("no resource at {}", request.uri));
        };
        let (path, query) = match rest.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (rest, None),
        };
        if !path.is_empty() && !path.starts_with('/') {
            return error(404, "NotFoundException", format!("no resource at {}", request.uri));
        }

        let decoded: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| urlencoding::decode(s).map(|c| c.into_owned()).unwrap_or_else(|_| s.to_string()))
            .collect();
        let segments: Vec<&str> = decoded.iter().map(String::as_str).collect();
        let body = request.body.as_ref();

        match (request.method, segments.as_slice()) {
            (Method::Get, []) => {
                self.inner.root_fetches.fetch_add(1, Ordering::SeqCst);
                ok(self.root_document())
            }
            (Method::Post, ["node"]) => self.create_node(body),
            (method, ["node", id, rest @ ..]) => match parse_id(id) {
                Some(id) => self.node_route(method, id, rest, body),
                None => error(400, "BadInputException", format!("invalid node id '{id}'")),
            },
            (Method::Get, ["relationship", "types"]) => self.relationship_types(),
            (method, ["relationship", id, rest @ ..]) => match parse_id(id) {
                Some(id) => self.relationship_route(method, id, rest, body),
                None => error(400, "BadInputException", format!("invalid relationship id '{id}'")),
            },
            (method, ["index", kind, rest @ ..]) => {
                let kind = match *kind {
                    "node" => IndexKind::Node,
                    "relationship" => IndexKind::Relationship,
                    other => return error(404, "NotFoundException", format!("no index collection '{other}'")),
                };
                self.index_route(method, kind, rest, query, body)
            }
            _ => error(404, "NotFoundException", format!("no resource at {}", request.uri)),
        }
    }

    fn node_route(&self, method: Method, id: u64, rest: &[&str], body: Option<&Json>) -> Response {
        match (method, rest) {
            (Method::Get, []) => match self.inner.nodes.read().get(&id) {
                Some(props) => ok(self.node_document(id, props)),
                None => error(404, "NodeNotFoundException", format!("Cannot find node with id [{id}] in database.")),
            },
            (Method::Delete, []) => self.delete_node(id),
            (method, ["properties", key @ ..]) => self.property_route(Collection::Node, id, method, key, body),
            (Method::Post, ["relationships"]) => self.create_relationship(id, body),
            (Method::Get, ["relationships", dir]) => self.list_relationships(id, dir),
            _ => error(405, "MethodNotAllowed", format!("{method} not supported on node {id}")),
        }
    }

    fn relationship_route(&self, method: Method, id: u64, rest: &[&str], body: Option<&Json>) -> Response {
        match (method, rest) {
            (Method::Get, []) => match self.inner.relationships.read().get(&id) {
                Some(rel) => ok(self.relationship_document(id, rel)),
                None => error(404, "RelationshipNotFoundException", format!("Relationship [{id}] not found.")),
            },
            (Method::Delete, []) => self.delete_relationship(id),
            (method, ["properties", key @ ..]) => {
                self.property_route(Collection::Relationship, id, method, key, body)
            }
            _ => error(405, "MethodNotAllowed", format!("{method} not supported on relationship {id}")),
        }
    }

    // ========================================================================
    // Nodes
    // ========================================================================

    fn create_node(&self, body: Option<&Json>) -> Response {
        let props = match body {
            None | Some(Json::Null) => PropertyMap::new(),
            Some(Json::Object(map)) => to_props(map),
            Some(other) => return error(400, "PropertyValueException", format!("Could not set property {other}")),
        };

        let id = self.inner.next_node_id.fetch_add(1, Ordering::Relaxed);
        let doc = self.node_document(id, &props);
        let mut adj = self.inner.adjacency.write();
        self.inner.nodes.write().insert(id, props);
        adj.insert(id, Vec::new());
        created(doc)
    }

    fn delete_node(&self, id: u64) -> Response {
        // Lock order: adjacency, then nodes, then relationships.
        let mut adj = self.inner.adjacency.write();
        // A node with relationships cannot be deleted
        if let Some(rels) = adj.get(&id) {
            if !rels.is_empty() {
                return error(
                    409,
                    "OperationFailureException",
                    format!("Node [{id}] has {} relationships and cannot be deleted.", rels.len()),
                );
            }
        }

        let removed = self.inner.nodes.write().remove(&id);
        adj.remove(&id);

        match removed {
            Some(_) => Response::new(204),
            None => error(404, "NodeNotFoundException", format!("Cannot find node with id [{id}] in database.")),
        }
    }

    // ========================================================================
    // Relationships
    // ========================================================================

    fn create_relationship(&self, src: u64, body: Option<&Json>) -> Response {
        let Some(Json::Object(obj)) = body else {
            return error(400, "BadInputException", "relationship description must be an object".to_string());
        };
        let Some(to) = obj.get("to").and_then(Json::as_str) else {
            return error(400, "BadInputException", "missing 'to'".to_string());
        };
        let Ok(dst) = id_from_uri(to) else {
            return error(400, "BadInputException", format!("'{to}' does not name a node"));
        };
        let rel_type = match obj.get("type").and_then(Json::as_str) {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => return error(400, "BadInputException", "missing 'type'".to_string()),
        };
        let properties = match obj.get("data") {
            None | Some(Json::Null) => PropertyMap::new(),
            Some(Json::Object(map)) => to_props(map),
            Some(other) => return error(400, "PropertyValueException", format!("Could not set property {other}")),
        };

        let mut adj = self.inner.adjacency.write();

        // Verify both nodes exist
        {
            let nodes = self.inner.nodes.read();
            if !nodes.contains_key(&src) {
                return error(404, "StartNodeNotFoundException", format!("Start node [{src}] not found."));
            }
            if !nodes.contains_key(&dst) {
                return error(400, "EndNodeNotFoundException", format!("End node [{dst}] not found."));
            }
        }

        let id = self.inner.next_rel_id.fetch_add(1, Ordering::Relaxed);
        let rel = StoredRel { src, dst, rel_type, properties };
        let doc = self.relationship_document(id, &rel);
        self.inner.relationships.write().insert(id, rel);

        // Update adjacency for both endpoints
        adj.entry(src).or_default().push(id);
        if src != dst {
            adj.entry(dst).or_default().push(id);
        }

        created(doc)
    }

    fn delete_relationship(&self, id: u64) -> Response {
        let removed = self.inner.relationships.write().remove(&id);
        let Some(rel) = removed else {
            return error(404, "RelationshipNotFoundException", format!("Relationship [{id}] not found."));
        };

        let mut adj = self.inner.adjacency.write();
        if let Some(rels) = adj.get_mut(&rel.src) {
            rels.retain(|rid| *rid != id);
        }
        if rel.src != rel.dst {
            if let Some(rels) = adj.get_mut(&rel.dst) {
                rels.retain(|rid| *rid != id);
            }
        }
        Response::new(204)
    }

    fn list_relationships(&self, node: u64, dir: &str) -> Response {
        if !matches!(dir, "in" | "out" | "all") {
            return error(400, "BadInputException", format!("unknown direction '{dir}'"));
        }

        let adj = self.inner.adjacency.read();
        let Some(rel_ids) = adj.get(&node) else {
            return error(404, "NodeNotFoundException", format!("Cannot find node with id [{node}] in database."));
        };
        let rels = self.inner.relationships.read();

        let mut result: Vec<(u64, Json)> = Vec::new();
        for rid in rel_ids {
            if let Some(rel) = rels.get(rid) {
                let matches_dir = match dir {
                    "out" => rel.src == node,
                    "in" => rel.dst == node,
                    _ => true,
                };
                if matches_dir {
                    result.push((*rid, self.relationship_document(*rid, rel)));
                }
            }
        }
        result.sort_by_key(|(rid, _)| *rid);
        ok(Json::Array(result.into_iter().map(|(_, doc)| doc).collect()))
    }

    fn relationship_types(&self) -> Response {
        let rels = self.inner.relationships.read();
        let mut types: Vec<String> = rels.values().map(|r| r.rel_type.clone()).collect();
        types.sort();
        types.dedup();
        ok(json!(types))
    }

    // ========================================================================
    // Properties (shared by nodes and relationships)
    // ========================================================================

    fn with_properties<R>(&self, coll: Collection, id: u64, f: impl FnOnce(&mut PropertyMap) -> R) -> Option<R> {
        match coll {
            Collection::Node => self.inner.nodes.write().get_mut(&id).map(f),
            Collection::Relationship => self.inner.relationships.write()
                .get_mut(&id)
                .map(|rel| f(&mut rel.properties)),
        }
    }

    fn property_route(
        &self,
        coll: Collection,
        id: u64,
        method: Method,
        key: &[&str],
        body: Option<&Json>,
    ) -> Response {
        let missing = || match coll {
            Collection::Node => error(404, "NodeNotFoundException", format!("Cannot find node with id [{id}] in database.")),
            Collection::Relationship => error(404, "RelationshipNotFoundException", format!("Relationship [{id}] not found.")),
        };

        match (method, key) {
            (Method::Get, []) => match self.with_properties(coll, id, |p| props_json(p)) {
                Some(Json::Object(map)) if map.is_empty() => Response::new(204),
                Some(doc) => ok(doc),
                None => missing(),
            },
            (Method::Put, []) => {
                let Some(Json::Object(map)) = body else {
                    return error(400, "PropertyValueException", "properties must be an object".to_string());
                };
                let props = to_props(map);
                match self.with_properties(coll, id, |p| *p = props) {
                    Some(()) => Response::new(204),
                    None => missing(),
                }
            }
            (Method::Delete, []) => match self.with_properties(coll, id, |p| p.clear()) {
                Some(()) => Response::new(204),
                None => missing(),
            },
            (Method::Get, [name]) => match self.with_properties(coll, id, |p| p.get(*name).cloned()) {
                Some(Some(value)) => ok(Json::from(value)),
                Some(None) => error(404, "NoSuchPropertyException", format!("{coll_name} [{id}] has no property with propertyKey=\"{name}\".", coll_name = coll.name())),
                None => missing(),
            },
            (Method::Put, [name]) => {
                let Some(value) = body else {
                    return error(400, "PropertyValueException", "missing property value".to_string());
                };
                let value = Value::from(value.clone());
                match self.with_properties(coll, id, |p| { p.insert((*name).to_string(), value); }) {
                    Some(()) => Response::new(204),
                    None => missing(),
                }
            }
            (Method::Delete, [name]) => match self.with_properties(coll, id, |p| p.remove(*name).is_some()) {
                Some(true) => Response::new(204),
                Some(false) => error(404, "NoSuchPropertyException", format!("{coll_name} [{id}] has no property with propertyKey=\"{name}\".", coll_name = coll.name())),
                None => missing(),
            },
            _ => error(405, "MethodNotAllowed", format!("{method} not supported on properties")),
        }
    }

    // ========================================================================
    // Indexes
    // ========================================================================

    fn index_route(
        &self,
        method: Method,
        kind: IndexKind,
        rest: &[&str],
        query: Option<&str>,
        body: Option<&Json>,
    ) -> Response {
        match (method, rest) {
            (Method::Post, []) => self.create_index(kind, body),
            (Method::Get, []) => self.list_indexes(kind),
            (Method::Delete, [name]) => match self.inner.indexes.write().remove(&(kind, (*name).to_string())) {
                Some(_) => Response::new(204),
                None => error(404, "NotFoundException", format!("No {kind} index named '{name}'.")),
            },
            (Method::Post, [name]) => self.add_to_index(kind, name, body),
            (Method::Get, [name]) => match query {
                Some(q) => self.find_by_query(kind, name, q),
                None => error(400, "BadInputException", "missing query".to_string()),
            },
            (Method::Get, [name, key, value]) => self.find_exact(kind, name, key, value),
            (Method::Delete, [name, tail @ ..]) if (1..=3).contains(&tail.len()) => {
                self.remove_entries(kind, name, tail)
            }
            _ => error(404, "NotFoundException", format!("no such {kind} index resource")),
        }
    }

    fn create_index(&self, kind: IndexKind, body: Option<&Json>) -> Response {
        let Some(Json::Object(obj)) = body else {
            return error(400, "BadInputException", "index description must be an object".to_string());
        };
        let name = match obj.get("name").and_then(Json::as_str) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => return error(400, "BadInputException", "missing 'name'".to_string()),
        };
        let mut config = default_index_config();
        match obj.get("config") {
            None | Some(Json::Null) => {}
            Some(Json::Object(extra)) => config.extend(extra.clone()),
            Some(other) => return error(400, "BadInputException", format!("invalid config {other}")),
        }

        let doc = self.index_document(kind, &name, &config);
        self.inner.indexes.write()
            .entry((kind, name))
            .and_modify(|idx| idx.config = config.clone())
            .or_insert_with(|| StoredIndex { config, entries: Vec::new() });
        created(doc)
    }

    fn list_indexes(&self, kind: IndexKind) -> Response {
        let indexes = self.inner.indexes.read();
        let listing: Map<String, Json> = indexes
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .map(|((_, name), idx)| (name.clone(), self.index_document(kind, name, &idx.config)))
            .collect();
        if listing.is_empty() {
            Response::new(204)
        } else {
            ok(Json::Object(listing))
        }
    }

    fn add_to_index(&self, kind: IndexKind, name: &str, body: Option<&Json>) -> Response {
        let Some(Json::Object(obj)) = body else {
            return error(400, "BadInputException", "index entry must be an object".to_string());
        };
        let key = match obj.get("key").and_then(Json::as_str) {
            Some(k) if !k.is_empty() => k.to_string(),
            _ => return error(400, "BadInputException", "missing 'key'".to_string()),
        };
        let Some(value) = obj.get("value").map(|v| Value::from(v.clone())).and_then(|v| v.to_path_segment()) else {
            return error(400, "BadInputException", "missing or non-scalar 'value'".to_string());
        };
        let Some(id) = obj.get("uri").and_then(Json::as_str).and_then(|u| id_from_uri(u).ok()) else {
            return error(400, "BadInputException", "missing or invalid 'uri'".to_string());
        };
        let Some(mut doc) = self.entity_document(kind, id) else {
            return error(400, "BadInputException", format!("{kind} [{id}] does not exist"));
        };

        {
            let mut indexes = self.inner.indexes.write();
            let index = indexes
                .entry((kind, name.to_string()))
                .or_insert_with(|| StoredIndex { config: default_index_config(), entries: Vec::new() });
            let entry = IndexEntry { key: key.clone(), value: value.clone(), id };
            if !index.entries.contains(&entry) {
                index.entries.push(entry);
            }
        }

        doc["indexed"] = Json::String(self.entry_uri(kind, name, &key, &value, id));
        created(doc)
    }

    fn entry_uri(&self, kind: IndexKind, name: &str, key: &str, value: &str, id: u64) -> String {
        format!(
            "{}/{}/{}/{}/{id}",
            self.index_uri(kind),
            encode_segment(name),
            encode_segment(key),
            encode_segment(value),
        )
    }

    fn find_exact(&self, kind: IndexKind, name: &str, key: &str, value: &str) -> Response {
        let ids: Vec<u64> = {
            let indexes = self.inner.indexes.read();
            let Some(index) = indexes.get(&(kind, name.to_string())) else {
                return error(404, "NotFoundException", format!("No {kind} index named '{name}'."));
            };
            index.entries.iter().filter(|e| e.key == key && e.value == value).map(|e| e.id).collect()
        };
        self.hits(kind, ids, |id| Some(self.entry_uri(kind, name, key, value, id)))
    }

    fn find_by_query(&self, kind: IndexKind, name: &str, query: &str) -> Response {
        let Ok(text) = urlencoding::decode(query) else {
            return error(400, "BadInputException", "query is not valid UTF-8".to_string());
        };

        let mut terms = Vec::new();
        for term in text.split_whitespace().filter(|t| *t != "AND") {
            match term.split_once(':') {
                Some((key, pattern)) => terms.push((key, pattern)),
                None => return error(400, "BadInputException", format!("cannot parse query term '{term}'")),
            }
        }
        if terms.is_empty() {
            return error(400, "BadInputException", "empty query".to_string());
        }

        let ids: Vec<u64> = {
            let indexes = self.inner.indexes.read();
            let Some(index) = indexes.get(&(kind, name.to_string())) else {
                return error(404, "NotFoundException", format!("No {kind} index named '{name}'."));
            };
            let mut candidates: Vec<u64> = index.entries.iter().map(|e| e.id).collect();
            candidates.sort_unstable();
            candidates.dedup();
            candidates
                .into_iter()
                .filter(|id| {
                    terms.iter().all(|(key, pattern)| {
                        index.entries.iter().any(|e| {
                            e.id == *id && (*key == "*" || e.key == *key) && pattern_matches(pattern, &e.value)
                        })
                    })
                })
                .collect()
        };
        self.hits(kind, ids, |_| None)
    }

    fn hits(&self, kind: IndexKind, mut ids: Vec<u64>, indexed: impl Fn(u64) -> Option<String>) -> Response {
        ids.sort_unstable();
        ids.dedup();
        let docs: Vec<Json> = ids
            .into_iter()
            .filter_map(|id| {
                let mut doc = self.entity_document(kind, id)?;
                if let Some(uri) = indexed(id) {
                    doc["indexed"] = Json::String(uri);
                }
                Some(doc)
            })
            .collect();
        ok(Json::Array(docs))
    }

    fn remove_entries(&self, kind: IndexKind, name: &str, tail: &[&str]) -> Response {
        let Some((last, selectors)) = tail.split_last() else {
            return error(400, "BadInputException", "missing entity id".to_string());
        };
        let Some(id) = parse_id(last) else {
            return error(400, "BadInputException", format!("invalid entity id '{last}'"));
        };
        let key = selectors.first().copied();
        let value = selectors.get(1).copied();

        let mut indexes = self.inner.indexes.write();
        let Some(index) = indexes.get_mut(&(kind, name.to_string())) else {
            return error(404, "NotFoundException", format!("No {kind} index named '{name}'."));
        };
        index.entries.retain(|e| {
            let selected = e.id == id
                && key.is_none_or(|k| e.key == k)
                && value.is_none_or(|v| e.value == v);
            !selected
        });
        Response::new(204)
    }
}

impl Default for MemoryTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Collection {
    fn name(self) -> &'static str {
        match self {
            Collection::Node => "Node",
            Collection::Relationship => "Relationship",
        }
    }
}

// ============================================================================
// Transport impl
// ============================================================================

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, request: Request) -> std::result::Result<Response, TransportError> {
        self.inner.requests.fetch_add(1, Ordering::SeqCst);
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(TransportError::new(format!(
                "connection refused: {} {}", request.method, request.uri
            )));
        }
        Ok(self.route(&request))
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn parse_id(segment: &str) -> Option<u64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

fn props_json(props: &PropertyMap) -> Json {
    Json::Object(props.iter().map(|(k, v)| (k.clone(), Json::from(v.clone()))).collect())
}

fn to_props(map: &Map<String, Json>) -> PropertyMap {
    map.iter().map(|(k, v)| (k.clone(), Value::from(v.clone()))).collect()
}

fn default_index_config() -> Map<String, Json> {
    let mut config = Map::new();
    config.insert("provider".into(), json!("lucene"));
    config.insert("type".into(), json!("exact"));
    config
}

fn pattern_matches(pattern: &str, value: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    match pattern.strip_suffix('*') {
        Some(prefix) => value.starts_with(prefix),
        None => pattern == value,
    }
}

fn ok(body: Json) -> Response {
    Response::json(200, &body)
}

fn created(body: Json) -> Response {
    Response::json(201, &body)
}

fn error(status: u16, exception: &str, message: String) -> Response {
    Response::json(status, &json!({ "message": message, "exception": exception }))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(path: &str) -> String {
        format!("{DEFAULT_BASE_URL}{DATA_PATH}{path}")
    }

    async fn send(t: &MemoryTransport, method: Method, path: &str, body: Option<Json>) -> (u16, Option<Json>) {
        let mut request = Request::new(method, uri(path));
        request.body = body;
        let response = t.send(request).await.unwrap();
        let json = response.body.map(|b| serde_json::from_str(&b).unwrap());
        (response.status, json)
    }

    #[tokio::test]
    async fn test_root_document() {
        let t = MemoryTransport::new();
        let (status, body) = send(&t, Method::Get, "/", None).await;
        assert_eq!(status, 200);
        let body = body.unwrap();
        assert_eq!(body["node"], json!(uri("/node")));
        assert_eq!(body["relationship_types"], json!(uri("/relationship/types")));
        assert_eq!(t.root_fetches(), 1);
    }

    #[tokio::test]
    async fn test_create_and_get_node() {
        let t = MemoryTransport::new();
        let (status, body) = send(&t, Method::Post, "/node", Some(json!({"name": "Ada"}))).await;
        assert_eq!(status, 201);
        let self_uri = body.unwrap()["self"].as_str().unwrap().to_string();
        let id = id_from_uri(&self_uri).unwrap();

        let (status, body) = send(&t, Method::Get, &format!("/node/{id}"), None).await;
        assert_eq!(status, 200);
        assert_eq!(body.unwrap()["data"], json!({"name": "Ada"}));
    }

    #[tokio::test]
    async fn test_cannot_delete_connected_node() {
        let t = MemoryTransport::new();
        send(&t, Method::Post, "/node", None).await;
        send(&t, Method::Post, "/node", None).await;
        let (status, _) = send(
            &t,
            Method::Post,
            "/node/1/relationships",
            Some(json!({"to": uri("/node/2"), "type": "KNOWS"})),
        ).await;
        assert_eq!(status, 201);

        let (status, _) = send(&t, Method::Delete, "/node/1", None).await;
        assert_eq!(status, 409);

        let (status, _) = send(&t, Method::Delete, "/relationship/1", None).await;
        assert_eq!(status, 204);
        let (status, _) = send(&t, Method::Delete, "/node/1", None).await;
        assert_eq!(status, 204);
        assert_eq!(t.node_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_delete_races_relationship_creation() {
        let t = MemoryTransport::new();
        for _ in 0..200 {
            let (_, a) = send(&t, Method::Post, "/node", None).await;
            let (_, b) = send(&t, Method::Post, "/node", None).await;
            let a = id_from_uri(a.unwrap()["self"].as_str().unwrap()).unwrap();
            let b = id_from_uri(b.unwrap()["self"].as_str().unwrap()).unwrap();

            let deleter = {
                let t = t.clone();
                tokio::spawn(async move { send(&t, Method::Delete, &format!("/node/{a}"), None).await.0 })
            };
            let linker = {
                let t = t.clone();
                tokio::spawn(async move {
                    let body = json!({"to": uri(&format!("/node/{b}")), "type": "KNOWS"});
                    send(&t, Method::Post, &format!("/node/{a}/relationships"), Some(body)).await.0
                })
            };
            let deleted = deleter.await.unwrap();
            let linked = linker.await.unwrap();
            assert!(
                (deleted == 204) != (linked == 201),
                "delete answered {deleted}, link answered {linked}"
            );
        }

        let nodes = t.inner.nodes.read();
        for rel in t.inner.relationships.read().values() {
            assert!(nodes.contains_key(&rel.src) && nodes.contains_key(&rel.dst));
        }
    }

    #[tokio::test]
    async fn test_empty_properties_answer_no_content() {
        let t = MemoryTransport::new();
        send(&t, Method::Post, "/node", None).await;
        let (status, body) = send(&t, Method::Get, "/node/1/properties", None).await;
        assert_eq!(status, 204);
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn test_index_entries_survive_entity_delete() {
        let t = MemoryTransport::new();
        send(&t, Method::Post, "/node", Some(json!({"name": "a"}))).await;
        let (status, body) = send(
            &t,
            Method::Post,
            "/index/node/people",
            Some(json!({"key": "name", "value": "a", "uri": uri("/node/1")})),
        ).await;
        assert_eq!(status, 201);
        assert_eq!(body.unwrap()["indexed"], json!(uri("/index/node/people/name/a/1")));

        send(&t, Method::Delete, "/node/1", None).await;
        let (status, body) = send(&t, Method::Get, "/index/node/people/name/a", None).await;
        assert_eq!(status, 200);
        assert_eq!(body.unwrap(), json!([]));
        assert_eq!(t.inner.indexes.read()[&(IndexKind::Node, "people".to_string())].entries.len(), 1);
    }

    #[tokio::test]
    async fn test_query_is_whole_query_component() {
        let t = MemoryTransport::new();
        send(&t, Method::Post, "/node", Some(json!({"name": "Wilma"}))).await;
        send(
            &t,
            Method::Post,
            "/index/node/people",
            Some(json!({"key": "name", "value": "Wilma", "uri": uri("/node/1")})),
        ).await;

        let (status, body) = send(&t, Method::Get, "/index/node/people?name%3AWil%2A", None).await;
        assert_eq!(status, 200);
        assert_eq!(body.unwrap().as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_offline() {
        let t = MemoryTransport::new();
        t.set_offline(true);
        assert!(t.send(Request::new(Method::Get, uri("/"))).await.is_err());
        assert_eq!(t.request_count(), 1);
    }

    #[test]
    fn test_pattern_matches() {
        assert!(pattern_matches("*", "anything"));
        assert!(pattern_matches("Wil*", "Wilma"));
        assert!(!pattern_matches("Wil*", "Barney"));
        assert!(pattern_matches("Wilma", "Wilma"));
    }
}
