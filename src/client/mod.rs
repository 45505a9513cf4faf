//! The REST client.
//!
//! `RestClient` owns a transport and the lazily resolved service root.
//! Every operation follows the same shape: validate arguments, resolve the
//! target URI from the service root, send one request, check the status,
//! decode the body. The per-resource operations live in submodules:
//!
//! | Module | Resources |
//! |--------|-----------|
//! | `node` | `<node>`, `<node>/<id>` |
//! | `relationship` | `<node>/<id>/relationships[/in\|out]`, `<relationship>/<id>`, `<relationship>/types` |
//! | `property` | `<entity>/<id>/properties[/<key>]` |
//! | `index` | `<index>/{node,relationship}/<name>[/<key>/<value>]` |

mod document;
mod index;
mod node;
mod property;
mod relationship;

use std::sync::Arc;

use serde_json::Value as Json;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::model::{EntityRef, PropertyMap, ServiceRoot, Value};
use crate::transport::{Method, MemoryTransport, Request, Transport};
use crate::{Error, Result};

// ============================================================================
// RestClient
// ============================================================================

/// Client for one server.
///
/// Cheap to share behind an `Arc`; any number of operations may be in
/// flight at once. The service root is fetched on first use and cached for
/// the life of the client.
pub struct RestClient<T: Transport> {
    config: ClientConfig,
    transport: T,
    root: OnceCell<Arc<ServiceRoot>>,
}

impl<T: Transport> RestClient<T> {
    /// Create a client that sends its requests through `transport`.
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport, root: OnceCell::new() }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Access the underlying transport (for inspection in tests).
    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ========================================================================
    // Service root
    // ========================================================================

    /// The server's service root, fetched once.
    ///
    /// Concurrent first callers share a single in-flight request. A failed
    /// fetch leaves the root unresolved, so a later call tries again.
    pub async fn service_root(&self) -> Result<Arc<ServiceRoot>> {
        self.root
            .get_or_try_init(|| self.fetch_service_root())
            .await
            .cloned()
    }

    /// The service root if it has already been resolved.
    pub fn cached_service_root(&self) -> Option<Arc<ServiceRoot>> {
        self.root.get().cloned()
    }

    async fn fetch_service_root(&self) -> Result<Arc<ServiceRoot>> {
        let uri = self.config.root_uri();
        let body = self.call(Request::new(Method::Get, &uri), &[200]).await?.body;
        let doc = body.ok_or_else(|| Error::MalformedServiceRoot(format!("GET {uri} returned no body")))?;
        let root = ServiceRoot::from_document(&doc)?;
        info!(
            uri = %uri,
            version = root.neo4j_version.as_deref().unwrap_or("unknown"),
            "resolved service root"
        );
        Ok(Arc::new(root))
    }

    // ========================================================================
    // Request plumbing
    // ========================================================================

    /// Send one request and check its status against `expected`.
    ///
    /// A body that is present but not JSON is a `MalformedResponse`.
    pub(crate) async fn call(&self, request: Request, expected: &[u16]) -> Result<Reply> {
        let method = request.method;
        let uri = request.uri.clone();
        debug!(%method, %uri, "sending request");

        let response = self.transport.send(request).await.map_err(|e| {
            warn!(%method, %uri, error = %e, "transport failure");
            Error::ServiceUnreachable(e)
        })?;
        debug!(%method, %uri, status = response.status, "received response");

        let body = match response.body {
            None => None,
            Some(text) => match serde_json::from_str::<Json>(&text) {
                Ok(json) => Some(json),
                Err(_) if !expected.contains(&response.status) => None,
                Err(e) => {
                    return Err(Error::MalformedResponse(format!("{method} {uri}: body is not JSON: {e}")));
                }
            },
        };

        if !expected.contains(&response.status) {
            let message = body
                .as_ref()
                .and_then(|b| b.get("message"))
                .and_then(Json::as_str)
                .map(str::to_string);
            debug!(%method, %uri, status = response.status, ?message, "unexpected status");
            return Err(Error::UnexpectedStatus { method, uri, status: response.status, message });
        }

        Ok(Reply { method, uri, status: response.status, body })
    }

    /// URI of a node or relationship resource.
    pub(crate) fn entity_uri(root: &ServiceRoot, entity: EntityRef) -> String {
        match entity {
            EntityRef::Node(id) => format!("{}/{id}", root.node),
            EntityRef::Relationship(id) => format!("{}/{id}", root.relationship),
        }
    }
}

// ============================================================================
// Constructors
// ============================================================================

#[cfg(feature = "http")]
impl RestClient<crate::transport::HttpTransport> {
    /// Client over HTTP, honouring `config.timeout()`.
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let transport = match config.timeout() {
            Some(timeout) => crate::transport::HttpTransport::with_timeout(timeout)?,
            None => crate::transport::HttpTransport::new(),
        };
        Ok(Self::with_transport(config, transport))
    }
}

/// In-memory server for testing and embedding.
impl RestClient<MemoryTransport> {
    pub fn open_memory() -> Self {
        Self::with_memory(MemoryTransport::new())
    }

    /// Use an existing memory transport; clones of it observe the same state.
    pub fn with_memory(transport: MemoryTransport) -> Self {
        let config = ClientConfig::memory();
        Self::with_transport(config, transport)
    }
}

// ============================================================================
// Reply
// ============================================================================

/// A response whose status matched expectations.
#[derive(Debug)]
pub(crate) struct Reply {
    method: Method,
    uri: String,
    pub(crate) status: u16,
    pub(crate) body: Option<Json>,
}

impl Reply {
    /// The body, which must be present.
    pub(crate) fn json(self) -> Result<Json> {
        let Reply { method, uri, body, .. } = self;
        body.ok_or_else(|| Error::MalformedResponse(format!("{method} {uri}: missing body")))
    }

    /// The body, which must be a JSON array.
    pub(crate) fn array(self) -> Result<Vec<Json>> {
        let context = format!("{} {}", self.method, self.uri);
        match self.json()? {
            Json::Array(items) => Ok(items),
            other => Err(Error::MalformedResponse(format!("{context}: expected an array, got {other}"))),
        }
    }
}

// ============================================================================
// Argument validation
// ============================================================================

pub(crate) fn require_non_empty(what: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidArgument(format!("{what} must be a non-empty string")));
    }
    Ok(())
}

/// Properties must have non-empty keys and JSON-representable values.
pub(crate) fn properties_body(properties: &PropertyMap) -> Result<Json> {
    let mut body = serde_json::Map::with_capacity(properties.len());
    for (key, value) in properties {
        require_non_empty("property key", key)?;
        check_value(key, value)?;
        body.insert(key.clone(), Json::from(value.clone()));
    }
    Ok(Json::Object(body))
}

pub(crate) fn check_value(key: &str, value: &Value) -> Result<()> {
    match value {
        Value::Float(f) if !f.is_finite() => Err(Error::InvalidArgument(format!(
            "property '{key}' is {f}, which has no JSON representation"
        ))),
        Value::List(items) => items.iter().try_for_each(|v| check_value(key, v)),
        Value::Map(map) => map.values().try_for_each(|v| check_value(key, v)),
        _ => Ok(()),
    }
}
