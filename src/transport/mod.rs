//! # Transport Trait
//!
//! The only collaborator the client needs: send one request with an
//! optional JSON body and hand back the status code and raw body.
//!
//! ## Implementations
//!
//! | Transport | Module | Description |
//! |-----------|--------|-------------|
//! | `HttpTransport` | `http` | reqwest over HTTP/1.1 (feature `http`) |
//! | `MemoryTransport` | `memory` | In-process simulation of the REST resource tree |

pub mod memory;
#[cfg(feature = "http")]
pub mod http;

use async_trait::async_trait;

pub use memory::MemoryTransport;
#[cfg(feature = "http")]
pub use http::HttpTransport;

// ============================================================================
// Request / Response
// ============================================================================

/// HTTP verbs used by the resource API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outbound request. `uri` is absolute and already percent-encoded.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    pub uri: String,
    pub body: Option<serde_json::Value>,
}

impl Request {
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self { method, uri: uri.into(), body: None }
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// What came back. `body` is the raw response text; `None` when empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Option<String>,
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self { status, body: None }
    }

    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self { status, body: Some(body.to_string()) }
    }
}

// ============================================================================
// Transport errors
// ============================================================================

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The transport itself failed (connection refused, timeout, DNS, ...).
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), source: None }
    }

    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self { message: message.into(), source: Some(source.into()) }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

// ============================================================================
// Transport Trait
// ============================================================================

/// Sends a single request. Implementations must not retry and must not
/// interpret status codes; that is the client's job.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, request: Request) -> std::result::Result<Response, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn send(&self, request: Request) -> std::result::Result<Response, TransportError> {
        (**self).send(request).await
    }
}
