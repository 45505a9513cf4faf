//! # neo4j-rest — Client for the Neo4j REST resource API
//!
//! Nodes, relationships, their properties and legacy indexes, addressed
//! through the URIs the server advertises in its service root.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `Transport` is the contract between client and wire
//! 2. **Clean DTOs**: `Node`, `Relationship`, `Value` cross all boundaries
//! 3. **Discover, then address**: every URI derives from the service root,
//!    which is fetched once per client
//! 4. **One request per operation**: no retries, no hidden batching
//!
//! ## Quick Start
//!
//! ```rust
//! use neo4j_rest::{props, RestClient, Value};
//!
//! # async fn example() -> neo4j_rest::Result<()> {
//! let client = RestClient::open_memory();
//!
//! let fred = client.create_node(props([("wife", "Wilma"), ("friend", "Barney")])).await?;
//! let again = client.get_node(fred.id).await?;
//! assert_eq!(again.get("wife"), Some(&Value::from("Wilma")));
//!
//! client.delete_node(fred.id).await?;
//! assert!(client.get_node(fred.id).await.unwrap_err().is_not_found());
//! # Ok(())
//! # }
//! ```
//!
//! ## Transports
//!
//! | Transport | Feature | Description |
//! |-----------|---------|-------------|
//! | Memory | (always) | In-process simulation for testing/embedding |
//! | HTTP | `http` (default) | reqwest against a running server |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod uri;
pub mod config;
pub mod transport;
pub mod client;
pub mod index;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Node, Relationship, Value, PropertyMap, props,
    NodeId, RelId, Direction, EntityRef, ServiceRoot,
};

// ============================================================================
// Re-exports: Client, configuration, transport
// ============================================================================

pub use client::RestClient;
pub use config::ClientConfig;
pub use index::{IndexHit, IndexInfo, IndexKind};
pub use transport::{Method, MemoryTransport, Request, Response, Transport, TransportError};
#[cfg(feature = "http")]
pub use transport::HttpTransport;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Service unreachable: {0}")]
    ServiceUnreachable(#[from] TransportError),

    #[error("{method} {uri} answered {status}{}", message_suffix(.message))]
    UnexpectedStatus {
        method: Method,
        uri: String,
        status: u16,
        /// The server's `message` field, when the error body carried one.
        message: Option<String>,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Malformed reference: {0}")]
    MalformedReference(String),

    #[error("Malformed service root: {0}")]
    MalformedServiceRoot(String),

    #[error("Consistency violation: {0}")]
    ConsistencyViolation(String),
}

impl Error {
    /// The HTTP status behind this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::UnexpectedStatus { status, .. } => Some(*status),
            Error::NotFound(_) => Some(404),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// Turn a 404 into `NotFound(what())`; anything else passes through.
    pub(crate) fn or_not_found(self, what: impl FnOnce() -> String) -> Self {
        match self {
            Error::UnexpectedStatus { status: 404, .. } => Error::NotFound(what()),
            other => other,
        }
    }
}

fn message_suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unexpected_status_display() {
        let err = Error::UnexpectedStatus {
            method: Method::Delete,
            uri: "http://localhost:7474/db/data/node/1".into(),
            status: 409,
            message: Some("Node [1] has 1 relationships".into()),
        };
        assert_eq!(
            err.to_string(),
            "DELETE http://localhost:7474/db/data/node/1 answered 409: Node [1] has 1 relationships"
        );
        assert_eq!(err.status(), Some(409));
    }

    #[test]
    fn test_or_not_found() {
        let err = Error::UnexpectedStatus { method: Method::Get, uri: "u".into(), status: 404, message: None };
        let err = err.or_not_found(|| "node 1".into());
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Not found: node 1");

        let err = Error::MalformedResponse("x".into()).or_not_found(|| "node 1".into());
        assert!(!err.is_not_found());
        assert_eq!(err.status(), None);
    }
}
