//! reqwest-backed transport.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::ACCEPT;

use super::{Method, Request, Response, Transport, TransportError};

/// HTTP/1.1 transport. Every request carries `Accept: application/json`;
/// bodies are sent as JSON.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Transport with reqwest defaults (no request timeout).
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    /// Transport whose requests fail after `timeout`.
    pub fn with_timeout(timeout: Duration) -> std::result::Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::with_source("failed to build HTTP client", e))?;
        Ok(Self { client })
    }

    /// Wrap an existing reqwest client (shared pools, custom TLS, ...).
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> std::result::Result<Response, TransportError> {
        let mut builder = self.client
            .request(to_reqwest(request.method), &request.uri)
            .header(ACCEPT, "application/json");
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            TransportError::with_source(format!("{} {} failed", request.method, request.uri), e)
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| {
            TransportError::with_source(format!("reading body of {} {}", request.method, request.uri), e)
        })?;

        Ok(Response {
            status,
            body: if text.trim().is_empty() { None } else { Some(text) },
        })
    }
}
