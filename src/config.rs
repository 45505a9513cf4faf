//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::transport::memory;
use crate::{Error, Result};

/// Where the server lives and how to reach its service root.
///
/// Deserializable so host applications can embed it in their own config
/// files; every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `http` or `https`.
    pub scheme: String,
    pub host: String,
    /// Omitted from the base URL when `None`.
    pub port: Option<u16>,
    /// Path of the service root document.
    pub root_path: String,
    /// Per-request timeout for the HTTP transport, in milliseconds.
    pub timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            scheme: "http".into(),
            host: "localhost".into(),
            port: Some(7474),
            root_path: "/db/data/".into(),
            timeout_ms: None,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration matching [`memory::DEFAULT_BASE_URL`].
    pub fn memory() -> Self {
        Self {
            host: memory::DEFAULT_HOST.into(),
            ..Self::default()
        }
    }

    /// Parse `scheme://host[:port][/root/path/]`.
    ///
    /// A port equal to the scheme's default is dropped. Credentials, query
    /// and fragment are rejected.
    ///
    /// ```
    /// use neo4j_rest::ClientConfig;
    ///
    /// let config = ClientConfig::from_url("https://graph.example.com:7473").unwrap();
    /// assert_eq!(config.root_uri(), "https://graph.example.com:7473/db/data/");
    /// ```
    pub fn from_url(url: &str) -> Result<Self> {
        let parsed = Url::parse(url)
            .map_err(|e| Error::InvalidArgument(format!("invalid url '{url}': {e}")))?;

        let scheme = parsed.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(Error::InvalidArgument(format!("unsupported scheme '{scheme}'")));
        }
        let host = match parsed.host_str() {
            Some(host) if !host.is_empty() => host,
            _ => return Err(Error::InvalidArgument(format!("'{url}' has no host"))),
        };
        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(Error::InvalidArgument(format!("'{url}' carries credentials")));
        }
        if parsed.query().is_some() || parsed.fragment().is_some() {
            return Err(Error::InvalidArgument(format!("'{url}' carries a query or fragment")));
        }

        let mut config = Self {
            scheme: scheme.to_string(),
            host: host.to_string(),
            port: parsed.port(),
            ..Self::default()
        };
        if parsed.path() != "/" {
            config.root_path = parsed.path().to_string();
        }
        Ok(config)
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    pub fn with_root_path(mut self, root_path: impl Into<String>) -> Self {
        self.root_path = root_path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis().try_into().unwrap_or(u64::MAX));
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// `scheme://host[:port]`
    pub fn base_url(&self) -> String {
        match self.port {
            Some(port) => format!("{}://{}:{port}", self.scheme, self.host),
            None => format!("{}://{}", self.scheme, self.host),
        }
    }

    /// Absolute URI of the service root document.
    pub fn root_uri(&self) -> String {
        if self.root_path.starts_with('/') {
            format!("{}{}", self.base_url(), self.root_path)
        } else {
            format!("{}/{}", self.base_url(), self.root_path)
        }
    }
}
