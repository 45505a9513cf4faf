//! Resource URI helpers.
//!
//! Every entity the server returns is named by its self URI. The numeric
//! id is the trailing path segment of that URI; nothing else about the URI
//! is interpreted.

use crate::{Error, Result};

/// Extract the numeric id from the trailing `/`-delimited segment of `uri`.
///
/// A single trailing slash is tolerated. The segment must consist of ASCII
/// digits only and fit in a `u64`.
///
/// ```
/// use neo4j_rest::uri::id_from_uri;
///
/// assert_eq!(id_from_uri("http://localhost:7474/db/data/node/42").unwrap(), 42);
/// assert!(id_from_uri("http://localhost:7474/db/data/node").is_err());
/// ```
pub fn id_from_uri(uri: &str) -> Result<u64> {
    if uri.is_empty() {
        return Err(Error::MalformedReference("empty reference".into()));
    }
    let trimmed = uri.strip_suffix('/').unwrap_or(uri);
    let (_, segment) = trimmed
        .rsplit_once('/')
        .ok_or_else(|| Error::MalformedReference(format!("no path segment in '{uri}'")))?;

    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::MalformedReference(format!(
            "trailing segment of '{uri}' is not a non-negative integer"
        )));
    }
    segment
        .parse::<u64>()
        .map_err(|e| Error::MalformedReference(format!("'{uri}': {e}")))
}

/// Percent-encode one path segment (index names, keys, values, property keys).
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Percent-encode a whole query component, e.g. the text of an index query.
pub fn encode_query(query: &str) -> String {
    urlencoding::encode(query).into_owned()
}

/// Append already-unencoded segments to `base`, encoding each one.
pub fn join(base: &str, segments: &[&str]) -> String {
    let mut uri = base.trim_end_matches('/').to_string();
    for segment in segments {
        uri.push('/');
        uri.push_str(&encode_segment(segment));
    }
    uri
}
