//! PropertyMap: the key-value store on nodes and relationships.

use std::collections::HashMap;
use super::Value;

/// A map of property names to values.
pub type PropertyMap = HashMap<String, Value>;

/// Convert a list of (key, value) pairs into a map value.
impl<K, V> From<Vec<(K, V)>> for Value
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from(pairs: Vec<(K, V)>) -> Self {
        Value::Map(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Build a [`PropertyMap`] from (key, value) pairs.
///
/// ```
/// use neo4j_rest::{props, Value};
///
/// let p = props([("wife", "Wilma"), ("friend", "Barney")]);
/// assert_eq!(p.get("wife"), Some(&Value::from("Wilma")));
/// ```
pub fn props<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> PropertyMap
where
    K: Into<String>,
    V: Into<Value>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}
