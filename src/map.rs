//! Property map for KDL nodes.
//!
//! This module provides [`KdlMap`], a wrapper around [`IndexMap`] holding the
//! named properties of a node. Keys are unique; inserting an existing key
//! replaces its value, which is how `node a=1 a=2` ends up with `a=2`.
//!
//! Iteration follows first-insertion order, so the writer prints properties in
//! the order they were first seen.
//!
//! ## Examples
//!
//! ```rust
//! use kdl_doc::{KdlMap, KdlValue};
//!
//! let mut map = KdlMap::new();
//! map.insert("name".to_string(), KdlValue::from("Alice"));
//! map.insert("age".to_string(), KdlValue::from(30));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! ```

use crate::KdlValue;
use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

/// An insertion-ordered map of property names to values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KdlMap(IndexMap<String, KdlValue>);

impl KdlMap {
    /// Creates an empty `KdlMap`.
    #[must_use]
    pub fn new() -> Self {
        KdlMap(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        KdlMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a property, returning the value it replaced.
    ///
    /// A replaced key keeps its original position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kdl_doc::{KdlMap, KdlValue};
    ///
    /// let mut map = KdlMap::new();
    /// assert!(map.insert("key".to_string(), KdlValue::from(1)).is_none());
    /// assert!(map.insert("key".to_string(), KdlValue::from(2)).is_some());
    /// assert_eq!(map.get("key").and_then(|v| v.as_i64()), Some(2));
    /// ```
    pub fn insert(&mut self, key: String, value: KdlValue) -> Option<KdlValue> {
        self.0.insert(key, value)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&KdlValue> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut KdlValue> {
        self.0.get_mut(key)
    }

    /// Removes a property, shifting later properties up to keep their order.
    pub fn remove(&mut self, key: &str) -> Option<KdlValue> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, String, KdlValue> {
        self.0.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, String, KdlValue> {
        self.0.values()
    }

    /// Returns an iterator over the properties, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, KdlValue> {
        self.0.iter()
    }
}

impl From<HashMap<String, KdlValue>> for KdlMap {
    fn from(map: HashMap<String, KdlValue>) -> Self {
        KdlMap(map.into_iter().collect())
    }
}

impl From<KdlMap> for HashMap<String, KdlValue> {
    fn from(map: KdlMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl IntoIterator for KdlMap {
    type Item = (String, KdlValue);
    type IntoIter = indexmap::map::IntoIter<String, KdlValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a KdlMap {
    type Item = (&'a String, &'a KdlValue);
    type IntoIter = indexmap::map::Iter<'a, String, KdlValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, KdlValue)> for KdlMap {
    fn from_iter<T: IntoIterator<Item = (String, KdlValue)>>(iter: T) -> Self {
        KdlMap(IndexMap::from_iter(iter))
    }
}

impl Serialize for KdlMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_insert_wins_in_place() {
        let mut map = KdlMap::new();
        map.insert("a".to_string(), KdlValue::from(1));
        map.insert("b".to_string(), KdlValue::from(2));
        map.insert("a".to_string(), KdlValue::from(3));

        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(map.get("a").and_then(|v| v.as_i64()), Some(3));
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut map: KdlMap = vec![
            ("x".to_string(), KdlValue::from(1)),
            ("y".to_string(), KdlValue::from(2)),
            ("z".to_string(), KdlValue::from(3)),
        ]
        .into_iter()
        .collect();

        assert!(map.remove("y").is_some());
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["x", "z"]);
        assert!(!map.contains_key("y"));
    }
}
