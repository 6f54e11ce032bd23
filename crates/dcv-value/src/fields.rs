use indexmap::map::{IntoIter, Iter, IterMut};
use indexmap::IndexMap;

use crate::value::Value;

/// Ordered mapping from field name to value.
///
/// Insertion order is kept and is the order fields are encoded in, so
/// re-encoding is deterministic. Equality is order-sensitive.
#[derive(Clone, Debug, Default)]
pub struct FieldMap(IndexMap<String, Value>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(IndexMap::with_capacity(capacity))
    }

    /// Insert or overwrite a field. Overwriting keeps the original position.
    pub fn set(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.0.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Remove a field, shifting later fields down to keep their order.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, String, Value> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, String, Value> {
        self.0.iter_mut()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl PartialEq for FieldMap {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl IntoIterator for FieldMap {
    type Item = (String, Value);
    type IntoIter = IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a FieldMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> FieldMap {
        FieldMap::from_iter([
            ("a", Value::from("hello")),
            ("b", Value::Bool(true)),
            ("c", Value::Int(3)),
        ])
    }

    #[test]
    fn keeps_insertion_order() {
        let fields = sample();
        assert_eq!(fields.names().collect::<Vec<_>>(), ["a", "b", "c"]);
    }

    #[test]
    fn overwrite_keeps_position() {
        let mut fields = sample();
        let previous = fields.set("a", Value::from("bye"));
        assert_eq!(previous, Some(Value::from("hello")));
        assert_eq!(fields.names().collect::<Vec<_>>(), ["a", "b", "c"]);
        assert_eq!(fields.get("a"), Some(&Value::from("bye")));
    }

    #[test]
    fn get_reports_presence() {
        let fields = sample();
        assert!(fields.contains("b"));
        assert_eq!(fields.get("b"), Some(&Value::Bool(true)));
        assert_eq!(fields.get("missing"), None);
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn remove_shifts() {
        let mut fields = sample();
        assert_eq!(fields.remove("a"), Some(Value::from("hello")));
        assert_eq!(fields.names().collect::<Vec<_>>(), ["b", "c"]);
        assert_eq!(fields.remove("a"), None);
    }

    #[test]
    fn equality_is_order_sensitive() {
        let forward = FieldMap::from_iter([("x", Value::Int(1)), ("y", Value::Int(2))]);
        let reverse = FieldMap::from_iter([("y", Value::Int(2)), ("x", Value::Int(1))]);
        assert_ne!(forward, reverse);
        assert_eq!(forward, forward.clone());
    }

    #[test]
    fn empty() {
        let fields = FieldMap::new();
        assert!(fields.is_empty());
        assert_eq!(fields.iter().count(), 0);
    }
}
