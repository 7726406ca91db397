use std::fmt;

use veil_utils::hash::HashMap;

use crate::{FromValue, FromValueError, Value};

/// A string-keyed mapping of [`Value`]s that keeps insertion order.
///
/// Keys are unique: inserting an existing key replaces its value in place.
///
/// # Examples
///
/// ```
/// use veil_schema::{Value, ValueMap};
///
/// let mut map = ValueMap::new();
/// map.insert("b", Value::Int(1));
/// map.insert("a", Value::Int(2));
/// map.insert("b", Value::Int(3));
///
/// let keys: Vec<_> = map.keys().collect();
/// assert_eq!(keys, ["b", "a"]);
/// assert_eq!(map.get("b"), Some(&Value::Int(3)));
/// ```
#[derive(Clone, Default)]
pub struct ValueMap {
    entries: Vec<(String, Value)>,
    index: HashMap<String, usize>,
}

impl ValueMap {
    /// Creates an empty map.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Inserts an entry, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        let key = key.into();
        match self.index.get(&key) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    #[inline]
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        let i = *self.index.get(key)?;
        Some(&mut self.entries[i].1)
    }

    /// Removes an entry, keeping the order of the others.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let i = self.index.remove(key)?;
        let (_, value) = self.entries.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(value)
    }

    /// Removes the field `name` and converts it.
    ///
    /// Absent and `null` entries yield `F::default()`. Used by derived
    /// [`FromValue`] impls.
    pub fn take_field<F: FromValue + Default>(&mut self, name: &str) -> Result<F, FromValueError> {
        match self.remove(name) {
            None | Some(Value::Null) => Ok(F::default()),
            Some(value) => F::from_value(value).map_err(|e| e.in_field(name)),
        }
    }

    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over entries in insertion order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates over keys in insertion order.
    #[inline]
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl PartialEq for ValueMap {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl fmt::Debug for ValueMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl IntoIterator for ValueMap {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl FromValue for ValueMap {
    fn from_value(value: Value) -> Result<Self, FromValueError> {
        match value {
            Value::Map(map) => Ok(map),
            other => Err(FromValueError::unexpected("veil_schema::ValueMap", "mapping", &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ValueMap;
    use crate::Value;

    #[test]
    fn remove_keeps_order_and_index() {
        let mut map: ValueMap = [("a", Value::Int(1)), ("b", Value::Int(2)), ("c", Value::Int(3))]
            .into_iter()
            .collect();
        assert_eq!(map.remove("a"), Some(Value::Int(1)));
        assert_eq!(map.keys().collect::<Vec<_>>(), ["b", "c"]);
        assert_eq!(map.get("c"), Some(&Value::Int(3)));
        assert!(map.remove("a").is_none());
        map.insert("a", Value::Null);
        assert_eq!(map.keys().collect::<Vec<_>>(), ["b", "c", "a"]);
    }

    #[test]
    fn take_field_defaults_absent_and_null() {
        let mut map: ValueMap = [("age", Value::Null), ("name", Value::from("joe"))]
            .into_iter()
            .collect();
        assert_eq!(map.take_field::<i32>("age"), Ok(0));
        assert_eq!(map.take_field::<i32>("missing"), Ok(0));
        assert_eq!(map.take_field::<String>("name").as_deref(), Ok("joe"));
        assert!(map.is_empty());
    }

    #[test]
    fn take_field_reports_path() {
        let mut map: ValueMap = [("age", Value::from("old"))].into_iter().collect();
        let err = map.take_field::<i32>("age").unwrap_err();
        assert_eq!(err.path().to_string(), "$.age");
    }
}
