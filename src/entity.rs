//! Entities: flat, insertion-ordered field maps.
//!
//! Column order in generated SQL follows the order fields were inserted, so
//! an `Entity` is an association list rather than a hash map.

use crate::error::Result;
use crate::value::Value;

/// One row's worth of fields, keyed by field or column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Entity {
    fields: Vec<(String, Value)>,
}

impl Entity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. Replacing an existing field keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.fields.push((key, value));
                None
            }
        }
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    /// Remove a field, preserving the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let idx = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(idx).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Entity {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut entity = Entity::new();
        for (k, v) in iter {
            entity.insert(k, v);
        }
        entity
    }
}

impl IntoIterator for Entity {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

/// A typed row that a [`TableDriver`](crate::TableDriver) reads and writes.
///
/// Field names use the external (camelCase) convention; the driver converts
/// them to column names on the way out and back on the way in.
///
/// ```
/// use entity_driver::{DriverError, Entity, Record};
///
/// struct Company {
///     id: String,
///     name: String,
/// }
///
/// impl Record for Company {
///     const FIELDS: &'static [&'static str] = &["id", "name"];
///
///     fn to_entity(&self) -> Entity {
///         Entity::new().with("id", self.id.as_str()).with("name", self.name.as_str())
///     }
///
///     fn from_entity(entity: Entity) -> Result<Self, DriverError> {
///         Ok(Company {
///             id: entity_driver::entity::text_field(&entity, "id")?,
///             name: entity_driver::entity::text_field(&entity, "name")?,
///         })
///     }
/// }
/// ```
pub trait Record: Sized {
    /// Every field name of the record, in external convention.
    const FIELDS: &'static [&'static str];

    fn to_entity(&self) -> Entity;

    /// # Errors
    ///
    /// Returns [`DriverError::Decode`](crate::DriverError::Decode) when a
    /// field is missing or has the wrong type.
    fn from_entity(entity: Entity) -> Result<Self>;
}

fn missing(key: &str) -> crate::DriverError {
    crate::DriverError::Decode(format!("field `{key}` is missing"))
}

fn mistyped(key: &str, expected: &str, got: &Value) -> crate::DriverError {
    crate::DriverError::Decode(format!("field `{key}` expected {expected}, got {got:?}"))
}

/// Read a text field for [`Record::from_entity`].
pub fn text_field(entity: &Entity, key: &str) -> Result<String> {
    match entity.get(key) {
        Some(Value::Text(s)) => Ok(s.clone()),
        Some(other) => Err(mistyped(key, "text", other)),
        None => Err(missing(key)),
    }
}

pub fn int_field(entity: &Entity, key: &str) -> Result<i64> {
    match entity.get(key) {
        Some(Value::Int(i)) => Ok(*i),
        Some(other) => Err(mistyped(key, "integer", other)),
        None => Err(missing(key)),
    }
}

pub fn float_field(entity: &Entity, key: &str) -> Result<f64> {
    match entity.get(key) {
        Some(v) => v.as_f64().ok_or_else(|| mistyped(key, "number", v)),
        None => Err(missing(key)),
    }
}

pub fn bool_field(entity: &Entity, key: &str) -> Result<bool> {
    match entity.get(key) {
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(mistyped(key, "boolean", other)),
        None => Err(missing(key)),
    }
}

pub fn timestamp_field(entity: &Entity, key: &str) -> Result<chrono::NaiveDateTime> {
    match entity.get(key) {
        Some(Value::Timestamp(ts)) => Ok(*ts),
        Some(other) => Err(mistyped(key, "timestamp", other)),
        None => Err(missing(key)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DriverError;

    #[test]
    fn test_insertion_order_is_kept() {
        let entity = Entity::new().with("b", 1).with("a", 2).with("c", 3);
        assert_eq!(entity.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut entity = Entity::new().with("b", 1).with("a", 2);
        let old = entity.insert("b", 10);
        assert_eq!(old, Some(Value::Int(1)));
        assert_eq!(entity.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(entity.get("b"), Some(&Value::Int(10)));
    }

    #[test]
    fn test_remove() {
        let mut entity = Entity::new().with("a", 1).with("b", 2).with("c", 3);
        assert_eq!(entity.remove("b"), Some(Value::Int(2)));
        assert_eq!(entity.remove("b"), None);
        assert_eq!(entity.keys().collect::<Vec<_>>(), vec!["a", "c"]);
        assert_eq!(entity.len(), 2);
    }

    #[test]
    fn test_field_readers() {
        let entity = Entity::new().with("name", "acme").with("n", 4).with("ok", true);
        assert_eq!(text_field(&entity, "name").unwrap(), "acme");
        assert_eq!(int_field(&entity, "n").unwrap(), 4);
        assert_eq!(float_field(&entity, "n").unwrap(), 4.0);
        assert!(bool_field(&entity, "ok").unwrap());
        assert!(matches!(text_field(&entity, "n"), Err(DriverError::Decode(_))));
        assert!(matches!(timestamp_field(&entity, "at"), Err(DriverError::Decode(_))));
    }
}
