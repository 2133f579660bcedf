//! Structured field values carried by log records

use super::error::{LoggerError, Result};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Kind tag of a [`FieldValue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Str,
    Bytes,
    Int,
    Float,
    Bool,
    Error,
    Strings,
    Opaque,
}

/// Value type for structured logging fields
#[derive(Clone)]
pub enum FieldValue {
    Str(String),
    Bytes(Vec<u8>),
    Int(i64),
    Float(f64),
    Bool(bool),
    Error(Arc<dyn StdError + Send + Sync>),
    Strings(Vec<String>),
    Opaque(Arc<dyn fmt::Display + Send + Sync>),
}

impl FieldValue {
    /// Wrap an error; it renders as its message text.
    pub fn error<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        FieldValue::Error(Arc::new(err))
    }

    /// Wrap any displayable value that has no dedicated variant.
    pub fn opaque<T>(value: T) -> Self
    where
        T: fmt::Display + Send + Sync + 'static,
    {
        FieldValue::Opaque(Arc::new(value))
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Str(_) => FieldKind::Str,
            FieldValue::Bytes(_) => FieldKind::Bytes,
            FieldValue::Int(_) => FieldKind::Int,
            FieldValue::Float(_) => FieldKind::Float,
            FieldValue::Bool(_) => FieldKind::Bool,
            FieldValue::Error(_) => FieldKind::Error,
            FieldValue::Strings(_) => FieldKind::Strings,
            FieldValue::Opaque(_) => FieldKind::Opaque,
        }
    }

    /// Whether text renderers apply the quoting rule to this value.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            FieldValue::Str(_) | FieldValue::Bytes(_) | FieldValue::Error(_)
        )
    }

    /// Convert to serde_json::Value for JSON serialization
    pub fn to_json_value(&self, key: &str) -> Result<serde_json::Value> {
        Ok(match self {
            FieldValue::Str(s) => serde_json::Value::String(s.clone()),
            FieldValue::Bytes(b) => serde_json::Value::String(String::from_utf8_lossy(b).into_owned()),
            FieldValue::Int(i) => serde_json::Value::Number((*i).into()),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .ok_or_else(|| {
                    LoggerError::formatter("json", format!("field '{}' is not a finite number", key))
                })?,
            FieldValue::Bool(b) => serde_json::Value::Bool(*b),
            FieldValue::Error(e) => serde_json::Value::String(e.to_string()),
            FieldValue::Strings(list) => serde_json::Value::Array(
                list.iter().cloned().map(serde_json::Value::String).collect(),
            ),
            FieldValue::Opaque(v) => serde_json::Value::String(v.to_string()),
        })
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => f.write_str(s),
            FieldValue::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Float(fl) => write!(f, "{}", fl),
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Error(e) => write!(f, "{}", e),
            FieldValue::Strings(list) => write!(f, "[{}]", list.join(" ")),
            FieldValue::Opaque(v) => write!(f, "{}", v),
        }
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => f.debug_tuple("Str").field(s).finish(),
            FieldValue::Bytes(b) => f.debug_tuple("Bytes").field(b).finish(),
            FieldValue::Int(i) => f.debug_tuple("Int").field(i).finish(),
            FieldValue::Float(fl) => f.debug_tuple("Float").field(fl).finish(),
            FieldValue::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            FieldValue::Error(e) => f.debug_tuple("Error").field(&e.to_string()).finish(),
            FieldValue::Strings(list) => f.debug_tuple("Strings").field(list).finish(),
            FieldValue::Opaque(v) => f.debug_tuple("Opaque").field(&v.to_string()).finish(),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(b: Vec<u8>) -> Self {
        FieldValue::Bytes(b)
    }
}

impl From<&[u8]> for FieldValue {
    fn from(b: &[u8]) -> Self {
        FieldValue::Bytes(b.to_vec())
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FieldValue {
                fn from(i: $t) -> Self {
                    FieldValue::Int(i64::from(i))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

// Wider integers stay numeric when they fit in an `i64`; larger values keep
// their exact decimal text.
macro_rules! impl_from_wide_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for FieldValue {
                fn from(i: $t) -> Self {
                    match i64::try_from(i) {
                        Ok(n) => FieldValue::Int(n),
                        Err(_) => FieldValue::Str(i.to_string()),
                    }
                }
            }
        )*
    };
}

impl_from_wide_int!(u64, usize, isize, i128, u128);

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<f32> for FieldValue {
    fn from(f: f32) -> Self {
        FieldValue::Float(f64::from(f))
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(list: Vec<String>) -> Self {
        FieldValue::Strings(list)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(list: Vec<&str>) -> Self {
        FieldValue::Strings(list.into_iter().map(String::from).collect())
    }
}

/// One key/value pair
#[derive(Debug, Clone)]
pub struct Field {
    pub key: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new(key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Field map with unique keys that remembers insertion order.
///
/// Inserting an existing key replaces its value in place, so iteration order
/// only depends on the order keys were first seen.
#[derive(Debug, Clone, Default)]
pub struct Fields {
    entries: Vec<(String, FieldValue)>,
}

impl Fields {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Add a field (builder style)
    #[must_use]
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        self.insert(key, value);
        self
    }

    /// Insert or replace a field, returning the previous value
    pub fn insert<K, V>(&mut self, key: K, value: V) -> Option<FieldValue>
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Insert only if the key is absent
    pub fn insert_missing<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let key = key.into();
        if !self.contains_key(&key) {
            self.entries.push((key, value.into()));
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove all fields, keeping the allocation
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copy every field of `other` into `self`, replacing existing keys
    pub fn merge(&mut self, other: &Fields) {
        for (key, value) in other.iter() {
            self.insert(key, value.clone());
        }
    }
}

impl FromIterator<Field> for Fields {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for field in iter {
            fields.insert(field.key, field.value);
        }
        fields
    }
}

impl<K, V> FromIterator<(K, V)> for Fields
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (key, value) in iter {
            fields.insert(key, value);
        }
        fields
    }
}

impl IntoIterator for Fields {
    type Item = (String, FieldValue);
    type IntoIter = std::vec::IntoIter<(String, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_tags() {
        assert_eq!(FieldValue::from("x").kind(), FieldKind::Str);
        assert_eq!(FieldValue::from(b"x".as_slice()).kind(), FieldKind::Bytes);
        assert_eq!(FieldValue::from(503).kind(), FieldKind::Int);
        assert_eq!(FieldValue::from(0.5).kind(), FieldKind::Float);
        assert_eq!(FieldValue::from(true).kind(), FieldKind::Bool);
        assert_eq!(FieldValue::from(vec!["a", "b"]).kind(), FieldKind::Strings);
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert_eq!(FieldValue::error(io).kind(), FieldKind::Error);
        assert_eq!(FieldValue::opaque('c').kind(), FieldKind::Opaque);
    }

    #[test]
    fn test_generic_text_conversion() {
        assert_eq!(FieldValue::from(vec!["a", "b", "c"]).to_string(), "[a b c]");
        assert_eq!(FieldValue::from(b"raw".to_vec()).to_string(), "raw");
        assert_eq!(FieldValue::from(-7).to_string(), "-7");
        assert_eq!(FieldValue::from(false).to_string(), "false");
    }

    #[test]
    fn test_wide_integers() {
        assert!(matches!(FieldValue::from(42_usize), FieldValue::Int(42)));
        assert!(matches!(FieldValue::from(7_u64), FieldValue::Int(7)));
        assert!(matches!(FieldValue::from(-3_i128), FieldValue::Int(-3)));

        let huge = FieldValue::from(u64::MAX);
        assert_eq!(huge.kind(), FieldKind::Str);
        assert_eq!(huge.to_string(), "18446744073709551615");
    }

    #[test]
    fn test_fields_insert_replaces_in_place() {
        let mut fields = Fields::new().with("b", 1).with("a", 2);
        let previous = fields.insert("b", 3);

        assert!(matches!(previous, Some(FieldValue::Int(1))));
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert!(matches!(fields.get("b"), Some(FieldValue::Int(3))));
    }

    #[test]
    fn test_fields_insert_missing() {
        let mut fields = Fields::new().with("type", "audit");
        fields.insert_missing("type", "log");
        fields.insert_missing("@version", "1");

        assert_eq!(fields.get("type").map(|v| v.to_string()), Some("audit".to_string()));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_fields_remove_and_clear() {
        let mut fields: Fields = vec![("a", 1), ("b", 2)].into_iter().collect();
        assert!(fields.remove("a").is_some());
        assert!(fields.remove("a").is_none());
        fields.clear();
        assert!(fields.is_empty());
    }

    #[test]
    fn test_json_rejects_non_finite_float() {
        assert!(FieldValue::Float(f64::NAN).to_json_value("ratio").is_err());
        assert_eq!(
            FieldValue::from(vec!["x"]).to_json_value("tags").unwrap(),
            serde_json::json!(["x"])
        );
    }
}
