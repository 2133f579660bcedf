//! Output key names and the caller-field collision policy

use super::field::{FieldValue, Fields};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

/// Prefix applied to caller fields whose key collides with a reserved output key
pub const CLASH_PREFIX: &str = "fields.";

/// Keys that renderers write themselves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKey {
    Time,
    Level,
    Msg,
    Prefix,
    Func,
    File,
}

impl FieldKey {
    pub fn default_name(self) -> &'static str {
        match self {
            FieldKey::Time => "time",
            FieldKey::Level => "level",
            FieldKey::Msg => "msg",
            FieldKey::Prefix => "prefix",
            FieldKey::Func => "function",
            FieldKey::File => "file",
        }
    }
}

/// Overrides for the names of reserved keys.
///
/// ```
/// use rust_field_logger::{FieldKey, FieldMap};
///
/// let map = FieldMap::new().with(FieldKey::Time, "@timestamp");
/// assert_eq!(map.resolve(FieldKey::Time), "@timestamp");
/// assert_eq!(map.resolve(FieldKey::Msg), "msg");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap {
    names: HashMap<FieldKey, String>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: FieldKey, name: impl Into<String>) -> Self {
        self.names.insert(key, name.into());
        self
    }

    pub fn resolve(&self, key: FieldKey) -> &str {
        self.names
            .get(&key)
            .map(String::as_str)
            .unwrap_or_else(|| key.default_name())
    }
}

/// Compute the keys a record's fields are rendered under.
///
/// Fields whose key equals the resolved time, level or message key (and the
/// function and file keys when the record carries caller info) are renamed
/// to `fields.<key>`. The prefix is repeated until the name no longer
/// collides with any other field, so no value is ever dropped. Order follows
/// the field map's insertion order.
pub fn resolve_field_clashes<'a>(
    fields: &'a Fields,
    map: &FieldMap,
    has_caller: bool,
) -> Vec<(Cow<'a, str>, &'a FieldValue)> {
    let mut reserved = vec![
        map.resolve(FieldKey::Time),
        map.resolve(FieldKey::Level),
        map.resolve(FieldKey::Msg),
    ];
    if has_caller {
        reserved.push(map.resolve(FieldKey::Func));
        reserved.push(map.resolve(FieldKey::File));
    }

    if !fields.keys().any(|k| reserved.contains(&k)) {
        return fields.iter().map(|(k, v)| (Cow::Borrowed(k), v)).collect();
    }

    let mut taken: HashSet<String> = fields
        .keys()
        .filter(|k| !reserved.contains(k))
        .map(String::from)
        .collect();

    fields
        .iter()
        .map(|(key, value)| {
            if !reserved.contains(&key) {
                return (Cow::Borrowed(key), value);
            }
            let mut renamed = format!("{}{}", CLASH_PREFIX, key);
            while taken.contains(&renamed) || reserved.contains(&renamed.as_str()) {
                renamed.insert_str(0, CLASH_PREFIX);
            }
            taken.insert(renamed.clone());
            (Cow::Owned(renamed), value)
        })
        .collect()
}
