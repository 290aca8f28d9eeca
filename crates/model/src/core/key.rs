use crate::{core::value::Value, records::item::Item};
use std::collections::HashSet;

/// Set of row keys as passed to keyed lookups.
pub type KeySet = HashSet<Value>;

/// Returns true when both keys identify the same row.
pub fn keys_equal(a: &Value, b: &Value) -> bool {
    a == b
}

/// Position of the item carrying `key`, if any.
pub fn index_of_key(items: &[Item], key: &Value) -> Option<usize> {
    items
        .iter()
        .position(|item| keys_equal(&item.metadata.key, key))
}

/// Builds a key set from anything convertible into values.
pub fn key_set<I, V>(keys: I) -> KeySet
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    keys.into_iter().map(Into::into).collect()
}
