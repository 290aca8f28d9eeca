use crate::{
    core::{key::KeySet, value::Value},
    query::attributes::FetchAttribute,
    records::item::Item,
};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchByKeysParameters {
    pub keys: KeySet,
    pub attributes: Option<Vec<FetchAttribute>>,
}

impl FetchByKeysParameters {
    pub fn new(keys: KeySet) -> Self {
        FetchByKeysParameters {
            keys,
            attributes: None,
        }
    }

    pub fn with_attributes(mut self, attributes: Vec<FetchAttribute>) -> Self {
        self.attributes = Some(attributes);
        self
    }
}

/// Found rows by key. Keys that were not found are absent.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchByKeysResults {
    pub fetch_parameters: FetchByKeysParameters,
    pub results: HashMap<Value, Item>,
}

impl FetchByKeysResults {
    pub fn keys(&self) -> HashSet<Value> {
        self.results.keys().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContainsKeysResults {
    pub contains_parameters: FetchByKeysParameters,
    pub results: HashSet<Value>,
}

impl From<FetchByKeysResults> for ContainsKeysResults {
    fn from(found: FetchByKeysResults) -> Self {
        let results = found.keys();
        ContainsKeysResults {
            contains_parameters: found.fetch_parameters,
            results,
        }
    }
}
