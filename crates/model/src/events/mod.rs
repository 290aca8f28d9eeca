use crate::{
    core::value::Value,
    error::ModelError,
    records::{item::ItemMetadata, row::RowData},
};
use std::collections::HashSet;

/// Kinds of events a provider dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    Refresh,
    Mutate,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Refresh => "refresh",
            EventType::Mutate => "mutate",
        }
    }
}

/// Emitted when the whole data set must be considered stale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshDetail {
    /// Set when the refresh is caused by a reset of the source.
    pub disregard_after_key: Option<Value>,
}

/// Where added rows go: after or before existing keys.
#[derive(Debug, Clone, PartialEq)]
pub enum AddPosition {
    AfterKeys(Vec<Value>),
    BeforeKeys(Vec<Option<Value>>),
}

/// One operation of a mutation event. `keys` is an ordered set: `data`,
/// `metadata` and `indexes` line up with it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationOperation {
    pub keys: Vec<Value>,
    pub data: Option<Vec<RowData>>,
    pub metadata: Option<Vec<ItemMetadata>>,
    pub indexes: Option<Vec<usize>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddOperation {
    pub operation: MutationOperation,
    pub position: Option<AddPosition>,
}

/// Rows added, removed or updated in one go.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationDetail {
    pub add: Option<AddOperation>,
    pub remove: Option<MutationOperation>,
    pub update: Option<MutationOperation>,
}

impl MutationDetail {
    /// Checks that keys are unique across operations and that indexes, when
    /// present, are strictly increasing.
    pub fn validate(&self) -> Result<(), ModelError> {
        let operations = [
            ("add", self.add.as_ref().map(|a| &a.operation)),
            ("remove", self.remove.as_ref()),
            ("update", self.update.as_ref()),
        ];

        let mut seen: HashSet<&Value> = HashSet::new();
        for (name, op) in operations {
            let Some(op) = op else { continue };

            for key in &op.keys {
                if !seen.insert(key) {
                    return Err(ModelError::InvalidMutation(format!(
                        "Key {key} appears more than once (in '{name}')"
                    )));
                }
            }

            if let Some(indexes) = &op.indexes {
                if indexes.windows(2).any(|w| w[0] >= w[1]) {
                    return Err(ModelError::InvalidMutation(format!(
                        "Indexes of '{name}' must be strictly increasing"
                    )));
                }
                if indexes.len() != op.keys.len() {
                    return Err(ModelError::InvalidMutation(format!(
                        "'{name}' has {} indexes for {} keys",
                        indexes.len(),
                        op.keys.len()
                    )));
                }
            }
        }

        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.add.is_none() && self.remove.is_none() && self.update.is_none()
    }
}

/// An event dispatched by a provider.
#[derive(Debug, Clone, PartialEq)]
pub enum DataProviderEvent {
    Refresh(RefreshDetail),
    Mutate(MutationDetail),
}

impl DataProviderEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            DataProviderEvent::Refresh(_) => EventType::Refresh,
            DataProviderEvent::Mutate(_) => EventType::Mutate,
        }
    }
}
