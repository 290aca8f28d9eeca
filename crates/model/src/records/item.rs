use crate::{core::value::Value, records::row::RowData};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ItemMetadata {
    pub key: Value,
}

/// A row paired with its metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub metadata: ItemMetadata,
    pub data: RowData,
}

impl Item {
    pub fn new(key: Value, data: RowData) -> Self {
        Item {
            metadata: ItemMetadata { key },
            data,
        }
    }

    pub fn key(&self) -> &Value {
        &self.metadata.key
    }
}
