use crate::{
    query::{attributes::FetchAttribute, filter::FilterExpr, sort::SortCriterion},
    records::{
        item::{Item, ItemMetadata},
        row::RowData,
    },
};
use serde::{Deserialize, Serialize};

/// Page size used when neither the caller nor the configuration picks one.
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Parameters of a `fetch_first` iteration.
///
/// `size` bounds the rows returned by one iteration step; `None` means the
/// source default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchListParameters {
    pub size: Option<usize>,
    pub sort_criteria: Option<Vec<SortCriterion>>,
    pub filter_criterion: Option<FilterExpr>,
    pub attributes: Option<Vec<FetchAttribute>>,
}

impl FetchListParameters {
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_sort_criteria(mut self, sort_criteria: Vec<SortCriterion>) -> Self {
        self.sort_criteria = Some(sort_criteria);
        self
    }

    pub fn with_filter_criterion(mut self, filter: FilterExpr) -> Self {
        self.filter_criterion = Some(filter);
        self
    }

    pub fn with_attributes(mut self, attributes: Vec<FetchAttribute>) -> Self {
        self.attributes = Some(attributes);
        self
    }
}

/// One page of an iteration. `data[i]` belongs to `metadata[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchListResult {
    pub fetch_parameters: FetchListParameters,
    data: Vec<RowData>,
    metadata: Vec<ItemMetadata>,
}

impl FetchListResult {
    pub fn new(fetch_parameters: FetchListParameters, items: Vec<Item>) -> Self {
        let (metadata, data) = items.into_iter().map(|i| (i.metadata, i.data)).unzip();
        FetchListResult {
            fetch_parameters,
            data,
            metadata,
        }
    }

    pub fn empty(fetch_parameters: FetchListParameters) -> Self {
        Self::new(fetch_parameters, Vec::new())
    }

    pub fn data(&self) -> &[RowData] {
        &self.data
    }

    pub fn metadata(&self) -> &[ItemMetadata] {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &crate::core::value::Value> {
        self.metadata.iter().map(|m| &m.key)
    }

    pub fn into_items(self) -> Vec<Item> {
        self.metadata
            .into_iter()
            .zip(self.data)
            .map(|(metadata, data)| Item { metadata, data })
            .collect()
    }
}

/// A step of an asynchronous iteration.
///
/// A `done` result is terminal and may still carry trailing rows; the stream
/// ends right after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsyncIteratorResult {
    pub done: bool,
    pub value: FetchListResult,
}

impl AsyncIteratorResult {
    pub fn next(value: FetchListResult) -> Self {
        AsyncIteratorResult { done: false, value }
    }

    pub fn done(value: FetchListResult) -> Self {
        AsyncIteratorResult { done: true, value }
    }
}
