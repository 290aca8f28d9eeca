use crate::{
    fetch::list::FetchListParameters,
    query::{attributes::FetchAttribute, filter::FilterExpr, sort::SortCriterion},
    records::item::Item,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchByOffsetParameters {
    pub offset: usize,
    pub size: usize,
    pub sort_criteria: Option<Vec<SortCriterion>>,
    pub filter_criterion: Option<FilterExpr>,
    pub attributes: Option<Vec<FetchAttribute>>,
}

impl FetchByOffsetParameters {
    pub fn new(offset: usize, size: usize) -> Self {
        FetchByOffsetParameters {
            offset,
            size,
            ..Default::default()
        }
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

    /// The iteration parameters equivalent to this window, without the offset.
    pub fn to_list_parameters(&self, page_size: usize) -> FetchListParameters {
        FetchListParameters {
            size: Some(page_size),
            sort_criteria: self.sort_criteria.clone(),
            filter_criterion: self.filter_criterion.clone(),
            attributes: self.attributes.clone(),
        }
    }
}

/// A window of rows. `done` is true when the source was exhausted, which is
/// not the same as `results.len() == size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchByOffsetResults {
    pub fetch_parameters: FetchByOffsetParameters,
    pub results: Vec<Item>,
    pub done: bool,
}
