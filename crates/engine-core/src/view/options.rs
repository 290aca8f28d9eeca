use super::mapping::{DataMapping, IdentityMapping};
use model::{
    core::value::Value,
    query::{attributes::FetchAttribute, filter::FilterExpr, sort::SortCriterion},
};
use std::sync::Arc;

/// Configuration of a [`ListDataProviderView`](super::ListDataProviderView).
///
/// `from` is resolved first; `offset` then counts rows after it. Request
/// parameters win over `sort_criteria`, `filter_criterion` and `attributes`
/// when both are present.
#[derive(Clone, Default)]
pub struct ViewOptions {
    pub from: Option<Value>,
    pub offset: usize,
    pub sort_criteria: Option<Vec<SortCriterion>>,
    pub data_mapping: Option<Arc<dyn DataMapping>>,
    pub attributes: Option<Vec<FetchAttribute>>,
    pub filter_criterion: Option<FilterExpr>,
}

impl ViewOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_key(mut self, key: impl Into<Value>) -> Self {
        self.from = Some(key.into());
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_sort_criteria(mut self, criteria: Vec<SortCriterion>) -> Self {
        self.sort_criteria = Some(criteria);
        self
    }

    pub fn with_data_mapping(mut self, mapping: impl DataMapping + 'static) -> Self {
        self.data_mapping = Some(Arc::new(mapping));
        self
    }

    pub fn with_attributes(mut self, attributes: Vec<FetchAttribute>) -> Self {
        self.attributes = Some(attributes);
        self
    }

    pub fn with_filter_criterion(mut self, filter: FilterExpr) -> Self {
        self.filter_criterion = Some(filter);
        self
    }

    /// The configured mapping, identity when none is set.
    pub fn mapping(&self) -> Arc<dyn DataMapping> {
        self.data_mapping
            .clone()
            .unwrap_or_else(|| Arc::new(IdentityMapping))
    }

    /// Offset-seek applies when there is an offset but no `from` key.
    pub(crate) fn seeks_by_offset(&self) -> bool {
        self.from.is_none() && self.offset > 0
    }
}

impl std::fmt::Debug for ViewOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewOptions")
            .field("from", &self.from)
            .field("offset", &self.offset)
            .field("sort_criteria", &self.sort_criteria)
            .field("data_mapping", &self.data_mapping.is_some())
            .field("attributes", &self.attributes)
            .field("filter_criterion", &self.filter_criterion)
            .finish()
    }
}
