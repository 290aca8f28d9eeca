use connectors::provider::DataProvider;
use model::{
    capability::{
        Capability, CapabilityName, FilterCapability, KeysImplementation, OffsetImplementation,
        SortAttributes,
    },
    query::filter::FilterExpr,
};

/// What a wrapped provider can do natively, probed once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BaseCapabilities {
    pub fetch_by_keys: Option<KeysImplementation>,
    pub fetch_by_offset: Option<OffsetImplementation>,
    pub sort: Option<SortAttributes>,
    pub filter: Option<FilterCapability>,
}

impl BaseCapabilities {
    pub fn probe(provider: &dyn DataProvider) -> Self {
        let mut caps = Self::default();

        if let Some(Capability::FetchByKeys { implementation }) =
            provider.get_capability(CapabilityName::FetchByKeys)
        {
            caps.fetch_by_keys = Some(implementation);
        }
        if let Some(Capability::FetchByOffset { implementation }) =
            provider.get_capability(CapabilityName::FetchByOffset)
        {
            caps.fetch_by_offset = Some(implementation);
        }
        if let Some(Capability::Sort { attributes }) = provider.get_capability(CapabilityName::Sort)
        {
            caps.sort = Some(attributes);
        }
        if let Some(Capability::Filter(filter)) = provider.get_capability(CapabilityName::Filter) {
            caps.filter = Some(filter);
        }

        caps
    }

    pub fn has_key_lookup(&self) -> bool {
        self.fetch_by_keys == Some(KeysImplementation::Lookup)
    }

    /// True when the provider can evaluate the whole expression itself.
    pub fn filters_natively(&self, filter: &FilterExpr) -> bool {
        let Some(capability) = &self.filter else {
            return false;
        };
        if contains_text(filter) && !capability.text_filter {
            return false;
        }
        filter
            .operators()
            .iter()
            .all(|op| capability.operators.contains(op))
    }
}

fn contains_text(filter: &FilterExpr) -> bool {
    match filter {
        FilterExpr::Text { .. } => true,
        FilterExpr::Compound { criteria, .. } => criteria.iter().any(contains_text),
        FilterExpr::Attribute { .. } => false,
    }
}
