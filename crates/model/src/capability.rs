use crate::query::filter::FilterOp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Names of the capabilities a provider can be asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CapabilityName {
    FetchByKeys,
    FetchByOffset,
    FetchFirst,
    Sort,
    Filter,
}

impl fmt::Display for CapabilityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CapabilityName::FetchByKeys => "fetchByKeys",
            CapabilityName::FetchByOffset => "fetchByOffset",
            CapabilityName::FetchFirst => "fetchFirst",
            CapabilityName::Sort => "sort",
            CapabilityName::Filter => "filter",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KeysImplementation {
    Iteration,
    Lookup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OffsetImplementation {
    Iteration,
    RandomAccess,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortAttributes {
    None,
    Single,
    Multiple,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IterateAfterDone {
    #[default]
    Allowed,
    NotAllowed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCapability {
    pub operators: Vec<FilterOp>,
    pub text_filter: bool,
}

impl FilterCapability {
    /// Every attribute operator plus text filtering.
    pub fn full() -> Self {
        FilterCapability {
            operators: FilterOp::ALL.to_vec(),
            text_filter: true,
        }
    }
}

/// Descriptor returned by `get_capability`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capability {
    FetchByKeys { implementation: KeysImplementation },
    FetchByOffset { implementation: OffsetImplementation },
    FetchFirst { iterate_after_done: IterateAfterDone },
    Sort { attributes: SortAttributes },
    Filter(FilterCapability),
}

impl Capability {
    pub fn name(&self) -> CapabilityName {
        match self {
            Capability::FetchByKeys { .. } => CapabilityName::FetchByKeys,
            Capability::FetchByOffset { .. } => CapabilityName::FetchByOffset,
            Capability::FetchFirst { .. } => CapabilityName::FetchFirst,
            Capability::Sort { .. } => CapabilityName::Sort,
            Capability::Filter(_) => CapabilityName::Filter,
        }
    }
}
