use super::limit_reached;
use async_trait::async_trait;
use connectors::{error::DataProviderError, provider::DataProvider};
use engine_config::settings::FetchSettings;
use futures::StreamExt;
use model::{
    capability::{Capability, KeysImplementation},
    fetch::{
        keys::{ContainsKeysResults, FetchByKeysParameters, FetchByKeysResults},
        list::{DEFAULT_PAGE_SIZE, FetchListParameters},
    },
};
use std::collections::HashMap;
use tracing::debug;

/// Keyed access implemented on top of some host provider.
#[async_trait]
pub trait FetchByKeysStrategy: Send + Sync {
    async fn fetch_by_keys(
        &self,
        host: &dyn DataProvider,
        params: FetchByKeysParameters,
    ) -> Result<FetchByKeysResults, DataProviderError>;

    async fn contains_keys(
        &self,
        host: &dyn DataProvider,
        params: FetchByKeysParameters,
    ) -> Result<ContainsKeysResults, DataProviderError> {
        Ok(self.fetch_by_keys(host, params).await?.into())
    }

    fn capability(&self) -> Capability;
}

/// Finds keys by scanning the host's `fetch_first` iteration page by page.
///
/// The scan stops as soon as every requested key was seen, the iteration is
/// exhausted, or `iteration_limit` rows were read. Keys that were not reached
/// are simply missing from the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchByKeysIteration {
    page_size: usize,
    iteration_limit: Option<usize>,
}

impl Default for FetchByKeysIteration {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            iteration_limit: None,
        }
    }
}

impl FetchByKeysIteration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &FetchSettings) -> Self {
        Self {
            page_size: settings.page_size.max(1),
            iteration_limit: settings.iteration_limit,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_iteration_limit(mut self, limit: usize) -> Self {
        self.iteration_limit = Some(limit);
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }
}

#[async_trait]
impl FetchByKeysStrategy for FetchByKeysIteration {
    async fn fetch_by_keys(
        &self,
        host: &dyn DataProvider,
        params: FetchByKeysParameters,
    ) -> Result<FetchByKeysResults, DataProviderError> {
        let mut remaining = params.keys.clone();
        let mut results = HashMap::with_capacity(remaining.len());

        if remaining.is_empty() {
            return Ok(FetchByKeysResults {
                fetch_parameters: params,
                results,
            });
        }

        let list_params = FetchListParameters {
            size: Some(self.page_size),
            attributes: params.attributes.clone(),
            ..Default::default()
        };
        let mut pages = host.fetch_first(list_params);
        let mut fetched = 0usize;

        while let Some(step) = pages.next().await {
            let step = step?;
            let done = step.done;

            for item in step.value.into_items() {
                fetched += 1;
                if remaining.remove(item.key()) {
                    results.insert(item.key().clone(), item);
                }
            }

            debug!(
                fetched,
                found = results.len(),
                remaining = remaining.len(),
                done,
                "Scanned page for keys"
            );

            if remaining.is_empty() || done || limit_reached(self.iteration_limit, fetched) {
                break;
            }
        }

        Ok(FetchByKeysResults {
            fetch_parameters: params,
            results,
        })
    }

    fn capability(&self) -> Capability {
        Capability::FetchByKeys {
            implementation: KeysImplementation::Iteration,
        }
    }
}
