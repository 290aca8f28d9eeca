use super::{FetchByKeysStrategy, FetchByOffsetStrategy};
use async_trait::async_trait;
use connectors::{
    error::DataProviderError,
    events::bus::EventBus,
    provider::{DataProvider, FetchListStream, IsEmpty},
};
use model::{
    capability::{Capability, CapabilityName},
    fetch::{
        keys::{ContainsKeysResults, FetchByKeysParameters, FetchByKeysResults},
        list::FetchListParameters,
        offset::{FetchByOffsetParameters, FetchByOffsetResults},
    },
};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
enum Layer {
    Keys(Arc<dyn FetchByKeysStrategy>),
    Offset(Arc<dyn FetchByOffsetStrategy>),
}

impl Layer {
    fn answers(&self, name: CapabilityName) -> Option<Capability> {
        match (self, name) {
            (Layer::Keys(strategy), CapabilityName::FetchByKeys) => Some(strategy.capability()),
            (Layer::Offset(strategy), CapabilityName::FetchByOffset) => {
                Some(strategy.capability())
            }
            _ => None,
        }
    }
}

/// A provider with capability strategies stacked over an inner provider.
///
/// Layers are kept in the order they were added. Every lookup walks them from
/// the most recently added one down and falls back to the inner provider when
/// no layer handles the operation.
#[derive(Clone)]
pub struct LayeredDataProvider {
    inner: Arc<dyn DataProvider>,
    layers: Vec<Layer>,
}

impl LayeredDataProvider {
    pub fn new(inner: Arc<dyn DataProvider>) -> Self {
        Self {
            inner,
            layers: Vec::new(),
        }
    }

    pub fn with_fetch_by_keys(mut self, strategy: impl FetchByKeysStrategy + 'static) -> Self {
        self.layers.push(Layer::Keys(Arc::new(strategy)));
        self
    }

    pub fn with_fetch_by_offset(mut self, strategy: impl FetchByOffsetStrategy + 'static) -> Self {
        self.layers.push(Layer::Offset(Arc::new(strategy)));
        self
    }

    pub fn inner(&self) -> &Arc<dyn DataProvider> {
        &self.inner
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    fn keys_strategy(&self) -> Option<Arc<dyn FetchByKeysStrategy>> {
        self.layers.iter().rev().find_map(|layer| match layer {
            Layer::Keys(strategy) => Some(strategy.clone()),
            Layer::Offset(_) => None,
        })
    }

    fn offset_strategy(&self) -> Option<Arc<dyn FetchByOffsetStrategy>> {
        self.layers.iter().rev().find_map(|layer| match layer {
            Layer::Offset(strategy) => Some(strategy.clone()),
            Layer::Keys(_) => None,
        })
    }
}

#[async_trait]
impl DataProvider for LayeredDataProvider {
    fn fetch_first(&self, params: FetchListParameters) -> FetchListStream {
        self.inner.fetch_first(params)
    }

    async fn fetch_by_keys(
        &self,
        params: FetchByKeysParameters,
    ) -> Result<FetchByKeysResults, DataProviderError> {
        match self.keys_strategy() {
            Some(strategy) => strategy.fetch_by_keys(self, params).await,
            None => self.inner.fetch_by_keys(params).await,
        }
    }

    async fn contains_keys(
        &self,
        params: FetchByKeysParameters,
    ) -> Result<ContainsKeysResults, DataProviderError> {
        match self.keys_strategy() {
            Some(strategy) => strategy.contains_keys(self, params).await,
            None => self.inner.contains_keys(params).await,
        }
    }

    async fn fetch_by_offset(
        &self,
        params: FetchByOffsetParameters,
    ) -> Result<FetchByOffsetResults, DataProviderError> {
        match self.offset_strategy() {
            Some(strategy) => strategy.fetch_by_offset(self, params).await,
            None => self.inner.fetch_by_offset(params).await,
        }
    }

    fn get_capability(&self, name: CapabilityName) -> Option<Capability> {
        let answer = self.layers.iter().rev().find_map(|layer| layer.answers(name));
        if answer.is_some() {
            debug!(capability = %name, "Capability answered by layer");
            return answer;
        }
        self.inner.get_capability(name)
    }

    async fn get_total_size(&self) -> Result<i64, DataProviderError> {
        self.inner.get_total_size().await
    }

    async fn is_empty(&self) -> Result<IsEmpty, DataProviderError> {
        self.inner.is_empty().await
    }

    fn events(&self) -> &EventBus {
        self.inner.events()
    }
}
