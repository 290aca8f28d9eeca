use crate::{error::DataProviderError, events::bus::EventBus};
use async_trait::async_trait;
use futures::stream::BoxStream;
use model::{
    capability::{Capability, CapabilityName},
    fetch::{
        keys::{ContainsKeysResults, FetchByKeysParameters, FetchByKeysResults},
        list::{AsyncIteratorResult, FetchListParameters},
        offset::{FetchByOffsetParameters, FetchByOffsetResults},
    },
};

/// Single-pass sequence of pages returned by `fetch_first`.
///
/// The stream ends right after the first result with `done == true`. Pages must
/// be pulled one at a time; the next pull starts only after the previous one
/// resolved.
pub type FetchListStream = BoxStream<'static, Result<AsyncIteratorResult, DataProviderError>>;

/// Answer of [`DataProvider::is_empty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsEmpty {
    Yes,
    No,
    Unknown,
}

/// A capability-queryable, asynchronously iterable collection of keyed rows.
///
/// Only `fetch_first` is mandatory. Keyed and offset access default to
/// [`DataProviderError::CapabilityAbsent`]; wrap such a provider in a
/// layered provider to add iteration-based fallbacks.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Opens a new iteration. Every call is independent of earlier ones.
    fn fetch_first(&self, params: FetchListParameters) -> FetchListStream;

    async fn fetch_by_keys(
        &self,
        _params: FetchByKeysParameters,
    ) -> Result<FetchByKeysResults, DataProviderError> {
        Err(DataProviderError::CapabilityAbsent(
            CapabilityName::FetchByKeys,
        ))
    }

    async fn contains_keys(
        &self,
        params: FetchByKeysParameters,
    ) -> Result<ContainsKeysResults, DataProviderError> {
        Ok(self.fetch_by_keys(params).await?.into())
    }

    async fn fetch_by_offset(
        &self,
        _params: FetchByOffsetParameters,
    ) -> Result<FetchByOffsetResults, DataProviderError> {
        Err(DataProviderError::CapabilityAbsent(
            CapabilityName::FetchByOffset,
        ))
    }

    fn get_capability(&self, name: CapabilityName) -> Option<Capability>;

    /// Total number of rows, `-1` when unknown.
    async fn get_total_size(&self) -> Result<i64, DataProviderError> {
        Ok(-1)
    }

    async fn is_empty(&self) -> Result<IsEmpty, DataProviderError> {
        Ok(IsEmpty::Unknown)
    }

    /// Registry of `refresh` and `mutate` listeners.
    fn events(&self) -> &EventBus;
}
