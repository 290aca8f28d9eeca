use super::limit_reached;
use async_trait::async_trait;
use connectors::{error::DataProviderError, provider::DataProvider};
use engine_config::settings::FetchSettings;
use futures::StreamExt;
use model::{
    capability::{Capability, OffsetImplementation},
    fetch::{
        list::DEFAULT_PAGE_SIZE,
        offset::{FetchByOffsetParameters, FetchByOffsetResults},
    },
};
use tracing::debug;

/// Offset access implemented on top of some host provider.
#[async_trait]
pub trait FetchByOffsetStrategy: Send + Sync {
    async fn fetch_by_offset(
        &self,
        host: &dyn DataProvider,
        params: FetchByOffsetParameters,
    ) -> Result<FetchByOffsetResults, DataProviderError>;

    fn capability(&self) -> Capability;
}

/// Reads the window `[offset, offset + size)` by skipping through the host's
/// `fetch_first` iteration.
///
/// `done` in the result means the host iteration was exhausted. A short
/// window with `done == false` only happens when the iteration limit cut the
/// scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchByOffsetIteration {
    page_size: usize,
    iteration_limit: Option<usize>,
}

impl Default for FetchByOffsetIteration {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            iteration_limit: None,
        }
    }
}

impl FetchByOffsetIteration {
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
}

#[async_trait]
impl FetchByOffsetStrategy for FetchByOffsetIteration {
    async fn fetch_by_offset(
        &self,
        host: &dyn DataProvider,
        params: FetchByOffsetParameters,
    ) -> Result<FetchByOffsetResults, DataProviderError> {
        let mut results = Vec::with_capacity(params.size.min(self.page_size));

        if params.size == 0 {
            return Ok(FetchByOffsetResults {
                fetch_parameters: params,
                results,
                done: false,
            });
        }

        let mut pages = host.fetch_first(params.to_list_parameters(self.page_size));
        let mut fetched = 0usize;

        let done = loop {
            let Some(step) = pages.next().await else {
                break true;
            };
            let step = step?;
            let done = step.done;

            let page = step.value.into_items();
            let page_len = page.len();

            if fetched + page_len > params.offset {
                let skip = params.offset.saturating_sub(fetched);
                let room = params.size - results.len();
                results.extend(page.into_iter().skip(skip).take(room));
            }
            fetched += page_len;

            debug!(
                fetched,
                collected = results.len(),
                offset = params.offset,
                size = params.size,
                done,
                "Scanned page for offset window"
            );

            if results.len() >= params.size || done || limit_reached(self.iteration_limit, fetched)
            {
                break done;
            }
        };

        Ok(FetchByOffsetResults {
            fetch_parameters: params,
            results,
            done,
        })
    }

    fn capability(&self) -> Capability {
        Capability::FetchByOffset {
            implementation: OffsetImplementation::Iteration,
        }
    }
}
