use async_trait::async_trait;
use connectors::{
    error::DataProviderError,
    events::bus::EventBus,
    provider::{DataProvider, FetchListStream},
};
use futures::{StreamExt, TryStreamExt, stream};
use model::{
    capability::{Capability, CapabilityName, IterateAfterDone, OffsetImplementation},
    core::value::Value,
    fetch::{
        list::{AsyncIteratorResult, FetchListParameters, FetchListResult},
        offset::{FetchByOffsetParameters, FetchByOffsetResults},
    },
    records::{item::Item, row::RowData},
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tracing::debug;

/// Call counters shared between a [`CountingProvider`] and the test.
#[derive(Debug, Default)]
pub struct Counters {
    pub fetch_first: AtomicUsize,
    pub pages: AtomicUsize,
    pub fetch_by_offset: AtomicUsize,
}

impl Counters {
    pub fn fetch_first(&self) -> usize {
        self.fetch_first.load(Ordering::SeqCst)
    }

    pub fn pages(&self) -> usize {
        self.pages.load(Ordering::SeqCst)
    }

    pub fn fetch_by_offset(&self) -> usize {
        self.fetch_by_offset.load(Ordering::SeqCst)
    }
}

/// A raw source: iterates rows in insertion order and ignores sort, filter
/// and attributes. Offset access is available only when enabled.
pub struct CountingProvider {
    rows: Arc<Vec<Item>>,
    page_size: usize,
    native_offset: bool,
    fail_at: Option<usize>,
    pub counters: Arc<Counters>,
    events: EventBus,
}

impl CountingProvider {
    pub fn new(n: i64, page_size: usize) -> Self {
        Self {
            rows: Arc::new(
                (1..=n)
                    .map(|i| Item::new(Value::from(i), row(i)))
                    .collect(),
            ),
            page_size,
            native_offset: false,
            fail_at: None,
            counters: Arc::new(Counters::default()),
            events: EventBus::new(),
        }
    }

    pub fn with_native_offset(mut self) -> Self {
        self.native_offset = true;
        self
    }

    /// Fails the `page`-th read (1-based) of every iteration, and every
    /// `fetch_by_offset` call from the `page`-th on, with an upstream error.
    pub fn failing_at(mut self, page: usize) -> Self {
        self.fail_at = Some(page);
        self
    }
}

pub fn upstream_failure(page: usize) -> String {
    format!("page {page} unavailable")
}

#[async_trait]
impl DataProvider for CountingProvider {
    fn fetch_first(&self, params: FetchListParameters) -> FetchListStream {
        self.counters.fetch_first.fetch_add(1, Ordering::SeqCst);

        let page_size = params.size.unwrap_or(self.page_size).max(1);
        let rows = self.rows.clone();
        let counters = self.counters.clone();
        let fail_at = self.fail_at;

        stream::unfold(Some((0usize, 1usize)), move |state| {
            let rows = rows.clone();
            let counters = counters.clone();
            let params = params.clone();
            async move {
                let (start, page) = state?;
                counters.pages.fetch_add(1, Ordering::SeqCst);
                if fail_at == Some(page) {
                    debug!(page, "Counting provider failing page");
                    return Some((
                        Err(DataProviderError::Upstream(upstream_failure(page))),
                        None,
                    ));
                }

                let end = (start + page_size).min(rows.len());
                debug!(start, end, "Counting provider page");

                let done = end >= rows.len();
                let value = FetchListResult::new(params, rows[start..end].to_vec());
                let step = AsyncIteratorResult { done, value };
                Some((Ok(step), if done { None } else { Some((end, page + 1)) }))
            }
        })
        .boxed()
    }

    async fn fetch_by_offset(
        &self,
        params: FetchByOffsetParameters,
    ) -> Result<FetchByOffsetResults, DataProviderError> {
        if !self.native_offset {
            return Err(DataProviderError::CapabilityAbsent(
                CapabilityName::FetchByOffset,
            ));
        }
        let call = self.counters.fetch_by_offset.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_at.is_some_and(|page| call >= page) {
            return Err(DataProviderError::Upstream(upstream_failure(call)));
        }

        let results = self
            .rows
            .iter()
            .skip(params.offset)
            .take(params.size)
            .cloned()
            .collect();
        let done = params.offset.saturating_add(params.size) >= self.rows.len();
        Ok(FetchByOffsetResults {
            fetch_parameters: params,
            results,
            done,
        })
    }

    fn get_capability(&self, name: CapabilityName) -> Option<Capability> {
        match name {
            CapabilityName::FetchFirst => Some(Capability::FetchFirst {
                iterate_after_done: IterateAfterDone::NotAllowed,
            }),
            CapabilityName::FetchByOffset if self.native_offset => {
                Some(Capability::FetchByOffset {
                    implementation: OffsetImplementation::RandomAccess,
                })
            }
            _ => None,
        }
    }

    fn events(&self) -> &EventBus {
        &self.events
    }
}

pub fn row(i: i64) -> RowData {
    RowData::from_pairs([
        ("id", Value::from(i)),
        ("name", Value::from(format!("row-{i}"))),
        ("group", Value::from(i % 3)),
    ])
}

pub fn rows(n: i64) -> Vec<RowData> {
    (1..=n).map(row).collect()
}

pub fn keys(ids: &[i64]) -> Vec<Value> {
    ids.iter().map(|i| Value::from(*i)).collect()
}

/// Every step of the iteration, as key lists.
pub async fn pages(stream: FetchListStream) -> Vec<Vec<Value>> {
    let steps: Vec<AsyncIteratorResult> = stream.try_collect().await.expect("iteration failed");
    steps
        .into_iter()
        .map(|step| step.value.keys().cloned().collect())
        .collect()
}

/// All keys of the iteration in order.
pub async fn flat_keys(stream: FetchListStream) -> Vec<Value> {
    pages(stream).await.into_iter().flatten().collect()
}
