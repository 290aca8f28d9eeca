use async_trait::async_trait;
use connectors::{
    events::bus::EventBus,
    memory::{array::ArrayDataProvider, options::ArrayProviderOptions},
    provider::{DataProvider, FetchListStream},
};
use futures::StreamExt;
use model::{
    capability::{Capability, CapabilityName},
    core::value::Value,
    fetch::list::FetchListParameters,
    records::row::RowData,
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

pub fn rows(n: i64) -> Vec<RowData> {
    (1..=n)
        .map(|i| {
            RowData::from_pairs([
                ("id", Value::from(i)),
                ("name", Value::from(format!("row-{i}"))),
                ("group", Value::from(i % 2)),
            ])
        })
        .collect()
}

pub fn array(n: i64, page_size: usize) -> ArrayDataProvider {
    ArrayDataProvider::new(
        rows(n),
        ArrayProviderOptions::keyed_by("id").with_page_size(page_size),
    )
}

/// Hides everything of the wrapped provider except `fetch_first` and counts
/// the pages pulled through it.
pub struct IterationOnly {
    inner: ArrayDataProvider,
    pub pages: Arc<AtomicUsize>,
    pub iterations: Arc<AtomicUsize>,
}

impl IterationOnly {
    pub fn new(n: i64, page_size: usize) -> Self {
        Self {
            inner: array(n, page_size),
            pages: Arc::new(AtomicUsize::new(0)),
            iterations: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn pages(&self) -> usize {
        self.pages.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataProvider for IterationOnly {
    fn fetch_first(&self, params: FetchListParameters) -> FetchListStream {
        self.iterations.fetch_add(1, Ordering::SeqCst);
        let pages = self.pages.clone();
        self.inner
            .fetch_first(params)
            .inspect(move |_| {
                pages.fetch_add(1, Ordering::SeqCst);
            })
            .boxed()
    }

    fn get_capability(&self, name: CapabilityName) -> Option<Capability> {
        match name {
            CapabilityName::FetchFirst => self.inner.get_capability(name),
            _ => None,
        }
    }

    fn events(&self) -> &EventBus {
        self.inner.events()
    }
}
