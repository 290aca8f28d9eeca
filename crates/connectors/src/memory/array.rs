use crate::{
    error::DataProviderError,
    events::bus::EventBus,
    memory::options::ArrayProviderOptions,
    provider::{DataProvider, FetchListStream, IsEmpty},
};
use async_trait::async_trait;
use futures::{StreamExt, stream};
use model::{
    capability::{
        Capability, CapabilityName, FilterCapability, KeysImplementation, OffsetImplementation,
        SortAttributes,
    },
    core::value::Value,
    events::{
        AddOperation, DataProviderEvent, MutationDetail, MutationOperation, RefreshDetail,
    },
    fetch::{
        keys::{FetchByKeysParameters, FetchByKeysResults},
        list::{AsyncIteratorResult, FetchListParameters, FetchListResult},
        offset::{FetchByOffsetParameters, FetchByOffsetResults},
    },
    query::{attributes::FetchAttribute, filter::FilterExpr, sort::SortCriterion, sort::sort_items},
    records::{item::Item, row::RowData},
};
use std::{
    collections::HashMap,
    sync::{
        Arc, RwLock,
        atomic::{AtomicU64, Ordering},
    },
};
use tracing::debug;

/// In-memory provider over a list of rows.
///
/// Supports every capability natively: keyed lookup, random-access offsets,
/// multi-attribute sort, all filter operators and attribute projection.
/// Mutations dispatch `mutate` events and `reset` dispatches `refresh`.
pub struct ArrayDataProvider {
    rows: RwLock<Arc<Vec<Item>>>,
    options: ArrayProviderOptions,
    next_seq: AtomicU64,
    events: EventBus,
}

impl ArrayDataProvider {
    pub fn new(rows: Vec<RowData>, options: ArrayProviderOptions) -> Self {
        let mut provider = Self::from_items(Vec::new(), options);
        let items = provider.keyed(rows);
        provider.rows = RwLock::new(Arc::new(items));
        provider
    }

    /// Builds a provider from already keyed items.
    pub fn from_items(items: Vec<Item>, options: ArrayProviderOptions) -> Self {
        ArrayDataProvider {
            next_seq: AtomicU64::new(items.len() as u64),
            rows: RwLock::new(Arc::new(items)),
            options,
            events: EventBus::new(),
        }
    }

    pub fn options(&self) -> &ArrayProviderOptions {
        &self.options
    }

    /// Appends rows and dispatches a `mutate` event describing them.
    pub async fn add(&self, rows: Vec<RowData>) -> Result<Vec<Value>, DataProviderError> {
        let added = self.keyed(rows);
        let keys: Vec<Value> = added.iter().map(|i| i.key().clone()).collect();

        let indexes = {
            let mut guard = self.write_rows()?;
            let current = Arc::make_mut(&mut *guard);
            let start = current.len();
            current.extend(added.iter().cloned());
            (start..current.len()).collect::<Vec<_>>()
        };

        let detail = MutationDetail {
            add: Some(AddOperation {
                operation: operation_for(&added, indexes),
                position: None,
            }),
            ..Default::default()
        };
        self.dispatch_mutation(detail).await?;
        Ok(keys)
    }

    /// Removes the rows carrying `keys`. Unknown keys are ignored.
    pub async fn remove(&self, keys: &[Value]) -> Result<(), DataProviderError> {
        let (removed, indexes) = {
            let mut guard = self.write_rows()?;
            let current = Arc::make_mut(&mut *guard);

            let mut removed = Vec::new();
            let mut indexes = Vec::new();
            for (index, item) in current.iter().enumerate() {
                if keys.contains(item.key()) {
                    removed.push(item.clone());
                    indexes.push(index);
                }
            }
            current.retain(|item| !keys.contains(item.key()));
            (removed, indexes)
        };

        if removed.is_empty() {
            return Ok(());
        }

        let detail = MutationDetail {
            remove: Some(operation_for(&removed, indexes)),
            ..Default::default()
        };
        self.dispatch_mutation(detail).await
    }

    /// Replaces rows with matching keys. Items whose key is unknown are ignored.
    pub async fn update(&self, items: Vec<Item>) -> Result<(), DataProviderError> {
        let (updated, indexes) = {
            let mut guard = self.write_rows()?;
            let current = Arc::make_mut(&mut *guard);

            let mut updated = Vec::new();
            let mut indexes = Vec::new();
            for (index, existing) in current.iter_mut().enumerate() {
                if let Some(item) = items.iter().find(|i| i.key() == existing.key()) {
                    *existing = item.clone();
                    updated.push(item.clone());
                    indexes.push(index);
                }
            }
            (updated, indexes)
        };

        if updated.is_empty() {
            return Ok(());
        }

        let detail = MutationDetail {
            update: Some(operation_for(&updated, indexes)),
            ..Default::default()
        };
        self.dispatch_mutation(detail).await
    }

    /// Replaces the whole data set and dispatches a `refresh` event.
    pub async fn reset(&self, rows: Vec<RowData>) -> Result<(), DataProviderError> {
        self.next_seq.store(0, Ordering::SeqCst);
        let items = self.keyed(rows);
        {
            let mut guard = self.write_rows()?;
            *guard = Arc::new(items);
        }

        debug!("Array provider reset");
        self.events
            .dispatch_event(DataProviderEvent::Refresh(RefreshDetail::default()))
            .await;
        Ok(())
    }

    async fn dispatch_mutation(&self, detail: MutationDetail) -> Result<(), DataProviderError> {
        detail.validate()?;
        self.events
            .dispatch_event(DataProviderEvent::Mutate(detail))
            .await;
        Ok(())
    }

    fn keyed(&self, rows: Vec<RowData>) -> Vec<Item> {
        rows.into_iter()
            .map(|row| {
                let key = match &self.options.key_attribute {
                    Some(attr) => row.get_value(attr),
                    None => Value::Uint(self.next_seq.fetch_add(1, Ordering::SeqCst)),
                };
                Item::new(key, row)
            })
            .collect()
    }

    fn snapshot(&self) -> Result<Arc<Vec<Item>>, DataProviderError> {
        self.rows
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| DataProviderError::LockError("Failed to read array rows".into()))
    }

    fn write_rows(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, Arc<Vec<Item>>>, DataProviderError> {
        self.rows
            .write()
            .map_err(|_| DataProviderError::LockError("Failed to write array rows".into()))
    }

    /// Filtered and sorted copy of the current rows.
    fn query(
        &self,
        sort_criteria: Option<&[SortCriterion]>,
        filter: Option<&FilterExpr>,
    ) -> Result<Vec<Item>, DataProviderError> {
        let snapshot = self.snapshot()?;
        let mut items: Vec<Item> = match filter {
            Some(filter) => snapshot
                .iter()
                .filter(|item| filter.matches(&item.data))
                .cloned()
                .collect(),
            None => snapshot.as_ref().clone(),
        };
        if let Some(criteria) = sort_criteria {
            sort_items(&mut items, criteria);
        }
        Ok(items)
    }
}

fn operation_for(items: &[Item], indexes: Vec<usize>) -> MutationOperation {
    MutationOperation {
        keys: items.iter().map(|i| i.key().clone()).collect(),
        data: Some(items.iter().map(|i| i.data.clone()).collect()),
        metadata: Some(items.iter().map(|i| i.metadata.clone()).collect()),
        indexes: Some(indexes),
    }
}

fn project(item: &Item, attributes: Option<&[FetchAttribute]>) -> Item {
    match attributes {
        Some(attributes) => Item {
            metadata: item.metadata.clone(),
            data: item.data.project(attributes),
        },
        None => item.clone(),
    }
}

#[async_trait]
impl DataProvider for ArrayDataProvider {
    fn fetch_first(&self, params: FetchListParameters) -> FetchListStream {
        let page_size = params
            .size
            .filter(|size| *size > 0)
            .unwrap_or(self.options.page_size)
            .max(1);

        let items = match self.query(
            params.sort_criteria.as_deref(),
            params.filter_criterion.as_ref(),
        ) {
            Ok(items) => Arc::new(items),
            Err(e) => return stream::once(async move { Err(e) }).boxed(),
        };

        stream::unfold(Some(0usize), move |position| {
            let items = items.clone();
            let params = params.clone();
            async move {
                let start = position?;
                let end = (start + page_size).min(items.len());
                let page = items[start..end]
                    .iter()
                    .map(|item| project(item, params.attributes.as_deref()))
                    .collect();
                let done = end >= items.len();

                debug!(start, end, done, "Array provider page");

                let result = FetchListResult::new(params, page);
                let step = if done {
                    AsyncIteratorResult::done(result)
                } else {
                    AsyncIteratorResult::next(result)
                };
                let next = if done { None } else { Some(end) };
                Some((Ok::<_, DataProviderError>(step), next))
            }
        })
        .boxed()
    }

    async fn fetch_by_keys(
        &self,
        params: FetchByKeysParameters,
    ) -> Result<FetchByKeysResults, DataProviderError> {
        let snapshot = self.snapshot()?;
        let results: HashMap<Value, Item> = snapshot
            .iter()
            .filter(|item| params.keys.contains(item.key()))
            .map(|item| {
                (
                    item.key().clone(),
                    project(item, params.attributes.as_deref()),
                )
            })
            .collect();

        Ok(FetchByKeysResults {
            fetch_parameters: params,
            results,
        })
    }

    async fn fetch_by_offset(
        &self,
        params: FetchByOffsetParameters,
    ) -> Result<FetchByOffsetResults, DataProviderError> {
        let items = self.query(
            params.sort_criteria.as_deref(),
            params.filter_criterion.as_ref(),
        )?;

        let results: Vec<Item> = items
            .iter()
            .skip(params.offset)
            .take(params.size)
            .map(|item| project(item, params.attributes.as_deref()))
            .collect();
        let done = params.offset.saturating_add(params.size) >= items.len();

        Ok(FetchByOffsetResults {
            fetch_parameters: params,
            results,
            done,
        })
    }

    fn get_capability(&self, name: CapabilityName) -> Option<Capability> {
        match name {
            CapabilityName::FetchByKeys => Some(Capability::FetchByKeys {
                implementation: KeysImplementation::Lookup,
            }),
            CapabilityName::FetchByOffset => Some(Capability::FetchByOffset {
                implementation: OffsetImplementation::RandomAccess,
            }),
            CapabilityName::FetchFirst => Some(Capability::FetchFirst {
                iterate_after_done: self.options.iterate_after_done,
            }),
            CapabilityName::Sort => Some(Capability::Sort {
                attributes: SortAttributes::Multiple,
            }),
            CapabilityName::Filter => Some(Capability::Filter(FilterCapability::full())),
        }
    }

    async fn get_total_size(&self) -> Result<i64, DataProviderError> {
        Ok(self.snapshot()?.len() as i64)
    }

    async fn is_empty(&self) -> Result<IsEmpty, DataProviderError> {
        Ok(if self.snapshot()?.is_empty() {
            IsEmpty::Yes
        } else {
            IsEmpty::No
        })
    }

    fn events(&self) -> &EventBus {
        &self.events
    }
}
