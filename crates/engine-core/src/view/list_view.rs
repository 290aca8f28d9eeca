use super::{capabilities::BaseCapabilities, mapping::DataMapping, options::ViewOptions};
use crate::fallback::{FetchByKeysIteration, FetchByKeysStrategy};
use async_trait::async_trait;
use connectors::{
    error::DataProviderError,
    events::bus::EventBus,
    provider::{DataProvider, FetchListStream, IsEmpty},
};
use engine_config::settings::FetchSettings;
use futures::{StreamExt, stream};
use model::{
    capability::{Capability, CapabilityName},
    core::{key::index_of_key, value::Value},
    events::EventType,
    fetch::{
        keys::{FetchByKeysParameters, FetchByKeysResults},
        list::{AsyncIteratorResult, DEFAULT_PAGE_SIZE, FetchListParameters, FetchListResult},
        offset::{FetchByOffsetParameters, FetchByOffsetResults},
    },
    query::{
        attributes::{FetchAttribute, merge_attributes},
        filter::FilterExpr,
        sort::SortCriterion,
    },
    records::item::Item,
};
use std::sync::Arc;
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, info};

/// A provider that decorates a base provider with a starting key or offset,
/// default sort, filter and attributes, and a [`DataMapping`].
///
/// Every `fetch_first` call snapshots the current options and owns its own
/// cache, so changing options never affects iterations already running.
/// Events of the base provider are re-dispatched on the view's own bus.
pub struct ListDataProviderView {
    base: Arc<dyn DataProvider>,
    options: ViewOptions,
    capabilities: BaseCapabilities,
    keys_fallback: FetchByKeysIteration,
    page_size: usize,
    events: EventBus,
    relay: JoinHandle<()>,
}

impl ListDataProviderView {
    /// Wraps `base`. Must be called inside a tokio runtime.
    pub async fn new(base: Arc<dyn DataProvider>, options: ViewOptions) -> Self {
        let capabilities = BaseCapabilities::probe(base.as_ref());
        let events = EventBus::new();
        let relay = spawn_relay(base.events(), events.clone()).await;

        info!(
            from = ?options.from,
            offset = options.offset,
            key_lookup = capabilities.has_key_lookup(),
            native_offset = capabilities.fetch_by_offset.is_some(),
            native_filter = capabilities.filter.is_some(),
            "Created list view"
        );

        Self {
            base,
            options,
            capabilities,
            keys_fallback: FetchByKeysIteration::default(),
            page_size: DEFAULT_PAGE_SIZE,
            events,
            relay,
        }
    }

    pub fn with_fetch_settings(mut self, settings: &FetchSettings) -> Self {
        self.keys_fallback = FetchByKeysIteration::from_settings(settings);
        self.page_size = settings.page_size.max(1);
        self
    }

    pub fn base(&self) -> &Arc<dyn DataProvider> {
        &self.base
    }

    pub fn capabilities(&self) -> &BaseCapabilities {
        &self.capabilities
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut ViewOptions {
        &mut self.options
    }

    pub fn set_from(&mut self, from: Option<Value>) {
        self.options.from = from;
    }

    pub fn set_offset(&mut self, offset: usize) {
        self.options.offset = offset;
    }

    pub fn set_sort_criteria(&mut self, criteria: Option<Vec<SortCriterion>>) {
        self.options.sort_criteria = criteria;
    }

    pub fn set_filter_criterion(&mut self, filter: Option<FilterExpr>) {
        self.options.filter_criterion = filter;
    }

    pub fn set_attributes(&mut self, attributes: Option<Vec<FetchAttribute>>) {
        self.options.attributes = attributes;
    }

    pub fn set_data_mapping(&mut self, mapping: Option<Arc<dyn DataMapping>>) {
        self.options.data_mapping = mapping;
    }

    fn criteria(
        &self,
        sort: Option<Vec<SortCriterion>>,
        filter: Option<FilterExpr>,
        attributes: Option<Vec<FetchAttribute>>,
    ) -> Criteria {
        Criteria {
            sort: sort.or_else(|| self.options.sort_criteria.clone()),
            filter: filter.or_else(|| self.options.filter_criterion.clone()),
            attributes: merge_attributes(attributes.as_ref(), self.options.attributes.as_ref()),
        }
    }
}

impl Drop for ListDataProviderView {
    fn drop(&mut self) {
        self.relay.abort();
    }
}

#[async_trait]
impl DataProvider for ListDataProviderView {
    fn fetch_first(&self, params: FetchListParameters) -> FetchListStream {
        let mapping = self.options.mapping();
        let caller = self.criteria(
            params.sort_criteria,
            params.filter_criterion,
            params.attributes,
        );
        let source = caller.to_source(mapping.as_ref());
        let fetch_size = params.size.filter(|size| *size > 0).unwrap_or(self.page_size);
        let echo = Echo {
            size: params.size,
            caller,
            mapping,
        };

        if self.options.seeks_by_offset() {
            debug!(offset = self.options.offset, fetch_size, "Offset-seek iteration");
            return into_stream(OffsetSeek {
                base: self.base.clone(),
                next_offset: self.options.offset,
                fetch_size,
                source,
                echo,
            });
        }

        let local_filter = source
            .filter
            .clone()
            .filter(|filter| !self.capabilities.filters_natively(filter));
        let upstream = self.base.fetch_first(FetchListParameters {
            size: Some(fetch_size),
            sort_criteria: source.sort.clone(),
            filter_criterion: source.filter.clone(),
            attributes: source.attributes.clone(),
        });

        debug!(
            from = ?self.options.from,
            offset = self.options.offset,
            fetch_size,
            local_filter = local_filter.is_some(),
            "Windowed iteration"
        );

        into_stream(WindowCursor {
            upstream,
            cache: ViewCache {
                items: Vec::new(),
                done: false,
                start_index: self.options.offset,
            },
            from: self.options.from.clone(),
            fetch_size,
            local_filter,
            echoed: None,
            echo,
        })
    }

    async fn fetch_by_keys(
        &self,
        params: FetchByKeysParameters,
    ) -> Result<FetchByKeysResults, DataProviderError> {
        let mapping = self.options.mapping();
        let attributes =
            merge_attributes(params.attributes.as_ref(), self.options.attributes.as_ref());
        let source_params = FetchByKeysParameters {
            keys: params.keys.clone(),
            attributes: attributes
                .as_deref()
                .map(|attributes| mapping.map_attributes(attributes)),
        };

        // Keys are matched on the source rows; only the emitted rows are mapped.
        let found = if self.capabilities.has_key_lookup() {
            self.base.fetch_by_keys(source_params).await?
        } else {
            self.keys_fallback
                .fetch_by_keys(self.base.as_ref(), source_params)
                .await?
        };

        debug!(
            requested = params.keys.len(),
            found = found.results.len(),
            lookup = self.capabilities.has_key_lookup(),
            "Fetched by keys"
        );

        Ok(FetchByKeysResults {
            fetch_parameters: FetchByKeysParameters {
                keys: params.keys,
                attributes,
            },
            results: found
                .results
                .into_iter()
                .map(|(key, item)| (key, mapping.map_fields(item)))
                .collect(),
        })
    }

    async fn fetch_by_offset(
        &self,
        params: FetchByOffsetParameters,
    ) -> Result<FetchByOffsetResults, DataProviderError> {
        let mapping = self.options.mapping();
        let caller = self.criteria(
            params.sort_criteria,
            params.filter_criterion,
            params.attributes,
        );
        let source = caller.to_source(mapping.as_ref());

        let window = self
            .base
            .fetch_by_offset(FetchByOffsetParameters {
                offset: params.offset,
                size: params.size,
                sort_criteria: source.sort,
                filter_criterion: source.filter,
                attributes: source.attributes,
            })
            .await?;

        let echo = Echo {
            size: Some(params.size),
            caller,
            mapping,
        };
        let FetchByOffsetResults {
            fetch_parameters: echoed,
            results,
            done,
        } = window;

        Ok(FetchByOffsetResults {
            fetch_parameters: FetchByOffsetParameters {
                offset: params.offset,
                size: params.size,
                sort_criteria: echo.sort(echoed.sort_criteria.as_deref()),
                filter_criterion: echo.filter(echoed.filter_criterion.as_ref()),
                attributes: echo.caller.attributes.clone(),
            },
            results: results.into_iter().map(|item| echo.map(item)).collect(),
            done,
        })
    }

    fn get_capability(&self, name: CapabilityName) -> Option<Capability> {
        self.base.get_capability(name)
    }

    async fn get_total_size(&self) -> Result<i64, DataProviderError> {
        self.base.get_total_size().await
    }

    async fn is_empty(&self) -> Result<IsEmpty, DataProviderError> {
        self.base.is_empty().await
    }

    fn events(&self) -> &EventBus {
        &self.events
    }
}

/// Forwards `refresh` and `mutate` events of `source` to `target` until the
/// returned task is aborted. The relay channel is unbounded so bursts are
/// never dropped.
async fn spawn_relay(source: &EventBus, target: EventBus) -> JoinHandle<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    source.add_event_listener(EventType::Refresh, tx.clone()).await;
    source.add_event_listener(EventType::Mutate, tx).await;

    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            debug!(event_type = event.event_type().as_str(), "Relaying base event");
            target.dispatch(event).await;
        }
    })
}

/// Sort, filter and attributes of one request, all in one vocabulary.
#[derive(Debug, Clone, Default)]
struct Criteria {
    sort: Option<Vec<SortCriterion>>,
    filter: Option<FilterExpr>,
    attributes: Option<Vec<FetchAttribute>>,
}

impl Criteria {
    fn to_source(&self, mapping: &dyn DataMapping) -> Criteria {
        Criteria {
            sort: self.sort.as_deref().map(|s| mapping.map_sort_criteria(s)),
            filter: self.filter.as_ref().map(|f| mapping.map_filter_criterion(f)),
            attributes: self.attributes.as_deref().map(|a| mapping.map_attributes(a)),
        }
    }
}

/// Rebuilds caller-facing parameters from what the base echoed back.
struct Echo {
    size: Option<usize>,
    caller: Criteria,
    mapping: Arc<dyn DataMapping>,
}

impl Echo {
    fn sort(&self, echoed: Option<&[SortCriterion]>) -> Option<Vec<SortCriterion>> {
        echoed
            .map(|s| self.mapping.unmap_sort_criteria(s))
            .or_else(|| self.caller.sort.clone())
    }

    fn filter(&self, echoed: Option<&FilterExpr>) -> Option<FilterExpr> {
        echoed
            .map(|f| self.mapping.unmap_filter_criterion(f))
            .or_else(|| self.caller.filter.clone())
    }

    fn list_parameters(&self, echoed: Option<&FetchListParameters>) -> FetchListParameters {
        FetchListParameters {
            size: self.size,
            sort_criteria: self.sort(echoed.and_then(|p| p.sort_criteria.as_deref())),
            filter_criterion: self.filter(echoed.and_then(|p| p.filter_criterion.as_ref())),
            attributes: self.caller.attributes.clone(),
        }
    }

    fn map(&self, item: Item) -> Item {
        self.mapping.map_fields(item)
    }
}

#[async_trait]
trait Cursor: Send + 'static {
    async fn step(&mut self) -> Result<AsyncIteratorResult, DataProviderError>;
}

/// Turns a cursor into a stream that ends after the first `done` result or
/// the first error.
fn into_stream<C: Cursor>(cursor: C) -> FetchListStream {
    stream::unfold(Some(cursor), |state| async move {
        let mut cursor = state?;
        match cursor.step().await {
            Ok(result) => {
                let next = if result.done { None } else { Some(cursor) };
                Some((Ok(result), next))
            }
            Err(e) => Some((Err(e), None)),
        }
    })
    .boxed()
}

/// Relays base `fetch_by_offset` windows starting at the view offset.
struct OffsetSeek {
    base: Arc<dyn DataProvider>,
    next_offset: usize,
    fetch_size: usize,
    source: Criteria,
    echo: Echo,
}

#[async_trait]
impl Cursor for OffsetSeek {
    async fn step(&mut self) -> Result<AsyncIteratorResult, DataProviderError> {
        let window = self
            .base
            .fetch_by_offset(FetchByOffsetParameters {
                offset: self.next_offset,
                size: self.fetch_size,
                sort_criteria: self.source.sort.clone(),
                filter_criterion: self.source.filter.clone(),
                attributes: self.source.attributes.clone(),
            })
            .await?;

        let done = window.done || window.results.is_empty();
        debug!(
            offset = self.next_offset,
            rows = window.results.len(),
            done,
            "Offset-seek step"
        );
        self.next_offset += window.results.len();

        let params = FetchListParameters {
            size: self.echo.size,
            sort_criteria: self.echo.sort(window.fetch_parameters.sort_criteria.as_deref()),
            filter_criterion: self
                .echo
                .filter(window.fetch_parameters.filter_criterion.as_ref()),
            attributes: self.echo.caller.attributes.clone(),
        };
        let items = window
            .results
            .into_iter()
            .map(|item| self.echo.map(item))
            .collect();

        Ok(AsyncIteratorResult {
            done,
            value: FetchListResult::new(params, items),
        })
    }
}

/// Rows pulled from the base but not yet handed out.
///
/// `start_index` is the number of leading `items` to skip before the next
/// window; it holds the view offset until the first window was produced.
struct ViewCache {
    items: Vec<Item>,
    done: bool,
    start_index: usize,
}

/// Windows over a base `fetch_first` iteration, honouring `from` and the
/// view offset.
struct WindowCursor {
    upstream: FetchListStream,
    cache: ViewCache,
    from: Option<Value>,
    fetch_size: usize,
    local_filter: Option<FilterExpr>,
    echoed: Option<FetchListParameters>,
    echo: Echo,
}

impl WindowCursor {
    async fn pull_page(&mut self) -> Result<(), DataProviderError> {
        let Some(step) = self.upstream.next().await else {
            self.cache.done = true;
            return Ok(());
        };
        let step = step?;
        self.cache.done = step.done;
        self.echoed = Some(step.value.fetch_parameters.clone());

        let mut items = step.value.into_items();
        let pulled = items.len();
        if let Some(filter) = &self.local_filter {
            items.retain(|item| filter.matches(&item.data));
        }

        debug!(
            pulled,
            kept = items.len(),
            done = self.cache.done,
            "Pulled base page"
        );

        let echo = &self.echo;
        self.cache
            .items
            .extend(items.into_iter().map(|item| echo.map(item)));
        Ok(())
    }

    /// Trims the cache to start at `key`. Returns false when the base ran
    /// out before the key showed up.
    async fn fetch_until_key(&mut self, key: &Value) -> Result<bool, DataProviderError> {
        loop {
            if let Some(position) = index_of_key(&self.cache.items, key) {
                self.cache.items.drain(..position);
                return Ok(true);
            }
            self.cache.items.clear();
            if self.cache.done {
                return Ok(false);
            }
            self.pull_page().await?;
        }
    }

    async fn fetch_until_offset(&mut self) -> Result<AsyncIteratorResult, DataProviderError> {
        loop {
            let start = self.cache.start_index.min(self.cache.items.len());
            let available = self.cache.items.len() - start;

            if available >= self.fetch_size || self.cache.done {
                let end = start + available.min(self.fetch_size);
                let window: Vec<Item> = self.cache.items.drain(..end).skip(start).collect();
                self.cache.start_index = 0;

                let done = self.cache.done && self.cache.items.is_empty();
                let params = self.echo.list_parameters(self.echoed.as_ref());
                return Ok(AsyncIteratorResult {
                    done,
                    value: FetchListResult::new(params, window),
                });
            }

            self.pull_page().await?;
        }
    }
}

#[async_trait]
impl Cursor for WindowCursor {
    async fn step(&mut self) -> Result<AsyncIteratorResult, DataProviderError> {
        if let Some(from) = self.from.take() {
            if !self.fetch_until_key(&from).await? {
                debug!(from = %from, "Start key not found");
                let params = self.echo.list_parameters(self.echoed.as_ref());
                return Ok(AsyncIteratorResult::done(FetchListResult::empty(params)));
            }
        }
        self.fetch_until_offset().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        testing::{IterationOnly, array, rows},
        view::mapping::{NameResolver, RenameMapping},
    };
    use connectors::memory::{array::ArrayDataProvider, options::ArrayProviderOptions};
    use futures::TryStreamExt;
    use model::{core::key::key_set, query::filter::FilterOp};
    use std::time::Duration;
    use tokio::time::timeout;

    async fn collect(view: &ListDataProviderView, params: FetchListParameters) -> Vec<Vec<Value>> {
        let steps: Vec<AsyncIteratorResult> =
            view.fetch_first(params).try_collect().await.unwrap();
        steps
            .into_iter()
            .map(|s| s.value.keys().cloned().collect())
            .collect()
    }

    fn keys(ids: &[i64]) -> Vec<Value> {
        ids.iter().map(|i| Value::from(*i)).collect()
    }

    fn rename() -> RenameMapping {
        RenameMapping::new(NameResolver::new([("id", "Id"), ("name", "Title")]))
    }

    #[tokio::test]
    async fn test_pages_without_options() {
        let view = ListDataProviderView::new(Arc::new(array(5, 2)), ViewOptions::new()).await;
        let pages = collect(&view, FetchListParameters::default().with_size(2)).await;
        assert_eq!(pages, vec![keys(&[1, 2]), keys(&[3, 4]), keys(&[5])]);
    }

    #[tokio::test]
    async fn test_last_step_is_done() {
        let view = ListDataProviderView::new(Arc::new(array(4, 2)), ViewOptions::new()).await;
        let steps: Vec<AsyncIteratorResult> = view
            .fetch_first(FetchListParameters::default().with_size(2))
            .try_collect()
            .await
            .unwrap();

        assert_eq!(
            steps.iter().map(|s| s.done).collect::<Vec<_>>(),
            vec![false, true]
        );
    }

    #[tokio::test]
    async fn test_from_key_starts_the_iteration() {
        let view = ListDataProviderView::new(
            Arc::new(IterationOnly::new(5, 2)),
            ViewOptions::new().from_key(3),
        )
        .await;

        let pages = collect(&view, FetchListParameters::default().with_size(2)).await;
        assert_eq!(pages, vec![keys(&[3, 4]), keys(&[5])]);
    }

    #[tokio::test]
    async fn test_offset_counts_after_from_key() {
        let view = ListDataProviderView::new(
            Arc::new(IterationOnly::new(6, 2)),
            ViewOptions::new().from_key(2).with_offset(1),
        )
        .await;

        let pages = collect(&view, FetchListParameters::default().with_size(2)).await;
        assert_eq!(pages, vec![keys(&[3, 4]), keys(&[5, 6])]);
    }

    #[tokio::test]
    async fn test_missing_from_key_is_an_empty_iteration() {
        let view = ListDataProviderView::new(
            Arc::new(IterationOnly::new(5, 2)),
            ViewOptions::new().from_key(42),
        )
        .await;

        let steps: Vec<AsyncIteratorResult> = view
            .fetch_first(FetchListParameters::default())
            .try_collect()
            .await
            .unwrap();
        assert_eq!(steps.len(), 1);
        assert!(steps[0].done);
        assert!(steps[0].value.is_empty());
    }

    #[tokio::test]
    async fn test_offset_seek_uses_native_offsets() {
        let view =
            ListDataProviderView::new(Arc::new(array(5, 25)), ViewOptions::new().with_offset(2))
                .await;

        let pages = collect(&view, FetchListParameters::default().with_size(2)).await;
        assert_eq!(pages, vec![keys(&[3, 4]), keys(&[5])]);
    }

    #[tokio::test]
    async fn test_offset_seek_without_native_offsets_fails() {
        let view = ListDataProviderView::new(
            Arc::new(IterationOnly::new(5, 2)),
            ViewOptions::new().with_offset(2),
        )
        .await;

        let mut steps = view.fetch_first(FetchListParameters::default());
        assert!(matches!(
            steps.next().await,
            Some(Err(DataProviderError::CapabilityAbsent(
                CapabilityName::FetchByOffset
            )))
        ));
        assert!(steps.next().await.is_none());
    }

    #[tokio::test]
    async fn test_default_filter_and_sort_are_applied() {
        let view = ListDataProviderView::new(
            Arc::new(array(6, 25)),
            ViewOptions::new()
                .with_filter_criterion(FilterExpr::attribute(FilterOp::Eq, "group", 0))
                .with_sort_criteria(vec![SortCriterion::descending("id")]),
        )
        .await;

        let pages = collect(&view, FetchListParameters::default()).await;
        assert_eq!(pages, vec![keys(&[6, 4, 2])]);
    }

    #[tokio::test]
    async fn test_request_criteria_override_defaults() {
        let view = ListDataProviderView::new(
            Arc::new(array(4, 25)),
            ViewOptions::new().with_sort_criteria(vec![SortCriterion::descending("id")]),
        )
        .await;

        let pages = collect(
            &view,
            FetchListParameters::default().with_sort_criteria(vec![SortCriterion::ascending("id")]),
        )
        .await;
        assert_eq!(pages, vec![keys(&[1, 2, 3, 4])]);
    }

    #[tokio::test]
    async fn test_mapping_renames_rows_and_echoes_view_vocabulary() {
        let view = ListDataProviderView::new(
            Arc::new(array(3, 25)),
            ViewOptions::new().with_data_mapping(rename()),
        )
        .await;

        let criteria = vec![SortCriterion::descending("Title")];
        let steps: Vec<AsyncIteratorResult> = view
            .fetch_first(FetchListParameters::default().with_sort_criteria(criteria.clone()))
            .try_collect()
            .await
            .unwrap();

        let page = &steps[0].value;
        assert_eq!(page.fetch_parameters.sort_criteria, Some(criteria));
        assert_eq!(page.keys().cloned().collect::<Vec<_>>(), keys(&[3, 2, 1]));
        assert_eq!(page.data()[0].get_value("Title"), Value::from("row-3"));
        assert!(page.data()[0].field_names().all(|name| name != "name"));
    }

    #[tokio::test]
    async fn test_fetch_by_keys_with_lookup_base() {
        let view = ListDataProviderView::new(
            Arc::new(array(5, 2)),
            ViewOptions::new().with_data_mapping(rename()),
        )
        .await;

        let found = view
            .fetch_by_keys(FetchByKeysParameters::new(key_set([2, 9])))
            .await
            .unwrap();
        assert_eq!(found.keys(), key_set([2]));
        assert_eq!(
            found.results[&Value::from(2)].data.get_value("Title"),
            Value::from("row-2")
        );
    }

    #[tokio::test]
    async fn test_fetch_by_keys_iterates_without_lookup() {
        let base = Arc::new(IterationOnly::new(5, 2));
        let view = ListDataProviderView::new(base.clone(), ViewOptions::new())
            .await
            .with_fetch_settings(&FetchSettings {
                page_size: 2,
                ..Default::default()
            });

        let contained = view
            .contains_keys(FetchByKeysParameters::new(key_set([1, 3])))
            .await
            .unwrap();
        assert_eq!(contained.results, key_set([1, 3]));
        assert_eq!(base.pages(), 2);
    }

    #[tokio::test]
    async fn test_fetch_by_offset_maps_and_echoes() {
        let view = ListDataProviderView::new(
            Arc::new(array(5, 25)),
            ViewOptions::new().with_data_mapping(rename()),
        )
        .await;

        let criteria = vec![SortCriterion::descending("Id")];
        let window = view
            .fetch_by_offset(FetchByOffsetParameters::new(1, 2).with_sort_criteria(criteria.clone()))
            .await
            .unwrap();

        assert_eq!(window.fetch_parameters.sort_criteria, Some(criteria));
        assert_eq!(
            window.results.iter().map(|i| i.key().clone()).collect::<Vec<_>>(),
            keys(&[4, 3])
        );
        assert_eq!(window.results[0].data.get_value("Id"), Value::from(4));
        assert!(!window.done);
    }

    #[tokio::test]
    async fn test_option_changes_do_not_touch_running_iterations() {
        let mut view = ListDataProviderView::new(Arc::new(array(4, 2)), ViewOptions::new()).await;

        let running = view.fetch_first(FetchListParameters::default().with_size(2));
        view.set_from(Some(Value::from(3)));

        let steps: Vec<AsyncIteratorResult> = running.try_collect().await.unwrap();
        assert_eq!(steps[0].value.keys().next(), Some(&Value::from(1)));

        let pages = collect(&view, FetchListParameters::default().with_size(2)).await;
        assert_eq!(pages, vec![keys(&[3, 4])]);
    }

    #[tokio::test]
    async fn test_base_events_are_relayed() {
        let base = Arc::new(ArrayDataProvider::new(
            rows(2),
            ArrayProviderOptions::keyed_by("id"),
        ));
        let view = ListDataProviderView::new(base.clone(), ViewOptions::new()).await;

        let (base_tx, mut base_rx) = mpsc::channel(4);
        base.events()
            .add_event_listener(EventType::Refresh, base_tx)
            .await;
        let (view_tx, mut view_rx) = mpsc::channel(4);
        view.events()
            .add_event_listener(EventType::Refresh, view_tx)
            .await;

        base.reset(rows(3)).await.unwrap();

        let from_base = base_rx.recv().await.unwrap();
        let from_view = timeout(Duration::from_secs(1), view_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(Arc::ptr_eq(&from_base, &from_view));
    }

    #[tokio::test]
    async fn test_event_burst_is_relayed_in_full() {
        let base = Arc::new(ArrayDataProvider::new(
            Vec::new(),
            ArrayProviderOptions::keyed_by("id"),
        ));
        let view = ListDataProviderView::new(base.clone(), ViewOptions::new()).await;
        let (view_tx, mut view_rx) = mpsc::unbounded_channel();
        view.events()
            .add_event_listener(EventType::Mutate, view_tx)
            .await;

        for i in 1..=100i64 {
            base.add(rows(i).split_off((i - 1) as usize)).await.unwrap();
        }

        for _ in 0..100 {
            timeout(Duration::from_secs(1), view_rx.recv())
                .await
                .unwrap()
                .unwrap();
        }
        assert!(view_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_delegated_queries() {
        let view = ListDataProviderView::new(Arc::new(array(3, 2)), ViewOptions::new()).await;
        assert_eq!(view.get_total_size().await.unwrap(), 3);
        assert_eq!(view.is_empty().await.unwrap(), IsEmpty::No);
        assert_eq!(
            view.get_capability(CapabilityName::Sort),
            view.base().get_capability(CapabilityName::Sort)
        );
    }
}
