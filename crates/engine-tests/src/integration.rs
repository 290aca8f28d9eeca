#[cfg(test)]
mod tests {
    use crate::utils::{CountingProvider, flat_keys, keys, pages, rows, upstream_failure};
    use connectors::{
        error::DataProviderError,
        memory::{array::ArrayDataProvider, options::ArrayProviderOptions},
        provider::DataProvider,
    };
    use engine_config::{env::EnvManager, settings::FetchSettings};
    use engine_core::{
        fallback::{FetchByKeysIteration, FetchByOffsetIteration, LayeredDataProvider},
        view::{ListDataProviderView, NameResolver, RenameMapping, ViewOptions},
    };
    use futures::StreamExt;
    use model::{
        capability::{Capability, CapabilityName, KeysImplementation},
        core::{key::key_set, value::Value},
        events::{DataProviderEvent, EventType},
        fetch::{
            keys::FetchByKeysParameters, list::FetchListParameters,
            offset::FetchByOffsetParameters,
        },
        query::{
            filter::{FilterExpr, FilterOp},
            sort::SortCriterion,
        },
        records::row::RowData,
    };
    use std::{sync::Arc, time::Duration};
    use tokio::{sync::mpsc, time::timeout};
    use tracing_test::traced_test;

    fn layered(source: CountingProvider, page_size: usize) -> LayeredDataProvider {
        LayeredDataProvider::new(Arc::new(source))
            .with_fetch_by_keys(FetchByKeysIteration::new().with_page_size(page_size))
            .with_fetch_by_offset(FetchByOffsetIteration::new().with_page_size(page_size))
    }

    fn assert_upstream(err: DataProviderError, page: usize) {
        match err {
            DataProviderError::Upstream(message) => assert_eq!(message, upstream_failure(page)),
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    // Keys {3, 5, 9} over five rows paged by two: 9 is absent and the scan
    // stops at the end of the source after exactly three pages.
    #[traced_test]
    #[tokio::test]
    async fn fetch_by_keys_over_iteration() {
        let source = CountingProvider::new(5, 2);
        let counters = source.counters.clone();
        let dp = layered(source, 2);

        let found = dp
            .fetch_by_keys(FetchByKeysParameters::new(key_set([3, 5, 9])))
            .await
            .unwrap();

        assert_eq!(found.keys(), key_set([3, 5]));
        assert_eq!(counters.pages(), 3);
        assert_eq!(counters.fetch_first(), 1);
    }

    #[traced_test]
    #[tokio::test]
    async fn fetch_by_keys_returns_exactly_present_keys() {
        let dp = layered(CountingProvider::new(7, 3), 3);
        let requests: [&[i64]; 5] = [&[], &[1], &[7, 2], &[0, 8, 100], &[1, 2, 3, 4, 5, 6, 7, 8]];

        for request in requests {
            let found = dp
                .fetch_by_keys(FetchByKeysParameters::new(key_set(request.iter().copied())))
                .await
                .unwrap();

            let expected = key_set(request.iter().copied().filter(|k| (1..=7).contains(k)));
            assert_eq!(found.keys(), expected, "request {request:?}");

            for (key, item) in &found.results {
                assert_eq!(item.key(), key);
                assert_eq!(item.data.get_value("id"), *key);
            }

            let contained = dp
                .contains_keys(FetchByKeysParameters::new(key_set(request.iter().copied())))
                .await
                .unwrap();
            assert_eq!(contained.results, expected);
        }
    }

    #[traced_test]
    #[tokio::test]
    async fn fetch_by_offset_over_iteration() {
        let dp = layered(CountingProvider::new(5, 2), 2);

        let window = dp
            .fetch_by_offset(FetchByOffsetParameters::new(3, 2))
            .await
            .unwrap();

        assert_eq!(
            window.results.iter().map(|i| i.key().clone()).collect::<Vec<_>>(),
            keys(&[4, 5])
        );
        assert!(window.done);
    }

    #[traced_test]
    #[tokio::test]
    async fn fetch_by_offset_windows_match_the_source() {
        let all: Vec<i64> = (1..=7).collect();

        for page_size in [1, 2, 3, 10] {
            let dp = layered(CountingProvider::new(7, page_size), page_size);
            for offset in 0..9 {
                for size in 1..5 {
                    let window = dp
                        .fetch_by_offset(FetchByOffsetParameters::new(offset, size))
                        .await
                        .unwrap();

                    let expected: Vec<i64> = all.iter().copied().skip(offset).take(size).collect();
                    assert_eq!(
                        window.results.iter().map(|i| i.key().clone()).collect::<Vec<_>>(),
                        keys(&expected),
                        "page_size={page_size} offset={offset} size={size}"
                    );
                    assert!(window.results.len() <= size);
                    if window.results.len() < size {
                        assert!(window.done);
                    }
                }
            }
        }
    }

    #[traced_test]
    #[tokio::test]
    async fn capability_queries_are_idempotent() {
        let dp: Arc<dyn DataProvider> = Arc::new(layered(CountingProvider::new(3, 2), 2));
        let view = ListDataProviderView::new(dp.clone(), ViewOptions::new()).await;

        for name in [
            CapabilityName::FetchByKeys,
            CapabilityName::FetchByOffset,
            CapabilityName::FetchFirst,
            CapabilityName::Sort,
            CapabilityName::Filter,
        ] {
            let first = view.get_capability(name);
            assert_eq!(first, dp.get_capability(name));
            assert_eq!(view.get_capability(name), first);
        }

        assert_eq!(
            view.get_capability(CapabilityName::FetchByKeys),
            Some(Capability::FetchByKeys {
                implementation: KeysImplementation::Iteration
            })
        );
    }

    #[traced_test]
    #[tokio::test]
    async fn from_and_offset_compose() {
        let all: Vec<i64> = (1..=8).collect();

        for from in 1..=8i64 {
            for offset in 0..4usize {
                let view = ListDataProviderView::new(
                    Arc::new(CountingProvider::new(8, 3)),
                    ViewOptions::new().from_key(from).with_offset(offset),
                )
                .await;

                let got = flat_keys(view.fetch_first(FetchListParameters::default().with_size(2))).await;
                let expected: Vec<i64> = all
                    .iter()
                    .copied()
                    .skip((from - 1) as usize + offset)
                    .collect();
                assert_eq!(got, keys(&expected), "from={from} offset={offset}");
            }
        }
    }

    #[traced_test]
    #[tokio::test]
    async fn missing_from_key_yields_one_empty_done_page() {
        let view = ListDataProviderView::new(
            Arc::new(CountingProvider::new(4, 2)),
            ViewOptions::new().from_key(99).with_offset(1),
        )
        .await;

        let mut steps = view.fetch_first(FetchListParameters::default());
        let only = steps.next().await.unwrap().unwrap();
        assert!(only.done);
        assert!(only.value.is_empty());
        assert!(steps.next().await.is_none());
    }

    #[traced_test]
    #[tokio::test]
    async fn offset_view_delegates_every_step() {
        let source = CountingProvider::new(9, 25).with_native_offset();
        let counters = source.counters.clone();
        let view =
            ListDataProviderView::new(Arc::new(source), ViewOptions::new().with_offset(2)).await;

        let got = pages(view.fetch_first(FetchListParameters::default().with_size(3))).await;

        assert_eq!(got, vec![keys(&[3, 4, 5]), keys(&[6, 7, 8]), keys(&[9])]);
        assert_eq!(counters.fetch_by_offset(), got.len());
        assert_eq!(counters.fetch_first(), 0);
    }

    #[traced_test]
    #[tokio::test]
    async fn filter_is_applied_locally_without_native_support() {
        let view = ListDataProviderView::new(
            Arc::new(CountingProvider::new(10, 4)),
            ViewOptions::new().with_filter_criterion(FilterExpr::attribute(FilterOp::Eq, "group", 0)),
        )
        .await;

        let got = flat_keys(view.fetch_first(FetchListParameters::default().with_size(2))).await;
        assert_eq!(got, keys(&[3, 6, 9]));
    }

    #[traced_test]
    #[tokio::test]
    async fn echoed_sort_criteria_round_trip_through_mapping() {
        let base = Arc::new(ArrayDataProvider::new(
            rows(4),
            ArrayProviderOptions::keyed_by("id").with_page_size(2),
        ));
        let mapping = RenameMapping::new(NameResolver::new([("name", "label"), ("id", "ident")]));
        let view =
            ListDataProviderView::new(base, ViewOptions::new().with_data_mapping(mapping)).await;

        let criteria = vec![
            SortCriterion::descending("label"),
            SortCriterion::ascending("ident"),
        ];
        let mut steps =
            view.fetch_first(FetchListParameters::default().with_sort_criteria(criteria.clone()));

        while let Some(step) = steps.next().await {
            let step = step.unwrap();
            assert_eq!(step.value.fetch_parameters.sort_criteria, Some(criteria.clone()));
            for row in step.value.data() {
                assert!(row.get("label").is_some());
                assert!(row.field_names().all(|name| name != "name"));
            }
        }

        let window = view
            .fetch_by_offset(FetchByOffsetParameters::new(0, 2).with_sort_criteria(criteria.clone()))
            .await
            .unwrap();
        assert_eq!(window.fetch_parameters.sort_criteria, Some(criteria));
        assert_eq!(
            window.results.iter().map(|i| i.key().clone()).collect::<Vec<_>>(),
            keys(&[4, 3])
        );
    }

    #[traced_test]
    #[tokio::test]
    async fn mutations_are_relayed_as_the_same_event() {
        let base = Arc::new(ArrayDataProvider::new(
            rows(2),
            ArrayProviderOptions::keyed_by("id"),
        ));
        let view = ListDataProviderView::new(base.clone(), ViewOptions::new()).await;

        let (base_tx, mut base_rx) = mpsc::channel(4);
        base.events()
            .add_event_listener(EventType::Mutate, base_tx)
            .await;
        let (view_tx, mut view_rx) = mpsc::channel(4);
        view.events()
            .add_event_listener(EventType::Mutate, view_tx)
            .await;

        let added = base
            .add(vec![RowData::from_pairs([("id", Value::from(3))])])
            .await
            .unwrap();
        assert_eq!(added, keys(&[3]));

        let from_base = base_rx.recv().await.unwrap();
        let from_view = timeout(Duration::from_secs(1), view_rx.recv())
            .await
            .unwrap()
            .unwrap();

        assert!(Arc::ptr_eq(&from_base, &from_view));
        match from_view.as_ref() {
            DataProviderEvent::Mutate(detail) => {
                let add = detail.add.as_ref().unwrap();
                assert_eq!(add.operation.keys, keys(&[3]));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[traced_test]
    #[tokio::test]
    async fn settings_drive_the_fallbacks() {
        let env = EnvManager::from_pairs([("DPV_PAGE_SIZE", "2"), ("DPV_ITERATION_LIMIT", "4")]);
        let settings = FetchSettings::load(None, &env).unwrap();

        let source = CountingProvider::new(10, 25);
        let counters = source.counters.clone();
        let dp = LayeredDataProvider::new(Arc::new(source))
            .with_fetch_by_keys(FetchByKeysIteration::from_settings(&settings));

        let found = dp
            .fetch_by_keys(FetchByKeysParameters::new(key_set([1, 9])))
            .await
            .unwrap();

        assert_eq!(found.keys(), key_set([1]));
        assert_eq!(counters.pages(), 2);
    }

    #[traced_test]
    #[tokio::test]
    async fn upstream_errors_surface_through_the_fallbacks() {
        let dp = layered(CountingProvider::new(10, 2).failing_at(2), 2);

        let err = dp
            .fetch_by_keys(FetchByKeysParameters::new(key_set([9])))
            .await
            .unwrap_err();
        assert_upstream(err, 2);

        let err = dp
            .contains_keys(FetchByKeysParameters::new(key_set([9])))
            .await
            .unwrap_err();
        assert_upstream(err, 2);

        let err = dp
            .fetch_by_offset(FetchByOffsetParameters::new(6, 2))
            .await
            .unwrap_err();
        assert_upstream(err, 2);
    }

    #[traced_test]
    #[tokio::test]
    async fn upstream_error_ends_windowed_iteration() {
        let view = ListDataProviderView::new(
            Arc::new(CountingProvider::new(6, 2).failing_at(2)),
            ViewOptions::new(),
        )
        .await;

        let mut steps = view.fetch_first(FetchListParameters::default().with_size(2));
        let first = steps.next().await.unwrap().unwrap();
        assert_eq!(first.value.keys().cloned().collect::<Vec<_>>(), keys(&[1, 2]));
        assert_upstream(steps.next().await.unwrap().unwrap_err(), 2);
        assert!(steps.next().await.is_none());
    }

    #[traced_test]
    #[tokio::test]
    async fn upstream_error_while_seeking_the_from_key() {
        let view = ListDataProviderView::new(
            Arc::new(CountingProvider::new(6, 2).failing_at(2)),
            ViewOptions::new().from_key(5),
        )
        .await;

        let mut steps = view.fetch_first(FetchListParameters::default().with_size(2));
        assert_upstream(steps.next().await.unwrap().unwrap_err(), 2);
        assert!(steps.next().await.is_none());
    }

    #[traced_test]
    #[tokio::test]
    async fn upstream_error_ends_offset_seek_iteration() {
        let source = CountingProvider::new(9, 25).with_native_offset().failing_at(2);
        let counters = source.counters.clone();
        let view =
            ListDataProviderView::new(Arc::new(source), ViewOptions::new().with_offset(2)).await;

        let mut steps = view.fetch_first(FetchListParameters::default().with_size(3));
        let first = steps.next().await.unwrap().unwrap();
        assert_eq!(first.value.keys().cloned().collect::<Vec<_>>(), keys(&[3, 4, 5]));
        assert_upstream(steps.next().await.unwrap().unwrap_err(), 2);
        assert!(steps.next().await.is_none());
        assert_eq!(counters.fetch_by_offset(), 2);
    }

    #[traced_test]
    #[tokio::test]
    async fn upstream_error_surfaces_through_view_lookups() {
        let settings = FetchSettings {
            page_size: 2,
            ..FetchSettings::default()
        };
        let view = ListDataProviderView::new(
            Arc::new(CountingProvider::new(10, 2).failing_at(3)),
            ViewOptions::new(),
        )
        .await
        .with_fetch_settings(&settings);

        let err = view
            .fetch_by_keys(FetchByKeysParameters::new(key_set([9])))
            .await
            .unwrap_err();
        assert_upstream(err, 3);

        let err = view
            .fetch_by_offset(FetchByOffsetParameters::new(0, 2))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DataProviderError::CapabilityAbsent(CapabilityName::FetchByOffset)
        ));
    }

    #[traced_test]
    #[tokio::test]
    async fn view_relays_a_burst_of_mutations() {
        let base = Arc::new(ArrayDataProvider::new(
            Vec::new(),
            ArrayProviderOptions::keyed_by("id"),
        ));
        let view = ListDataProviderView::new(base.clone(), ViewOptions::new()).await;

        let (base_tx, mut base_rx) = mpsc::unbounded_channel();
        base.events()
            .add_event_listener(EventType::Mutate, base_tx)
            .await;
        let (view_tx, mut view_rx) = mpsc::unbounded_channel();
        view.events()
            .add_event_listener(EventType::Mutate, view_tx)
            .await;

        for i in 1..=100i64 {
            base.add(vec![RowData::from_pairs([("id", Value::from(i))])])
                .await
                .unwrap();
        }

        for _ in 0..100 {
            let from_base = base_rx.recv().await.unwrap();
            let from_view = timeout(Duration::from_secs(1), view_rx.recv())
                .await
                .unwrap()
                .unwrap();
            assert!(Arc::ptr_eq(&from_base, &from_view));
        }
    }
}
