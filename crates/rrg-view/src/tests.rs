#[cfg(test)]
mod view_tests {
    use crate::config::ViewConfig;
    use crate::state::{EmptyReason, ReloadOutcome, RotationView, ViewState};
    use chrono::NaiveDate;
    use rrg_core::{ColorMode, Entity, ExportFormat, Quadrant, RotationDataset, RotationError, TimePoint};

    fn day(d: u32, entities: Vec<Entity>) -> TimePoint {
        TimePoint::new(NaiveDate::from_ymd_opt(2024, 1, d).unwrap(), entities)
    }

    fn dataset(benchmark: &str) -> RotationDataset {
        RotationDataset::new(
            benchmark,
            (1..=8)
                .map(|d| {
                    let f = d as f64;
                    day(d, vec![
                        Entity::new("1617.T", "Foods", 100.0 + f, 100.0 - f),
                        Entity::new("1631.T", "Banks", 100.0 - f, 100.0 + f / 2.0),
                    ])
                })
                .collect(),
        )
    }

    fn loaded(benchmark: &str) -> RotationView {
        let mut view = RotationView::default();
        let ticket = view.begin_reload(benchmark);
        view.complete_reload(ticket, Ok(dataset(benchmark)));
        view
    }

    #[test]
    fn test_initial_state_is_empty() {
        let view = RotationView::default();
        assert_eq!(view.state(), ViewState::Empty { reason: EmptyReason::NotLoaded });
        assert!(view.scene().is_none());
        assert!(view.table().is_empty());
    }

    #[test]
    fn test_load_selects_latest_date() {
        let view = loaded("1306.T");
        match view.state() {
            ViewState::Loaded { benchmark, date, index, dates } => {
                assert_eq!(benchmark, "1306.T");
                assert_eq!(index, 7);
                assert_eq!(dates, 8);
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
            }
            other => panic!("expected loaded, got {:?}", other),
        }

        let scene = view.scene().unwrap();
        assert_eq!(scene.series.len(), 2);
        assert_eq!(scene.series_for("1617.T").unwrap().tail.len(), 5);
    }

    #[test]
    fn test_loading_clears_scene() {
        let mut view = loaded("1306.T");
        view.begin_reload("1321.T");
        assert!(view.state().is_loading());
        assert!(view.scene().is_none());
        assert!(view.set_date_index(0).is_none());
    }

    #[test]
    fn test_empty_response_is_no_data() {
        let mut view = RotationView::default();
        let ticket = view.begin_reload("1306.T");
        let outcome = view.complete_reload(ticket, Ok(RotationDataset::new("1306.T", Vec::new())));

        assert_eq!(
            outcome,
            ReloadOutcome::Applied(ViewState::Empty { reason: EmptyReason::NoData })
        );
        assert!(view.scene().is_none());
        assert!(view.candidates().is_none());
    }

    #[test]
    fn test_fetch_failure_keeps_message() {
        let mut view = loaded("1306.T");
        let ticket = view.begin_reload("1306.T");
        view.complete_reload(ticket, Err(RotationError::FetchFailed("HTTP 500: boom".to_string())));

        match view.state() {
            ViewState::Empty { reason: EmptyReason::FetchFailed(msg) } => {
                assert!(msg.contains("boom"));
                assert!(EmptyReason::FetchFailed(msg).message().starts_with("Failed to fetch data"));
            }
            other => panic!("expected fetch failure, got {:?}", other),
        }
        assert!(view.dataset().is_none());
    }

    #[test]
    fn test_stale_ticket_is_discarded() {
        let mut view = RotationView::default();
        let old = view.begin_reload("1306.T");
        let new = view.begin_reload("1321.T");

        let outcome = view.complete_reload(new, Ok(dataset("1321.T")));
        assert!(matches!(outcome, ReloadOutcome::Applied(ViewState::Loaded { .. })));

        let outcome = view.complete_reload(old, Ok(dataset("1306.T")));
        assert_eq!(outcome, ReloadOutcome::Discarded { generation: 1, latest: 2 });
        assert_eq!(view.dataset().unwrap().benchmark, "1321.T");
    }

    #[test]
    fn test_date_index_clamped_and_range_stable() {
        let mut view = loaded("1306.T");
        let range = view.range().unwrap();

        let scene = view.set_date_index(2).unwrap();
        assert_eq!(scene.index, 2);
        assert_eq!(scene.range, range);
        assert_eq!(scene.series_for("1617.T").unwrap().tail.len(), 3);

        let scene = view.set_date_index(500).unwrap();
        assert_eq!(scene.index, 7);
        assert_eq!(scene.range, range);
    }

    #[test]
    fn test_set_date_by_value() {
        let mut view = loaded("1306.T");
        let scene = view.set_date(NaiveDate::from_ymd_opt(2024, 1, 4).unwrap()).unwrap();
        assert_eq!(scene.index, 3);

        let scene = view.set_date(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()).unwrap();
        assert_eq!(scene.index, 3);
    }

    #[test]
    fn test_tail_length_clamped_and_kept_across_reload() {
        let mut view = loaded("1306.T");
        let scene = view.set_tail_length(0).unwrap();
        assert_eq!(scene.series_for("1617.T").unwrap().tail.len(), 1);

        view.set_tail_length(3);
        let ticket = view.begin_reload("1306.T");
        view.complete_reload(ticket, Ok(dataset("1306.T")));
        assert_eq!(view.tail_length(), 3);
        assert_eq!(view.scene().unwrap().series_for("1631.T").unwrap().tail.len(), 3);

        view.set_tail_length(99);
        assert_eq!(view.tail_length(), 20);
    }

    #[test]
    fn test_visibility_toggles_and_resets_on_benchmark_change() {
        let mut view = loaded("1306.T");
        let scene = view.set_visible("1631.T", false).unwrap();
        assert_eq!(scene.series.len(), 1);
        // hidden entities still shape the range
        assert_eq!(scene.range, view.range().unwrap());

        let ticket = view.begin_reload("1306.T");
        view.complete_reload(ticket, Ok(dataset("1306.T")));
        assert!(!view.is_visible("1631.T"));

        let ticket = view.begin_reload("1321.T");
        view.complete_reload(ticket, Ok(dataset("1321.T")));
        assert!(view.is_visible("1631.T"));
        assert_eq!(view.scene().unwrap().series.len(), 2);
    }

    #[test]
    fn test_new_ids_on_same_benchmark_become_visible() {
        let mut view = loaded("1306.T");
        view.set_visible("1631.T", false);

        let mut ds = dataset("1306.T");
        ds.points[7].entities.push(Entity::new("1633.T", "Real Estate", 97.0, 98.0));
        let ticket = view.begin_reload("1306.T");
        view.complete_reload(ticket, Ok(ds));

        assert!(view.is_visible("1633.T"));
        assert!(!view.is_visible("1631.T"));
    }

    #[test]
    fn test_position_colors_follow_visible_order() {
        let mut config = ViewConfig::default();
        config.scene.color_mode = ColorMode::ByPosition;
        let mut view = RotationView::new(config);
        let ticket = view.begin_reload("1306.T");
        view.complete_reload(ticket, Ok(dataset("1306.T")));

        let before = view.scene().unwrap().series_for("1631.T").unwrap().color.clone();
        let after = view.set_visible("1617.T", false).unwrap().series_for("1631.T").unwrap().color.clone();
        assert_ne!(before, after);
    }

    #[test]
    fn test_table_and_candidates_follow_index() {
        let mut view = loaded("1306.T");
        let names: Vec<String> = view.table().into_iter().map(|r| r.name).collect();
        assert_eq!(names, vec!["Banks", "Foods"]);

        view.set_date_index(0);
        let c = view.candidates().unwrap();
        assert_eq!(c.long.len(), 1);
        assert_eq!(c.long[0].quadrant, Some(Quadrant::Improving));
        assert_eq!(c.short[0].quadrant, Some(Quadrant::Weakening));
    }

    #[test]
    fn test_export_requires_loaded_data() {
        let now = chrono::Utc::now();
        assert_eq!(
            RotationView::default().export(ExportFormat::Csv, now),
            Err(RotationError::EmptyDataset)
        );

        let view = loaded("1306.T");
        let csv = view.export(ExportFormat::Csv, now).unwrap();
        assert_eq!(csv.lines().count(), 17);
        let json = view.export(ExportFormat::Json, now).unwrap();
        assert!(json.contains("\"total_records\": 16"));
    }
}

#[cfg(test)]
mod controller_tests {
    use crate::config::ViewConfig;
    use crate::controller::RotationController;
    use crate::state::{EmptyReason, RotationView, ViewState};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rrg_client::RotationSource;
    use rrg_core::{Entity, RotationDataset, RotationError, RotationResult, TickerInfo, TimePoint};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Serves a one-day dataset per benchmark after a per-benchmark delay
    struct StubSource {
        delays: Vec<(String, Duration)>,
    }

    impl StubSource {
        fn new(delays: &[(&str, u64)]) -> Self {
            Self {
                delays: delays
                    .iter()
                    .map(|(b, ms)| (b.to_string(), Duration::from_millis(*ms)))
                    .collect(),
            }
        }
    }

    #[async_trait]
    impl RotationSource for StubSource {
        async fn fetch(&self, benchmark: &str, _date: Option<NaiveDate>) -> RotationResult<RotationDataset> {
            let delay = self
                .delays
                .iter()
                .find(|(b, _)| b == benchmark)
                .map(|(_, d)| *d)
                .unwrap_or_default();
            tokio::time::sleep(delay).await;

            match benchmark {
                "EMPTY" => Ok(RotationDataset::new(benchmark, Vec::new())),
                "DOWN" => Err(RotationError::FetchFailed("connection refused".to_string())),
                _ => Ok(RotationDataset::new(
                    benchmark,
                    vec![TimePoint::new(
                        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                        vec![Entity::new("A", "A", 105.0, 95.0)],
                    )],
                )),
            }
        }

        async fn benchmarks(&self) -> RotationResult<Vec<TickerInfo>> {
            Ok(vec![
                TickerInfo { ticker: "1321.T".to_string(), name: "Nikkei 225 ETF".to_string() },
                TickerInfo { ticker: "1306.T".to_string(), name: "TOPIX ETF".to_string() },
            ])
        }

        fn source_name(&self) -> &'static str {
            "stub"
        }
    }

    fn controller(delays: &[(&str, u64)]) -> RotationController {
        RotationController::new(RotationView::new(ViewConfig::default()), Arc::new(StubSource::new(delays)))
    }

    #[tokio::test]
    async fn test_reload_loads_and_scrubs_without_fetching() {
        let c = controller(&[]);
        let state = c.reload("1306.T").await;
        assert!(state.is_loaded());

        let scene = c.set_date_index(10).await.unwrap();
        assert_eq!(scene.index, 0);
        assert_eq!(scene.series[0].quadrant, Some(rrg_core::Quadrant::Weakening));
        assert_eq!(c.table().await.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_and_failed_reloads() {
        let c = controller(&[]);

        let state = c.reload("EMPTY").await;
        assert_eq!(state, ViewState::Empty { reason: EmptyReason::NoData });
        assert!(c.scene().await.is_none());

        let state = c.reload("DOWN").await;
        assert!(matches!(state, ViewState::Empty { reason: EmptyReason::FetchFailed(_) }));
    }

    #[tokio::test]
    async fn test_last_request_wins() {
        let c = controller(&[("1306.T", 80), ("1321.T", 0)]);

        let (slow, fast) = tokio::join!(c.reload("1306.T"), c.reload("1321.T"));

        assert!(matches!(fast, ViewState::Loaded { ref benchmark, .. } if benchmark == "1321.T"));
        // the first reload was cancelled and never shows its own benchmark
        assert!(!matches!(slow, ViewState::Loaded { ref benchmark, .. } if benchmark == "1306.T"));
        assert_eq!(c.with_view(|v| v.generation()).await, 2);
        assert_eq!(
            c.with_view(|v| v.dataset().map(|d| d.benchmark.clone())).await.as_deref(),
            Some("1321.T")
        );
    }

    #[derive(Default)]
    struct FetchCounter {
        active: AtomicUsize,
        max_active: AtomicUsize,
        started: AtomicUsize,
        completed: AtomicUsize,
    }

    struct ActiveGuard<'a>(&'a FetchCounter);

    impl Drop for ActiveGuard<'_> {
        fn drop(&mut self) {
            self.0.active.fetch_sub(1, Ordering::SeqCst);
        }
    }

    /// Sleeps 200ms for "SLOW" and 10ms otherwise, tracking overlap
    struct CountingSource {
        counter: Arc<FetchCounter>,
    }

    #[async_trait]
    impl RotationSource for CountingSource {
        async fn fetch(&self, benchmark: &str, _date: Option<NaiveDate>) -> RotationResult<RotationDataset> {
            let counter = &self.counter;
            counter.started.fetch_add(1, Ordering::SeqCst);
            let now = counter.active.fetch_add(1, Ordering::SeqCst) + 1;
            counter.max_active.fetch_max(now, Ordering::SeqCst);
            let _guard = ActiveGuard(counter);

            let ms = if benchmark == "SLOW" { 200 } else { 10 };
            tokio::time::sleep(Duration::from_millis(ms)).await;

            counter.completed.fetch_add(1, Ordering::SeqCst);
            Ok(RotationDataset::new(
                benchmark,
                vec![TimePoint::new(
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    vec![Entity::new("A", "A", 101.0, 101.0)],
                )],
            ))
        }

        async fn benchmarks(&self) -> RotationResult<Vec<TickerInfo>> {
            Ok(Vec::new())
        }

        fn source_name(&self) -> &'static str {
            "counting"
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_new_reload_cancels_running_fetch() {
        let counter = Arc::new(FetchCounter::default());
        let c = RotationController::new(
            RotationView::default(),
            Arc::new(CountingSource { counter: Arc::clone(&counter) }),
        );

        let (first, second) = tokio::join!(c.reload("SLOW"), async {
            // let the slow fetch get going before superseding it
            tokio::time::sleep(Duration::from_millis(30)).await;
            c.reload("FAST").await
        });

        assert_eq!(counter.started.load(Ordering::SeqCst), 2);
        assert_eq!(counter.max_active.load(Ordering::SeqCst), 1);
        assert_eq!(counter.completed.load(Ordering::SeqCst), 1);
        assert_eq!(counter.active.load(Ordering::SeqCst), 0);

        assert!(matches!(second, ViewState::Loaded { ref benchmark, .. } if benchmark == "FAST"));
        assert!(!matches!(first, ViewState::Loaded { ref benchmark, .. } if benchmark == "SLOW"));
        assert_eq!(
            c.with_view(|v| v.dataset().map(|d| d.benchmark.clone())).await.as_deref(),
            Some("FAST")
        );
    }

    #[tokio::test]
    async fn test_sequential_reloads_each_fetch_once() {
        let counter = Arc::new(FetchCounter::default());
        let c = RotationController::new(
            RotationView::default(),
            Arc::new(CountingSource { counter: Arc::clone(&counter) }),
        );

        assert!(c.reload("A").await.is_loaded());
        assert!(c.reload("B").await.is_loaded());
        assert_eq!(counter.completed.load(Ordering::SeqCst), 2);
        assert_eq!(counter.max_active.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_default_benchmark_prefers_configured() {
        let c = controller(&[]);
        assert_eq!(c.default_benchmark().await, "1306.T");
    }
}
