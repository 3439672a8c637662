use chrono::NaiveDate;
use rrg_client::RotationSource;
use rrg_core::{select_default_benchmark, RotationError, Scene, TableRow};
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::AbortHandle;

use crate::state::{ReloadOutcome, RotationView, ViewState};

/// Shares one [`RotationView`] between UI bindings and drives reloads
/// against a [`RotationSource`].
///
/// The view lock is never held across the fetch, so scrubbing stays
/// responsive while a reload is in flight. At most one fetch runs at a time:
/// a new reload aborts the previous one and waits for it to be dropped.
#[derive(Clone)]
pub struct RotationController {
    view: Arc<Mutex<RotationView>>,
    source: Arc<dyn RotationSource>,
    in_flight: Arc<Mutex<Option<AbortHandle>>>,
    /// Single permit, held by the running fetch task
    fetch_slot: Arc<Semaphore>,
}

impl RotationController {
    pub fn new(view: RotationView, source: Arc<dyn RotationSource>) -> Self {
        Self {
            view: Arc::new(Mutex::new(view)),
            source,
            in_flight: Arc::new(Mutex::new(None)),
            fetch_slot: Arc::new(Semaphore::new(1)),
        }
    }

    /// Fetch the latest history for `benchmark`
    pub async fn reload(&self, benchmark: &str) -> ViewState {
        self.reload_at(benchmark, None).await
    }

    /// Fetch history up to `date`. Starting another reload cancels this one;
    /// a cancelled or superseded caller gets the current state back.
    pub async fn reload_at(&self, benchmark: &str, date: Option<NaiveDate>) -> ViewState {
        let ticket = {
            let mut view = self.view.lock().await;
            let ticket = view.begin_reload(benchmark);
            if let Some(previous) = self.in_flight.lock().await.take() {
                previous.abort();
            }
            ticket
        };

        // resolves once the aborted fetch has released its permit
        let permit = match Arc::clone(&self.fetch_slot).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return self.state().await,
        };

        let task = {
            let view = self.view.lock().await;
            if view.generation() != ticket.generation {
                tracing::debug!(benchmark, generation = ticket.generation, "Reload superseded before fetch");
                return view.state();
            }

            let source = Arc::clone(&self.source);
            let requested = benchmark.to_string();
            // permit stays captured until the fetch future is gone
            let task = tokio::spawn(async move {
                let result = source.fetch(&requested, date).await;
                drop(permit);
                result
            });
            *self.in_flight.lock().await = Some(task.abort_handle());
            task
        };

        let result = match task.await {
            Ok(result) => result,
            Err(e) if e.is_cancelled() => {
                tracing::debug!(benchmark, generation = ticket.generation, "Fetch cancelled by newer reload");
                return self.state().await;
            }
            Err(e) => Err(RotationError::FetchFailed(format!("fetch task failed: {}", e))),
        };

        let mut view = self.view.lock().await;
        match view.complete_reload(ticket, result) {
            ReloadOutcome::Applied(state) => state,
            ReloadOutcome::Discarded { .. } => view.state(),
        }
    }

    /// Ask the source for its benchmarks and pick the configured default
    pub async fn default_benchmark(&self) -> String {
        let preferred = self.view.lock().await.config().default_benchmark.clone();
        match self.source.benchmarks().await {
            Ok(tickers) => select_default_benchmark(&tickers, &preferred).unwrap_or(preferred),
            Err(e) => {
                tracing::error!("Failed to load tickers from {}: {}", self.source.source_name(), e);
                preferred
            }
        }
    }

    pub async fn state(&self) -> ViewState {
        self.view.lock().await.state()
    }

    pub async fn scene(&self) -> Option<Scene> {
        self.view.lock().await.scene()
    }

    pub async fn table(&self) -> Vec<TableRow> {
        self.view.lock().await.table()
    }

    pub async fn set_date_index(&self, index: usize) -> Option<Scene> {
        self.view.lock().await.set_date_index(index)
    }

    pub async fn set_tail_length(&self, tail_length: usize) -> Option<Scene> {
        self.view.lock().await.set_tail_length(tail_length)
    }

    pub async fn set_visible(&self, id: &str, visible: bool) -> Option<Scene> {
        self.view.lock().await.set_visible(id, visible)
    }

    /// Run a read-only closure against the view
    pub async fn with_view<R>(&self, f: impl FnOnce(&RotationView) -> R) -> R {
        let view = self.view.lock().await;
        f(&view)
    }
}
