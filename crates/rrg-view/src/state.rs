//! Rotation View State
//!
//! Owns the fetched series and the transient view parameters, and turns
//! them into scenes. Reloads are split into `begin_reload` / `complete_reload`
//! so that a response is applied only if no newer request has been issued.

use chrono::{DateTime, NaiveDate, Utc};
use rrg_core::{
    build_scene_with_range, candidates, clamp_index, clamp_tail_length, compute_display_range, export_records,
    project_table, to_csv, to_json, Candidates, DisplayRange, ExportFormat, RotationDataset, RotationError,
    RotationResult, Scene, TableRow, Visibility,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::ViewConfig;

/// Why the view has nothing to show
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum EmptyReason {
    NotLoaded,
    NoData,
    FetchFailed(String),
}

impl EmptyReason {
    /// Message shown in place of the chart and table
    pub fn message(&self) -> String {
        match self {
            EmptyReason::NotLoaded => "Select a benchmark to load data.".to_string(),
            EmptyReason::NoData => "No data to display.".to_string(),
            EmptyReason::FetchFailed(e) => format!("Failed to fetch data: {}", e),
        }
    }
}

/// Snapshot of the view's state machine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    Empty {
        reason: EmptyReason,
    },
    Loading {
        benchmark: String,
        generation: u64,
    },
    Loaded {
        benchmark: String,
        date: NaiveDate,
        index: usize,
        dates: usize,
    },
}

impl ViewState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ViewState::Loaded { .. })
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading { .. })
    }
}

/// Handle for one in-flight reload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadTicket {
    pub benchmark: String,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReloadOutcome {
    Applied(ViewState),
    /// A newer request was issued before this one resolved
    Discarded { generation: u64, latest: u64 },
}

#[derive(Debug)]
struct LoadedData {
    dataset: RotationDataset,
    range: DisplayRange,
    index: usize,
}

#[derive(Debug)]
enum Phase {
    Empty(EmptyReason),
    Loading(ReloadTicket),
    Loaded(LoadedData),
}

pub struct RotationView {
    config: ViewConfig,
    phase: Phase,
    generation: u64,
    tail_length: usize,
    /// Benchmark of the last successful load
    benchmark: Option<String>,
    visible: HashSet<String>,
    /// Every id seen for `benchmark`, so new ids can default to visible
    known: HashSet<String>,
}

impl RotationView {
    pub fn new(config: ViewConfig) -> Self {
        let tail_length = clamp_tail_length(config.tail_length);
        Self {
            config,
            phase: Phase::Empty(EmptyReason::NotLoaded),
            generation: 0,
            tail_length,
            benchmark: None,
            visible: HashSet::new(),
            known: HashSet::new(),
        }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn tail_length(&self) -> usize {
        self.tail_length
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn state(&self) -> ViewState {
        match &self.phase {
            Phase::Empty(reason) => ViewState::Empty { reason: reason.clone() },
            Phase::Loading(ticket) => ViewState::Loading {
                benchmark: ticket.benchmark.clone(),
                generation: ticket.generation,
            },
            Phase::Loaded(data) => ViewState::Loaded {
                benchmark: data.dataset.benchmark.clone(),
                date: data.dataset.points[data.index].date,
                index: data.index,
                dates: data.dataset.len(),
            },
        }
    }

    pub fn dataset(&self) -> Option<&RotationDataset> {
        match &self.phase {
            Phase::Loaded(data) => Some(&data.dataset),
            _ => None,
        }
    }

    /// Display range of the loaded dataset
    pub fn range(&self) -> Option<DisplayRange> {
        match &self.phase {
            Phase::Loaded(data) => Some(data.range),
            _ => None,
        }
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.visible.contains(id)
    }

    /// Move to `Loading` and hand out a ticket for the response. Any earlier
    /// ticket becomes stale.
    pub fn begin_reload(&mut self, benchmark: &str) -> ReloadTicket {
        self.generation += 1;
        let ticket = ReloadTicket {
            benchmark: benchmark.to_string(),
            generation: self.generation,
        };

        tracing::info!(benchmark, generation = self.generation, "Reload started");
        self.phase = Phase::Loading(ticket.clone());
        ticket
    }

    /// Apply a fetch result if `ticket` is still the latest request.
    pub fn complete_reload(
        &mut self,
        ticket: ReloadTicket,
        result: RotationResult<RotationDataset>,
    ) -> ReloadOutcome {
        if ticket.generation != self.generation {
            tracing::warn!(
                benchmark = %ticket.benchmark,
                generation = ticket.generation,
                latest = self.generation,
                "Discarding stale reload response"
            );
            return ReloadOutcome::Discarded {
                generation: ticket.generation,
                latest: self.generation,
            };
        }

        self.phase = match result {
            Ok(dataset) => self.load(ticket.benchmark, dataset),
            Err(RotationError::EmptyDataset) => Phase::Empty(EmptyReason::NoData),
            Err(e) => {
                tracing::error!(benchmark = %ticket.benchmark, "Failed to fetch RRG data: {}", e);
                Phase::Empty(EmptyReason::FetchFailed(e.to_string()))
            }
        };

        ReloadOutcome::Applied(self.state())
    }

    fn load(&mut self, benchmark: String, dataset: RotationDataset) -> Phase {
        let range = match compute_display_range(&dataset.points, &self.config.scene.range) {
            Ok(range) => range,
            Err(_) => {
                tracing::info!(%benchmark, "Calculate returned no rows");
                return Phase::Empty(EmptyReason::NoData);
            }
        };

        let all_ids: HashSet<String> = dataset
            .points
            .iter()
            .flat_map(|tp| tp.entities.iter().map(|e| e.id.clone()))
            .collect();

        if self.benchmark.as_deref() == Some(benchmark.as_str()) {
            // same benchmark: keep toggles, show ids never seen before
            let fresh: Vec<String> = all_ids.difference(&self.known).cloned().collect();
            self.visible.extend(fresh);
        } else {
            self.visible = dataset
                .points
                .last()
                .map(|tp| tp.entities.iter().map(|e| e.id.clone()).collect())
                .unwrap_or_default();
        }
        self.known = all_ids;
        self.benchmark = Some(benchmark.clone());

        let index = dataset.latest_index().unwrap_or(0);
        tracing::info!(
            %benchmark,
            dates = dataset.len(),
            visible = self.visible.len(),
            "Dataset loaded"
        );

        Phase::Loaded(LoadedData { dataset, range, index })
    }

    /// Scene for the current parameters; `None` unless loaded
    pub fn scene(&self) -> Option<Scene> {
        let Phase::Loaded(data) = &self.phase else {
            return None;
        };

        let visible = Visibility::Only(self.visible.clone());
        build_scene_with_range(
            &data.dataset.points,
            data.range,
            data.index,
            self.tail_length,
            &visible,
            self.config.scene.color_mode,
        )
    }

    /// Select a date; out-of-range indices are clamped
    pub fn set_date_index(&mut self, index: usize) -> Option<Scene> {
        if let Phase::Loaded(data) = &mut self.phase {
            let clamped = clamp_index(index, data.dataset.len());
            if clamped != index {
                tracing::debug!(requested = index, clamped, "Date index clamped");
            }
            data.index = clamped;
        }
        self.scene()
    }

    /// Select a date by value; unknown dates leave the index unchanged
    pub fn set_date(&mut self, date: NaiveDate) -> Option<Scene> {
        let index = self
            .dataset()
            .and_then(|ds| ds.points.iter().position(|tp| tp.date == date));
        match index {
            Some(i) => self.set_date_index(i),
            None => {
                tracing::debug!(%date, "Date not in dataset");
                self.scene()
            }
        }
    }

    /// Change the tail length (clamped to 1..=20); survives reloads
    pub fn set_tail_length(&mut self, tail_length: usize) -> Option<Scene> {
        self.tail_length = clamp_tail_length(tail_length);
        self.scene()
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) -> Option<Scene> {
        if visible {
            self.visible.insert(id.to_string());
        } else {
            self.visible.remove(id);
        }
        self.scene()
    }

    /// Table rows for the selected date; empty unless loaded
    pub fn table(&self) -> Vec<TableRow> {
        match &self.phase {
            Phase::Loaded(data) => project_table(&data.dataset.points[data.index]),
            _ => Vec::new(),
        }
    }

    pub fn candidates(&self) -> Option<Candidates> {
        match &self.phase {
            Phase::Loaded(data) => Some(candidates(&data.dataset.points[data.index])),
            _ => None,
        }
    }

    /// Serialize the whole loaded dataset
    pub fn export(&self, format: ExportFormat, exported_at: DateTime<Utc>) -> RotationResult<String> {
        let dataset = self.dataset().ok_or(RotationError::EmptyDataset)?;
        let records = export_records(dataset);
        match format {
            ExportFormat::Csv => to_csv(&records),
            ExportFormat::Json => to_json(dataset, records, exported_at),
        }
    }
}

impl Default for RotationView {
    fn default() -> Self {
        Self::new(ViewConfig::default())
    }
}
