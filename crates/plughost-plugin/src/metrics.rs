//! Load-phase timing.
//!
//! One [`LoadMetrics`] record per load attempt, kept newest first in a
//! [`MetricsRecorder`] capped at [`HISTORY_CAPACITY`] records.

use crate::error::LoadStage;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::{Duration, SystemTime};
use tokio::time::Instant;

pub const HISTORY_CAPACITY: usize = 50;

/// Timing of one load attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadMetrics {
    pub plugin_name: String,
    pub timestamp: SystemTime,
    pub out_of_process: bool,
    pub find: Duration,
    pub instantiate: Duration,
    pub connect_graph: Duration,
    pub allocate_resources: Duration,
    pub load_view: Duration,
    pub total: Duration,
    /// Phase the attempt failed in, `None` on success.
    pub failure: Option<LoadStage>,
}

impl LoadMetrics {
    /// All phases zero, stamped now.
    pub fn new(plugin_name: impl Into<String>, out_of_process: bool) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            timestamp: SystemTime::now(),
            out_of_process,
            find: Duration::ZERO,
            instantiate: Duration::ZERO,
            connect_graph: Duration::ZERO,
            allocate_resources: Duration::ZERO,
            load_view: Duration::ZERO,
            total: Duration::ZERO,
            failure: None,
        }
    }

    pub fn phase(&self, stage: LoadStage) -> Duration {
        match stage {
            LoadStage::Find => self.find,
            LoadStage::Instantiate => self.instantiate,
            LoadStage::ConnectGraph => self.connect_graph,
            LoadStage::AllocateResources => self.allocate_resources,
            LoadStage::LoadView => self.load_view,
        }
    }

    pub fn set_phase(&mut self, stage: LoadStage, elapsed: Duration) {
        match stage {
            LoadStage::Find => self.find = elapsed,
            LoadStage::Instantiate => self.instantiate = elapsed,
            LoadStage::ConnectGraph => self.connect_graph = elapsed,
            LoadStage::AllocateResources => self.allocate_resources = elapsed,
            LoadStage::LoadView => self.load_view = elapsed,
        }
    }

    pub fn phases(&self) -> [(LoadStage, Duration); 5] {
        [
            (LoadStage::Find, self.find),
            (LoadStage::Instantiate, self.instantiate),
            (LoadStage::ConnectGraph, self.connect_graph),
            (LoadStage::AllocateResources, self.allocate_resources),
            (LoadStage::LoadView, self.load_view),
        ]
    }

    pub fn phase_sum(&self) -> Duration {
        self.phases().iter().map(|(_, d)| *d).sum()
    }

    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    /// One line: `Total: 12.34 ms (Instantiate: 5.67 ms)`.
    pub fn summary(&self) -> String {
        format!(
            "Total: {:.2} ms (Instantiate: {:.2} ms)",
            millis(self.total),
            millis(self.instantiate)
        )
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Splits one load attempt into consecutive phases.
///
/// Reads the runtime clock, so paused test time is honoured.
#[derive(Debug)]
pub(crate) struct PhaseClock {
    start: Instant,
    mark: Instant,
}

impl PhaseClock {
    pub(crate) fn start() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            mark: now,
        }
    }

    /// Time since the previous lap, and starts the next phase.
    pub(crate) fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.mark);
        self.mark = now;
        elapsed
    }

    pub(crate) fn total(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Aggregate over the recorded history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub count: usize,
    pub failures: usize,
    pub mean_total: Duration,
    pub min_total: Duration,
    pub max_total: Duration,
}

/// Bounded history of load records. Control context only.
#[derive(Debug, Default)]
pub struct MetricsRecorder {
    history: VecDeque<LoadMetrics>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            history: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Prepends `metrics`, evicting the oldest record past capacity.
    pub fn record(&mut self, metrics: LoadMetrics) {
        match metrics.failure {
            None => tracing::info!(
                plugin = %metrics.plugin_name,
                out_of_process = metrics.out_of_process,
                total_ms = millis(metrics.total),
                instantiate_ms = millis(metrics.instantiate),
                "load recorded"
            ),
            Some(stage) => tracing::info!(
                plugin = %metrics.plugin_name,
                failed_at = %stage,
                total_ms = millis(metrics.total),
                "failed load recorded"
            ),
        }

        self.history.push_front(metrics);
        self.history.truncate(HISTORY_CAPACITY);
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// The most recent record.
    pub fn latest(&self) -> Option<&LoadMetrics> {
        self.history.front()
    }

    /// Newest first.
    pub fn history(&self) -> impl Iterator<Item = &LoadMetrics> {
        self.history.iter()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn summary(&self) -> Option<MetricsSummary> {
        let count = self.history.len();
        if count == 0 {
            return None;
        }
        let totals = self.history.iter().map(|m| m.total);
        Some(MetricsSummary {
            count,
            failures: self.history.iter().filter(|m| !m.succeeded()).count(),
            mean_total: totals.clone().sum::<Duration>() / count as u32,
            min_total: totals.clone().min().unwrap_or_default(),
            max_total: totals.max().unwrap_or_default(),
        })
    }
}
