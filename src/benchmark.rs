//! Repeated-load benchmark.

use plughost_plugin::LoadMetrics;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    pub iterations: usize,
    /// Pause between iterations so teardown of the previous instance settles.
    pub settle_delay: Duration,
    pub out_of_process: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            iterations: 10,
            settle_delay: Duration::from_millis(500),
            out_of_process: true,
        }
    }
}

impl BenchmarkConfig {
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn out_of_process(mut self, out_of_process: bool) -> Self {
        self.out_of_process = out_of_process;
        self
    }
}

/// Every attempt's record, oldest first, plus aggregates.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    pub plugin_name: String,
    pub runs: Vec<LoadMetrics>,
    pub failures: usize,
    /// Mean total load time over successful runs.
    pub average_total: Option<Duration>,
}

impl BenchmarkReport {
    pub(crate) fn new(plugin_name: impl Into<String>, runs: Vec<LoadMetrics>) -> Self {
        let successes: Vec<Duration> = runs
            .iter()
            .filter(|m| m.succeeded())
            .map(|m| m.total)
            .collect();
        let average_total = (!successes.is_empty())
            .then(|| successes.iter().sum::<Duration>() / successes.len() as u32);

        Self {
            plugin_name: plugin_name.into(),
            failures: runs.len() - successes.len(),
            runs,
            average_total,
        }
    }

    pub fn successes(&self) -> usize {
        self.runs.len() - self.failures
    }

    /// Mean of one phase over successful runs.
    pub fn average_phase(&self, stage: plughost_plugin::LoadStage) -> Option<Duration> {
        let n = self.successes();
        if n == 0 {
            return None;
        }
        let sum: Duration = self
            .runs
            .iter()
            .filter(|m| m.succeeded())
            .map(|m| m.phase(stage))
            .sum();
        Some(sum / n as u32)
    }
}

impl std::fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} runs, {} failed",
            self.plugin_name,
            self.runs.len(),
            self.failures
        )?;
        if let Some(avg) = self.average_total {
            write!(f, ", average {:.2} ms", avg.as_secs_f64() * 1000.0)?;
        }
        Ok(())
    }
}
