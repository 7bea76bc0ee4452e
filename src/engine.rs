//! The host: lifecycle manager, metrics history and plugin registry in one place.

use crate::benchmark::{BenchmarkConfig, BenchmarkReport};
use crate::builder::HostEngineBuilder;
use crate::{Error, Result};
use plughost_core::{
    AudioSession, GraphTopology, OfflineSession, ParameterSnapshot, PluginCategory,
};
use plughost_plugin::{
    FactoryInstantiator, Instantiator, LifecycleManager, LifecycleState, LoadMetrics,
    MetricsRecorder, PluginDescriptor, PluginInstance, PluginRegistry,
};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Hosts one plugin at a time.
///
/// Created through [`HostEngine::builder`]. Every method runs on the control
/// context; the render path lives in the session.
pub struct HostEngine<I = FactoryInstantiator, S = OfflineSession> {
    manager: LifecycleManager<I, S>,
    metrics: MetricsRecorder,
    registry: Option<Box<dyn PluginRegistry + Send>>,
}

impl HostEngine {
    pub fn builder() -> HostEngineBuilder {
        HostEngineBuilder::default()
    }
}

impl<I: Instantiator, S: AudioSession> HostEngine<I, S> {
    pub(crate) fn new(
        manager: LifecycleManager<I, S>,
        registry: Option<Box<dyn PluginRegistry + Send>>,
    ) -> Self {
        Self {
            manager,
            metrics: MetricsRecorder::new(),
            registry,
        }
    }

    /// Loads `descriptor`, replacing the active plugin.
    pub async fn load_plugin(
        &mut self,
        descriptor: &PluginDescriptor,
        out_of_process: bool,
    ) -> Result<LoadMetrics> {
        Ok(self
            .manager
            .load(descriptor, out_of_process, &mut self.metrics)
            .await?)
    }

    /// Looks `name` up in the registry, then loads it.
    pub async fn load_by_name(&mut self, name: &str, out_of_process: bool) -> Result<LoadMetrics> {
        let registry = self.registry.as_ref().ok_or(Error::NoRegistry)?;
        let descriptor = registry
            .find(name)
            .ok_or_else(|| Error::PluginNotFound(name.to_string()))?;
        self.load_plugin(&descriptor, out_of_process).await
    }

    pub fn unload_plugin(&mut self) {
        self.manager.unload();
    }

    pub fn start_playing(&mut self) -> Result<()> {
        Ok(self.manager.start_playing()?)
    }

    pub fn stop_playing(&mut self) {
        self.manager.stop_playing();
    }

    pub fn is_playing(&self) -> bool {
        self.manager.is_playing()
    }

    pub fn state(&self) -> LifecycleState {
        self.manager.state()
    }

    pub fn active_plugin(&self) -> Option<&PluginInstance> {
        self.manager.active()
    }

    pub fn topology(&self) -> Arc<GraphTopology> {
        self.manager.topology()
    }

    pub fn set_parameter(&self, address: u64, value: f32) -> Result<f32> {
        Ok(self.manager.set_parameter(address, value)?)
    }

    pub fn parameter(&self, address: u64) -> Result<f32> {
        Ok(self.manager.parameter(address)?)
    }

    pub fn parameter_snapshot(&self) -> Vec<ParameterSnapshot> {
        self.manager.parameter_snapshot()
    }

    /// Main output gain.
    pub fn set_volume(&self, volume: f32) {
        self.manager.set_volume(volume);
    }

    pub fn volume(&self) -> f32 {
        self.manager.volume()
    }

    /// Handles pending interruption and route-change notifications.
    pub fn pump_session_events(&mut self) -> Result<usize> {
        Ok(self.manager.pump_session_events()?)
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    pub fn clear_metrics(&mut self) {
        self.metrics.clear();
    }

    pub fn session(&self) -> &S {
        self.manager.session()
    }

    pub fn session_mut(&mut self) -> &mut S {
        self.manager.session_mut()
    }

    pub fn manager(&self) -> &LifecycleManager<I, S> {
        &self.manager
    }

    pub fn available_plugins(&self, category: PluginCategory) -> Vec<PluginDescriptor> {
        self.registry
            .as_ref()
            .map(|r| r.enumerate(category))
            .unwrap_or_default()
    }

    pub fn scan_plugins(&self) -> BTreeMap<PluginCategory, Vec<PluginDescriptor>> {
        self.registry
            .as_ref()
            .map(|r| r.scan_all())
            .unwrap_or_default()
    }

    /// Loads `descriptor` `config.iterations` times, pausing `settle_delay`
    /// between attempts. Failed attempts are counted, not fatal.
    pub async fn benchmark(
        &mut self,
        descriptor: &PluginDescriptor,
        config: &BenchmarkConfig,
    ) -> BenchmarkReport {
        let mut runs = Vec::with_capacity(config.iterations);

        for iteration in 0..config.iterations {
            match self.load_plugin(descriptor, config.out_of_process).await {
                Ok(metrics) => {
                    tracing::debug!(iteration, summary = %metrics.summary(), "benchmark run");
                    runs.push(metrics);
                }
                Err(e) => {
                    tracing::warn!(iteration, error = %e, "benchmark run failed");
                    if let Some(metrics) = self.metrics.latest() {
                        runs.push(metrics.clone());
                    }
                }
            }

            if iteration + 1 < config.iterations && !config.settle_delay.is_zero() {
                tokio::time::sleep(config.settle_delay).await;
            }
        }

        let report = BenchmarkReport::new(descriptor.name.clone(), runs);
        tracing::info!(%report, "benchmark finished");
        report
    }
}
