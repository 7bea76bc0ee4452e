//! Plugin lifecycle state machine.
//!
//! ```text
//! Idle -> Unloading -> Instantiating -> Connecting -> Allocating -> Ready <-> Playing
//!                           |               |             |
//!                           +---------------+-------------+--> (unload) -> Idle
//! ```
//!
//! A load always starts by unloading whatever is active, so at most one
//! plugin exists at a time and no edge of the previous graph survives. Every
//! attempt, successful or not, produces one [`LoadMetrics`] record.

use crate::descriptor::PluginDescriptor;
use crate::error::{HostError, InstantiationError, InstantiationErrorKind, LoadStage, Result};
use crate::instance::{InstanceSlot, PluginInstance};
use crate::instantiate::Instantiator;
use crate::metrics::{LoadMetrics, MetricsRecorder, PhaseClock};
use plughost_core::{
    AudioSession, GraphTopology, InterruptionPhase, ParameterSnapshot, RenderEngine,
    RouteChangeReason, SessionEvent,
};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Idle,
    Unloading,
    Instantiating,
    Connecting,
    Allocating,
    Ready,
    Playing,
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LifecycleState::Idle => write!(f, "idle"),
            LifecycleState::Unloading => write!(f, "unloading"),
            LifecycleState::Instantiating => write!(f, "instantiating"),
            LifecycleState::Connecting => write!(f, "connecting"),
            LifecycleState::Allocating => write!(f, "allocating"),
            LifecycleState::Ready => write!(f, "ready"),
            LifecycleState::Playing => write!(f, "playing"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Upper bound on the instantiation call.
    pub instantiate_timeout: Duration,
    /// Upper bound on the control-surface request. Exceeding it is not a failure.
    pub view_timeout: Duration,
    /// Whether to ask for a control surface at all.
    pub request_view: bool,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            instantiate_timeout: Duration::from_secs(10),
            view_timeout: Duration::from_secs(2),
            request_view: true,
        }
    }
}

impl LifecycleConfig {
    pub fn validate(&self) -> Result<()> {
        if self.instantiate_timeout.is_zero() {
            return Err(plughost_core::Error::InvalidConfig(
                "instantiate_timeout must be non-zero".into(),
            )
            .into());
        }
        if self.request_view && self.view_timeout.is_zero() {
            return Err(plughost_core::Error::InvalidConfig(
                "view_timeout must be non-zero when requesting views".into(),
            )
            .into());
        }
        Ok(())
    }
}

/// Owns the render engine, the audio session and the active plugin.
///
/// Control context only. The session must already have the engine's
/// renderer attached.
pub struct LifecycleManager<I, S> {
    engine: RenderEngine,
    session: S,
    instantiator: I,
    config: LifecycleConfig,
    state: LifecycleState,
    slot: InstanceSlot,
    resume_on_end: bool,
}

impl<I: Instantiator, S: AudioSession> LifecycleManager<I, S> {
    pub fn new(engine: RenderEngine, session: S, instantiator: I, config: LifecycleConfig) -> Self {
        Self {
            engine,
            session,
            instantiator,
            config,
            state: LifecycleState::Idle,
            slot: InstanceSlot::new(),
            resume_on_end: false,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.is_occupied()
    }

    pub fn is_playing(&self) -> bool {
        self.state == LifecycleState::Playing
    }

    pub fn active(&self) -> Option<&PluginInstance> {
        self.slot.get()
    }

    pub fn topology(&self) -> Arc<GraphTopology> {
        self.engine.topology()
    }

    pub fn engine(&self) -> &RenderEngine {
        &self.engine
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn instantiator(&self) -> &I {
        &self.instantiator
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Loads `descriptor`, replacing any active plugin.
    ///
    /// One record goes to `metrics` whatever the outcome. On failure the
    /// manager is back in `Idle` with the pass-through graph installed.
    pub async fn load(
        &mut self,
        descriptor: &PluginDescriptor,
        out_of_process: bool,
        metrics: &mut MetricsRecorder,
    ) -> Result<LoadMetrics> {
        tracing::info!(plugin = %descriptor, out_of_process, "loading plugin");

        let mut record = LoadMetrics::new(&descriptor.name, out_of_process);
        let mut clock = PhaseClock::start();
        let outcome = self
            .run_load(descriptor, out_of_process, &mut record, &mut clock)
            .await;

        if let Err(e) = &outcome {
            record.failure = Some(e.stage().unwrap_or(LoadStage::Find));
            tracing::error!(plugin = %descriptor.name, error = %e, "plugin load failed");
            self.unload();
        }

        record.total = clock.total();
        metrics.record(record.clone());
        outcome.map(|()| record)
    }

    async fn run_load(
        &mut self,
        descriptor: &PluginDescriptor,
        out_of_process: bool,
        record: &mut LoadMetrics,
        clock: &mut PhaseClock,
    ) -> Result<()> {
        self.unload();
        let found = self.instantiator.has_component(&descriptor.signature);
        record.find = clock.lap();
        if !found {
            return Err(HostError::Instantiation {
                stage: LoadStage::Find,
                source: InstantiationError::component_not_found(descriptor.signature),
            });
        }

        self.state = LifecycleState::Instantiating;
        let timeout = self.config.instantiate_timeout;
        let result = tokio::time::timeout(
            timeout,
            self.instantiator.instantiate(descriptor, out_of_process),
        )
        .await;
        record.instantiate = clock.lap();
        let stage = match result {
            Ok(Ok(stage)) => stage,
            Ok(Err(source)) => {
                return Err(HostError::Instantiation {
                    stage: LoadStage::Instantiate,
                    source,
                })
            }
            Err(_) => {
                return Err(HostError::Instantiation {
                    stage: LoadStage::Instantiate,
                    source: InstantiationError::new(
                        InstantiationErrorKind::Timeout,
                        format!("no instance after {}ms", timeout.as_millis()),
                    ),
                })
            }
        };
        if stage.category() != descriptor.category {
            tracing::warn!(
                plugin = %descriptor.name,
                reported = %stage.category(),
                expected = %descriptor.category,
                "stage category differs from descriptor; wiring by descriptor"
            );
        }

        self.state = LifecycleState::Connecting;
        let id = self.slot.allocate_id();
        let parameters = stage.parameters();
        let topology = GraphTopology::plan(
            descriptor.category,
            id,
            self.engine.hardware_format(),
            self.engine.source_format(),
        );
        self.engine
            .stage(topology, Some(stage))
            .map_err(HostError::GraphConnection)?;
        self.slot.replace(PluginInstance::new(
            id,
            descriptor.clone(),
            out_of_process,
            parameters,
        ));
        record.connect_graph = clock.lap();
        tracing::debug!(topology = %self.engine.topology(), "graph connected");

        self.state = LifecycleState::Allocating;
        self.engine
            .commit()
            .map_err(HostError::ResourceAllocation)?;
        if !self.session.is_running() {
            self.session
                .activate()
                .and_then(|()| self.session.start())
                .map_err(|e| HostError::ResourceAllocation(e.into()))?;
        }
        record.allocate_resources = clock.lap();
        self.state = LifecycleState::Ready;

        if self.config.request_view {
            self.acquire_view(descriptor).await;
        }
        record.load_view = clock.lap();

        tracing::info!(plugin = %descriptor.name, stage = id.0, "plugin ready");
        Ok(())
    }

    async fn acquire_view(&mut self, descriptor: &PluginDescriptor) {
        let parameters = self.slot.get().and_then(|i| i.parameters().cloned());
        let request = self.instantiator.request_view(descriptor, parameters);
        match tokio::time::timeout(self.config.view_timeout, request).await {
            Ok(Some(view)) => {
                if let Some(instance) = self.slot.get_mut() {
                    instance.set_view(view);
                }
            }
            Ok(None) => tracing::debug!(plugin = %descriptor.name, "no control surface"),
            Err(_) => tracing::warn!(
                plugin = %descriptor.name,
                timeout_ms = self.config.view_timeout.as_millis() as u64,
                "control surface request timed out; continuing without one"
            ),
        }
    }

    /// Stops playback and the session, releases the active plugin and
    /// restores the pass-through graph. A no-op when nothing is loaded.
    ///
    /// Safe after a load was abandoned mid-instantiation.
    pub fn unload(&mut self) {
        if self.state == LifecycleState::Idle && !self.slot.is_occupied() {
            return;
        }

        self.state = LifecycleState::Unloading;
        self.engine.set_playing(false);
        self.session.stop();

        // Drain the renderer so the bypass push cannot find the queue full.
        self.engine.discard_staged();
        self.session.synchronize();
        self.engine.collect_garbage();

        if let Err(e) = self.engine.install_bypass() {
            tracing::error!(error = %e, "failed to restore pass-through graph");
        }
        self.session.synchronize();
        self.engine.collect_garbage();

        if let Some(instance) = self.slot.clear() {
            tracing::info!(plugin = instance.name(), "plugin unloaded");
        }
        self.resume_on_end = false;
        self.state = LifecycleState::Idle;
    }

    /// Legal while `Ready` or `Playing`. Re-activates and starts the session
    /// if it is not running.
    pub fn start_playing(&mut self) -> Result<()> {
        match self.state {
            LifecycleState::Playing => return Ok(()),
            LifecycleState::Ready => {}
            state => {
                return Err(HostError::InvalidState {
                    operation: "start playing",
                    state,
                })
            }
        }

        if !self.session.is_running() {
            self.session
                .activate()
                .map_err(plughost_core::Error::from)?;
            self.session.start().map_err(plughost_core::Error::from)?;
        }
        self.engine.set_playing(true);
        self.state = LifecycleState::Playing;
        tracing::info!("playback started");
        Ok(())
    }

    /// Idempotent; legal in any state.
    pub fn stop_playing(&mut self) {
        self.engine.set_playing(false);
        if self.state == LifecycleState::Playing {
            self.state = LifecycleState::Ready;
            tracing::info!("playback stopped");
        }
    }

    pub fn set_volume(&self, volume: f32) {
        self.engine.set_volume(volume);
    }

    pub fn volume(&self) -> f32 {
        self.engine.volume()
    }

    /// Sets a parameter of the active plugin; returns the clamped value stored.
    pub fn set_parameter(&self, address: u64, value: f32) -> Result<f32> {
        let bank = self
            .slot
            .get()
            .ok_or(HostError::NotLoaded)?
            .parameters()
            .ok_or(HostError::UnknownParameter(address))?;
        let bridge = bank
            .bridge(address)
            .ok_or(HostError::UnknownParameter(address))?;
        if !bridge.descriptor().flags.writable {
            return Err(HostError::ReadOnlyParameter(address));
        }
        Ok(bridge.set(value))
    }

    pub fn parameter(&self, address: u64) -> Result<f32> {
        let bank = self
            .slot
            .get()
            .ok_or(HostError::NotLoaded)?
            .parameters()
            .ok_or(HostError::UnknownParameter(address))?;
        bank.get(address).ok_or(HostError::UnknownParameter(address))
    }

    /// Requested and effective values of every parameter, for UI polling.
    pub fn parameter_snapshot(&self) -> Vec<ParameterSnapshot> {
        self.slot
            .get()
            .and_then(|i| i.parameters())
            .map(|bank| bank.snapshot())
            .unwrap_or_default()
    }

    /// Reacts to a session notification. Never unloads.
    pub fn handle_session_event(&mut self, event: SessionEvent) -> Result<()> {
        match event {
            SessionEvent::Interruption {
                phase: InterruptionPhase::Began,
                ..
            } => {
                tracing::info!("session interrupted; stopping playback");
                self.resume_on_end |= self.is_playing();
                self.stop_playing();
            }
            SessionEvent::Interruption {
                phase: InterruptionPhase::Ended,
                should_resume,
            } => {
                let resume_playback = std::mem::take(&mut self.resume_on_end);
                if !should_resume {
                    tracing::info!("session interruption ended");
                    return Ok(());
                }
                tracing::info!("session interruption ended; resuming");
                self.session
                    .activate()
                    .map_err(plughost_core::Error::from)?;
                if self.slot.is_occupied() && !self.session.is_running() {
                    self.session.start().map_err(plughost_core::Error::from)?;
                }
                if resume_playback {
                    self.start_playing()?;
                }
            }
            SessionEvent::RouteChange {
                reason: RouteChangeReason::OldDeviceUnavailable,
            } => {
                tracing::warn!("output device removed");
                if self.is_playing() {
                    self.stop_playing();
                }
            }
            SessionEvent::RouteChange { reason } => {
                tracing::info!(?reason, "audio route changed");
            }
        }
        Ok(())
    }

    /// Handles every pending session notification. Returns how many.
    pub fn pump_session_events(&mut self) -> Result<usize> {
        let mut handled = 0;
        while let Some(event) = self.session.poll_event() {
            self.handle_session_event(event)?;
            handled += 1;
        }
        Ok(handled)
    }
}
