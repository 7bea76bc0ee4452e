//! Builder for configuring and constructing a `HostEngine`.

use crate::config::HostConfig;
use crate::{HostEngine, Result};
use plughost_core::{AudioFormat, AudioSession, OfflineSession, RenderEngine, SourceClip};
use plughost_plugin::{
    FactoryInstantiator, GainEffect, Instantiator, LifecycleManager, PluginRegistry,
    StaticRegistry,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// The hardware format comes from the session and cannot be overridden.
///
/// # Example
///
/// ```ignore
/// use plughost::prelude::*;
///
/// let builder = HostEngine::builder()
///     .source_wav("drums.wav")
///     .view_timeout(Duration::from_secs(1));
/// let instantiator = builder.builtin_instantiator();
/// let mut host = builder.build_offline(instantiator, AudioFormat::stereo(48000.0))?;
///
/// host.load_plugin(&GainEffect::descriptor(), true).await?;
/// host.start_playing()?;
/// ```
#[derive(Default)]
pub struct HostEngineBuilder {
    config: HostConfig,
    source_clip: Option<Arc<SourceClip>>,
    source_path: Option<PathBuf>,
    registry: Option<Box<dyn PluginRegistry + Send>>,
}

impl HostEngineBuilder {
    /// Replaces every setting made so far.
    pub fn config(mut self, config: HostConfig) -> Self {
        self.config = config;
        self
    }

    /// Default: 4096
    pub fn max_block_frames(mut self, frames: usize) -> Self {
        self.config.engine.max_block_frames = frames;
        self
    }

    /// Default: 16
    pub fn command_queue_capacity(mut self, capacity: usize) -> Self {
        self.config.engine.command_queue_capacity = capacity;
        self
    }

    /// Default: no ramp
    pub fn parameter_ramp(mut self, ramp: Duration) -> Self {
        self.config.engine.parameter_ramp = ramp;
        self
    }

    /// Default: 10 s
    pub fn instantiate_timeout(mut self, timeout: Duration) -> Self {
        self.config.lifecycle.instantiate_timeout = timeout;
        self
    }

    /// Default: 2 s
    pub fn view_timeout(mut self, timeout: Duration) -> Self {
        self.config.lifecycle.view_timeout = timeout;
        self
    }

    /// Default: true
    pub fn request_view(mut self, request: bool) -> Self {
        self.config.lifecycle.request_view = request;
        self
    }

    /// Audio the source node plays into effect stages.
    pub fn source_clip(mut self, clip: SourceClip) -> Self {
        self.source_clip = Some(Arc::new(clip));
        self.source_path = None;
        self
    }

    /// As [`source_clip`](Self::source_clip), decoded from a WAV file at build time.
    pub fn source_wav(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self.source_clip = None;
        self
    }

    pub fn registry(mut self, registry: impl PluginRegistry + Send + 'static) -> Self {
        self.registry = Some(Box::new(registry));
        self
    }

    /// An instantiator offering the built-in effects, using the configured ramp.
    pub fn builtin_instantiator(&self) -> FactoryInstantiator {
        FactoryInstantiator::new().with(
            GainEffect::descriptor().signature,
            GainEffect::factory(self.config.engine.parameter_ramp),
        )
    }

    /// A registry listing the built-in effects.
    pub fn builtin_registry() -> StaticRegistry {
        StaticRegistry::new().with(GainEffect::descriptor())
    }

    /// Builds against an [`OfflineSession`] reporting `hardware_format`.
    pub fn build_offline<I: Instantiator>(
        self,
        instantiator: I,
        hardware_format: AudioFormat,
    ) -> Result<HostEngine<I, OfflineSession>> {
        self.build_with_session(instantiator, OfflineSession::new(hardware_format))
    }

    /// Attaches the renderer to `session` and wires the lifecycle manager.
    pub fn build_with_session<I: Instantiator, S: AudioSession>(
        self,
        instantiator: I,
        mut session: S,
    ) -> Result<HostEngine<I, S>> {
        self.config.validate()?;

        let clip = match (self.source_clip, self.source_path) {
            (Some(clip), _) => Some(clip),
            (None, Some(path)) => Some(Arc::new(SourceClip::open_wav(path)?)),
            (None, None) => None,
        };

        let hardware = session.hardware_format();
        let (engine, renderer) = RenderEngine::new(self.config.engine, hardware, clip)?;
        session.attach(renderer);

        tracing::info!(
            hardware = %hardware,
            source = ?engine.source_format().map(|f| f.to_string()),
            "plughost engine ready"
        );

        let manager = LifecycleManager::new(engine, session, instantiator, self.config.lifecycle);
        Ok(HostEngine::new(manager, self.registry))
    }
}
