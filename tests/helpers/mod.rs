//! Fixtures for plughost integration tests.
//!
//! Everything runs against the offline session: blocks are rendered on the
//! test thread, so output is deterministic and no audio device is needed.

#![allow(dead_code)]

pub mod tolerances;

use plughost::core::{
    AudioBuffers, NoInput, PullInput, RenderError, RenderStage, StageError,
};
use plughost::plugin::{
    FactoryInstantiator, InstantiationError, PluginRegistry, StaticRegistry,
};
use plughost::prelude::*;

/// Hardware rate of the offline session.
pub const TEST_SAMPLE_RATE: f64 = 48000.0;

/// Native rate of the source clip; differs from the hardware on purpose.
pub const SOURCE_SAMPLE_RATE: f64 = 44100.0;

/// Constant level of the source clip.
pub const SOURCE_LEVEL: f32 = 0.5;

/// Constant level emitted by [`ConstantGenerator`].
pub const GENERATOR_LEVEL: f32 = 0.25;

pub const TEST_BLOCK: usize = 256;

pub fn hardware() -> AudioFormat {
    AudioFormat::stereo(TEST_SAMPLE_RATE)
}

/// Stereo clip at [`SOURCE_SAMPLE_RATE`], every sample [`SOURCE_LEVEL`].
pub fn source_clip() -> SourceClip {
    SourceClip::from_channels(SOURCE_SAMPLE_RATE, vec![vec![SOURCE_LEVEL; 1024]; 2])
        .expect("valid clip")
}

// ----------------------------------------------------------------------------
// Test stages
// ----------------------------------------------------------------------------

/// Generator emitting a constant on every channel.
pub struct ConstantGenerator;

impl RenderStage for ConstantGenerator {
    fn name(&self) -> &str {
        "Constant"
    }

    fn category(&self) -> PluginCategory {
        PluginCategory::Generator
    }

    fn allocate_render_resources(
        &mut self,
        _format: &AudioFormat,
        _max_frames: usize,
    ) -> Result<(), StageError> {
        Ok(())
    }

    fn render(
        &mut self,
        frames: usize,
        output: &mut AudioBuffers,
        _input: &mut dyn PullInput,
    ) -> Result<(), RenderError> {
        for ch in output.channels_mut() {
            ch[..frames].fill(GENERATOR_LEVEL);
        }
        Ok(())
    }
}

/// Effect that fails at a chosen point after instantiation.
pub struct FaultyEffect {
    mono_only: bool,
    fail_allocation: bool,
}

impl RenderStage for FaultyEffect {
    fn name(&self) -> &str {
        "Faulty"
    }

    fn category(&self) -> PluginCategory {
        PluginCategory::Effect
    }

    fn supports_format(&self, format: &AudioFormat) -> bool {
        !self.mono_only || format.channels == 1
    }

    fn allocate_render_resources(
        &mut self,
        _format: &AudioFormat,
        _max_frames: usize,
    ) -> Result<(), StageError> {
        if self.fail_allocation {
            return Err(StageError::Exhausted("no DSP voices left".into()));
        }
        Ok(())
    }

    fn render(
        &mut self,
        frames: usize,
        output: &mut AudioBuffers,
        _input: &mut dyn PullInput,
    ) -> Result<(), RenderError> {
        NoInput.pull(frames, output)
    }
}

// ----------------------------------------------------------------------------
// Descriptors
// ----------------------------------------------------------------------------

pub fn gain_descriptor() -> PluginDescriptor {
    GainEffect::descriptor()
}

pub fn generator_descriptor() -> PluginDescriptor {
    PluginDescriptor::new("Constant", PluginCategory::Generator, b"cnst", b"Test")
}

/// Instantiation fails with a format error and native status.
pub fn broken_descriptor() -> PluginDescriptor {
    PluginDescriptor::new("Broken", PluginCategory::Effect, b"brkn", b"Test")
}

/// Instantiates, but only accepts mono connections.
pub fn mono_only_descriptor() -> PluginDescriptor {
    PluginDescriptor::new("Mono Only", PluginCategory::Effect, b"mono", b"Test")
}

/// Instantiates and connects, but cannot allocate render resources.
pub fn starving_descriptor() -> PluginDescriptor {
    PluginDescriptor::new("Starving", PluginCategory::Effect, b"strv", b"Test")
}

/// Panics while instantiating.
pub fn crashing_descriptor() -> PluginDescriptor {
    PluginDescriptor::new("Crashing", PluginCategory::Effect, b"crsh", b"Test")
}

pub const FORMAT_ERROR_STATUS: i32 = -10868;

pub fn test_instantiator() -> FactoryInstantiator {
    FactoryInstantiator::new()
        .with(
            gain_descriptor().signature,
            GainEffect::factory(Duration::ZERO),
        )
        .with(generator_descriptor().signature, |_| {
            Ok(Box::new(ConstantGenerator))
        })
        .with(broken_descriptor().signature, |_| {
            Err(InstantiationError::format_not_supported(FORMAT_ERROR_STATUS))
        })
        .with(mono_only_descriptor().signature, |_| {
            Ok(Box::new(FaultyEffect {
                mono_only: true,
                fail_allocation: false,
            }))
        })
        .with(starving_descriptor().signature, |_| {
            Ok(Box::new(FaultyEffect {
                mono_only: false,
                fail_allocation: true,
            }))
        })
        .with(crashing_descriptor().signature, |_| {
            panic!("plugin process terminated")
        })
}

pub fn test_registry() -> StaticRegistry {
    [
        gain_descriptor(),
        generator_descriptor(),
        broken_descriptor(),
        mono_only_descriptor(),
        starving_descriptor(),
        crashing_descriptor(),
    ]
    .into_iter()
    .collect()
}

/// Host with the source clip, the test registry and the offline session.
pub fn test_host() -> HostEngine {
    HostEngine::builder()
        .source_clip(source_clip())
        .registry(test_registry())
        .max_block_frames(1024)
        .build_offline(test_instantiator(), hardware())
        .expect("Failed to create test host")
}

/// Renders one block and returns a copy of output `channel`.
pub fn render_channel(host: &mut HostEngine, channel: usize) -> Vec<f32> {
    let output = host
        .session_mut()
        .render_block(TEST_BLOCK)
        .expect("render failed");
    output.channel(channel)[..TEST_BLOCK].to_vec()
}

pub fn is_silent(samples: &[f32]) -> bool {
    samples.iter().all(|s| s.abs() < tolerances::SILENCE_THRESHOLD)
}

/// Names listed for `category`, in registry order.
pub fn registry_names(registry: &impl PluginRegistry, category: PluginCategory) -> Vec<String> {
    registry
        .enumerate(category)
        .into_iter()
        .map(|d| d.name)
        .collect()
}
