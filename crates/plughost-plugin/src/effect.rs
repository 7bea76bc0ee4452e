//! Built-in gain effect with a bypass switch.
//!
//! | Address | Parameter | Range      | Default |
//! |---------|-----------|------------|---------|
//! | 0       | Gain      | 0.0 - 2.0  | 1.0     |
//! | 1       | Bypass    | off / on   | off     |

use crate::descriptor::PluginDescriptor;
use crate::error::InstantiationError;
use plughost_core::{
    AudioBuffers, AudioFormat, ParameterBank, ParameterDescriptor, ParameterUnit, PluginCategory,
    PullInput, RenderError, RenderStage, SmoothedValue, StageError,
};
use std::sync::Arc;
use std::time::Duration;

pub const GAIN: u64 = 0;
pub const BYPASS: u64 = 1;

pub struct GainEffect {
    parameters: Arc<ParameterBank>,
    smoother: SmoothedValue,
    ramp: Duration,
    format: Option<AudioFormat>,
}

impl GainEffect {
    pub fn new() -> Self {
        let parameters = Arc::new(ParameterBank::new([
            ParameterDescriptor::new(GAIN, "gain", "Gain", 0.0, 2.0, 1.0)
                .unit(ParameterUnit::LinearGain),
            ParameterDescriptor::toggle(BYPASS, "bypass", "Bypass", false),
        ]));

        Self {
            smoother: SmoothedValue::immediate(1.0),
            parameters,
            ramp: Duration::ZERO,
            format: None,
        }
    }

    /// Ramp gain changes over `ramp` instead of jumping.
    pub fn with_ramp(mut self, ramp: Duration) -> Self {
        self.ramp = ramp;
        self
    }

    pub fn descriptor() -> PluginDescriptor {
        PluginDescriptor::new("Gain", PluginCategory::Effect, b"gain", b"Plgh")
            .manufacturer("plughost")
            .version(1)
            .custom_view(true)
    }

    /// Factory for registering with a [`FactoryInstantiator`](crate::FactoryInstantiator).
    pub fn factory(
        ramp: Duration,
    ) -> impl Fn(&PluginDescriptor) -> Result<Box<dyn RenderStage>, InstantiationError>
           + Send
           + Sync
           + 'static {
        move |_: &PluginDescriptor| -> Result<Box<dyn RenderStage>, InstantiationError> {
            Ok(Box::new(GainEffect::new().with_ramp(ramp)))
        }
    }

    pub fn is_allocated(&self) -> bool {
        self.format.is_some()
    }
}

impl Default for GainEffect {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderStage for GainEffect {
    fn name(&self) -> &str {
        "Gain"
    }

    fn category(&self) -> PluginCategory {
        PluginCategory::Effect
    }

    fn parameters(&self) -> Option<Arc<ParameterBank>> {
        Some(Arc::clone(&self.parameters))
    }

    fn allocate_render_resources(
        &mut self,
        format: &AudioFormat,
        max_frames: usize,
    ) -> Result<(), StageError> {
        if !self.supports_format(format) {
            return Err(StageError::FormatNotSupported(*format));
        }
        if max_frames == 0 {
            return Err(StageError::TooManyFrames(max_frames));
        }
        self.smoother.set_ramp(self.ramp, format.sample_rate);
        self.smoother
            .reset(self.parameters.get(GAIN).unwrap_or(self.smoother.target()));
        self.format = Some(*format);
        Ok(())
    }

    fn deallocate_render_resources(&mut self) {
        self.format = None;
    }

    fn render(
        &mut self,
        frames: usize,
        output: &mut AudioBuffers,
        input: &mut dyn PullInput,
    ) -> Result<(), RenderError> {
        input.pull(frames, output)?;

        let (Some(gain), Some(bypass)) =
            (self.parameters.bridge(GAIN), self.parameters.bridge(BYPASS))
        else {
            return Ok(());
        };

        let bypassed = bypass.get();
        bypass.publish_effective(bypassed);
        if bypass.descriptor().is_on(bypassed) {
            return Ok(());
        }

        self.smoother.set_target(gain.get());
        if self.smoother.is_ramping() {
            for i in 0..frames {
                let g = self.smoother.next_sample();
                for ch in 0..output.channel_count() {
                    output.channel_mut(ch)[i] *= g;
                }
            }
        } else {
            let g = self.smoother.current();
            for ch in output.channels_mut() {
                ch[..frames].iter_mut().for_each(|s| *s *= g);
            }
        }

        gain.publish_effective(self.smoother.current());
        Ok(())
    }
}
