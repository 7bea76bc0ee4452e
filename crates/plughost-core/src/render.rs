//! The contract between the host and a hosted render unit.

use crate::bridge::ParameterBank;
use crate::format::{AudioFormat, PluginCategory};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Deinterleaved channel buffers, sized once up front.
///
/// Every render-side operation works on a `frames` prefix of each channel and
/// never reallocates.
#[derive(Clone)]
pub struct AudioBuffers {
    channels: Vec<Vec<f32>>,
    capacity: usize,
}

impl AudioBuffers {
    /// Allocates; control context only.
    pub fn new(channels: usize, capacity: usize) -> Self {
        Self {
            channels: (0..channels).map(|_| vec![0.0; capacity]).collect(),
            capacity,
        }
    }

    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> &mut [f32] {
        &mut self.channels[index]
    }

    pub fn channels_mut(&mut self) -> impl Iterator<Item = &mut [f32]> {
        self.channels.iter_mut().map(|c| c.as_mut_slice())
    }

    #[inline]
    pub fn silence(&mut self, frames: usize) {
        let frames = frames.min(self.capacity);
        for ch in &mut self.channels {
            ch[..frames].fill(0.0);
        }
    }
}

impl fmt::Debug for AudioBuffers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioBuffers")
            .field("channels", &self.channels.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// Render-path failure. Carries no heap data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("no upstream connection")]
    NoConnection,
    #[error("{requested} frames exceeds maximum of {max}")]
    TooManyFrames { requested: usize, max: usize },
    #[error("stage reported status {0}")]
    Stage(i32),
}

/// Control-side failure raised by a stage while preparing to render.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StageError {
    #[error("format not supported: {0}")]
    FormatNotSupported(AudioFormat),
    #[error("maximum block of {0} frames not supported")]
    TooManyFrames(usize),
    #[error("resources exhausted: {0}")]
    Exhausted(String),
}

/// Upstream of a stage. Pulled synchronously from inside [`RenderStage::render`].
pub trait PullInput {
    /// Fills the first `frames` samples of every channel of `into`.
    fn pull(&mut self, frames: usize, into: &mut AudioBuffers) -> Result<(), RenderError>;
}

/// Upstream of generator stages: nothing is connected.
pub struct NoInput;

impl PullInput for NoInput {
    fn pull(&mut self, _frames: usize, _into: &mut AudioBuffers) -> Result<(), RenderError> {
        Err(RenderError::NoConnection)
    }
}

/// A hosted render unit.
///
/// `render` runs on the real-time thread: it must finish within one
/// hardware block and must not allocate, lock, block or call back into the
/// control context. Everything else is called from the control context.
pub trait RenderStage: Send {
    fn name(&self) -> &str;

    fn category(&self) -> PluginCategory;

    /// Parameter tree shared with the control side, if the stage has one.
    fn parameters(&self) -> Option<Arc<ParameterBank>> {
        None
    }

    /// Whether the stage can be wired with `format` on its input and output.
    fn supports_format(&self, format: &AudioFormat) -> bool {
        !format.interleaved && format.channels > 0
    }

    /// Prepares for rendering `format` in blocks of at most `max_frames`.
    fn allocate_render_resources(
        &mut self,
        format: &AudioFormat,
        max_frames: usize,
    ) -> Result<(), StageError>;

    fn deallocate_render_resources(&mut self) {}

    /// Produces `frames` samples into `output`, in place.
    ///
    /// Processing stages pull their input into `output` first and then
    /// transform it.
    fn render(
        &mut self,
        frames: usize,
        output: &mut AudioBuffers,
        input: &mut dyn PullInput,
    ) -> Result<(), RenderError>;
}
