//! Render engine configuration.

use crate::{Error, Result};
use std::time::Duration;

/// Upper bound for `max_block_frames`; larger hardware blocks are not realistic.
const MAX_BLOCK_FRAMES_LIMIT: usize = 16384;

/// Configuration for the render engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Largest block the renderer will be asked to process. Buffers are sized
    /// to this up front so the render path never allocates.
    pub max_block_frames: usize,
    /// Number of graphs that may be in flight between control and render
    /// context before `commit` reports [`Error::QueueFull`].
    pub command_queue_capacity: usize,
    /// Ramp applied by stages that smooth parameter changes. Zero disables it.
    pub parameter_ramp: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_block_frames: 4096,
            command_queue_capacity: 16,
            parameter_ramp: Duration::ZERO,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_block_frames == 0 || self.max_block_frames > MAX_BLOCK_FRAMES_LIMIT {
            return Err(Error::InvalidConfig(format!(
                "max_block_frames {} out of range (1-{})",
                self.max_block_frames, MAX_BLOCK_FRAMES_LIMIT
            )));
        }
        if self.command_queue_capacity < 2 {
            return Err(Error::InvalidConfig(format!(
                "command_queue_capacity {} must be at least 2",
                self.command_queue_capacity
            )));
        }
        if self.parameter_ramp > Duration::from_secs(1) {
            return Err(Error::InvalidConfig(format!(
                "parameter_ramp {:?} longer than 1s",
                self.parameter_ramp
            )));
        }
        Ok(())
    }
}
