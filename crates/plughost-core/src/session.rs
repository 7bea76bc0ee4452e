//! Platform audio session collaborator.
//!
//! The host only needs a session to report its hardware format, run the
//! renderer, and hand over interruption and route-change notifications as
//! discrete events. [`OfflineSession`] is a deterministic implementation
//! driven block by block from the caller's thread.

use crate::engine::Renderer;
use crate::format::AudioFormat;
use crate::render::{AudioBuffers, RenderError};
use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no renderer attached")]
    NotAttached,

    #[error("session is not active")]
    Inactive,

    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptionPhase {
    Began,
    Ended,
}

/// Why the output route changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteChangeReason {
    NewDeviceAvailable,
    /// The device playback was using went away (headphones unplugged).
    OldDeviceUnavailable,
    CategoryChange,
    Override,
    WakeFromSleep,
    NoSuitableRoute,
    ConfigurationChange,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Interruption {
        phase: InterruptionPhase,
        should_resume: bool,
    },
    RouteChange {
        reason: RouteChangeReason,
    },
}

/// Drives a [`Renderer`] from the hardware clock.
pub trait AudioSession: Send {
    fn hardware_format(&self) -> AudioFormat;

    /// Takes ownership of the real-time half of the engine.
    fn attach(&mut self, renderer: Renderer);

    fn start(&mut self) -> Result<(), SessionError>;

    fn stop(&mut self);

    fn is_running(&self) -> bool;

    /// Re-activates the session after an interruption.
    fn activate(&mut self) -> Result<(), SessionError> {
        Ok(())
    }

    /// Lets graph changes take effect while the session is stopped and no
    /// render callback would pick them up.
    fn synchronize(&mut self) {}

    /// Next pending notification, if any. Never blocks.
    fn poll_event(&mut self) -> Option<SessionEvent> {
        None
    }
}

/// A session with no hardware: blocks are rendered on demand.
pub struct OfflineSession {
    format: AudioFormat,
    renderer: Option<Renderer>,
    output: AudioBuffers,
    running: bool,
    active: bool,
    fail_next_start: Option<String>,
    blocks_rendered: u64,
    events_tx: Sender<SessionEvent>,
    events_rx: Receiver<SessionEvent>,
}

impl OfflineSession {
    pub fn new(format: AudioFormat) -> Self {
        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        Self {
            format,
            renderer: None,
            output: AudioBuffers::new(format.channel_count(), 0),
            running: false,
            active: true,
            fail_next_start: None,
            blocks_rendered: 0,
            events_tx,
            events_rx,
        }
    }

    /// Posts notifications as the platform would.
    pub fn event_sender(&self) -> Sender<SessionEvent> {
        self.events_tx.clone()
    }

    /// Makes the next `start` fail, as when the device cannot be opened.
    pub fn fail_next_start(&mut self, reason: impl Into<String>) {
        self.fail_next_start = Some(reason.into());
    }

    /// Marks the session inactive, as the platform does when an interruption begins.
    pub fn deactivate(&mut self) {
        self.active = false;
        self.running = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Simulates the output device changing under the engine.
    pub fn set_hardware_format(&mut self, format: AudioFormat) {
        self.format = format;
        let capacity = self.output.capacity();
        self.output = AudioBuffers::new(format.channel_count(), capacity);
    }

    pub fn blocks_rendered(&self) -> u64 {
        self.blocks_rendered
    }

    /// Renders one block. A stopped session outputs silence.
    pub fn render_block(&mut self, frames: usize) -> Result<&AudioBuffers, RenderError> {
        let Some(renderer) = self.renderer.as_mut() else {
            return Err(RenderError::NoConnection);
        };

        if !self.running {
            renderer.sync();
            self.output.silence(frames);
            return Ok(&self.output);
        }

        renderer.process(frames, &mut self.output)?;
        self.blocks_rendered += 1;
        Ok(&self.output)
    }
}

impl AudioSession for OfflineSession {
    fn hardware_format(&self) -> AudioFormat {
        self.format
    }

    fn attach(&mut self, renderer: Renderer) {
        self.output = AudioBuffers::new(self.format.channel_count(), renderer.max_frames());
        self.renderer = Some(renderer);
    }

    fn start(&mut self) -> Result<(), SessionError> {
        if self.renderer.is_none() {
            return Err(SessionError::NotAttached);
        }
        if !self.active {
            return Err(SessionError::Inactive);
        }
        if let Some(reason) = self.fail_next_start.take() {
            return Err(SessionError::DeviceUnavailable(reason));
        }
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn activate(&mut self) -> Result<(), SessionError> {
        self.active = true;
        Ok(())
    }

    fn synchronize(&mut self) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.sync();
        }
    }

    fn poll_event(&mut self) -> Option<SessionEvent> {
        self.events_rx.try_recv().ok()
    }
}
