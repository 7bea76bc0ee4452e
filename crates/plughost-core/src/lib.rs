//! Real-time render kernel for hosting a single audio plugin.
//!
//! # Primary API
//!
//! - [`RenderEngine`] / [`Renderer`]: control-side graph owner and its real-time half
//! - [`GraphTopology`]: edge list planned from a [`PluginCategory`] and the hardware format
//! - [`ParameterBank`] / [`ParameterBridge`]: lock-free parameter cells shared with a stage
//! - [`RenderStage`]: the contract every hosted render unit implements
//! - [`AudioSession`]: the platform audio session collaborator ([`OfflineSession`] for tests)
//!
//! # Threading
//!
//! Everything except [`Renderer::process`] and the render-side methods of
//! [`ParameterBridge`] belongs to the control context. The render path never
//! locks, allocates or frees; whole graphs are exchanged through two
//! single-producer/single-consumer ring buffers.
//!
//! # Example
//!
//! ```ignore
//! use plughost_core::*;
//!
//! let mut session = OfflineSession::new(AudioFormat::stereo(48000.0));
//! let (mut engine, renderer) =
//!     RenderEngine::new(EngineConfig::default(), session.hardware_format(), None)?;
//! session.attach(renderer);
//!
//! let topology = GraphTopology::plan(PluginCategory::Effect, StageId(1), session.hardware_format(), None);
//! engine.stage(topology, Some(stage))?;
//! engine.commit()?;
//! session.start()?;
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub use config::EngineConfig;

mod lockfree;
pub use lockfree::{AtomicFlag, AtomicFloat};

mod format;
pub use format::{AudioFormat, PluginCategory, StageRole};

pub mod parameter;
pub use parameter::{ParameterDescriptor, ParameterFlags, ParameterUnit};

mod bridge;
pub use bridge::{ParameterBank, ParameterBridge, ParameterSnapshot};

pub mod smooth;
pub use smooth::SmoothedValue;

pub mod render;
pub use render::{AudioBuffers, NoInput, PullInput, RenderError, RenderStage, StageError};

pub mod topology;
pub use topology::{Connection, GraphTopology, NodeId, StageId};

mod clip;
pub use clip::SourceClip;

mod engine;
pub use engine::{RenderEngine, Renderer};

pub mod session;
pub use session::{
    AudioSession, InterruptionPhase, OfflineSession, RouteChangeReason, SessionError,
    SessionEvent,
};
