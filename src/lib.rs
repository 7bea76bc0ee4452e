//! # plughost
//!
//! Hosts a single audio plugin inside a lock-free render graph and measures
//! how long each loading phase takes.
//!
//! ```ignore
//! use plughost::prelude::*;
//!
//! let builder = HostEngine::builder().source_wav("loop.wav");
//! let instantiator = builder.builtin_instantiator();
//! let mut host = builder.build_offline(instantiator, AudioFormat::stereo(48000.0))?;
//!
//! let timing = host.load_plugin(&GainEffect::descriptor(), true).await?;
//! println!("{}", timing.summary());
//!
//! host.start_playing()?;
//! host.set_parameter(0, 0.5)?;
//! ```
//!
//! ## Crates
//!
//! - [`core`]: render kernel (`RenderEngine`, `GraphTopology`, `ParameterBank`, sessions)
//! - [`plugin`]: plugin lifecycle (`LifecycleManager`, instantiation, `MetricsRecorder`)

pub mod error;
pub use error::{Error, Result};

mod config;
pub use config::HostConfig;

mod builder;
pub use builder::HostEngineBuilder;

mod engine;
pub use engine::HostEngine;

pub mod benchmark;
pub use benchmark::{BenchmarkConfig, BenchmarkReport};

pub use plughost_core as core;
pub use plughost_plugin as plugin;

pub mod prelude {
    // Host
    pub use crate::{BenchmarkConfig, HostEngine, HostEngineBuilder};

    // Formats and graph
    pub use crate::core::{AudioFormat, GraphTopology, NodeId, PluginCategory, SourceClip};

    // Sessions
    pub use crate::core::{AudioSession, OfflineSession, SessionEvent};

    // Plugins
    pub use crate::plugin::{
        effect::{BYPASS, GAIN},
        GainEffect, LifecycleState, LoadMetrics, PluginDescriptor, PluginRegistry,
    };

    pub use std::time::Duration;
}
