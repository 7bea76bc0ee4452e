//! Plugin lifecycle for plughost.
//!
//! Loads one render unit at a time into a [`plughost_core::RenderEngine`]:
//! find, instantiate (optionally out of process), connect, allocate, and an
//! optional control-surface request, each phase timed into [`LoadMetrics`].
//!
//! ## Usage
//!
//! ```ignore
//! use plughost_plugin::{LifecycleManager, LifecycleConfig, MetricsRecorder};
//!
//! let mut manager = LifecycleManager::new(engine, session, instantiator, LifecycleConfig::default());
//! let mut metrics = MetricsRecorder::new();
//!
//! let timing = manager.load(&descriptor, true, &mut metrics).await?;
//! println!("{}", timing.summary());
//!
//! manager.start_playing()?;
//! manager.set_parameter(0, 0.5)?;
//! ```

pub mod error;
pub use error::{HostError, InstantiationError, InstantiationErrorKind, LoadStage, Result};

mod descriptor;
pub use descriptor::{ComponentSignature, FourCharCode, PluginDescriptor};

pub mod discovery;
pub use discovery::{PluginRegistry, StaticRegistry};

mod view;
pub use view::ControlSurface;

pub mod instantiate;
pub use instantiate::{FactoryInstantiator, Instantiator, StageFactory, ViewBehavior};

mod instance;
pub use instance::{InstanceSlot, PluginInstance};

pub mod effect;
pub use effect::GainEffect;

mod metrics;
pub use metrics::{LoadMetrics, MetricsRecorder, MetricsSummary, HISTORY_CAPACITY};

pub mod lifecycle;
pub use lifecycle::{LifecycleConfig, LifecycleManager, LifecycleState};
