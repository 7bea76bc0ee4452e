//! Centralized error type for the plughost umbrella crate.
//!
//! Wraps the subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] plughost_core::Error),

    #[error("Plugin: {0}")]
    Host(#[from] plughost_plugin::HostError),

    #[error("No plugin named '{0}' in the registry")]
    PluginNotFound(String),

    #[error("No plugin registry configured")]
    NoRegistry,
}

impl Error {
    /// Load phase the failure happened in, for load failures.
    pub fn load_stage(&self) -> Option<plughost_plugin::LoadStage> {
        match self {
            Error::Host(e) => e.stage(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
