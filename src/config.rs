//! Host configuration.

use crate::Result;
use plughost_core::EngineConfig;
use plughost_plugin::LifecycleConfig;

/// Everything [`HostEngineBuilder`](crate::HostEngineBuilder) needs besides
/// the instantiator and the session.
#[derive(Debug, Clone, Default)]
pub struct HostConfig {
    pub engine: EngineConfig,
    pub lifecycle: LifecycleConfig,
}

impl HostConfig {
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()?;
        self.lifecycle.validate()?;
        Ok(())
    }
}
