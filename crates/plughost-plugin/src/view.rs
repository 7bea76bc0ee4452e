//! Control surface handed out after a load.

use plughost_core::{ParameterBank, ParameterSnapshot};
use std::sync::Arc;

/// Handle to a plugin's control surface.
///
/// Presentation is out of scope: this only carries what a UI needs to reflect
/// the plugin, and polls parameter values rather than being notified, since
/// the render thread never calls back into the control context.
#[derive(Debug, Clone)]
pub struct ControlSurface {
    plugin_name: String,
    preferred_size: Option<(u32, u32)>,
    parameters: Option<Arc<ParameterBank>>,
}

impl ControlSurface {
    pub fn new(plugin_name: impl Into<String>) -> Self {
        Self {
            plugin_name: plugin_name.into(),
            preferred_size: None,
            parameters: None,
        }
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.preferred_size = Some((width, height));
        self
    }

    pub fn with_parameters(mut self, parameters: Arc<ParameterBank>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    pub fn preferred_size(&self) -> Option<(u32, u32)> {
        self.preferred_size
    }

    /// Current parameter values, sampled.
    pub fn poll(&self) -> Vec<ParameterSnapshot> {
        self.parameters
            .as_ref()
            .map(|bank| bank.snapshot())
            .unwrap_or_default()
    }
}
