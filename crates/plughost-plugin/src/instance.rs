//! The active plugin and its single-slot owner.

use crate::descriptor::PluginDescriptor;
use crate::view::ControlSurface;
use plughost_core::{ParameterBank, StageId};
use std::sync::Arc;
use std::time::Instant;

/// Control-side handle to a live plugin.
///
/// The render stage itself belongs to the engine's graph; this keeps the
/// identity, the shared parameter bank and the optional control surface.
#[derive(Debug)]
pub struct PluginInstance {
    id: StageId,
    descriptor: PluginDescriptor,
    out_of_process: bool,
    parameters: Option<Arc<ParameterBank>>,
    view: Option<ControlSurface>,
    loaded_at: Instant,
}

impl PluginInstance {
    pub fn new(
        id: StageId,
        descriptor: PluginDescriptor,
        out_of_process: bool,
        parameters: Option<Arc<ParameterBank>>,
    ) -> Self {
        Self {
            id,
            descriptor,
            out_of_process,
            parameters,
            view: None,
            loaded_at: Instant::now(),
        }
    }

    pub fn id(&self) -> StageId {
        self.id
    }

    pub fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn is_out_of_process(&self) -> bool {
        self.out_of_process
    }

    pub fn parameters(&self) -> Option<&Arc<ParameterBank>> {
        self.parameters.as_ref()
    }

    pub fn view(&self) -> Option<&ControlSurface> {
        self.view.as_ref()
    }

    pub fn set_view(&mut self, view: ControlSurface) {
        self.view = Some(view);
    }

    pub fn loaded_at(&self) -> Instant {
        self.loaded_at
    }
}

/// Holds at most one [`PluginInstance`].
#[derive(Debug, Default)]
pub struct InstanceSlot {
    active: Option<PluginInstance>,
    next_id: u64,
}

impl InstanceSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh identity for the next instance. Never reused.
    pub fn allocate_id(&mut self) -> StageId {
        self.next_id += 1;
        StageId(self.next_id)
    }

    /// Installs `instance`, returning whatever it displaced.
    pub fn replace(&mut self, instance: PluginInstance) -> Option<PluginInstance> {
        self.active.replace(instance)
    }

    pub fn clear(&mut self) -> Option<PluginInstance> {
        self.active.take()
    }

    pub fn get(&self) -> Option<&PluginInstance> {
        self.active.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut PluginInstance> {
        self.active.as_mut()
    }

    pub fn is_occupied(&self) -> bool {
        self.active.is_some()
    }
}
