//! The instantiation primitive.
//!
//! The platform provides instantiation as an opaque asynchronous call that
//! may run the plugin in a separate process. [`FactoryInstantiator`] stands
//! in for it with registered constructors; out-of-process requests run the
//! constructor on a blocking worker so a panic surfaces as a crashed process
//! rather than taking the host down.

use crate::descriptor::{ComponentSignature, PluginDescriptor};
use crate::error::{InstantiationError, InstantiationErrorKind};
use crate::view::ControlSurface;
use plughost_core::{ParameterBank, RenderStage};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Constructor for one component.
pub type StageFactory = Arc<
    dyn Fn(&PluginDescriptor) -> Result<Box<dyn RenderStage>, InstantiationError> + Send + Sync,
>;

pub trait Instantiator {
    /// Whether a component with `signature` is installed.
    fn has_component(&self, signature: &ComponentSignature) -> bool;

    fn instantiate(
        &self,
        descriptor: &PluginDescriptor,
        out_of_process: bool,
    ) -> impl Future<Output = Result<Box<dyn RenderStage>, InstantiationError>> + Send;

    /// Asks for the plugin's control surface. Best effort: `None` when the
    /// plugin has none. May never resolve; callers bound the wait.
    fn request_view(
        &self,
        _descriptor: &PluginDescriptor,
        _parameters: Option<Arc<ParameterBank>>,
    ) -> impl Future<Output = Option<ControlSurface>> + Send {
        std::future::ready(None)
    }
}

/// How [`FactoryInstantiator`] answers view requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewBehavior {
    /// A surface for plugins with a custom view, none otherwise.
    #[default]
    Immediate,
    /// As `Immediate`, after a delay.
    Delayed(Duration),
    /// The request never completes.
    Never,
}

/// Instantiates registered components through their factories.
#[derive(Clone, Default)]
pub struct FactoryInstantiator {
    factories: HashMap<ComponentSignature, StageFactory>,
    latency: Duration,
    view: ViewBehavior,
}

impl FactoryInstantiator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, signature: ComponentSignature, factory: F)
    where
        F: Fn(&PluginDescriptor) -> Result<Box<dyn RenderStage>, InstantiationError>
            + Send
            + Sync
            + 'static,
    {
        tracing::debug!(%signature, "component registered");
        self.factories.insert(signature, Arc::new(factory));
    }

    pub fn with<F>(mut self, signature: ComponentSignature, factory: F) -> Self
    where
        F: Fn(&PluginDescriptor) -> Result<Box<dyn RenderStage>, InstantiationError>
            + Send
            + Sync
            + 'static,
    {
        self.register(signature, factory);
        self
    }

    /// Delay added before every instantiation, modelling platform latency.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_view_behavior(mut self, view: ViewBehavior) -> Self {
        self.view = view;
        self
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for FactoryInstantiator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryInstantiator")
            .field("components", &self.factories.keys().collect::<Vec<_>>())
            .field("latency", &self.latency)
            .field("view", &self.view)
            .finish()
    }
}

impl Instantiator for FactoryInstantiator {
    fn has_component(&self, signature: &ComponentSignature) -> bool {
        self.factories.contains_key(signature)
    }

    fn instantiate(
        &self,
        descriptor: &PluginDescriptor,
        out_of_process: bool,
    ) -> impl Future<Output = Result<Box<dyn RenderStage>, InstantiationError>> + Send {
        let factory = self.factories.get(&descriptor.signature).cloned();
        let descriptor = descriptor.clone();
        let latency = self.latency;

        async move {
            let factory = factory
                .ok_or_else(|| InstantiationError::component_not_found(descriptor.signature))?;

            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }

            if out_of_process {
                tokio::task::spawn_blocking(move || factory(&descriptor))
                    .await
                    .map_err(|e| {
                        InstantiationError::new(InstantiationErrorKind::ProcessCrashed, e.to_string())
                    })?
            } else {
                factory(&descriptor)
            }
        }
    }

    fn request_view(
        &self,
        descriptor: &PluginDescriptor,
        parameters: Option<Arc<ParameterBank>>,
    ) -> impl Future<Output = Option<ControlSurface>> + Send {
        let surface = descriptor.has_custom_view.then(|| {
            let surface = ControlSurface::new(descriptor.name.clone()).with_size(400, 300);
            match parameters {
                Some(bank) => surface.with_parameters(bank),
                None => surface,
            }
        });
        let behavior = self.view;

        async move {
            match behavior {
                ViewBehavior::Immediate => {}
                ViewBehavior::Delayed(delay) => tokio::time::sleep(delay).await,
                ViewBehavior::Never => std::future::pending::<()>().await,
            }
            surface
        }
    }
}
