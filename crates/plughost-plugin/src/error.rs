//! Error types for plugin loading

use crate::lifecycle::LifecycleState;
use serde::Serialize;
use thiserror::Error;

/// Phase of a load attempt, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LoadStage {
    Find,
    Instantiate,
    ConnectGraph,
    AllocateResources,
    LoadView,
}

impl std::fmt::Display for LoadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadStage::Find => write!(f, "finding component"),
            LoadStage::Instantiate => write!(f, "creating instance"),
            LoadStage::ConnectGraph => write!(f, "connecting graph"),
            LoadStage::AllocateResources => write!(f, "allocating render resources"),
            LoadStage::LoadView => write!(f, "loading view"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstantiationErrorKind {
    ComponentNotFound,
    FormatNotSupported,
    MissingEntitlement,
    ProcessCrashed,
    Timeout,
    Other,
}

impl std::fmt::Display for InstantiationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstantiationErrorKind::ComponentNotFound => write!(f, "component not found"),
            InstantiationErrorKind::FormatNotSupported => write!(f, "format not supported"),
            InstantiationErrorKind::MissingEntitlement => write!(f, "missing entitlement"),
            InstantiationErrorKind::ProcessCrashed => write!(f, "plugin process crashed"),
            InstantiationErrorKind::Timeout => write!(f, "timed out"),
            InstantiationErrorKind::Other => write!(f, "instantiation failed"),
        }
    }
}

/// Failure reported by the instantiation primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstantiationError {
    pub kind: InstantiationErrorKind,
    /// Native status code, when the platform supplied one.
    pub status: Option<i32>,
    pub message: String,
}

impl InstantiationError {
    pub fn new(kind: InstantiationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(mut self, status: i32) -> Self {
        self.status = Some(status);
        self
    }

    pub fn format_not_supported(status: i32) -> Self {
        Self::new(
            InstantiationErrorKind::FormatNotSupported,
            "render unit rejected the stream format",
        )
        .with_status(status)
    }

    pub fn component_not_found(signature: impl std::fmt::Display) -> Self {
        Self::new(
            InstantiationErrorKind::ComponentNotFound,
            format!("no component registered for {signature}"),
        )
    }
}

impl std::fmt::Display for InstantiationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(status) = self.status {
            write!(f, " (status {status})")?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for InstantiationError {}

#[derive(Error, Debug)]
pub enum HostError {
    #[error("Plugin load failed at {stage} stage: {source}")]
    Instantiation {
        stage: LoadStage,
        #[source]
        source: InstantiationError,
    },

    #[error("Graph connection failed: {0}")]
    GraphConnection(#[source] plughost_core::Error),

    #[error("Resource allocation failed: {0}")]
    ResourceAllocation(#[source] plughost_core::Error),

    #[error("Cannot {operation} while {state}")]
    InvalidState {
        operation: &'static str,
        state: LifecycleState,
    },

    #[error("No plugin loaded")]
    NotLoaded,

    #[error("Unknown parameter address {0}")]
    UnknownParameter(u64),

    #[error("Parameter {0} is read-only")]
    ReadOnlyParameter(u64),

    #[error(transparent)]
    Core(#[from] plughost_core::Error),
}

impl HostError {
    /// The load phase the failure happened in, for load failures.
    pub fn stage(&self) -> Option<LoadStage> {
        match self {
            HostError::Instantiation { stage, .. } => Some(*stage),
            HostError::GraphConnection(_) => Some(LoadStage::ConnectGraph),
            HostError::ResourceAllocation(_) => Some(LoadStage::AllocateResources),
            _ => None,
        }
    }

    pub fn instantiation_kind(&self) -> Option<InstantiationErrorKind> {
        match self {
            HostError::Instantiation { source, .. } => Some(source.kind),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, HostError>;
