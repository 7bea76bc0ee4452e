//! Error types for plughost-core.

use crate::format::AudioFormat;
use crate::topology::NodeId;
use thiserror::Error;

/// Error type for plughost-core operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid audio format: {0}")]
    InvalidFormat(String),

    #[error("Incompatible format on {source_node} -> {destination}: {format}")]
    IncompatibleFormat {
        source_node: NodeId,
        destination: NodeId,
        format: AudioFormat,
    },

    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    #[error("Render command queue full ({capacity} graphs in flight)")]
    QueueFull { capacity: usize },

    #[error("No staged graph to commit")]
    NothingStaged,

    #[error("Stage failed to allocate render resources: {0}")]
    Allocation(String),

    #[error("Audio session: {0}")]
    Session(#[from] crate::session::SessionError),

    #[error("Source clip: {0}")]
    Clip(#[from] hound::Error),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
