//! Graph wiring for one hosted stage.
//!
//! The graph has at most four nodes: an upstream source (the clip player),
//! the hosted stage, the main mixer and the hardware output. A topology is
//! always planned whole and replaces its predecessor whole.

use crate::format::{AudioFormat, PluginCategory, StageRole};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a hosted stage within the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StageId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeId {
    Source,
    Stage(StageId),
    Mixer,
    Output,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeId::Source => write!(f, "source"),
            NodeId::Stage(id) => write!(f, "stage#{}", id.0),
            NodeId::Mixer => write!(f, "mixer"),
            NodeId::Output => write!(f, "output"),
        }
    }
}

/// A directed edge carrying `format`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub source: NodeId,
    pub destination: NodeId,
    pub format: AudioFormat,
}

impl Connection {
    fn new(source: NodeId, destination: NodeId, format: AudioFormat) -> Self {
        Self {
            source,
            destination,
            format,
        }
    }
}

/// Ordered edge list, upstream first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphTopology {
    connections: Vec<Connection>,
}

impl GraphTopology {
    /// Wiring for a stage of `category`.
    ///
    /// - Effect / MusicEffect: `source -> stage -> mixer -> output`, in the
    ///   source's native format when known, otherwise the hardware format.
    /// - Instrument / Generator / MidiProcessor: `stage -> mixer -> output`,
    ///   stereo at the hardware sample rate.
    ///
    /// The mixer to output edge always carries the hardware format.
    pub fn plan(
        category: PluginCategory,
        stage: StageId,
        hardware: AudioFormat,
        source_format: Option<AudioFormat>,
    ) -> Self {
        let node = NodeId::Stage(stage);
        let mut connections = Vec::with_capacity(3);

        match category.role() {
            StageRole::Processor => {
                let format = source_format.unwrap_or(hardware);
                connections.push(Connection::new(NodeId::Source, node, format));
                connections.push(Connection::new(node, NodeId::Mixer, format));
            }
            StageRole::Generator => {
                let format = AudioFormat::stereo(hardware.sample_rate);
                connections.push(Connection::new(node, NodeId::Mixer, format));
            }
        }

        connections.push(Connection::new(NodeId::Mixer, NodeId::Output, hardware));
        Self { connections }
    }

    /// Pass-through wiring used when nothing is hosted: `source -> mixer -> output`.
    pub fn bypass(hardware: AudioFormat, source_format: Option<AudioFormat>) -> Self {
        Self {
            connections: vec![
                Connection::new(
                    NodeId::Source,
                    NodeId::Mixer,
                    source_format.unwrap_or(hardware),
                ),
                Connection::new(NodeId::Mixer, NodeId::Output, hardware),
            ],
        }
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// The hosted stage, if any edge references one.
    pub fn stage(&self) -> Option<StageId> {
        self.connections.iter().find_map(|c| match (c.source, c.destination) {
            (NodeId::Stage(id), _) | (_, NodeId::Stage(id)) => Some(id),
            _ => None,
        })
    }

    pub fn references(&self, node: NodeId) -> bool {
        self.connections
            .iter()
            .any(|c| c.source == node || c.destination == node)
    }

    pub fn has_source(&self) -> bool {
        self.references(NodeId::Source)
    }

    pub fn input_format(&self, node: NodeId) -> Option<AudioFormat> {
        self.connections
            .iter()
            .find(|c| c.destination == node)
            .map(|c| c.format)
    }

    pub fn output_format(&self, node: NodeId) -> Option<AudioFormat> {
        self.connections
            .iter()
            .find(|c| c.source == node)
            .map(|c| c.format)
    }

    /// Checks the edge list forms one chain ending at the output, with valid
    /// formats and no node feeding or being fed twice.
    pub fn validate(&self) -> Result<()> {
        let Some(last) = self.connections.last() else {
            return Err(Error::InvalidTopology("no connections".into()));
        };
        if last.source != NodeId::Mixer || last.destination != NodeId::Output {
            return Err(Error::InvalidTopology(
                "chain must end with mixer -> output".into(),
            ));
        }

        for (i, conn) in self.connections.iter().enumerate() {
            conn.format.validate()?;
            if conn.source == conn.destination {
                return Err(Error::InvalidTopology(format!(
                    "{} connected to itself",
                    conn.source
                )));
            }
            let rest = &self.connections[i + 1..];
            if rest.iter().any(|c| c.source == conn.source) {
                return Err(Error::InvalidTopology(format!(
                    "{} has two outgoing edges",
                    conn.source
                )));
            }
            if rest.iter().any(|c| c.destination == conn.destination) {
                return Err(Error::InvalidTopology(format!(
                    "{} has two incoming edges",
                    conn.destination
                )));
            }
            if let Some(next) = self.connections.get(i + 1) {
                if next.source != conn.destination {
                    return Err(Error::InvalidTopology(format!(
                        "{} -> {} does not continue from {}",
                        next.source, next.destination, conn.destination
                    )));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for GraphTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, conn) in self.connections.iter().enumerate() {
            if i == 0 {
                write!(f, "{}", conn.source)?;
            }
            write!(f, " -[{}]-> {}", conn.format, conn.destination)?;
        }
        Ok(())
    }
}
