//! Stream formats and plugin categories.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stream format carried by a graph connection.
///
/// Compared structurally: two connections are compatible only if sample
/// rate, channel count and interleaving all match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioFormat {
    pub sample_rate: f64,
    pub channels: u16,
    pub interleaved: bool,
}

impl AudioFormat {
    /// Deinterleaved float format, the layout every render stage processes.
    pub fn standard(sample_rate: f64, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            interleaved: false,
        }
    }

    pub fn stereo(sample_rate: f64) -> Self {
        Self::standard(sample_rate, 2)
    }

    pub fn validate(&self) -> Result<()> {
        if !(8000.0..=384000.0).contains(&self.sample_rate) {
            return Err(Error::InvalidFormat(format!(
                "sample_rate {} out of range (8000-384000 Hz)",
                self.sample_rate
            )));
        }
        if self.channels == 0 {
            return Err(Error::InvalidFormat("zero channels".into()));
        }
        Ok(())
    }

    #[inline]
    pub fn channel_count(&self) -> usize {
        self.channels as usize
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Hz/{} ch{}",
            self.sample_rate,
            self.channels,
            if self.interleaved { " interleaved" } else { "" }
        )
    }
}

/// How a stage sits in the signal chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageRole {
    /// Consumes an upstream source and produces processed output.
    Processor,
    /// Produces output on its own; nothing is connected upstream.
    Generator,
}

/// Plugin category. Drives graph wiring.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum PluginCategory {
    Effect,
    Instrument,
    MidiProcessor,
    MusicEffect,
    Generator,
}

impl PluginCategory {
    pub const ALL: [PluginCategory; 5] = [
        PluginCategory::Effect,
        PluginCategory::Instrument,
        PluginCategory::MidiProcessor,
        PluginCategory::MusicEffect,
        PluginCategory::Generator,
    ];

    /// Four-character component type code.
    pub fn type_code(&self) -> [u8; 4] {
        match self {
            PluginCategory::Effect => *b"aufx",
            PluginCategory::Instrument => *b"aumu",
            PluginCategory::MidiProcessor => *b"aumi",
            PluginCategory::MusicEffect => *b"aumf",
            PluginCategory::Generator => *b"augn",
        }
    }

    pub fn from_type_code(code: [u8; 4]) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.type_code() == code)
    }

    pub fn role(&self) -> StageRole {
        match self {
            PluginCategory::Effect | PluginCategory::MusicEffect => StageRole::Processor,
            PluginCategory::Instrument
            | PluginCategory::MidiProcessor
            | PluginCategory::Generator => StageRole::Generator,
        }
    }
}

impl fmt::Display for PluginCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PluginCategory::Effect => write!(f, "Effect"),
            PluginCategory::Instrument => write!(f, "Instrument"),
            PluginCategory::MidiProcessor => write!(f, "MIDI Processor"),
            PluginCategory::MusicEffect => write!(f, "Music Effect"),
            PluginCategory::Generator => write!(f, "Generator"),
        }
    }
}
