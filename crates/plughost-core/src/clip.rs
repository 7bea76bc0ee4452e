//! Audio played by the source node.

use crate::format::AudioFormat;
use crate::{Error, Result};
use std::io::Read;
use std::path::Path;

/// Decoded, deinterleaved audio held in memory for the source node.
///
/// Its format is the "native source format" effect stages are wired with.
#[derive(Debug, Clone)]
pub struct SourceClip {
    format: AudioFormat,
    channels: Vec<Vec<f32>>,
}

impl SourceClip {
    /// Every channel must have the same length.
    pub fn from_channels(sample_rate: f64, channels: Vec<Vec<f32>>) -> Result<Self> {
        let Some(first) = channels.first() else {
            return Err(Error::InvalidFormat("clip has no channels".into()));
        };
        let frames = first.len();
        if channels.iter().any(|c| c.len() != frames) {
            return Err(Error::InvalidFormat("clip channels differ in length".into()));
        }
        let format = AudioFormat::standard(sample_rate, channels.len() as u16);
        format.validate()?;
        Ok(Self { format, channels })
    }

    pub fn open_wav(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let clip = Self::read_wav(hound::WavReader::open(path)?)?;
        tracing::debug!(path = %path.display(), format = %clip.format, frames = clip.frames(), "loaded source clip");
        Ok(clip)
    }

    pub fn read_wav<R: Read>(reader: hound::WavReader<R>) -> Result<Self> {
        let spec = reader.spec();
        let channel_count = spec.channels as usize;
        if channel_count == 0 {
            return Err(Error::InvalidFormat("WAV has no channels".into()));
        }

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .collect::<std::result::Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 * scale))
                    .collect::<std::result::Result<_, _>>()?
            }
        };

        let frames = interleaved.len() / channel_count;
        let mut channels = vec![Vec::with_capacity(frames); channel_count];
        for frame in interleaved.chunks_exact(channel_count) {
            for (ch, sample) in channels.iter_mut().zip(frame) {
                ch.push(*sample);
            }
        }

        Self::from_channels(spec.sample_rate as f64, channels)
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    pub fn frames(&self) -> usize {
        self.channels[0].len()
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
