use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use crate::SampleBuffer;

#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    #[error("WAV decode error: {0}")]
    Wav(#[from] hound::Error),
    #[error("Unsupported sample format: {0}")]
    Unsupported(String),
}

/// Turns the bytes of an audio asset into PCM samples.
pub trait AudioDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<SampleBuffer, DecodeError>;
}

/// Decoder for RIFF WAV assets, the format UTAU voicebanks ship in.
///
/// Handles 8/16/24/32-bit integer and 32-bit float samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct WavDecoder;

impl AudioDecoder for WavDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<SampleBuffer, DecodeError> {
        let mut reader = hound::WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();
        let channels = spec.channels as usize;
        if channels == 0 {
            return Err(DecodeError::Unsupported("zero channels".to_string()));
        }

        let interleaved: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => {
                if spec.bits_per_sample != 32 {
                    return Err(DecodeError::Unsupported(format!(
                        "{}-bit float",
                        spec.bits_per_sample
                    )));
                }
                reader.samples::<f32>().collect::<Result<_, _>>()?
            }
            hound::SampleFormat::Int => {
                if !matches!(spec.bits_per_sample, 8 | 16 | 24 | 32) {
                    return Err(DecodeError::Unsupported(format!(
                        "{}-bit integer",
                        spec.bits_per_sample
                    )));
                }
                let scale = (1u64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()?
            }
        };

        let frames = interleaved.len() / channels;
        let mut planar = vec![Vec::with_capacity(frames); channels];
        for frame in interleaved.chunks_exact(channels) {
            for (channel, &sample) in planar.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }

        Ok(SampleBuffer::new(spec.sample_rate, planar))
    }
}

/// Decoded voicebank assets keyed by container path.
///
/// Buffers are reference counted so scheduled playback can hold on to them
/// without copying; the store itself is never mutated once loading finishes.
#[derive(Debug, Clone, Default)]
pub struct SampleStore {
    buffers: HashMap<String, Arc<SampleBuffer>>,
}

impl SampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, asset_path: impl Into<String>, buffer: SampleBuffer) {
        self.buffers.insert(asset_path.into(), Arc::new(buffer));
    }

    pub fn get(&self, asset_path: &str) -> Option<&Arc<SampleBuffer>> {
        self.buffers.get(asset_path)
    }

    pub fn contains(&self, asset_path: &str) -> bool {
        self.buffers.contains_key(asset_path)
    }

    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// All asset paths in sorted order.
    pub fn asset_paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.buffers.keys().map(|s| s.as_str()).collect();
        paths.sort_unstable();
        paths
    }
}
