//! # utau-rs
//!
//! A Rust library for sample-based singing voice synthesis from UTAU-style
//! voicebanks.
//!
//! ## Features
//!
//! - **Voicebank loading**: `oto.ini` timing metadata from zip archives or folders,
//!   including multi-folder voicebanks
//! - **Note scheduling**: beat-based note events resolved to trimmed sample playback
//! - **Offline rendering**: deterministic stereo mixdown to 16-bit PCM WAV
//! - **Live playback**: scheduling against any audio clock, or the system audio
//!   device with the `device` feature
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! utau-rs = { version = "2026.10", features = ["device"] }
//! ```
//!
//! ```ignore
//! use std::path::PathBuf;
//! use utau_rs::Engine;
//!
//! let mut engine = Engine::new();
//! engine.load_voicebank(&PathBuf::from("voicebanks/teto.zip"))?;
//!
//! let timeline = engine.timeline_mut();
//! timeline.add_note(0.0, 1.0, 60, "a")?;
//! timeline.add_note(1.0, 1.0, 62, "ka")?;
//!
//! engine.render_to_file(&PathBuf::from("render.wav"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod engine;
pub mod render;
pub mod timeline;
pub mod voicebank;
pub mod wav;

pub use config::{EngineConfig, EngineConfigBuilder};
pub use engine::{Engine, EngineState};
pub use render::{schedule, PlaybackInstruction};
pub use timeline::{NoteEvent, NoteId, Timeline, TimelineError};
pub use voicebank::{AliasIndex, SampleStore, TimingRecord, Voicebank, VoicebankError};

use std::path::Path;

/// Decoded PCM audio, stored as one `f32` vector per channel.
///
/// Buffers are created once (by decoding an asset or by rendering) and then
/// only read. Voicebank samples are shared as `Arc<SampleBuffer>`.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl SampleBuffer {
    /// Build a buffer from per-channel sample data.
    ///
    /// Channels are truncated to the shortest one so every channel has the
    /// same frame count.
    pub fn new(sample_rate: u32, mut channels: Vec<Vec<f32>>) -> Self {
        let frames = channels.iter().map(Vec::len).min().unwrap_or(0);
        for channel in &mut channels {
            channel.truncate(frames);
        }
        Self {
            sample_rate,
            channels,
        }
    }

    /// A zero-filled buffer.
    pub fn silent(channels: usize, frames: usize, sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: vec![vec![0.0; frames]; channels],
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of sample frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }

    pub(crate) fn channels_mut(&mut self) -> &mut [Vec<f32>] {
        &mut self.channels
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Write the audio to a 16-bit PCM WAV file.
    pub fn write_wav(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        wav::write_file(self, path)?;
        Ok(())
    }
}
