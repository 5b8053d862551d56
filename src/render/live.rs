use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::scheduler::PlaybackInstruction;
use crate::SampleBuffer;

#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    #[error("No output device found")]
    NoDevice,
    #[error("Audio device error: {0}")]
    Device(String),
    #[error("Output stream error: {0}")]
    Stream(String),
}

/// A buffer source to start on an audio output.
#[derive(Debug, Clone)]
pub struct ScheduledSource {
    pub buffer: Arc<SampleBuffer>,
    /// Absolute start time on the output clock, in seconds.
    pub when: f64,
    /// Read position in the buffer, in seconds.
    pub offset: f64,
    /// Time to play, in seconds. Always positive.
    pub duration: f64,
    pub gain: f32,
}

/// An audio sink with its own clock that plays buffers at future times.
pub trait AudioOutput {
    /// Current time of the output clock, in seconds.
    fn now(&self) -> f64;

    fn sample_rate(&self) -> u32;

    /// Start a one-shot source. It cannot be cancelled once started.
    fn start(&self, source: ScheduledSource) -> Result<(), OutputError>;
}

/// Plays scheduled instructions on an [`AudioOutput`] as they are issued.
///
/// Stopping is best effort: it only keeps new sources from being started.
/// Sources already handed to the output play to their end.
pub struct LiveRenderer<O> {
    output: O,
    stopped: AtomicBool,
}

impl<O: AudioOutput> LiveRenderer<O> {
    pub fn new(output: O) -> Self {
        Self {
            output,
            stopped: AtomicBool::new(false),
        }
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    /// Start every audible instruction relative to the output's current time.
    ///
    /// Returns the number of sources started. Instructions with a
    /// non-positive duration are left out, and a source the output refuses
    /// is logged without affecting the others.
    pub fn play(&self, instructions: &[PlaybackInstruction]) -> usize {
        let now = self.output.now();
        let mut started = 0;

        for instruction in instructions {
            if self.is_stopped() {
                log::debug!("Playback stopped, {} sources started", started);
                break;
            }
            if !instruction.is_audible() {
                continue;
            }

            let source = ScheduledSource {
                buffer: Arc::clone(&instruction.buffer),
                when: now + instruction.start_time_secs,
                offset: instruction.trim_in_secs,
                duration: instruction.duration_secs,
                gain: 1.0,
            };
            match self.output.start(source) {
                Ok(()) => started += 1,
                Err(e) => log::warn!("Failed to start note {}: {e}", instruction.note_id),
            }
        }

        started
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.stopped.store(false, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}
