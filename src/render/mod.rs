//! Turning a timeline into sound.
//!
//! Rendering happens in two steps. [`schedule`] resolves every note to a
//! [`PlaybackInstruction`] without touching any audio device. A backend then
//! executes the plan:
//!
//! - [`LiveRenderer`] starts each instruction on an [`AudioOutput`] relative
//!   to its clock.
//! - [`OfflineRenderer`] mixes the plan into a stereo buffer, deterministically.
//!
//! Enable the `device` feature for [`device::DeviceOutput`], which plays
//! through the system's default output device.
//!
//! # Example
//!
//! ```rust,no_run
//! use utau_rs::render::{schedule, OfflineRenderer};
//! use utau_rs::voicebank::{AliasIndex, SampleStore};
//! use utau_rs::Timeline;
//!
//! let (aliases, samples) = (AliasIndex::new(), SampleStore::new());
//! let mut timeline = Timeline::new(120.0, 8)?;
//! timeline.add_note(0.0, 1.0, 60, "a")?;
//!
//! let plan = schedule(&timeline, &aliases, &samples);
//! println!("{} notes will sound", plan.len());
//!
//! let mixdown = OfflineRenderer::new(44100).render(&timeline, &aliases, &samples);
//! mixdown.write_wav(std::path::Path::new("render.wav"))?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#[cfg(feature = "device")]
pub mod device;
pub mod live;
pub mod offline;
pub mod scheduler;
mod voice;

pub use live::{AudioOutput, LiveRenderer, OutputError, ScheduledSource};
pub use offline::OfflineRenderer;
pub use scheduler::{schedule, PlaybackInstruction, MIN_NOTE_SECS};
