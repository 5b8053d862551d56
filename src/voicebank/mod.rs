//! UTAU-style voicebank loading.
//!
//! A voicebank is a set of short WAV recordings plus one or more `oto.ini`
//! files describing where each recording starts and which alias (syllable or
//! phoneme) it sings.
//!
//! # Voicebank Layout
//!
//! ```text
//! teto.zip
//! ├── A3/
//! │   ├── oto.ini      # ka.wav=ka,45,120,-300,80,20
//! │   ├── ka.wav
//! │   └── ...
//! └── C4/
//!     ├── oto.ini
//!     └── ...
//! ```
//!
//! Filenames inside an `oto.ini` are relative to the folder holding it. After
//! loading, every [`TimingRecord::asset_path`] is relative to the container
//! root instead.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use utau_rs::voicebank::{load, LoadOptions, WavDecoder, ZipContainer};
//!
//! let mut container = ZipContainer::open(Path::new("teto.zip"))?;
//! let bank = load(&mut container, &WavDecoder, &LoadOptions::default())?;
//! println!("{} aliases, {} samples", bank.aliases.len(), bank.samples.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod alias;
pub mod container;
pub mod loader;
pub mod oto;
pub mod samples;

pub use alias::AliasIndex;
pub use container::{Container, DirContainer, MemoryContainer, ZipContainer};
pub use loader::{load, LoadOptions, Voicebank, VoicebankError};
pub use oto::{parse, TimingRecord};
pub use samples::{AudioDecoder, DecodeError, SampleStore, WavDecoder};
