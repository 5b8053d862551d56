use std::path::Path;

use crate::config::EngineConfig;
use crate::render::{schedule, AudioOutput, LiveRenderer, OfflineRenderer, PlaybackInstruction};
use crate::timeline::Timeline;
use crate::voicebank::{
    self, AliasIndex, AudioDecoder, Container, DirContainer, SampleStore, Voicebank, WavDecoder,
    ZipContainer,
};
use crate::SampleBuffer;

/// Everything a render needs: the notes and the loaded voicebank.
///
/// States share nothing, so independent states can be scheduled and rendered
/// from different threads.
#[derive(Debug, Clone, Default)]
pub struct EngineState {
    pub timeline: Timeline,
    pub aliases: AliasIndex,
    pub samples: SampleStore,
}

impl EngineState {
    pub fn new(timeline: Timeline, voicebank: Voicebank) -> Self {
        Self {
            timeline,
            aliases: voicebank.aliases,
            samples: voicebank.samples,
        }
    }

    pub fn set_voicebank(&mut self, voicebank: Voicebank) {
        self.aliases = voicebank.aliases;
        self.samples = voicebank.samples;
    }

    pub fn schedule(&self) -> Vec<PlaybackInstruction> {
        schedule(&self.timeline, &self.aliases, &self.samples)
    }
}

/// Singing synthesis engine.
///
/// Owns an [`EngineState`] and the configuration used to load voicebanks
/// and render it.
///
/// # Quick Start
///
/// ```rust,no_run
/// use utau_rs::Engine;
/// use std::path::PathBuf;
///
/// let mut engine = Engine::new();
/// engine.load_voicebank(&PathBuf::from("voicebanks/teto"))?;
/// engine.timeline_mut().add_note(0.0, 2.0, 60, "a")?;
/// engine.render_to_file(&PathBuf::from("render.wav"))?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Engine {
    config: EngineConfig,
    decoder: Box<dyn AudioDecoder + Send + Sync>,
    state: EngineState,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create an engine with the default configuration and WAV decoder.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            decoder: Box::new(WavDecoder),
            state: EngineState::default(),
        }
    }

    /// Replace the decoder used for voicebank assets.
    pub fn with_decoder<D>(mut self, decoder: D) -> Self
    where
        D: AudioDecoder + Send + Sync + 'static,
    {
        self.decoder = Box::new(decoder);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut EngineState {
        &mut self.state
    }

    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.state.timeline
    }

    /// Load a voicebank from a `.zip` archive or an unpacked folder,
    /// replacing the current one.
    pub fn load_voicebank(&mut self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        if path.is_dir() {
            self.load_container(&mut DirContainer::new(path))
        } else {
            self.load_container(&mut ZipContainer::open(path)?)
        }
    }

    pub fn load_container<C>(&mut self, container: &mut C) -> Result<(), Box<dyn std::error::Error>>
    where
        C: Container + ?Sized,
    {
        let bank = voicebank::load(
            container,
            self.decoder.as_ref(),
            &self.config.load_options(),
        )?;
        self.state.set_voicebank(bank);
        Ok(())
    }

    /// Aliases of the loaded voicebank, sorted.
    pub fn list_aliases(&self) -> Vec<&str> {
        self.state.aliases.aliases()
    }

    pub fn schedule(&self) -> Vec<PlaybackInstruction> {
        self.state.schedule()
    }

    pub fn render_offline(&self) -> SampleBuffer {
        OfflineRenderer::new(self.config.sample_rate)
            .with_tail_secs(self.config.tail_secs)
            .render(&self.state.timeline, &self.state.aliases, &self.state.samples)
    }

    /// Render offline and write a 16-bit PCM WAV file.
    pub fn render_to_file(&self, wav_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let rendered = self.render_offline();
        log::info!(
            "Writing {:.2}s of audio to {}",
            rendered.duration_secs(),
            wav_path.display()
        );
        rendered.write_wav(wav_path)
    }

    /// Start the timeline on a live renderer. Returns the number of notes started.
    pub fn play<O: AudioOutput>(&self, renderer: &LiveRenderer<O>) -> usize {
        renderer.play(&self.schedule())
    }
}
