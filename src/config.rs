use std::path::Path;

use derive_builder::Builder;
use serde::Deserialize;

use crate::render::offline::TAIL_SECS;
use crate::voicebank::LoadOptions;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Engine settings.
///
/// Every field has a default, so a JSON config only needs the keys it
/// changes:
///
/// ```json
/// { "sample_rate": 48000, "metadata_filename": "oto.ini" }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Builder)]
#[serde(default)]
#[builder(default)]
pub struct EngineConfig {
    /// Sample rate of offline renders.
    pub sample_rate: u32,
    /// Seconds of silence rendered after the last beat.
    pub tail_secs: f64,
    /// Timing metadata file name, matched case-insensitively.
    #[builder(setter(into))]
    pub metadata_filename: String,
    /// Audio extensions decoded when a voicebank has no metadata.
    pub audio_extensions: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            tail_secs: TAIL_SECS,
            metadata_filename: "oto.ini".to_string(),
            audio_extensions: vec!["wav".to_string()],
        }
    }
}

impl EngineConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            metadata_filename: self.metadata_filename.clone(),
            audio_extensions: self.audio_extensions.clone(),
        }
    }
}
