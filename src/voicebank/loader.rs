use std::collections::HashSet;

use super::alias::AliasIndex;
use super::container::Container;
use super::oto::{self, TimingRecord};
use super::samples::{AudioDecoder, SampleStore};

#[derive(thiserror::Error, Debug)]
pub enum VoicebankError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Entry '{0}' not found in voicebank")]
    EntryNotFound(String),
}

/// How a container is scanned for metadata and audio.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// File name of the timing metadata, matched case-insensitively against
    /// the end of each entry path.
    pub metadata_filename: String,
    /// Extensions (without the dot) decoded when no metadata is present.
    pub audio_extensions: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            metadata_filename: "oto.ini".to_string(),
            audio_extensions: vec!["wav".to_string()],
        }
    }
}

/// A loaded voicebank: the alias index plus every asset that decoded.
#[derive(Debug, Clone, Default)]
pub struct Voicebank {
    pub aliases: AliasIndex,
    pub samples: SampleStore,
}

/// Load a voicebank from a container.
///
/// Every metadata file found is parsed and its asset paths are rewritten
/// relative to the container root, so folders of a multi-folder voicebank do
/// not collide. Records from all metadata files are concatenated in encounter
/// order. If no records were found at all, every audio entry in the container
/// is decoded instead.
///
/// Assets that cannot be read or decoded are logged and left out; they never
/// abort the load.
pub fn load<C, D>(
    container: &mut C,
    decoder: &D,
    options: &LoadOptions,
) -> Result<Voicebank, VoicebankError>
where
    C: Container + ?Sized,
    D: AudioDecoder + ?Sized,
{
    let entries = container.list()?;
    let metadata_name = options.metadata_filename.to_lowercase();

    let mut records = Vec::new();
    let mut metadata_files = 0usize;
    for path in entries
        .iter()
        .filter(|p| p.to_lowercase().ends_with(&metadata_name))
    {
        let bytes = container.read(path)?;
        let text = String::from_utf8_lossy(&bytes);
        let dir = parent_dir(path);

        let parsed = oto::parse(&text);
        log::debug!("{path}: {} timing records", parsed.len());
        records.extend(parsed.into_iter().map(|record| TimingRecord {
            asset_path: format!("{dir}{}", record.asset_path),
            ..record
        }));
        metadata_files += 1;
    }

    let assets: Vec<String> = if records.is_empty() {
        if metadata_files == 0 {
            log::warn!("No {} found, decoding every audio file", options.metadata_filename);
        }
        entries
            .iter()
            .filter(|p| has_audio_extension(p, &options.audio_extensions))
            .cloned()
            .collect()
    } else {
        let mut seen = HashSet::new();
        records
            .iter()
            .filter(|r| seen.insert(r.asset_path.as_str()))
            .map(|r| r.asset_path.clone())
            .collect()
    };

    let mut samples = SampleStore::new();
    let mut failed = 0usize;
    for asset in &assets {
        let decoded = container
            .read(asset)
            .map_err(|e| e.to_string())
            .and_then(|bytes| decoder.decode(&bytes).map_err(|e| e.to_string()));
        match decoded {
            Ok(buffer) => samples.insert(asset.clone(), buffer),
            Err(e) => {
                log::warn!("Skipping {asset}: {e}");
                failed += 1;
            }
        }
    }

    let aliases = AliasIndex::from_records(records);
    log::info!(
        "Loaded voicebank: {} metadata files, {} records, {} aliases, {} samples ({} failed)",
        metadata_files,
        aliases.record_count(),
        aliases.len(),
        samples.len(),
        failed
    );

    Ok(Voicebank { aliases, samples })
}

/// The directory part of a container path, including its trailing `/`.
/// Empty for entries at the root.
fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |i| &path[..=i])
}

fn has_audio_extension(path: &str, extensions: &[String]) -> bool {
    path.rsplit_once('.')
        .map(|(_, ext)| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voicebank::container::MemoryContainer;
    use crate::voicebank::samples::WavDecoder;
    use crate::{wav, SampleBuffer};

    fn tone(frames: usize) -> Vec<u8> {
        let samples = (0..frames).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        wav::encode(&SampleBuffer::new(44100, vec![samples])).unwrap()
    }

    fn load_memory(container: &mut MemoryContainer) -> Voicebank {
        load(container, &WavDecoder, &LoadOptions::default()).unwrap()
    }

    #[test]
    fn prefixes_asset_paths_with_metadata_directory() {
        let mut container = MemoryContainer::new();
        container.insert("voice/oto.ini", "a.wav=la,100,50,-100,30,10");
        container.insert("voice/a.wav", tone(100));

        let bank = load_memory(&mut container);
        let record = bank.aliases.first("la").unwrap();
        assert_eq!(record.asset_path, "voice/a.wav");
        assert_eq!(record.alias, "la");
        assert_eq!(record.offset_ms, 100.0);
        assert!(bank.samples.contains("voice/a.wav"));
    }

    #[test]
    fn root_metadata_gets_no_prefix() {
        let mut container = MemoryContainer::new();
        container.insert("OTO.INI", "a.wav=la");
        container.insert("a.wav", tone(10));

        let bank = load_memory(&mut container);
        assert_eq!(bank.aliases.first("la").unwrap().asset_path, "a.wav");
        assert_eq!(bank.samples.len(), 1);
    }

    #[test]
    fn merges_multi_folder_voicebanks_in_encounter_order() {
        let mut container = MemoryContainer::new();
        container.insert("A/oto.ini", "la.wav=la,10\nli.wav=li");
        container.insert("A/la.wav", tone(10));
        container.insert("A/li.wav", tone(10));
        container.insert("B/oto.ini", "la.wav=la,20");
        container.insert("B/la.wav", tone(10));

        let bank = load_memory(&mut container);
        let la = bank.aliases.get("la");
        assert_eq!(la.len(), 2);
        assert_eq!(la[0].asset_path, "A/la.wav");
        assert_eq!(la[1].asset_path, "B/la.wav");
        assert_eq!(bank.samples.len(), 3);
    }

    #[test]
    fn decode_failures_do_not_abort_loading() {
        let mut container = MemoryContainer::new();
        container.insert("oto.ini", "good.wav=ga\nbad.wav=ba\nmissing.wav=mi");
        container.insert("good.wav", tone(10));
        container.insert("bad.wav", b"garbage".to_vec());

        let bank = load_memory(&mut container);
        assert_eq!(bank.aliases.len(), 3);
        assert_eq!(bank.samples.asset_paths(), vec!["good.wav"]);
    }

    #[test]
    fn only_referenced_assets_are_decoded() {
        let mut container = MemoryContainer::new();
        container.insert("oto.ini", "a.wav=a\na.wav=a2");
        container.insert("a.wav", tone(10));
        container.insert("unused.wav", tone(10));

        let bank = load_memory(&mut container);
        assert_eq!(bank.samples.asset_paths(), vec!["a.wav"]);
    }

    #[test]
    fn without_metadata_every_audio_file_is_decoded() {
        let mut container = MemoryContainer::new();
        container.insert("x/a.WAV", tone(10));
        container.insert("b.wav", tone(10));
        container.insert("readme.txt", "hello");

        let bank = load_memory(&mut container);
        assert!(bank.aliases.is_empty());
        assert_eq!(bank.samples.asset_paths(), vec!["b.wav", "x/a.WAV"]);
    }

    #[test]
    fn non_utf8_metadata_is_read_lossily() {
        let mut container = MemoryContainer::new();
        let mut ini = b"a.wav=a,5\n".to_vec();
        ini.extend_from_slice(&[0x82, 0xa0, b'.', b'w', b'a', b'v', b'=', 0x82, 0xa0, b'\n']);
        container.insert("oto.ini", ini);
        container.insert("a.wav", tone(10));

        let bank = load_memory(&mut container);
        assert_eq!(bank.aliases.record_count(), 2);
        assert_eq!(bank.aliases.first("a").unwrap().offset_ms, 5.0);
    }

    #[test]
    fn parent_dir_keeps_trailing_slash() {
        assert_eq!(parent_dir("voice/sub/oto.ini"), "voice/sub/");
        assert_eq!(parent_dir("oto.ini"), "");
    }
}
