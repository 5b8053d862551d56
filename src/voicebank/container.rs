use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use super::loader::VoicebankError;

/// A read-only collection of files, addressed by `/`-separated paths.
pub trait Container {
    /// Paths of all file entries. Directories are not listed.
    fn list(&mut self) -> Result<Vec<String>, VoicebankError>;

    /// Read the full contents of one entry.
    fn read(&mut self, path: &str) -> Result<Vec<u8>, VoicebankError>;
}

/// A voicebank packaged as a zip archive.
pub struct ZipContainer<R> {
    archive: zip::ZipArchive<R>,
}

impl ZipContainer<File> {
    pub fn open(path: &Path) -> Result<Self, VoicebankError> {
        Self::new(File::open(path)?)
    }
}

impl<R: Read + Seek> ZipContainer<R> {
    pub fn new(reader: R) -> Result<Self, VoicebankError> {
        Ok(Self {
            archive: zip::ZipArchive::new(reader)?,
        })
    }
}

impl<R: Read + Seek> Container for ZipContainer<R> {
    fn list(&mut self) -> Result<Vec<String>, VoicebankError> {
        let mut paths = Vec::with_capacity(self.archive.len());
        for i in 0..self.archive.len() {
            let entry = self.archive.by_index(i)?;
            if entry.is_dir() || entry.name().ends_with('/') {
                continue;
            }
            paths.push(entry.name().to_string());
        }
        Ok(paths)
    }

    fn read(&mut self, path: &str) -> Result<Vec<u8>, VoicebankError> {
        let mut entry = match self.archive.by_name(path) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => {
                return Err(VoicebankError::EntryNotFound(path.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        let mut data = Vec::new();
        entry.read_to_end(&mut data)?;
        Ok(data)
    }
}

/// A voicebank unpacked into a folder on disk.
pub struct DirContainer {
    root: PathBuf,
}

impl DirContainer {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    fn walk(&self, dir: &Path, prefix: &str, out: &mut Vec<String>) -> std::io::Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(dir)?.collect::<Result<_, _>>()?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let name = entry.file_name().to_string_lossy().into_owned();
            let relative = format!("{prefix}{name}");
            if entry.file_type()?.is_dir() {
                self.walk(&entry.path(), &format!("{relative}/"), out)?;
            } else {
                out.push(relative);
            }
        }
        Ok(())
    }
}

impl Container for DirContainer {
    fn list(&mut self) -> Result<Vec<String>, VoicebankError> {
        let mut paths = Vec::new();
        self.walk(&self.root, "", &mut paths)?;
        Ok(paths)
    }

    fn read(&mut self, path: &str) -> Result<Vec<u8>, VoicebankError> {
        let full = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |acc, segment| acc.join(segment));
        match std::fs::read(&full) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(VoicebankError::EntryNotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Entries held in memory, listed in path order.
#[derive(Debug, Clone, Default)]
pub struct MemoryContainer {
    entries: BTreeMap<String, Vec<u8>>,
}

impl MemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, data: impl Into<Vec<u8>>) {
        self.entries.insert(path.into(), data.into());
    }
}

impl Container for MemoryContainer {
    fn list(&mut self) -> Result<Vec<String>, VoicebankError> {
        Ok(self.entries.keys().cloned().collect())
    }

    fn read(&mut self, path: &str) -> Result<Vec<u8>, VoicebankError> {
        self.entries
            .get(path)
            .cloned()
            .ok_or_else(|| VoicebankError::EntryNotFound(path.to_string()))
    }
}
