use crate::error::SorterError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Extensions the ingestion layer accepts, lower-case and without the dot.
pub const SUPPORTED_EXTENSIONS: [&str; 4] = ["wav", "mp3", "aif", "aiff"];

/// The closed set of output buckets, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryId {
    Kicks,
    Snares,
    Hihats,
    Percussion,
    Bass,
    Sfx,
    Vocals,
    Other,
}

impl CategoryId {
    pub const ALL: [CategoryId; 8] = [
        CategoryId::Kicks,
        CategoryId::Snares,
        CategoryId::Hihats,
        CategoryId::Percussion,
        CategoryId::Bass,
        CategoryId::Sfx,
        CategoryId::Vocals,
        CategoryId::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryId::Kicks => "kicks",
            CategoryId::Snares => "snares",
            CategoryId::Hihats => "hihats",
            CategoryId::Percussion => "percussion",
            CategoryId::Bass => "bass",
            CategoryId::Sfx => "sfx",
            CategoryId::Vocals => "vocals",
            CategoryId::Other => "other",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CategoryId::Kicks => "Kicks",
            CategoryId::Snares => "Snares/Claps",
            CategoryId::Hihats => "Hi-Hats",
            CategoryId::Percussion => "Percussion",
            CategoryId::Bass => "Bass",
            CategoryId::Sfx => "SFX",
            CategoryId::Vocals => "Vocals",
            CategoryId::Other => "Other",
        }
    }

    /// Position in [`CategoryId::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryId {
    type Err = SorterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        CategoryId::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| SorterError::UnknownCategory(s.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub display_name: String,
    pub member_count: usize,
    pub selected: bool,
}

impl Category {
    pub fn new(id: CategoryId) -> Self {
        Self {
            id,
            display_name: id.display_name().to_string(),
            member_count: 0,
            selected: true,
        }
    }
}

/// A file handed to the core by the ingestion layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateFile {
    pub file_name: String,
    pub relative_path: Option<String>,
    pub size: u64,
    pub mtime: i64,
    /// Where the bytes live, when the caller has them on disk.
    pub location: Option<PathBuf>,
    /// blake3 digest, present when the scanner hashed the file.
    pub fingerprint: Option<String>,
}

impl CandidateFile {
    pub fn new(
        file_name: impl Into<String>,
        relative_path: Option<String>,
        size: u64,
        mtime: i64,
    ) -> Result<Self, SorterError> {
        let file_name = file_name.into();
        if file_name.trim().is_empty() || !is_supported_audio(Path::new(&file_name)) {
            return Err(SorterError::UnsupportedFile(file_name));
        }
        Ok(Self {
            file_name,
            relative_path: relative_path.filter(|p| !p.trim().is_empty()),
            size,
            mtime,
            location: None,
            fingerprint: None,
        })
    }

    pub fn with_location(mut self, location: PathBuf) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: Option<String>) -> Self {
        self.fingerprint = fingerprint;
        self
    }
}

pub fn is_supported_audio(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// Demo-only values shown next to a sample. Not derived from audio content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleMetadata {
    pub duration_seconds: f32,
    pub waveform: Vec<f32>,
    pub bpm: u32,
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleRecord {
    pub id: String,
    pub file_name: String,
    pub relative_path: Option<String>,
    pub size: u64,
    pub mtime: i64,
    pub location: Option<PathBuf>,
    pub category: CategoryId,
    pub metadata: SampleMetadata,
    #[serde(default)]
    pub playing: bool,
}
