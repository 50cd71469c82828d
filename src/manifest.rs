//! TOML pack manifest: which chunks go into a .raff file and where their payloads come from.
//!
//! ```toml
//! terminate = true
//!
//! [[chunk]]
//! icon = "🦊"   # exactly 4 UTF-8 octets, or 0x + 8 hex digits
//! name = "IMG1"
//! path = "img1.bin"  # relative to the manifest file
//!
//! [[chunk]]
//! icon = "TEXT"
//! name = "note"
//! text = "hello"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::format::{ChunkCode, ParseChunkCodeError};
use crate::packer::{PackEntry, PackOptions};

/// Errors produced while loading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid manifest: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("chunk {index}: {source}")]
    Code {
        index: usize,
        source: ParseChunkCodeError,
    },
    #[error("chunk {0}: exactly one of `path` or `text` is required")]
    Payload(usize),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawManifest {
    #[serde(default = "default_terminate")]
    terminate: bool,
    #[serde(default, rename = "chunk")]
    chunks: Vec<RawChunk>,
}

fn default_terminate() -> bool {
    PackOptions::default().terminate
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawChunk {
    icon: String,
    name: String,
    path: Option<PathBuf>,
    text: Option<String>,
}

/// A loaded manifest with payloads already read.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub options: PackOptions,
    pub entries: Vec<PackEntry>,
}

impl Manifest {
    /// Parse manifest text. Relative payload paths resolve against `base_dir`.
    pub fn parse(text: &str, base_dir: &Path) -> Result<Self, ManifestError> {
        let raw: RawManifest = toml::from_str(text)?;
        let entries = raw
            .chunks
            .into_iter()
            .enumerate()
            .map(|(index, chunk)| {
                let code = |s: &str| {
                    s.parse::<ChunkCode>()
                        .map_err(|source| ManifestError::Code { index, source })
                };
                let icon = code(&chunk.icon)?;
                let name = code(&chunk.name)?;
                let payload = match (chunk.path, chunk.text) {
                    (Some(path), None) => {
                        let path = base_dir.join(path);
                        fs::read(&path).map_err(|source| ManifestError::Io { path, source })?
                    }
                    (None, Some(text)) => text.into_bytes(),
                    _ => return Err(ManifestError::Payload(index)),
                };
                Ok(PackEntry {
                    icon,
                    name,
                    payload,
                })
            })
            .collect::<Result<Vec<_>, ManifestError>>()?;

        Ok(Self {
            options: PackOptions {
                terminate: raw.terminate,
            },
            entries,
        })
    }

    /// Load a manifest file; payload paths resolve against its directory.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ManifestError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::parse(&text, base_dir)
    }
}
