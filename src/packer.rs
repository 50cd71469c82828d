//! RAFF packer: build a .raff stream from (icon, name, payload) entries.
//!
//! Used by `raff pack`. Writes file header + chunks + optional terminal marker.

use std::io::Write;

use log::debug;
use thiserror::Error;

use crate::format::{ChunkCode, MARKER_HEADER_LEN};
use crate::writer::{RaffWriter, WriteError};

/// Errors produced by the packer.
#[derive(Debug, Error)]
pub enum PackError {
    #[error(transparent)]
    Write(#[from] WriteError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("icon and name both zero would read as the terminal marker (entry {0})")]
    ReservedCode(usize),
}

/// One chunk to pack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackEntry {
    pub icon: ChunkCode,
    pub name: ChunkCode,
    pub payload: Vec<u8>,
}

/// Options for building a .raff stream.
#[derive(Debug, Clone)]
pub struct PackOptions {
    /// If true, end the chunk sequence with an explicit terminal marker.
    pub terminate: bool,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self { terminate: true }
    }
}

/// Build a .raff stream from `entries`, in order. Returns the number of octets written.
///
/// Entries with icon and name both zero are refused, since a reader would stop there.
pub fn pack_raff<W: Write>(
    out: &mut W,
    entries: &[PackEntry],
    options: &PackOptions,
) -> Result<u64, PackError> {
    if let Some(index) = entries
        .iter()
        .position(|e| e.icon.is_zero() && e.name.is_zero())
    {
        return Err(PackError::ReservedCode(index));
    }

    let mut writer = RaffWriter::new(&mut *out)?;
    for entry in entries {
        writer.write_chunk(entry.icon, entry.name, &entry.payload)?;
    }

    let written = if options.terminate {
        let written = writer.position() + MARKER_HEADER_LEN as u64;
        writer.finish()?;
        written
    } else {
        let written = writer.position();
        writer.into_inner().flush()?;
        written
    };
    debug!("packed {} chunks into {} octets", entries.len(), written);
    Ok(written)
}
