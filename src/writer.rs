//! RAFF writer: file header, chunks, terminal marker and raw markers.
//!
//! Writes are issued in call order and never buffered across calls. A failed
//! write leaves the stream partially written; there is no rollback.

use std::io::{ErrorKind, Write};

use log::debug;
use thiserror::Error;

use crate::format::{
    ChunkCode, ChunkHeader, ChunkMarkerHeader, CHUNK_HEADER_LEN, CODE_LEN, MARKER_HEADER_LEN,
    MAX_OCTET_COUNT, RAFF_MAGIC,
};

/// Errors produced by the RAFF writer.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not write everything: {0} octets requested")]
    ShortWrite(usize),
    #[error("payload of {0} octets does not fit a 32-bit octet count")]
    PayloadTooLarge(usize),
}

fn write_octets<W: Write + ?Sized>(out: &mut W, octets: &[u8]) -> Result<(), WriteError> {
    match out.write_all(octets) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::WriteZero => Err(WriteError::ShortWrite(octets.len())),
        Err(e) => Err(WriteError::Io(e)),
    }
}

/// Write the 9-octet file header. Must be the first thing in the stream.
pub fn write_file_header<W: Write + ?Sized>(out: &mut W) -> Result<(), WriteError> {
    write_octets(out, &RAFF_MAGIC)
}

/// Write one chunk: icon, name, big-endian payload length, payload.
///
/// The length is always taken from `payload`. Payloads longer than `u32::MAX`
/// are rejected before anything is written.
pub fn write_chunk<W: Write + ?Sized>(
    out: &mut W,
    icon: ChunkCode,
    name: ChunkCode,
    payload: &[u8],
) -> Result<(), WriteError> {
    if payload.len() as u64 > MAX_OCTET_COUNT {
        return Err(WriteError::PayloadTooLarge(payload.len()));
    }
    let header = ChunkHeader {
        icon,
        name,
        octet_count: payload.len() as u32,
    };
    debug!("writing chunk {} {} ({} octets)", icon.to_icon_string(), name, header.octet_count);
    write_octets(out, &header.to_bytes())?;
    write_octets(out, payload)
}

/// Write the explicit end-of-sequence marker: icon and name zero, no length field.
pub fn write_terminal_marker<W: Write + ?Sized>(out: &mut W) -> Result<(), WriteError> {
    write_octets(out, &ChunkMarkerHeader::TERMINAL.to_bytes())
}

/// Write a bare four-octet icon with nothing following it.
pub fn write_raw_marker<W: Write + ?Sized>(out: &mut W, icon: ChunkCode) -> Result<(), WriteError> {
    write_octets(out, icon.octets())
}

/// Streaming writer that owns its output and tracks how many octets it emitted.
pub struct RaffWriter<W: Write> {
    out: W,
    position: u64,
}

impl<W: Write> RaffWriter<W> {
    /// Take ownership of `out` and write the file header.
    pub fn new(mut out: W) -> Result<Self, WriteError> {
        write_file_header(&mut out)?;
        Ok(Self {
            out,
            position: RAFF_MAGIC.len() as u64,
        })
    }

    pub fn write_chunk(
        &mut self,
        icon: ChunkCode,
        name: ChunkCode,
        payload: &[u8],
    ) -> Result<(), WriteError> {
        write_chunk(&mut self.out, icon, name, payload)?;
        self.position += (CHUNK_HEADER_LEN + payload.len()) as u64;
        Ok(())
    }

    pub fn write_raw_marker(&mut self, icon: ChunkCode) -> Result<(), WriteError> {
        write_raw_marker(&mut self.out, icon)?;
        self.position += CODE_LEN as u64;
        Ok(())
    }

    /// Write the terminal marker, flush, and hand back the stream.
    pub fn finish(mut self) -> Result<W, WriteError> {
        write_terminal_marker(&mut self.out)?;
        self.position += MARKER_HEADER_LEN as u64;
        debug!("terminal marker written at {} octets", self.position);
        self.out.flush()?;
        Ok(self.out)
    }

    /// Total octets written so far, file header included.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Hand back the stream without writing a terminal marker.
    pub fn into_inner(self) -> W {
        self.out
    }
}
