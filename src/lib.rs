//! RAFF — reader and writer for a streaming, self-describing chunked binary container.
//!
//! A RAFF stream is a 9-octet magic header followed by chunks, each an icon
//! code, a name code, a big-endian octet count and that many payload octets.
//! The sequence ends at end of stream or at an explicit zero/zero terminal marker.
//!
//! This crate provides:
//! - **Format types** (`format`): `ChunkCode`, `ChunkHeader`, constants (`RAFF_MAGIC`, etc.).
//! - **Writer** (`writer`): `write_chunk` and friends, and the owning `RaffWriter`.
//! - **Reader** (`reader`): `read_chunk_header` and friends, and the owning `RaffReader`.
//! - **Packer** (`packer`, `manifest`): build a .raff from entries or a TOML manifest.
//! - **Viewer** (`view`): the listing behind `raff view`.

pub mod format;
#[cfg(feature = "serde")]
pub mod manifest;
pub mod packer;
pub mod reader;
#[cfg(feature = "serde")]
pub mod view;
pub mod writer;

pub use format::{
    Chunk, ChunkCode, ChunkHeader, ChunkMarkerHeader, ParseChunkCodeError, CHUNK_HEADER_LEN,
    MARKER_HEADER_LEN, RAFF_MAGIC,
};
#[cfg(feature = "serde")]
pub use manifest::{Manifest, ManifestError};
pub use packer::{pack_raff, PackEntry, PackError, PackOptions};
pub use reader::{
    read_chunk, read_chunk_header, read_chunk_marker_header, read_chunk_payload, read_file_header,
    read_marker, read_raw_marker, skip_chunk_payload, Expect, Marker, RaffReader, ReadError,
    Termination,
};
pub use writer::{
    write_chunk, write_file_header, write_raw_marker, write_terminal_marker, RaffWriter,
    WriteError,
};
