//! RAFF binary format types and constants.
//!
//! Defines the file header magic, the four-octet chunk codes and the chunk
//! header layout. All multi-octet integers are big-endian.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Magic octets at the start of every RAFF stream: 🦊 "RAFF" '\n'.
pub const RAFF_MAGIC: [u8; 9] = [0xF0, 0x9F, 0xA6, 0x8A, b'R', b'A', b'F', b'F', 0x0A];

/// Size of a chunk code (icon or name) on the wire.
pub const CODE_LEN: usize = 4;

/// Size of a marker header: icon (4) + name (4).
pub const MARKER_HEADER_LEN: usize = CODE_LEN * 2;

/// Size of a full chunk header: icon (4) + name (4) + octet count (4).
pub const CHUNK_HEADER_LEN: usize = MARKER_HEADER_LEN + 4;

/// Largest payload a single chunk can describe.
pub const MAX_OCTET_COUNT: u64 = u32::MAX as u64;

/// Four-octet code used for both the icon and the name of a chunk.
///
/// The octets are stored in wire order, so the numeric view is the
/// big-endian interpretation and the textual views read the octets as-is.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChunkCode([u8; CODE_LEN]);

impl ChunkCode {
    /// The all-zero code. Icon and name both zero form the terminal marker.
    pub const ZERO: ChunkCode = ChunkCode([0; CODE_LEN]);

    #[must_use]
    pub const fn new(octets: [u8; CODE_LEN]) -> Self {
        Self(octets)
    }

    #[must_use]
    pub const fn from_u32(value: u32) -> Self {
        Self(value.to_be_bytes())
    }

    #[must_use]
    pub const fn to_u32(self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    #[must_use]
    pub const fn octets(&self) -> &[u8; CODE_LEN] {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0; CODE_LEN]
    }

    /// Icon view: the octets decoded as UTF-8, so a four-octet emoji renders as one glyph.
    #[must_use]
    pub fn to_icon_string(&self) -> String {
        String::from_utf8_lossy(&self.0).into_owned()
    }

    /// Name view: one character per octet.
    #[must_use]
    pub fn to_name_string(&self) -> String {
        self.0.iter().map(|&b| char::from(b)).collect()
    }
}

impl From<[u8; CODE_LEN]> for ChunkCode {
    fn from(octets: [u8; CODE_LEN]) -> Self {
        Self(octets)
    }
}

impl From<u32> for ChunkCode {
    fn from(value: u32) -> Self {
        Self::from_u32(value)
    }
}

impl From<ChunkCode> for u32 {
    fn from(code: ChunkCode) -> Self {
        code.to_u32()
    }
}

/// Error returned when text cannot be turned into a [`ChunkCode`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid chunk code {0:?}: expected exactly 4 octets or 0x followed by 8 hex digits")]
pub struct ParseChunkCodeError(pub String);

impl FromStr for ChunkCode {
    type Err = ParseChunkCodeError;

    /// Accepts either exactly four UTF-8 octets ("PICT", "🖼") or a hex literal ("0x50494354").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            if hex.len() == 8 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                if let Ok(value) = u32::from_str_radix(hex, 16) {
                    return Ok(Self::from_u32(value));
                }
            }
            return Err(ParseChunkCodeError(s.to_string()));
        }
        let octets: [u8; CODE_LEN] = s
            .as_bytes()
            .try_into()
            .map_err(|_| ParseChunkCodeError(s.to_string()))?;
        Ok(Self(octets))
    }
}

impl fmt::Display for ChunkCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_name_string())
    }
}

impl fmt::Debug for ChunkCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkCode({:#010x} {:?})", self.to_u32(), self.to_name_string())
    }
}

/// Icon and name of a chunk, as read before the octet count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChunkMarkerHeader {
    pub icon: ChunkCode,
    pub name: ChunkCode,
}

impl ChunkMarkerHeader {
    /// The explicit end-of-sequence marker (icon and name both zero).
    pub const TERMINAL: ChunkMarkerHeader = ChunkMarkerHeader {
        icon: ChunkCode::ZERO,
        name: ChunkCode::ZERO,
    };

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.icon.is_zero() && self.name.is_zero()
    }

    /// Wire encoding: icon then name.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; MARKER_HEADER_LEN] {
        let mut buf = [0u8; MARKER_HEADER_LEN];
        buf[..CODE_LEN].copy_from_slice(self.icon.octets());
        buf[CODE_LEN..].copy_from_slice(self.name.octets());
        buf
    }

    #[must_use]
    pub fn from_bytes(buf: &[u8; MARKER_HEADER_LEN]) -> Self {
        let mut icon = [0u8; CODE_LEN];
        let mut name = [0u8; CODE_LEN];
        icon.copy_from_slice(&buf[..CODE_LEN]);
        name.copy_from_slice(&buf[CODE_LEN..]);
        Self {
            icon: ChunkCode(icon),
            name: ChunkCode(name),
        }
    }
}

/// Header preceding every chunk payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChunkHeader {
    pub icon: ChunkCode,
    pub name: ChunkCode,
    /// Exact payload length in octets.
    pub octet_count: u32,
}

impl ChunkHeader {
    #[must_use]
    pub fn marker(&self) -> ChunkMarkerHeader {
        ChunkMarkerHeader {
            icon: self.icon,
            name: self.name,
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.marker().is_terminal()
    }

    /// Wire encoding: icon, name, big-endian octet count.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; CHUNK_HEADER_LEN] {
        let mut buf = [0u8; CHUNK_HEADER_LEN];
        buf[..MARKER_HEADER_LEN].copy_from_slice(&self.marker().to_bytes());
        buf[MARKER_HEADER_LEN..].copy_from_slice(&self.octet_count.to_be_bytes());
        buf
    }
}

/// A chunk header together with its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub header: ChunkHeader,
    pub payload: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_numeric_view_is_big_endian() {
        let code: ChunkCode = "PICT".parse().unwrap();
        assert_eq!(code.to_u32(), 0x5049_4354);
        assert_eq!(ChunkCode::from_u32(0x5049_4354), code);
        assert_eq!(code.to_name_string(), "PICT");
    }

    #[test]
    fn code_icon_view_decodes_emoji() {
        let code = ChunkCode::new([0xF0, 0x9F, 0xA6, 0x8A]);
        assert_eq!(code.to_icon_string(), "🦊");
        assert_eq!(code.to_name_string().chars().count(), 4);
    }

    #[test]
    fn code_parse_rejects_wrong_length() {
        assert!("PIC".parse::<ChunkCode>().is_err());
        assert!("PICTS".parse::<ChunkCode>().is_err());
        assert!("0x1234".parse::<ChunkCode>().is_err());
        assert_eq!("0x00000001".parse::<ChunkCode>().unwrap().to_u32(), 1);
    }

    #[test]
    fn header_layout() {
        let header = ChunkHeader {
            icon: "PICT".parse().unwrap(),
            name: "IMG1".parse().unwrap(),
            octet_count: 3,
        };
        assert_eq!(&header.to_bytes(), b"PICTIMG1\x00\x00\x00\x03");
        assert!(!header.is_terminal());
        assert!(ChunkMarkerHeader::TERMINAL.is_terminal());
    }
}
