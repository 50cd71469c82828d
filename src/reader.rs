//! RAFF reader: validate the file header, then pull chunk headers one at a time.
//!
//! Does not interpret payload contents. After each header the payload must be
//! read or skipped in full before the next header is requested; [`RaffReader`]
//! enforces this, the free functions leave it to the caller.

use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use log::{debug, info};
use thiserror::Error;

use crate::format::{
    Chunk, ChunkCode, ChunkHeader, ChunkMarkerHeader, CHUNK_HEADER_LEN, CODE_LEN,
    MARKER_HEADER_LEN, RAFF_MAGIC,
};

/// Errors produced by the RAFF reader.
///
/// [`ReadError::EndOfStream`] is the clean termination signal; every other
/// variant means the stream is broken.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("unexpected file header")]
    Format,
    #[error("end of stream")]
    EndOfStream,
    #[error("truncated read: expected {expected} octets, got {actual}")]
    Truncated { expected: u64, actual: u64 },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("payload size mismatch: declared {declared} octets, buffer holds {actual}")]
    PayloadSizeMismatch { declared: u32, actual: usize },
    #[error("no chunk payload is pending")]
    NoPendingPayload,
    #[error("reader stopped after an earlier error")]
    Failed,
}

impl ReadError {
    /// True for the clean end-of-stream signal.
    #[must_use]
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, ReadError::EndOfStream)
    }

    /// False for caller mistakes that leave the stream untouched.
    fn breaks_stream(&self) -> bool {
        !matches!(
            self,
            ReadError::NoPendingPayload | ReadError::PayloadSizeMismatch { .. }
        )
    }
}

/// Read until `buf` is full or the stream is exhausted. Returns octets read.
fn read_full<R: Read + ?Sized>(input: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match input.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Fill `buf` exactly. Nothing read at all is `EndOfStream`, a partial fill is `Truncated`.
fn read_field<R: Read + ?Sized>(input: &mut R, buf: &mut [u8]) -> Result<(), ReadError> {
    match read_full(input, buf)? {
        0 if !buf.is_empty() => Err(ReadError::EndOfStream),
        n if n < buf.len() => Err(ReadError::Truncated {
            expected: buf.len() as u64,
            actual: n as u64,
        }),
        _ => Ok(()),
    }
}

/// Read the 9-octet file header and compare it against [`RAFF_MAGIC`].
pub fn read_file_header<R: Read + ?Sized>(input: &mut R) -> Result<(), ReadError> {
    let mut magic = [0u8; RAFF_MAGIC.len()];
    let n = read_full(input, &mut magic)?;
    if n != magic.len() || magic != RAFF_MAGIC {
        return Err(ReadError::Format);
    }
    Ok(())
}

/// Read icon and name (8 octets).
pub fn read_chunk_marker_header<R: Read + ?Sized>(
    input: &mut R,
) -> Result<ChunkMarkerHeader, ReadError> {
    let mut buf = [0u8; MARKER_HEADER_LEN];
    read_field(input, &mut buf)?;
    Ok(ChunkMarkerHeader::from_bytes(&buf))
}

/// Read a full chunk header.
///
/// A terminal marker has no length field: it comes back with an octet count of
/// zero and nothing past its 8 octets is consumed.
pub fn read_chunk_header<R: Read + ?Sized>(input: &mut R) -> Result<ChunkHeader, ReadError> {
    let marker = read_chunk_marker_header(input)?;
    if marker.is_terminal() {
        return Ok(ChunkHeader {
            icon: marker.icon,
            name: marker.name,
            octet_count: 0,
        });
    }

    let mut count = [0u8; 4];
    match read_field(input, &mut count) {
        Ok(()) => {}
        Err(ReadError::EndOfStream) => {
            return Err(ReadError::Truncated {
                expected: count.len() as u64,
                actual: 0,
            })
        }
        Err(e) => return Err(e),
    }
    Ok(ChunkHeader {
        icon: marker.icon,
        name: marker.name,
        octet_count: u32::from_be_bytes(count),
    })
}

/// Read exactly `octet_count` payload octets into a fresh buffer.
pub fn read_chunk_payload<R: Read + ?Sized>(
    input: &mut R,
    octet_count: u32,
) -> Result<Vec<u8>, ReadError> {
    // Grow as data arrives; a corrupt count must not allocate gigabytes up front.
    let mut payload = Vec::with_capacity((octet_count as usize).min(64 * 1024));
    Read::take(&mut *input, u64::from(octet_count)).read_to_end(&mut payload)?;
    if payload.len() < octet_count as usize {
        return Err(ReadError::Truncated {
            expected: u64::from(octet_count),
            actual: payload.len() as u64,
        });
    }
    if payload.len() != octet_count as usize {
        return Err(ReadError::PayloadSizeMismatch {
            declared: octet_count,
            actual: payload.len(),
        });
    }
    Ok(payload)
}

/// Read a chunk header and its payload. A terminal marker comes back with an empty payload.
pub fn read_chunk<R: Read + ?Sized>(input: &mut R) -> Result<Chunk, ReadError> {
    let header = read_chunk_header(input)?;
    if header.is_terminal() {
        return Ok(Chunk {
            header,
            payload: Vec::new(),
        });
    }
    let payload = read_chunk_payload(input, header.octet_count)?;
    Ok(Chunk { header, payload })
}

/// Advance the stream by exactly `octet_count` octets without keeping them.
pub fn skip_chunk_payload<R: Read + ?Sized>(
    input: &mut R,
    octet_count: u32,
) -> Result<(), ReadError> {
    let skipped = io::copy(&mut Read::take(&mut *input, u64::from(octet_count)), &mut io::sink())?;
    if skipped != u64::from(octet_count) {
        return Err(short_skip(skipped, octet_count));
    }
    Ok(())
}

fn short_skip(available: u64, octet_count: u32) -> ReadError {
    ReadError::Io(io::Error::new(
        ErrorKind::UnexpectedEof,
        format!("could not skip payload: {available} of {octet_count} octets available"),
    ))
}

/// Read a bare four-octet icon.
pub fn read_raw_marker<R: Read + ?Sized>(input: &mut R) -> Result<ChunkCode, ReadError> {
    let mut icon = [0u8; CODE_LEN];
    read_field(input, &mut icon)?;
    Ok(ChunkCode::new(icon))
}

/// Which wire shape the caller expects next. Both begin with an icon, so the
/// shape cannot be sniffed from the octets themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    /// Full chunk header (icon, name, octet count).
    Chunk,
    /// Bare four-octet icon.
    Raw,
}

/// Result of [`read_marker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Chunk(ChunkHeader),
    Raw(ChunkCode),
}

/// Read whichever shape the framing above says comes next.
pub fn read_marker<R: Read + ?Sized>(input: &mut R, expect: Expect) -> Result<Marker, ReadError> {
    match expect {
        Expect::Chunk => read_chunk_header(input).map(Marker::Chunk),
        Expect::Raw => read_raw_marker(input).map(Marker::Raw),
    }
}

/// How a chunk sequence ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The stream ran out exactly on a chunk boundary.
    EndOfStream,
    /// An explicit zero icon / zero name marker was read.
    TerminalMarker,
}

/// Seek-based payload skipping for streams whose length is known.
struct SeekSkip<R> {
    advance: fn(&mut R, u32) -> io::Result<()>,
    /// Stream length counted from the first magic octet.
    stream_len: u64,
}

/// RAFF reader: validates the file header and walks chunks in order.
///
/// After any error that leaves the stream in an unknown state, every further
/// call fails with [`ReadError::Failed`] instead of reporting a clean end.
pub struct RaffReader<R: Read> {
    input: R,
    /// Offset of the next unread octet from the start of the stream.
    position: u64,
    /// Octet count of the payload following the last header, if not yet consumed.
    pending: Option<u32>,
    termination: Option<Termination>,
    failed: bool,
    seek: Option<SeekSkip<R>>,
}

impl RaffReader<BufReader<File>> {
    /// Open a RAFF file and validate its header. Skipped payloads are seeked over.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ReadError> {
        let file = File::open(path)?;
        let stream_len = file.metadata()?.len();
        let mut reader = Self::new(BufReader::new(file))?;
        reader.seek = Some(SeekSkip {
            advance: |input: &mut BufReader<File>, n: u32| input.seek_relative(i64::from(n)),
            stream_len,
        });
        Ok(reader)
    }
}

impl<R: Read + Seek> RaffReader<R> {
    /// Like [`RaffReader::new`], but skipped payloads are seeked over instead of read.
    ///
    /// The stream may start anywhere; its remaining length is measured once up front.
    pub fn new_seekable(mut input: R) -> Result<Self, ReadError> {
        let start = input.stream_position()?;
        let end = input.seek(SeekFrom::End(0))?;
        input.seek(SeekFrom::Start(start))?;
        let mut reader = Self::new(input)?;
        reader.seek = Some(SeekSkip {
            advance: |input: &mut R, n: u32| {
                input.seek(SeekFrom::Current(i64::from(n))).map(|_| ())
            },
            stream_len: end.saturating_sub(start),
        });
        Ok(reader)
    }
}

impl<R: Read> RaffReader<R> {
    /// Take ownership of `input` and validate the file header.
    pub fn new(mut input: R) -> Result<Self, ReadError> {
        read_file_header(&mut input)?;
        Ok(Self {
            input,
            position: RAFF_MAGIC.len() as u64,
            pending: None,
            termination: None,
            failed: false,
            seek: None,
        })
    }

    /// Refuse to continue after a stream error; remember new ones.
    fn guarded<T>(
        &mut self,
        op: impl FnOnce(&mut Self) -> Result<T, ReadError>,
    ) -> Result<T, ReadError> {
        if self.failed {
            return Err(ReadError::Failed);
        }
        let result = op(self);
        if let Err(e) = &result {
            if e.breaks_stream() {
                self.failed = true;
            }
        }
        result
    }

    /// Next chunk header, or `None` once the sequence has ended cleanly.
    ///
    /// A payload left unconsumed from the previous header is skipped first.
    pub fn next_header(&mut self) -> Result<Option<ChunkHeader>, ReadError> {
        self.guarded(Self::read_next_header)
    }

    fn read_next_header(&mut self) -> Result<Option<ChunkHeader>, ReadError> {
        if self.termination.is_some() {
            return Ok(None);
        }
        if self.pending.is_some() {
            self.skip_pending()?;
        }

        let header = match read_chunk_header(&mut self.input) {
            Ok(header) => header,
            Err(ReadError::EndOfStream) => {
                info!("encountered end of stream at {:#x}", self.position);
                self.termination = Some(Termination::EndOfStream);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        if header.is_terminal() {
            info!("found terminal marker at {:#x}", self.position);
            self.position += MARKER_HEADER_LEN as u64;
            self.termination = Some(Termination::TerminalMarker);
            return Ok(None);
        }

        debug!(
            "chunk {} {} ({} octets) at {:#x}",
            header.icon.to_icon_string(),
            header.name,
            header.octet_count,
            self.position
        );
        self.position += CHUNK_HEADER_LEN as u64;
        self.pending = Some(header.octet_count);
        Ok(Some(header))
    }

    /// Read the payload of the last header into a fresh buffer.
    pub fn read_payload(&mut self) -> Result<Vec<u8>, ReadError> {
        self.guarded(Self::read_pending)
    }

    fn read_pending(&mut self) -> Result<Vec<u8>, ReadError> {
        let octet_count = self.pending.take().ok_or(ReadError::NoPendingPayload)?;
        let payload = read_chunk_payload(&mut self.input, octet_count)?;
        self.position += u64::from(octet_count);
        Ok(payload)
    }

    /// Read the payload of the last header into `buf`, which must be exactly its size.
    pub fn read_payload_into(&mut self, buf: &mut [u8]) -> Result<(), ReadError> {
        self.guarded(|reader| reader.read_pending_into(buf))
    }

    fn read_pending_into(&mut self, buf: &mut [u8]) -> Result<(), ReadError> {
        let octet_count = self.pending.ok_or(ReadError::NoPendingPayload)?;
        if buf.len() != octet_count as usize {
            return Err(ReadError::PayloadSizeMismatch {
                declared: octet_count,
                actual: buf.len(),
            });
        }
        self.pending = None;
        let n = read_full(&mut self.input, buf)?;
        if n != buf.len() {
            return Err(ReadError::Truncated {
                expected: u64::from(octet_count),
                actual: n as u64,
            });
        }
        self.position += u64::from(octet_count);
        Ok(())
    }

    /// Skip the payload of the last header.
    pub fn skip_payload(&mut self) -> Result<(), ReadError> {
        self.guarded(Self::skip_pending)
    }

    fn skip_pending(&mut self) -> Result<(), ReadError> {
        let octet_count = self.pending.take().ok_or(ReadError::NoPendingPayload)?;
        match &self.seek {
            Some(seek) => {
                let available = seek.stream_len.saturating_sub(self.position);
                if u64::from(octet_count) > available {
                    return Err(short_skip(available, octet_count));
                }
                (seek.advance)(&mut self.input, octet_count)?;
            }
            None => skip_chunk_payload(&mut self.input, octet_count)?,
        }
        self.position += u64::from(octet_count);
        Ok(())
    }

    /// Iterate over the remaining chunks with their payloads.
    pub fn chunks(&mut self) -> Chunks<'_, R> {
        Chunks {
            reader: self,
            failed: false,
        }
    }

    /// Offset of the next unread octet.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.position
    }

    /// How the sequence ended, once it has.
    #[must_use]
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    pub fn into_inner(self) -> R {
        self.input
    }
}

/// Iterator returned by [`RaffReader::chunks`]. Stops after the first error.
pub struct Chunks<'a, R: Read> {
    reader: &'a mut RaffReader<R>,
    failed: bool,
}

impl<R: Read> Iterator for Chunks<'_, R> {
    type Item = Result<Chunk, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = match self.reader.next_header() {
            Ok(None) => return None,
            Ok(Some(header)) => self
                .reader
                .read_payload()
                .map(|payload| Chunk { header, payload }),
            Err(e) => Err(e),
        };
        self.failed = result.is_err();
        Some(result)
    }
}
