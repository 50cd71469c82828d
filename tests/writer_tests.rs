//! Writer tests: exact byte layout, short writes, raw markers.

use std::io::{self, Write};

use raff::{
    read_marker, write_chunk, write_file_header, write_raw_marker, write_terminal_marker,
    ChunkCode, Expect, Marker, RaffWriter, WriteError, RAFF_MAGIC,
};

fn code(s: &str) -> ChunkCode {
    s.parse().unwrap()
}

/// Accepts up to `capacity` octets, then reports zero-length writes.
struct Full {
    data: Vec<u8>,
    capacity: usize,
}

impl Write for Full {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = buf.len().min(self.capacity - self.data.len());
        self.data.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct Broken;

impl Write for Broken {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn writer_exact_layout() {
    let mut buf = Vec::new();
    write_file_header(&mut buf).unwrap();
    write_chunk(&mut buf, code("PICT"), code("IMG1"), &[1, 2, 3]).unwrap();
    write_terminal_marker(&mut buf).unwrap();

    let mut expected = vec![0xF0, 0x9F, 0xA6, 0x8A, b'R', b'A', b'F', b'F', 0x0A];
    expected.extend_from_slice(b"PICTIMG1");
    expected.extend_from_slice(&[0, 0, 0, 3, 1, 2, 3]);
    expected.extend_from_slice(&[0; 8]);
    assert_eq!(buf, expected);
}

#[test]
fn writer_length_is_big_endian() {
    let mut buf = Vec::new();
    write_chunk(&mut buf, code("DATA"), code("big "), &vec![0u8; 0x0001_0203]).unwrap();
    assert_eq!(&buf[8..12], &[0x00, 0x01, 0x02, 0x03]);
    assert_eq!(buf.len(), 12 + 0x0001_0203);
}

/// A stream that stops accepting octets is a short write, distinct from a transport error.
#[test]
fn writer_short_write_is_reported() {
    let mut out = Full {
        data: Vec::new(),
        capacity: RAFF_MAGIC.len() + 5,
    };
    write_file_header(&mut out).unwrap();
    let err = write_chunk(&mut out, code("PICT"), code("IMG1"), b"x").unwrap_err();
    assert!(matches!(err, WriteError::ShortWrite(12)), "got {err:?}");
}

#[test]
fn writer_transport_error_is_io() {
    let err = write_file_header(&mut Broken).unwrap_err();
    match err {
        WriteError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
        other => panic!("expected IO error, got {other:?}"),
    }
}

/// A raw marker is only the four icon octets, read back with an explicit shape.
#[test]
fn writer_raw_marker_shape() {
    let mut buf = Vec::new();
    write_raw_marker(&mut buf, code("SYNC")).unwrap();
    write_chunk(&mut buf, code("PICT"), code("IMG1"), b"").unwrap();
    assert_eq!(&buf[..4], b"SYNC");
    assert_eq!(buf.len(), 4 + 12);

    let mut input = buf.as_slice();
    assert_eq!(read_marker(&mut input, Expect::Raw).unwrap(), Marker::Raw(code("SYNC")));
    match read_marker(&mut input, Expect::Chunk).unwrap() {
        Marker::Chunk(header) => {
            assert_eq!(header.icon, code("PICT"));
            assert_eq!(header.octet_count, 0);
        }
        other => panic!("expected chunk header, got {other:?}"),
    }
    assert!(read_marker(&mut input, Expect::Raw).unwrap_err().is_end_of_stream());
}

#[test]
fn raff_writer_tracks_position() {
    let mut writer = RaffWriter::new(Vec::new()).unwrap();
    assert_eq!(writer.position(), 9);
    writer.write_chunk(code("PICT"), code("IMG1"), &[0; 10]).unwrap();
    writer.write_raw_marker(code("SYNC")).unwrap();
    assert_eq!(writer.position(), 9 + 12 + 10 + 4);
    let bytes = writer.finish().unwrap();
    assert_eq!(bytes.len(), 9 + 12 + 10 + 4 + 8);
    assert_eq!(&bytes[bytes.len() - 8..], &[0; 8]);
}

#[test]
fn raff_writer_into_inner_skips_terminal_marker() {
    let mut writer = RaffWriter::new(Vec::new()).unwrap();
    writer.write_chunk(code("PICT"), code("IMG1"), b"ab").unwrap();
    let bytes = writer.into_inner();
    assert_eq!(bytes.len(), 9 + 12 + 2);
}

/// Payloads past the 32-bit octet count are refused before anything is written.
#[cfg(target_pointer_width = "64")]
#[test]
fn writer_rejects_oversized_payload() {
    let payload = vec![0u8; u32::MAX as usize + 1];
    let mut buf = Vec::new();
    let err = write_chunk(&mut buf, code("HUGE"), code("blob"), &payload).unwrap_err();
    assert!(
        matches!(err, WriteError::PayloadTooLarge(n) if n == u32::MAX as usize + 1),
        "got {err:?}"
    );
    assert!(buf.is_empty());
}
