//! Packer tests: produce a .raff and read it back with the reader.

use std::io::{Cursor, Write};

use raff::{pack_raff, ChunkCode, Manifest, PackEntry, PackError, PackOptions, RaffReader, Termination};

fn entry(icon: &str, name: &str, payload: &[u8]) -> PackEntry {
    PackEntry {
        icon: icon.parse().unwrap(),
        name: name.parse().unwrap(),
        payload: payload.to_vec(),
    }
}

/// Produce a .raff in memory (two chunks), then read it back in order.
#[test]
fn packer_produce_and_read_back() {
    let entries = vec![entry("PICT", "IMG1", &[1, 2, 3]), entry("TEXT", "note", b"")];

    let mut buf = Cursor::new(Vec::new());
    let written = pack_raff(&mut buf, &entries, &PackOptions::default()).unwrap();
    let bytes = buf.into_inner();
    assert_eq!(written, bytes.len() as u64);

    let mut reader = RaffReader::new(bytes.as_slice()).unwrap();
    let chunks: Vec<_> = reader.chunks().collect::<Result<_, _>>().unwrap();
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].header.name, "IMG1".parse::<ChunkCode>().unwrap());
    assert_eq!(chunks[0].payload, [1, 2, 3]);
    assert!(chunks[1].payload.is_empty());
    assert_eq!(reader.termination(), Some(Termination::TerminalMarker));
}

#[test]
fn packer_without_terminal_marker_ends_at_stream_end() {
    let entries = vec![entry("PICT", "IMG1", b"x")];
    let mut buf = Vec::new();
    let written = pack_raff(&mut buf, &entries, &PackOptions { terminate: false }).unwrap();
    assert_eq!(written, 9 + 12 + 1);
    assert_eq!(buf.len(), 9 + 12 + 1);

    let mut reader = RaffReader::new(buf.as_slice()).unwrap();
    assert_eq!(reader.chunks().count(), 1);
    assert_eq!(reader.termination(), Some(Termination::EndOfStream));
}

/// An entry that would read back as the terminal marker is refused before anything is written.
#[test]
fn packer_rejects_terminal_codes() {
    let entries = vec![
        entry("PICT", "IMG1", b"x"),
        PackEntry {
            icon: ChunkCode::ZERO,
            name: ChunkCode::ZERO,
            payload: b"lost".to_vec(),
        },
    ];
    let mut buf = Vec::new();
    let err = pack_raff(&mut buf, &entries, &PackOptions::default()).unwrap_err();
    assert!(matches!(err, PackError::ReservedCode(1)));
    assert!(buf.is_empty());
}

/// Manifest on disk with a payload file next to it.
#[test]
fn packer_from_manifest_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut blob = std::fs::File::create(dir.path().join("img1.bin")).unwrap();
    blob.write_all(&[0xDE, 0xAD, 0xBE, 0xEF]).unwrap();
    drop(blob);

    let manifest_path = dir.path().join("pack.toml");
    std::fs::write(
        &manifest_path,
        r#"
terminate = false

[[chunk]]
icon = "🦊"
name = "IMG1"
path = "img1.bin"

[[chunk]]
icon = "0x54455854"
name = "note"
text = "hello"
"#,
    )
    .unwrap();

    let manifest = Manifest::load(&manifest_path).unwrap();
    assert!(!manifest.options.terminate);
    assert_eq!(manifest.entries[0].icon.to_icon_string(), "🦊");
    assert_eq!(manifest.entries[0].payload, [0xDE, 0xAD, 0xBE, 0xEF]);
    assert_eq!(manifest.entries[1].icon.to_name_string(), "TEXT");

    let mut buf = Vec::new();
    pack_raff(&mut buf, &manifest.entries, &manifest.options).unwrap();
    let mut reader = RaffReader::new(buf.as_slice()).unwrap();
    let chunks: Vec<_> = reader.chunks().collect::<Result<_, _>>().unwrap();
    assert_eq!(chunks[1].payload, b"hello");
}

#[test]
fn packer_manifest_missing_payload_file() {
    let dir = tempfile::tempdir().unwrap();
    let manifest_path = dir.path().join("pack.toml");
    std::fs::write(
        &manifest_path,
        "[[chunk]]\nicon = \"PICT\"\nname = \"IMG1\"\npath = \"missing.bin\"\n",
    )
    .unwrap();

    let err = Manifest::load(&manifest_path).unwrap_err();
    assert!(err.to_string().contains("missing.bin"), "got {err}");
}
