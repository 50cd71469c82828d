//! Minimal example: build a .raff with two chunks, then read it back and print each header.
//!
//! Run: cargo run --example build_and_read

use raff::{RaffReader, RaffWriter};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut writer = RaffWriter::new(Vec::new())?;
    writer.write_chunk("PICT".parse()?, "IMG1".parse()?, &[0x01, 0x02, 0x03])?;
    writer.write_chunk("TEXT".parse()?, "note".parse()?, b"hello")?;
    let bytes = writer.finish()?;

    let mut reader = RaffReader::new(bytes.as_slice())?;
    for chunk in reader.chunks() {
        let chunk = chunk?;
        println!(
            "{} {} {} octets",
            chunk.header.icon.to_icon_string(),
            chunk.header.name,
            chunk.payload.len()
        );
    }
    println!("ended by {:?}", reader.termination());
    Ok(())
}
