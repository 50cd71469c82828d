#![no_main]

use libfuzzer_sys::fuzz_target;
use raff::{RaffReader, ReadError};

fuzz_target!(|data: &[u8]| {
    let Ok(mut reader) = RaffReader::new(data) else {
        return;
    };
    let mut consumed = reader.position();
    for chunk in reader.chunks() {
        match chunk {
            Ok(chunk) => consumed += 12 + chunk.payload.len() as u64,
            Err(ReadError::EndOfStream) => unreachable!("end of stream is not surfaced as an error"),
            Err(_) => return,
        }
    }
    assert!(consumed <= data.len() as u64);
});
