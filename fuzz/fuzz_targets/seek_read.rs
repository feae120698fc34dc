//! Fuzz target driving a SeekableStream with arbitrary seek/read sequences.
//!
//! Run with: cargo +nightly fuzz run seek_read
//!
//! The stream runs over uncompressed data split into fixed blocks, so every
//! read can be checked against a plain slice of the data.

#![no_main]

use std::io::Cursor;

use blockseek::{BlockDescriptor, BlockIndex, CopyBlockDecoder, SeekableStream, Whence};
use libfuzzer_sys::fuzz_target;

const DATA_LEN: usize = 4096;
const BLOCK_LEN: u64 = 300;

fuzz_target!(|ops: &[u8]| {
    let data: Vec<u8> = (0..DATA_LEN).map(|i| (i * 31 % 256) as u8).collect();
    let descriptors = (0..DATA_LEN as u64)
        .step_by(BLOCK_LEN as usize)
        .map(|start| BlockDescriptor::new(start, BLOCK_LEN.min(DATA_LEN as u64 - start)));
    let index = BlockIndex::build(descriptors).expect("static index");
    let decoder = CopyBlockDecoder::new(Cursor::new(data.clone())).expect("in-memory data");
    let mut stream = SeekableStream::new(decoder, index);

    for op in ops.chunks(3) {
        let value = op.get(1..).map_or(0, |b| b.iter().fold(0u16, |a, &x| a << 8 | x as u16));
        match op[0] % 4 {
            0 => {
                let _ = stream.seek(value as i64, Whence::Start);
            }
            1 => {
                let _ = stream.seek(value as i64 - 2048, Whence::Current);
            }
            2 => {
                let position = stream.tell() as usize;
                let bytes = stream.read(Some(value as usize % 512)).expect("read");
                assert_eq!(bytes, data[position..position + bytes.len()]);
            }
            _ => {
                let position = stream.tell() as usize;
                let line = stream.readline(Some(value as usize % 512)).expect("readline");
                assert_eq!(line, data[position..position + line.len()]);
            }
        }
        assert!(stream.tell() <= DATA_LEN as u64);
    }
});
