//! Seekable access to files of concatenated gzip members.

#![cfg(feature = "deflate")]

mod common;

use blockseek::{
    BlockIndex, Error, SeekableDetectedFile, SeekableGzipFile, SeekableStream, Whence,
    decoder::GzipBlockDecoder,
};
use common::{build_members, gzip_fixture, gzip_member, random_bytes, split_even, text_lines};
use std::io::Cursor;

#[test]
fn test_reads_whole_file() {
    let data = text_lines(300, 21);
    let fixture = gzip_fixture(&split_even(&data, 1_024));

    let mut stream = SeekableGzipFile::open(&fixture.data_path, &fixture.index_path).unwrap();
    assert_eq!(stream.read(None).unwrap(), data);
    assert_eq!(stream.next_line().unwrap(), None);
}

#[test]
fn test_random_access_binary_data() {
    let data = random_bytes(50_000, 22);
    let fixture = gzip_fixture(&split_even(&data, 4_096));
    let mut stream = SeekableGzipFile::open(&fixture.data_path, &fixture.index_path).unwrap();

    for target in [49_999usize, 0, 4_096, 4_095, 20_000, 8_191, 40_960] {
        stream.seek(target as i64, Whence::Start).unwrap();
        let bytes = stream.read(Some(300)).unwrap();
        assert_eq!(bytes, data[target..(target + 300).min(data.len())]);
    }
}

#[test]
fn test_read_crosses_member_boundaries() {
    let data = random_bytes(10_000, 23);
    let fixture = gzip_fixture(&split_even(&data, 333));
    let mut stream = SeekableGzipFile::open(&fixture.data_path, &fixture.index_path).unwrap();

    stream.seek(300, Whence::Start).unwrap();
    assert_eq!(stream.read(Some(5_000)).unwrap(), data[300..5_300]);
    assert_eq!(stream.tell(), 5_300);
}

#[test]
fn test_in_memory_source() {
    let data = text_lines(100, 24);
    let (compressed, index) = build_members(&split_even(&data, 500), gzip_member);

    let decoder = GzipBlockDecoder::new(Cursor::new(compressed)).unwrap();
    let mut stream = SeekableStream::from_index_source(decoder, index.as_bytes()).unwrap();

    stream.seek(1_234, Whence::Start).unwrap();
    assert_eq!(stream.read(Some(100)).unwrap(), data[1_234..1_334]);

    let (decoder, index) = stream.into_inner();
    assert_eq!(index.total_size(), data.len() as u64);
    assert!(decoder.compressed_len() > 0);
}

#[test]
fn test_open_detected() {
    let data = text_lines(100, 25);
    let fixture = gzip_fixture(&split_even(&data, 700));
    let mut stream =
        SeekableDetectedFile::open_detected(&fixture.data_path, &fixture.index_path).unwrap();

    stream.seek(10, Whence::End).unwrap();
    assert_eq!(stream.read(None).unwrap(), data[data.len() - 10..]);
}

#[test]
fn test_index_pointing_inside_member() {
    let data = random_bytes(4_000, 26);
    let fixture = gzip_fixture(&split_even(&data, 2_000));

    let index = BlockIndex::from_path(&fixture.index_path).unwrap();
    let second = index.compressed_start(1);
    fixture.rewrite_index(&format!("0 2000\n{} 2000\n", second + 3));

    let mut stream = SeekableGzipFile::open(&fixture.data_path, &fixture.index_path).unwrap();
    stream.seek(2_500, Whence::Start).unwrap();
    let err = stream.read(Some(10)).unwrap_err();
    assert!(matches!(err, Error::Io(_)), "unexpected error: {:?}", err);

    // The stream recovers once the cursor moves back into a valid block.
    stream.seek(100, Whence::Start).unwrap();
    assert_eq!(stream.read(Some(10)).unwrap(), data[100..110]);
}

#[test]
fn test_compressed_start_past_end() {
    let data = random_bytes(1_000, 27);
    let fixture = gzip_fixture(&split_even(&data, 500));
    fixture.rewrite_index("0 500\n999999 500\n");

    let mut stream = SeekableGzipFile::open(&fixture.data_path, &fixture.index_path).unwrap();
    stream.seek(600, Whence::Start).unwrap();
    let err = stream.read(Some(1)).unwrap_err();
    assert!(matches!(err, Error::DecoderSeek { position: 999_999, .. }));
    assert!(!stream.is_synchronized());
}
