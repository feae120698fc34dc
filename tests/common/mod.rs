//! Shared test utilities for integration tests.
//!
//! This module provides helpers that build block-compressed data files and
//! their index files in temporary directories.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

/// Generates `count` lines of random lowercase text, each ending in `\n`.
///
/// Line lengths vary between 0 and 120 characters so blocks split lines at
/// arbitrary points.
pub fn text_lines(count: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut out = Vec::new();
    for _ in 0..count {
        let len = rng.gen_range(0..=120);
        out.extend((0..len).map(|_| rng.gen_range(b'a'..=b'z')));
        out.push(b'\n');
    }
    out
}

/// Generates `len` random bytes, newlines included.
pub fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| rng.r#gen()).collect()
}

/// Splits `data` into blocks of the given lengths.
///
/// The last block takes whatever `lengths` leaves over, so the blocks always
/// cover all of `data`.
pub fn split_at_lengths(data: &[u8], lengths: &[usize]) -> Vec<Vec<u8>> {
    let mut blocks = Vec::new();
    let mut rest = data;
    for &len in lengths {
        let (head, tail) = rest.split_at(len.min(rest.len()));
        blocks.push(head.to_vec());
        rest = tail;
    }
    if !rest.is_empty() || blocks.is_empty() {
        blocks.push(rest.to_vec());
    }
    blocks
}

/// Splits `data` into blocks of `block_len` bytes (the last may be shorter).
pub fn split_even(data: &[u8], block_len: usize) -> Vec<Vec<u8>> {
    if data.is_empty() {
        return vec![Vec::new()];
    }
    data.chunks(block_len).map(<[u8]>::to_vec).collect()
}

/// Concatenates independently compressed members and renders their index.
///
/// Returns the compressed bytes and the index text.
pub fn build_members<F>(blocks: &[Vec<u8>], mut compress: F) -> (Vec<u8>, String)
where
    F: FnMut(&[u8]) -> Vec<u8>,
{
    let mut compressed = Vec::new();
    let mut index = String::new();
    for block in blocks {
        writeln!(index, "{} {}", compressed.len(), block.len()).unwrap();
        compressed.extend(compress(block));
    }
    (compressed, index)
}

/// Compresses `data` as a single bzip2 stream.
#[cfg(feature = "bzip2")]
pub fn bzip2_member(data: &[u8]) -> Vec<u8> {
    use std::io::Write;

    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::fast());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Compresses `data` as a single gzip member.
#[cfg(feature = "deflate")]
pub fn gzip_member(data: &[u8]) -> Vec<u8> {
    use std::io::Write;

    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// A data file and its index file in a temporary directory.
pub struct Fixture {
    /// Keeps the directory alive for the duration of the test.
    pub dir: TempDir,
    pub data_path: PathBuf,
    pub index_path: PathBuf,
}

impl Fixture {
    /// Writes `data` and `index` under the given file name.
    pub fn new(name: &str, data: &[u8], index: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let data_path = dir.path().join(name);
        let index_path = dir.path().join(format!("{}.idx", name));
        fs::write(&data_path, data).unwrap();
        fs::write(&index_path, index).unwrap();
        Self {
            dir,
            data_path,
            index_path,
        }
    }

    /// Replaces the index file.
    pub fn rewrite_index(&self, index: &str) {
        fs::write(&self.index_path, index).unwrap();
    }
}

/// Writes a multi-stream bzip2 fixture from pre-split blocks.
#[cfg(feature = "bzip2")]
pub fn bzip2_fixture(blocks: &[Vec<u8>]) -> Fixture {
    let (compressed, index) = build_members(blocks, bzip2_member);
    Fixture::new("data.bz2", &compressed, &index)
}

/// Writes a multi-member gzip fixture from pre-split blocks.
#[cfg(feature = "deflate")]
pub fn gzip_fixture(blocks: &[Vec<u8>]) -> Fixture {
    let (compressed, index) = build_members(blocks, gzip_member);
    Fixture::new("data.gz", &compressed, &index)
}
