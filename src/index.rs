//! Block index mapping uncompressed offsets to compressed block starts.
//!
//! A block-compressed file is a sequence of blocks, each of which can be
//! decoded on its own once the decoder is positioned at its start. The
//! [`BlockIndex`] records where each block begins in the compressed stream
//! and how many bytes it expands to, so any uncompressed offset can be
//! translated into "decode from block `b` and skip `o` bytes".
//!
//! # Index file format
//!
//! The textual index holds one record per line, in block order:
//!
//! ```text
//! <compressed_block_start> <uncompressed_block_length>
//! ```
//!
//! Fields are separated by whitespace. Blank lines are skipped and fields
//! after the second are ignored. The unit of `compressed_block_start` is
//! whatever the decoder addresses blocks by (a byte offset for the member
//! decoders shipped with this crate).
//!
//! # Example
//!
//! ```rust
//! use blockseek::{BlockDescriptor, BlockIndex};
//!
//! let index = BlockIndex::build([
//!     BlockDescriptor::new(0, 100),
//!     BlockDescriptor::new(40, 50),
//!     BlockDescriptor::new(55, 200),
//! ])?;
//!
//! assert_eq!(index.total_size(), 350);
//! assert_eq!(index.locate(150)?, (2, 0));
//! assert_eq!(index.locate(149)?, (1, 49));
//! # Ok::<(), blockseek::Error>(())
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::{Error, Result};

/// One record of an index source: where a block starts in the compressed
/// stream and how long it is once decompressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDescriptor {
    /// Position of the block in the compressed stream (decoder units).
    pub compressed_start: u64,
    /// Length of the block once decompressed, in bytes.
    pub length: u64,
}

impl BlockDescriptor {
    /// Creates a descriptor.
    pub fn new(compressed_start: u64, length: u64) -> Self {
        Self {
            compressed_start,
            length,
        }
    }
}

/// A resolved block of the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// Zero-based block number.
    pub number: usize,
    /// Uncompressed offset at which the block begins.
    pub start: u64,
    /// Uncompressed length of the block.
    pub length: u64,
    /// Position of the block in the compressed stream.
    pub compressed_start: u64,
}

impl Block {
    /// Returns the uncompressed offset one past the last byte of the block.
    pub fn end(&self) -> u64 {
        self.start + self.length
    }

    /// Returns `true` if `position` falls inside this block.
    pub fn contains(&self, position: u64) -> bool {
        position >= self.start && position < self.end()
    }
}

/// Ordered table of block boundaries.
///
/// Built once from a list of [`BlockDescriptor`]s and immutable afterwards.
/// Always holds at least one block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockIndex {
    /// Uncompressed offset at which each block begins.
    starts: Vec<u64>,
    /// Compressed position at which each block begins.
    compressed_starts: Vec<u64>,
    /// Uncompressed size of the whole stream.
    total_size: u64,
}

impl BlockIndex {
    /// Builds an index from block descriptors given in block order.
    ///
    /// Block starts are the running sum of the descriptor lengths, beginning
    /// at 0.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexFormat`] if there are no descriptors or if the
    /// lengths sum past `u64::MAX`.
    pub fn build<I>(descriptors: I) -> Result<Self>
    where
        I: IntoIterator<Item = BlockDescriptor>,
    {
        let descriptors = descriptors.into_iter();
        let (lower, _) = descriptors.size_hint();
        let mut starts = Vec::with_capacity(lower);
        let mut compressed_starts = Vec::with_capacity(lower);
        let mut position: u64 = 0;

        for (i, descriptor) in descriptors.enumerate() {
            starts.push(position);
            compressed_starts.push(descriptor.compressed_start);
            position = position.checked_add(descriptor.length).ok_or_else(|| {
                Error::index_format(i + 1, "total uncompressed size overflows u64")
            })?;
        }

        if starts.is_empty() {
            return Err(Error::index_format(0, "index contains no blocks"));
        }

        Ok(Self {
            starts,
            compressed_starts,
            total_size: position,
        })
    }

    /// Parses a textual index from a reader.
    ///
    /// See the [module documentation](self) for the record format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexFormat`] for a record with fewer than two
    /// fields, a field that is not an integer, or a negative length, and
    /// [`Error::Io`] if the reader fails.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self> {
        let mut descriptors = Vec::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = i + 1;
            let mut fields = line.split_whitespace();

            let Some(first) = fields.next() else {
                continue;
            };
            let second = fields.next().ok_or_else(|| {
                Error::index_format(line_number, "expected two fields, found one")
            })?;

            let compressed_start = parse_field(first, line_number, "compressed block start")?;
            let length = parse_field(second, line_number, "uncompressed block length")?;
            descriptors.push(BlockDescriptor::new(compressed_start, length));
        }

        let index = Self::build(descriptors)?;
        log::debug!(
            "Parsed block index: {} blocks, {} uncompressed bytes",
            index.len(),
            index.total_size
        );
        Ok(index)
    }

    /// Reads and parses an index file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::parse(BufReader::new(file))
    }

    /// Maps an uncompressed position to `(block, offset_within_block)`.
    ///
    /// Selects the greatest block whose start is `<= position`, so blocks of
    /// length zero are never returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SeekRange`] if `position >= total_size()`.
    pub fn locate(&self, position: u64) -> Result<(usize, u64)> {
        if position >= self.total_size {
            return Err(Error::SeekRange {
                target: i128::from(position),
                size: self.total_size,
            });
        }

        // starts[0] == 0 <= position, so the partition point is at least 1.
        let block = self.starts.partition_point(|&start| start <= position) - 1;
        Ok((block, position - self.starts[block]))
    }

    /// Returns the number of blocks.
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    /// Returns `false`; an index always holds at least one block.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the uncompressed size of the whole stream.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Returns the compressed position of a block.
    ///
    /// # Panics
    ///
    /// Panics if `block >= len()`.
    pub fn compressed_start(&self, block: usize) -> u64 {
        self.compressed_starts[block]
    }

    /// Returns the uncompressed offset at which a block begins.
    ///
    /// # Panics
    ///
    /// Panics if `block >= len()`.
    pub fn block_start(&self, block: usize) -> u64 {
        self.starts[block]
    }

    /// Returns the uncompressed length of a block.
    ///
    /// # Panics
    ///
    /// Panics if `block >= len()`.
    pub fn block_len(&self, block: usize) -> u64 {
        let end = self
            .starts
            .get(block + 1)
            .copied()
            .unwrap_or(self.total_size);
        end - self.starts[block]
    }

    /// Returns a resolved view of a block, or `None` if out of range.
    pub fn block(&self, number: usize) -> Option<Block> {
        if number >= self.len() {
            return None;
        }
        Some(Block {
            number,
            start: self.starts[number],
            length: self.block_len(number),
            compressed_start: self.compressed_starts[number],
        })
    }

    /// Iterates over all blocks in order.
    pub fn blocks(&self) -> impl ExactSizeIterator<Item = Block> + '_ {
        (0..self.len()).map(|number| Block {
            number,
            start: self.starts[number],
            length: self.block_len(number),
            compressed_start: self.compressed_starts[number],
        })
    }
}

fn parse_field(field: &str, line: usize, name: &str) -> Result<u64> {
    let negative = field
        .strip_prefix('-')
        .is_some_and(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()));
    if negative {
        return Err(Error::index_format(
            line,
            format!("{} is negative: {}", name, field),
        ));
    }
    field
        .parse::<u64>()
        .map_err(|e| Error::index_format(line, format!("{} {:?}: {}", name, field, e)))
}
