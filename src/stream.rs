//! Seekable stream over block-compressed data.
//!
//! [`SeekableStream`] keeps a logical cursor over the uncompressed data and
//! a [`BlockDecoder`] that can only be entered at block starts. Seeking just
//! moves the cursor and marks the decoder as out of sync; the next read
//! looks the cursor up in the [`BlockIndex`], repositions the decoder at the
//! containing block and discards bytes up to the cursor before delivering
//! data. Any number of seeks between two reads therefore costs one
//! reposition.
//!
//! # Example
//!
//! ```rust,no_run
//! use blockseek::{SeekableBzip2File, Whence};
//!
//! let mut stream = SeekableBzip2File::open("reads.fa.bz2", "reads.fa.bz2.idx")?;
//!
//! // Jump near the end and read a line
//! stream.seek(1_000_000, Whence::Start)?;
//! let line = stream.readline(None)?;
//! println!("{} bytes, cursor now at {}", line.len(), stream.tell());
//!
//! // Iterate over the remaining lines
//! for line in stream.lines() {
//!     let line = line?;
//!     print!("{}", String::from_utf8_lossy(&line));
//! }
//! # Ok::<(), blockseek::Error>(())
//! ```
//!
//! # `std::io` integration
//!
//! The stream implements [`std::io::Read`] and [`std::io::Seek`]. The
//! inherent `read` and `seek` methods shadow the trait methods of the same
//! name, so call the trait versions as `Read::read(&mut stream, buf)` or go
//! through adapters such as [`std::io::BufReader`] and `read_to_end`.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, SeekFrom};
use std::path::Path;

use crate::config::StreamConfig;
use crate::decoder::{BlockDecoder, CopyBlockDecoder, MemberDecoder, MemberFormat};
use crate::index::BlockIndex;
use crate::stats::StreamStats;
use crate::{Error, Result};

#[cfg(feature = "bzip2")]
use crate::decoder::Bzip2BlockDecoder;

#[cfg(feature = "deflate")]
use crate::decoder::GzipBlockDecoder;

/// Origin of a [`SeekableStream::seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Whence {
    /// Absolute position: `offset`.
    Start,
    /// Relative to the cursor: `position + offset`.
    Current,
    /// Counted back from the end: `total_size - offset`.
    End,
}

impl TryFrom<i32> for Whence {
    type Error = Error;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            0 => Ok(Whence::Start),
            1 => Ok(Whence::Current),
            2 => Ok(Whence::End),
            other => Err(Error::InvalidWhence(other)),
        }
    }
}

/// Whether the decoder's position matches the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyncState {
    /// The next byte the decoder yields is the byte at the cursor.
    Synchronized,
    /// The cursor moved since the decoder was last positioned.
    ///
    /// `decoder_at` is the uncompressed position the decoder was left at,
    /// when known.
    Dirty { decoder_at: Option<u64> },
}

/// A seekable byte and line stream over block-compressed data.
///
/// Owns its decoder exclusively; dropping the stream or calling
/// [`close`](Self::close) releases it. Not meant for concurrent use: open
/// one stream per reader instead.
pub struct SeekableStream<D: BlockDecoder> {
    decoder: D,
    index: BlockIndex,
    position: u64,
    sync: SyncState,
    config: StreamConfig,
    stats: StreamStats,
}

/// Seekable stream over a file of concatenated bzip2 streams.
#[cfg(feature = "bzip2")]
pub type SeekableBzip2File = SeekableStream<Bzip2BlockDecoder<BufReader<File>>>;

/// Seekable stream over a file of concatenated gzip members.
#[cfg(feature = "deflate")]
pub type SeekableGzipFile = SeekableStream<GzipBlockDecoder<BufReader<File>>>;

/// Seekable stream over an uncompressed file.
pub type SeekableRawFile = SeekableStream<CopyBlockDecoder<BufReader<File>>>;

/// Seekable stream whose decoder was chosen from the data's magic bytes.
pub type SeekableDetectedFile = SeekableStream<Box<dyn BlockDecoder>>;

impl<D: BlockDecoder> SeekableStream<D> {
    /// Creates a stream with the default configuration.
    ///
    /// The stream starts at position 0, unsynchronized: the first read
    /// always positions the decoder explicitly.
    pub fn new(decoder: D, index: BlockIndex) -> Self {
        log::debug!(
            "Opened seekable stream: {} blocks, {} bytes",
            index.len(),
            index.total_size()
        );
        Self {
            decoder,
            index,
            position: 0,
            sync: SyncState::Dirty { decoder_at: None },
            config: StreamConfig::default(),
            stats: StreamStats::default(),
        }
    }

    /// Creates a stream with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the configuration is invalid.
    pub fn with_config(decoder: D, index: BlockIndex, config: StreamConfig) -> Result<Self> {
        config.validate()?;
        let mut stream = Self::new(decoder, index);
        stream.config = config;
        Ok(stream)
    }

    /// Creates a stream, parsing the block index from a textual source.
    pub fn from_index_source<I: BufRead>(decoder: D, index: I) -> Result<Self> {
        Ok(Self::new(decoder, BlockIndex::parse(index)?))
    }

    /// Moves the cursor without touching the decoder.
    ///
    /// The absolute target is `offset` for [`Whence::Start`],
    /// `position + offset` for [`Whence::Current`] and
    /// `total_size - offset` for [`Whence::End`]. A target equal to the
    /// current position is a no-op. Returns the new position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SeekRange`] if the target is not in
    /// `[0, total_size)`; the stream is unchanged in that case.
    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        let size = self.index.total_size();
        let target = match whence {
            Whence::Start => i128::from(offset),
            Whence::Current => i128::from(self.position) + i128::from(offset),
            Whence::End => i128::from(size) - i128::from(offset),
        };

        if target == i128::from(self.position) {
            return Ok(self.position);
        }
        if target < 0 || target >= i128::from(size) {
            return Err(Error::SeekRange { target, size });
        }

        let decoder_at = match self.sync {
            SyncState::Synchronized => Some(self.position).filter(|&p| p < size),
            SyncState::Dirty { decoder_at } => decoder_at,
        };
        self.position = target as u64;
        self.sync = SyncState::Dirty { decoder_at };
        self.stats.seeks += 1;
        log::trace!("Seek to {} ({:?} {})", self.position, whence, offset);
        Ok(self.position)
    }

    /// Like [`seek`](Self::seek), with the origin given as `0`, `1` or `2`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWhence`] for any other origin value, before
    /// any state change.
    pub fn seek_whence(&mut self, offset: i64, whence: i32) -> Result<u64> {
        let whence = Whence::try_from(whence)?;
        self.seek(offset, whence)
    }

    /// Returns the cursor position.
    pub fn tell(&self) -> u64 {
        self.position
    }

    /// Reads up to `size` bytes, or everything up to the end of the stream
    /// when `size` is `None`.
    ///
    /// Returns an empty buffer at end of stream, after which the cursor
    /// stays at [`total_size`](Self::total_size).
    pub fn read(&mut self, size: Option<usize>) -> Result<Vec<u8>> {
        match size {
            Some(n) => Ok(self.read_chunk(n)?.unwrap_or_default()),
            None => {
                let mut out = Vec::new();
                while let Some(chunk) = self.read_chunk(self.config.read_chunk_size)? {
                    if chunk.is_empty() {
                        break;
                    }
                    out.extend_from_slice(&chunk);
                }
                Ok(out)
            }
        }
    }

    /// Reads one line including its `\n`, or at most `size` bytes of it.
    ///
    /// Returns an empty buffer at end of stream. Use
    /// [`next_line`](Self::next_line) to tell end of stream apart from a
    /// zero-byte result.
    pub fn readline(&mut self, size: Option<usize>) -> Result<Vec<u8>> {
        Ok(self.line_chunk(size)?.unwrap_or_default())
    }

    /// Reads the next line, returning `None` at end of stream.
    pub fn next_line(&mut self) -> Result<Option<Vec<u8>>> {
        self.line_chunk(None)
    }

    /// Returns an iterator over the remaining lines.
    ///
    /// Iteration stops at end of stream or after the first error.
    pub fn lines(&mut self) -> Lines<'_, D> {
        Lines {
            stream: self,
            done: false,
        }
    }

    /// Reads all remaining lines.
    pub fn readlines(&mut self) -> Result<Vec<Vec<u8>>> {
        self.lines().collect()
    }

    /// Closes the stream and releases the decoder.
    pub fn close(self) -> Result<()> {
        log::trace!("Closing seekable stream at position {}", self.position);
        self.decoder.close()
    }

    /// Returns the block index.
    pub fn index(&self) -> &BlockIndex {
        &self.index
    }

    /// Returns the uncompressed size of the stream.
    pub fn total_size(&self) -> u64 {
        self.index.total_size()
    }

    /// Returns `true` if the decoder is positioned at the cursor.
    pub fn is_synchronized(&self) -> bool {
        self.sync == SyncState::Synchronized
    }

    /// Returns the stream configuration.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Returns the statistics gathered so far.
    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    /// Returns a reference to the decoder.
    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Consumes the stream, returning the decoder and the index.
    pub fn into_inner(self) -> (D, BlockIndex) {
        (self.decoder, self.index)
    }

    /// Positions the decoder at the cursor.
    fn resynchronize(&mut self) -> Result<()> {
        let target = self.position;
        let (block, offset) = self.index.locate(target)?;

        if let SyncState::Dirty {
            decoder_at: Some(at),
        } = self.sync
        {
            if self.config.forward_skip && at >= self.index.block_start(block) && at <= target {
                self.sync = SyncState::Dirty { decoder_at: None };
                self.discard(block, target - at)?;
                self.stats.forward_skips += 1;
                self.sync = SyncState::Synchronized;
                log::trace!("Skipped forward {} bytes to {}", target - at, target);
                return Ok(());
            }
        }

        self.sync = SyncState::Dirty { decoder_at: None };
        let compressed_start = self.index.compressed_start(block);
        self.decoder.seek_block(compressed_start)?;
        self.stats.resyncs += 1;
        self.discard(block, offset)?;

        self.sync = SyncState::Synchronized;
        log::trace!(
            "Resynchronized at {}: block {} (compressed {}), skipped {}",
            target,
            block,
            compressed_start,
            offset
        );
        Ok(())
    }

    fn discard(&mut self, block: usize, count: u64) -> Result<()> {
        if count == 0 {
            return Ok(());
        }

        let skipped = self.decoder.skip(count)?;
        self.stats.bytes_discarded += skipped;
        if skipped < count {
            log::warn!(
                "Block {} ended after {} of {} bytes while seeking to {}",
                block,
                skipped,
                count,
                self.position
            );
            return Err(Error::CorruptIndex {
                block,
                expected: count,
                actual: skipped,
            });
        }
        Ok(())
    }

    /// Synchronizes if needed and returns the bytes left before the end.
    fn prepare(&mut self) -> Result<u64> {
        let size = self.index.total_size();
        if self.position >= size {
            return Ok(0);
        }
        if self.sync != SyncState::Synchronized {
            self.resynchronize()?;
        }
        Ok(size - self.position)
    }

    fn read_chunk(&mut self, max: usize) -> Result<Option<Vec<u8>>> {
        let remaining = self.prepare()?;
        if remaining == 0 {
            return Ok(self.end_of_stream());
        }

        let want = usize::try_from(remaining).map_or(max, |r| r.min(max));
        // A failed read may have consumed decoder input.
        self.sync = SyncState::Dirty { decoder_at: None };
        let chunk = self.decoder.read(want)?;
        self.sync = SyncState::Synchronized;
        match chunk {
            Some(bytes) => {
                self.advance(bytes.len());
                Ok(Some(bytes))
            }
            None => Ok(self.end_of_stream()),
        }
    }

    fn line_chunk(&mut self, max: Option<usize>) -> Result<Option<Vec<u8>>> {
        let remaining = self.prepare()?;
        if remaining == 0 {
            return Ok(self.end_of_stream());
        }

        let cap = usize::try_from(remaining).unwrap_or(usize::MAX);
        let limit = max.map_or(cap, |m| m.min(cap));
        self.sync = SyncState::Dirty { decoder_at: None };
        let line = self.decoder.read_line(Some(limit))?;
        self.sync = SyncState::Synchronized;
        match line {
            Some(line) => {
                self.advance(line.len());
                Ok(Some(line))
            }
            None => Ok(self.end_of_stream()),
        }
    }

    fn advance(&mut self, n: usize) {
        let size = self.index.total_size();
        self.position = self.position.saturating_add(n as u64).min(size);
        self.stats.bytes_delivered += n as u64;
    }

    fn end_of_stream(&mut self) -> Option<Vec<u8>> {
        if self.position != self.index.total_size() {
            log::trace!("End of stream reached at {}", self.position);
        }
        self.position = self.index.total_size();
        self.stats.eof_hits += 1;
        None
    }
}

impl<F: MemberFormat> SeekableStream<MemberDecoder<BufReader<File>, F>> {
    /// Opens a member-compressed data file and its index file.
    ///
    /// The index is parsed first, so a malformed index fails before the
    /// data file is touched.
    pub fn open(data: impl AsRef<Path>, index: impl AsRef<Path>) -> Result<Self> {
        let index = BlockIndex::from_path(index)?;
        let decoder = MemberDecoder::open_path(data)?;
        Ok(Self::new(decoder, index))
    }
}

impl SeekableStream<CopyBlockDecoder<BufReader<File>>> {
    /// Opens an uncompressed data file and its index file.
    pub fn open(data: impl AsRef<Path>, index: impl AsRef<Path>) -> Result<Self> {
        let index = BlockIndex::from_path(index)?;
        let decoder = CopyBlockDecoder::open_path(data)?;
        Ok(Self::new(decoder, index))
    }
}

impl SeekableStream<Box<dyn BlockDecoder>> {
    /// Opens a data file, choosing the decoder from its magic bytes.
    pub fn open_detected(data: impl AsRef<Path>, index: impl AsRef<Path>) -> Result<Self> {
        let index = BlockIndex::from_path(index)?;
        let decoder = crate::decoder::open_detected(data)?;
        Ok(Self::new(decoder, index))
    }
}

impl<D: BlockDecoder> fmt::Debug for SeekableStream<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeekableStream")
            .field("position", &self.position)
            .field("total_size", &self.index.total_size())
            .field("blocks", &self.index.len())
            .field("synchronized", &self.is_synchronized())
            .finish_non_exhaustive()
    }
}

impl<D: BlockDecoder> io::Read for SeekableStream<D> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.read_chunk(buf.len())? {
            Some(bytes) => {
                buf[..bytes.len()].copy_from_slice(&bytes);
                Ok(bytes.len())
            }
            None => Ok(0),
        }
    }
}

impl<D: BlockDecoder> io::Seek for SeekableStream<D> {
    /// Seeks with `std::io` conventions: `SeekFrom::End(n)` targets
    /// `total_size + n`.
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let size = self.index.total_size();
        let result = match pos {
            SeekFrom::Start(p) => match i64::try_from(p) {
                Ok(offset) => SeekableStream::seek(self, offset, Whence::Start),
                Err(_) => Err(Error::SeekRange {
                    target: i128::from(p),
                    size,
                }),
            },
            SeekFrom::Current(delta) => SeekableStream::seek(self, delta, Whence::Current),
            SeekFrom::End(delta) => match delta.checked_neg() {
                Some(back) => SeekableStream::seek(self, back, Whence::End),
                None => Err(Error::SeekRange {
                    target: i128::from(size) + i128::from(delta),
                    size,
                }),
            },
        };
        Ok(result?)
    }
}

/// Iterator over the lines of a [`SeekableStream`].
///
/// Created by [`SeekableStream::lines`].
pub struct Lines<'a, D: BlockDecoder> {
    stream: &'a mut SeekableStream<D>,
    done: bool,
}

impl<D: BlockDecoder> Iterator for Lines<'_, D> {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.stream.next_line() {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<D: BlockDecoder> std::iter::FusedIterator for Lines<'_, D> {}
