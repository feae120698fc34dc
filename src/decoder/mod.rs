//! Block decoders.
//!
//! A [`BlockDecoder`] is the collaborator a [`SeekableStream`] drives: it can
//! reposition to the start of a compressed block and then deliver
//! decompressed bytes or lines from there onwards, running on into the
//! following blocks.
//!
//! The crate ships decoders for data files made of independently
//! compressed members, where the index records the byte offset of each
//! member:
//!
//! - [`Bzip2BlockDecoder`] for concatenated bzip2 streams (`bzip2` feature)
//! - [`GzipBlockDecoder`] for concatenated gzip members (`deflate` feature)
//! - [`CopyBlockDecoder`] for uncompressed data
//!
//! [`SeekableStream`]: crate::SeekableStream

#[cfg(feature = "bzip2")]
pub mod bzip2;

#[cfg(feature = "deflate")]
pub mod gzip;

pub mod detect;
pub mod member;

mod copy;

use std::io::{self, BufRead};

use crate::Result;

/// Default buffer size for decoder output (64 KiB).
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// A decoder that can be repositioned at compressed block boundaries.
///
/// End of stream is reported as `Ok(None)`, distinct from `Ok(Some(vec![]))`
/// which a zero-byte request may legitimately produce.
pub trait BlockDecoder {
    /// Repositions decoding at the block starting at `position` in the
    /// compressed stream.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DecoderSeek`](crate::Error::DecoderSeek) if the
    /// position cannot be a block start.
    fn seek_block(&mut self, position: u64) -> Result<()>;

    /// Reads up to `max` decompressed bytes.
    ///
    /// Fewer bytes are returned only at end of stream. Returns `None` once
    /// the stream is exhausted.
    fn read(&mut self, max: usize) -> Result<Option<Vec<u8>>>;

    /// Reads one line, including its `\n` terminator, stopping early after
    /// `max` bytes when a limit is given. Returns `None` at end of stream.
    fn read_line(&mut self, max: Option<usize>) -> Result<Option<Vec<u8>>>;

    /// Discards up to `count` decompressed bytes, returning how many were
    /// actually discarded.
    fn skip(&mut self, count: u64) -> Result<u64> {
        const CHUNK: u64 = 64 * 1024;

        let mut skipped = 0;
        while skipped < count {
            let want = (count - skipped).min(CHUNK) as usize;
            match self.read(want)? {
                Some(bytes) if !bytes.is_empty() => skipped += bytes.len() as u64,
                _ => break,
            }
        }
        Ok(skipped)
    }

    /// Releases the decoder and its data source.
    fn close(self) -> Result<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

impl<D: BlockDecoder + ?Sized> BlockDecoder for Box<D> {
    fn seek_block(&mut self, position: u64) -> Result<()> {
        (**self).seek_block(position)
    }

    fn read(&mut self, max: usize) -> Result<Option<Vec<u8>>> {
        (**self).read(max)
    }

    fn read_line(&mut self, max: Option<usize>) -> Result<Option<Vec<u8>>> {
        (**self).read_line(max)
    }

    fn skip(&mut self, count: u64) -> Result<u64> {
        (**self).skip(count)
    }
}

/// Copy decoder (no compression).
pub use copy::CopyBlockDecoder;

pub use detect::{DataFormat, detect_format, open_detected};
pub use member::{MemberDecoder, MemberFormat};

#[cfg(feature = "bzip2")]
pub use self::bzip2::{Bzip2BlockDecoder, Bzip2Members};

#[cfg(feature = "deflate")]
pub use gzip::{GzipBlockDecoder, GzipMembers};

/// Reads up to `max` bytes from a buffered reader.
///
/// Returns `None` if the reader was already exhausted.
pub(crate) fn read_bounded<B: BufRead + ?Sized>(
    reader: &mut B,
    max: usize,
) -> io::Result<Option<Vec<u8>>> {
    if max == 0 {
        return Ok(Some(Vec::new()));
    }

    let mut out = Vec::with_capacity(max.min(DEFAULT_BUFFER_SIZE));
    while out.len() < max {
        let available = match reader.fill_buf() {
            Ok(buf) => buf,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if available.is_empty() {
            break;
        }
        let take = available.len().min(max - out.len());
        out.extend_from_slice(&available[..take]);
        reader.consume(take);
    }

    if out.is_empty() {
        Ok(None)
    } else {
        Ok(Some(out))
    }
}

/// Reads one line of at most `max` bytes from a buffered reader.
///
/// Returns `None` if the reader was already exhausted.
pub(crate) fn read_line_bounded<B: BufRead + ?Sized>(
    reader: &mut B,
    max: Option<usize>,
) -> io::Result<Option<Vec<u8>>> {
    if max == Some(0) {
        return Ok(Some(Vec::new()));
    }

    let mut out = Vec::new();
    loop {
        let available = match reader.fill_buf() {
            Ok(buf) => buf,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if available.is_empty() {
            break;
        }

        let room = max.map_or(available.len(), |m| (m - out.len()).min(available.len()));
        let window = &available[..room];
        let (take, done) = match window.iter().position(|&b| b == b'\n') {
            Some(newline) => (newline + 1, true),
            None => (room, false),
        };
        out.extend_from_slice(&window[..take]);
        reader.consume(take);

        if done || max.is_some_and(|m| out.len() >= m) {
            break;
        }
    }

    if out.is_empty() {
        Ok(None)
    } else {
        Ok(Some(out))
    }
}

/// Discards up to `count` bytes from a buffered reader.
pub(crate) fn skip_bounded<B: BufRead + ?Sized>(reader: &mut B, count: u64) -> io::Result<u64> {
    let mut skipped = 0u64;
    while skipped < count {
        let available = match reader.fill_buf() {
            Ok(buf) => buf.len(),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if available == 0 {
            break;
        }
        let take = (available as u64).min(count - skipped) as usize;
        reader.consume(take);
        skipped += take as u64;
    }
    Ok(skipped)
}
