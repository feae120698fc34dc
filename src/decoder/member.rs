//! Decoders for data made of independently compressed members.
//!
//! Multi-member files (concatenated bzip2 streams, BGZF-style gzip members)
//! can be entered at the start of any member: seeking the compressed source
//! to the member's byte offset and starting a fresh multi-member decoder
//! there yields the data of that member followed by all later ones.
//!
//! [`MemberDecoder`] implements that once; a [`MemberFormat`] supplies the
//! codec.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::marker::PhantomData;
use std::path::Path;

use super::{BlockDecoder, DEFAULT_BUFFER_SIZE, read_bounded, read_line_bounded, skip_bounded};
use crate::{Error, Result};

/// A compression format whose members can be decoded back to back.
pub trait MemberFormat {
    /// Human-readable name, used in log and error messages.
    const NAME: &'static str;

    /// Decoder reading every member from its source until the source ends.
    type Reader<R: BufRead>: Read;

    /// Starts decoding members from the current position of `source`.
    fn reader<R: BufRead>(source: R) -> Self::Reader<R>;

    /// Recovers the compressed source from a decoder.
    fn into_source<R: BufRead>(reader: Self::Reader<R>) -> R;
}

/// Block decoder for a stream of compressed members.
///
/// The index positions are byte offsets of member starts in the compressed
/// source.
pub struct MemberDecoder<R: BufRead + Seek, F: MemberFormat> {
    output: Option<BufReader<F::Reader<R>>>,
    compressed_len: u64,
    buffer_size: usize,
    _format: PhantomData<F>,
}

impl<R: BufRead + Seek, F: MemberFormat> fmt::Debug for MemberDecoder<R, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberDecoder")
            .field("format", &F::NAME)
            .field("compressed_len", &self.compressed_len)
            .finish_non_exhaustive()
    }
}

impl<R: BufRead + Seek, F: MemberFormat> MemberDecoder<R, F> {
    /// Creates a decoder positioned at the first member of `source`.
    ///
    /// # Arguments
    ///
    /// * `source` - The compressed data
    pub fn new(source: R) -> Result<Self> {
        Self::with_buffer_size(source, DEFAULT_BUFFER_SIZE)
    }

    /// Creates a decoder with a custom output buffer size.
    pub fn with_buffer_size(mut source: R, buffer_size: usize) -> Result<Self> {
        let compressed_len = source.seek(SeekFrom::End(0))?;
        source.seek(SeekFrom::Start(0))?;

        Ok(Self {
            output: Some(BufReader::with_capacity(
                buffer_size.max(1),
                F::reader(source),
            )),
            compressed_len,
            buffer_size: buffer_size.max(1),
            _format: PhantomData,
        })
    }

    /// Returns the length of the compressed source in bytes.
    pub fn compressed_len(&self) -> u64 {
        self.compressed_len
    }

    fn output(&mut self) -> Result<&mut BufReader<F::Reader<R>>> {
        self.output.as_mut().ok_or_else(|| {
            Error::Io(std::io::Error::other(format!(
                "{} decoder lost its source after a failed reposition",
                F::NAME
            )))
        })
    }
}

impl<F: MemberFormat> MemberDecoder<BufReader<File>, F> {
    /// Opens a compressed file.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::new(BufReader::new(file))
    }
}

impl<R: BufRead + Seek, F: MemberFormat> BlockDecoder for MemberDecoder<R, F> {
    fn seek_block(&mut self, position: u64) -> Result<()> {
        if position >= self.compressed_len {
            return Err(Error::decoder_seek(
                position,
                format!(
                    "past the end of the {} byte {} stream",
                    self.compressed_len,
                    F::NAME
                ),
            ));
        }

        let output = self.output.take().ok_or_else(|| {
            Error::decoder_seek(position, format!("{} decoder has no source", F::NAME))
        })?;
        let mut source = F::into_source(output.into_inner());
        let seeked = source.seek(SeekFrom::Start(position));
        self.output = Some(BufReader::with_capacity(
            self.buffer_size,
            F::reader(source),
        ));

        seeked.map_err(|e| Error::decoder_seek(position, e.to_string()))?;
        log::trace!("{} decoder repositioned at byte {}", F::NAME, position);
        Ok(())
    }

    fn read(&mut self, max: usize) -> Result<Option<Vec<u8>>> {
        Ok(read_bounded(self.output()?, max)?)
    }

    fn read_line(&mut self, max: Option<usize>) -> Result<Option<Vec<u8>>> {
        Ok(read_line_bounded(self.output()?, max)?)
    }

    fn skip(&mut self, count: u64) -> Result<u64> {
        Ok(skip_bounded(self.output()?, count)?)
    }

    fn close(mut self) -> Result<()> {
        self.output.take();
        log::trace!("{} decoder closed", F::NAME);
        Ok(())
    }
}
