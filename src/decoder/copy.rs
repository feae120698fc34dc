//! Copy decoder (no compression).

use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::Path;

use super::{BlockDecoder, read_bounded, read_line_bounded, skip_bounded};
use crate::{Error, Result};

/// A block decoder over uncompressed data.
///
/// Compressed positions are plain byte offsets, so any offset is a valid
/// block start. Useful for indexing large plain files with the same API.
#[derive(Debug)]
pub struct CopyBlockDecoder<R> {
    inner: R,
    len: u64,
}

impl<R: BufRead + Seek> CopyBlockDecoder<R> {
    /// Creates a new copy decoder positioned at the start of `inner`.
    pub fn new(mut inner: R) -> Result<Self> {
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self { inner, len })
    }

    /// Returns the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl CopyBlockDecoder<BufReader<File>> {
    /// Opens a plain file.
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(BufReader::new(File::open(path.as_ref())?))
    }
}

impl<R: BufRead + Seek> BlockDecoder for CopyBlockDecoder<R> {
    fn seek_block(&mut self, position: u64) -> Result<()> {
        if position > self.len {
            return Err(Error::decoder_seek(
                position,
                format!("past the end of the {} byte file", self.len),
            ));
        }
        self.inner
            .seek(SeekFrom::Start(position))
            .map_err(|e| Error::decoder_seek(position, e.to_string()))?;
        Ok(())
    }

    fn read(&mut self, max: usize) -> Result<Option<Vec<u8>>> {
        Ok(read_bounded(&mut self.inner, max)?)
    }

    fn read_line(&mut self, max: Option<usize>) -> Result<Option<Vec<u8>>> {
        Ok(read_line_bounded(&mut self.inner, max)?)
    }

    fn skip(&mut self, count: u64) -> Result<u64> {
        Ok(skip_bounded(&mut self.inner, count)?)
    }
}
