//! Error types for seekable block-compressed streams.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes when opening or reading a [`SeekableStream`], along with a
//! convenient [`Result<T>`] type alias.
//!
//! # Error Handling
//!
//! All fallible operations in this crate return `Result<T, Error>`. End of
//! stream is never an error: reads past the end return an empty result.
//!
//! ```rust,no_run
//! use blockseek::{Error, SeekableBzip2File, Whence};
//!
//! fn read_at(offset: i64) -> blockseek::Result<Vec<u8>> {
//!     let mut stream = SeekableBzip2File::open("data.bz2", "data.bz2.idx")?;
//!     match stream.seek(offset, Whence::Start) {
//!         Ok(_) => stream.read(Some(64)),
//!         Err(Error::SeekRange { size, .. }) => {
//!             eprintln!("offset {} is outside the {} byte stream", offset, size);
//!             Ok(Vec::new())
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```
//!
//! [`SeekableStream`]: crate::SeekableStream

use std::io;

/// The main error type for seekable stream operations.
///
/// # Error Categories
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | I/O | [`Io`][Self::Io] | File system or decompression failures |
/// | Index | [`IndexFormat`][Self::IndexFormat], [`CorruptIndex`][Self::CorruptIndex] | Bad or mismatched index |
/// | Caller | [`SeekRange`][Self::SeekRange], [`InvalidWhence`][Self::InvalidWhence], [`InvalidConfig`][Self::InvalidConfig] | Invalid arguments |
/// | Decoder | [`DecoderSeek`][Self::DecoderSeek], [`UnsupportedFormat`][Self::UnsupportedFormat] | Block position rejected, codec disabled |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred while reading the data or index source.
    ///
    /// Decompression failures reported by the underlying codec (for example
    /// a truncated bzip2 member) also surface here, since the codecs report
    /// them as [`std::io::Error`].
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A record of the block index could not be parsed.
    ///
    /// Raised while the index is being built, which aborts stream
    /// construction. `line` is 1-based; it is 0 when the failure concerns
    /// the index as a whole (for example, an index with no records).
    #[error("Invalid index record at line {line}: {reason}")]
    IndexFormat {
        /// The 1-based line number of the offending record.
        line: usize,
        /// A description of what was wrong with the record.
        reason: String,
    },

    /// A seek target falls outside the readable range `[0, size)`.
    ///
    /// The stream is left exactly as it was before the call.
    #[error("Seek target {target} is outside the stream (size {size})")]
    SeekRange {
        /// The absolute target that was computed for the seek.
        target: i128,
        /// The uncompressed size of the stream.
        size: u64,
    },

    /// The decoder ran out of data while skipping to a position inside a
    /// block.
    ///
    /// This means the index claims a block boundary or length that the
    /// compressed data does not honor. The stream position is undefined
    /// afterwards; the next read attempts a fresh resynchronization.
    #[error(
        "Corrupt index: block {block} should hold at least {expected} bytes before the target, decoder produced {actual}"
    )]
    CorruptIndex {
        /// The block the stream was resynchronizing into.
        block: usize,
        /// Number of bytes that should have been discarded.
        expected: u64,
        /// Number of bytes the decoder actually produced.
        actual: u64,
    },

    /// The decoder refused to reposition to a compressed block start.
    #[error("Decoder cannot seek to compressed position {position}: {reason}")]
    DecoderSeek {
        /// The compressed position that was requested.
        position: u64,
        /// Why the position was rejected.
        reason: String,
    },

    /// The data is compressed with a codec this build cannot decode.
    ///
    /// Enable the corresponding feature flag (`bzip2` or `deflate`).
    #[error("Unsupported data format: {format}")]
    UnsupportedFormat {
        /// The name of the detected format.
        format: &'static str,
    },

    /// A numeric `whence` value did not name a seek origin.
    #[error("Invalid whence value: {0} (expected 0, 1 or 2)")]
    InvalidWhence(i32),

    /// A configuration value was rejected.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Returns `true` if this error indicates that the index and the
    /// compressed data disagree or that the data itself is damaged.
    pub fn is_corruption(&self) -> bool {
        match self {
            Error::CorruptIndex { .. } | Error::IndexFormat { .. } => true,
            Error::Io(e) => e.kind() == io::ErrorKind::InvalidData,
            _ => false,
        }
    }

    /// Returns `true` if this error rejected a seek without touching the
    /// stream state.
    pub fn is_range_error(&self) -> bool {
        matches!(self, Error::SeekRange { .. } | Error::InvalidWhence(_))
    }

    /// Creates an IndexFormat error.
    pub fn index_format(line: usize, reason: impl Into<String>) -> Self {
        Error::IndexFormat {
            line,
            reason: reason.into(),
        }
    }

    /// Creates a DecoderSeek error.
    pub fn decoder_seek(position: u64, reason: impl Into<String>) -> Self {
        Error::DecoderSeek {
            position,
            reason: reason.into(),
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(e) => e,
            Error::SeekRange { .. } | Error::InvalidWhence(_) | Error::InvalidConfig(_) => {
                io::Error::new(io::ErrorKind::InvalidInput, err)
            }
            Error::IndexFormat { .. } | Error::CorruptIndex { .. } => {
                io::Error::new(io::ErrorKind::InvalidData, err)
            }
            other => io::Error::other(other),
        }
    }
}

/// A specialized Result type for seekable stream operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_from() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_index_format_message() {
        let err = Error::index_format(3, "length is negative");
        assert_eq!(
            err.to_string(),
            "Invalid index record at line 3: length is negative"
        );
        assert!(err.is_corruption());
    }

    #[test]
    fn test_seek_range() {
        let err = Error::SeekRange {
            target: -1,
            size: 350,
        };
        let msg = err.to_string();
        assert!(msg.contains("-1"));
        assert!(msg.contains("350"));
        assert!(err.is_range_error());
        assert!(!err.is_corruption());
    }

    #[test]
    fn test_corrupt_index() {
        let err = Error::CorruptIndex {
            block: 2,
            expected: 49,
            actual: 12,
        };
        let msg = err.to_string();
        assert!(msg.contains("block 2"));
        assert!(msg.contains("49"));
        assert!(msg.contains("12"));
        assert!(err.is_corruption());
    }

    #[test]
    fn test_invalid_whence() {
        let err = Error::InvalidWhence(7);
        assert!(err.to_string().contains('7'));
        assert!(err.is_range_error());
    }

    #[test]
    fn test_into_io_error_kinds() {
        let err: io::Error = Error::SeekRange {
            target: 500,
            size: 10,
        }
        .into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        let err: io::Error = Error::CorruptIndex {
            block: 0,
            expected: 1,
            actual: 0,
        }
        .into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        let err: io::Error = Error::decoder_seek(99, "past end").into();
        assert_eq!(err.kind(), io::ErrorKind::Other);

        let original = io::Error::new(io::ErrorKind::UnexpectedEof, "short");
        let err: io::Error = Error::Io(original).into();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
