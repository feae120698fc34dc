//! # blockseek
//!
//! Random access into block-compressed files.
//!
//! A compressed file made of independently decodable blocks (concatenated
//! bzip2 streams, gzip members written BGZF-style) can be read from any
//! block start without decompressing what comes before it. Given a small
//! side index describing each block, this crate exposes such a file as a
//! seekable stream of uncompressed bytes and lines.
//!
//! ## Quick Start
//!
//! ### Reading at an Offset
//!
//! ```rust,no_run
//! use blockseek::{Result, SeekableBzip2File, Whence};
//!
//! fn main() -> Result<()> {
//!     let mut stream = SeekableBzip2File::open("genome.fa.bz2", "genome.fa.bz2.idx")?;
//!
//!     stream.seek(1_048_576, Whence::Start)?;
//!     let bytes = stream.read(Some(80))?;
//!     println!("read {} bytes, now at {}", bytes.len(), stream.tell());
//!     Ok(())
//! }
//! ```
//!
//! ### Iterating Over Lines
//!
//! ```rust,no_run
//! use blockseek::{Result, SeekableGzipFile, Whence};
//!
//! fn main() -> Result<()> {
//!     let mut stream = SeekableGzipFile::open("events.log.gz", "events.log.gz.idx")?;
//!
//!     // The last 4 KiB of the log
//!     stream.seek(4096, Whence::End)?;
//!     for line in stream.lines() {
//!         print!("{}", String::from_utf8_lossy(&line?));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Index Format
//!
//! The index is a text file with one record per block, in block order:
//!
//! ```text
//! <compressed_start> <uncompressed_length>
//! ```
//!
//! `compressed_start` is the byte offset of the block in the compressed
//! file; `uncompressed_length` is the number of bytes the block decodes to.
//! See [`index`] for the details.
//!
//! ## Seek Semantics
//!
//! Seeking only moves a cursor. The decoder is repositioned lazily, on the
//! next read, at the start of the block containing the cursor; bytes before
//! the cursor in that block are decoded and discarded. Repeated seeks
//! without reads in between cost nothing.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `bzip2` | Yes | Concatenated bzip2 streams |
//! | `deflate` | Yes | Concatenated gzip members |
//!
//! ## Error Handling
//!
//! All operations return [`Result<T>`], which is an alias for
//! `std::result::Result<T, Error>`. Reaching the end of the stream is not an
//! error:
//!
//! ```rust,no_run
//! use blockseek::{Error, SeekableBzip2File, Whence};
//!
//! fn line_at(offset: i64) -> blockseek::Result<Option<Vec<u8>>> {
//!     let mut stream = SeekableBzip2File::open("data.bz2", "data.bz2.idx")?;
//!     match stream.seek(offset, Whence::Start) {
//!         Ok(_) => stream.next_line(),
//!         Err(Error::SeekRange { .. }) => Ok(None),
//!         Err(e) => Err(e),
//!     }
//! }
//! # fn main() {}
//! ```
//!
//! ## Logging
//!
//! The crate logs through the [`log`](https://docs.rs/log) facade: stream
//! construction at `debug`, seeks and resynchronizations at `trace`, and
//! index/data mismatches at `warn`.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod config;
pub mod decoder;
pub mod error;
pub mod index;
pub mod stats;
pub mod stream;

pub use config::StreamConfig;
pub use error::{Error, Result};
pub use index::{Block, BlockDescriptor, BlockIndex};
pub use stats::StreamStats;
pub use stream::{Lines, SeekableDetectedFile, SeekableRawFile, SeekableStream, Whence};

// Re-export decoder API at crate root for convenience
pub use decoder::{BlockDecoder, CopyBlockDecoder, DataFormat, MemberDecoder, MemberFormat};

#[cfg(feature = "bzip2")]
#[cfg_attr(docsrs, doc(cfg(feature = "bzip2")))]
pub use stream::SeekableBzip2File;

#[cfg(feature = "deflate")]
#[cfg_attr(docsrs, doc(cfg(feature = "deflate")))]
pub use stream::SeekableGzipFile;
