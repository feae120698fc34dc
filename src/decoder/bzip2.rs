//! BZip2 member decoder.
//!
//! Data files for this decoder are concatenations of complete bzip2
//! streams, one per indexed block. The index records the byte offset at
//! which each stream begins.

use std::io::BufRead;

use bzip2::bufread::MultiBzDecoder;

use super::member::{MemberDecoder, MemberFormat};

/// Concatenated bzip2 streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bzip2Members;

impl MemberFormat for Bzip2Members {
    const NAME: &'static str = "bzip2";

    type Reader<R: BufRead> = MultiBzDecoder<R>;

    fn reader<R: BufRead>(source: R) -> Self::Reader<R> {
        MultiBzDecoder::new(source)
    }

    fn into_source<R: BufRead>(reader: Self::Reader<R>) -> R {
        reader.into_inner()
    }
}

/// Block decoder for concatenated bzip2 streams.
pub type Bzip2BlockDecoder<R> = MemberDecoder<R, Bzip2Members>;
