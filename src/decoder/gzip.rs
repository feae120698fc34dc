//! Gzip member decoder.
//!
//! Handles BGZF-style files: a sequence of complete gzip members, one per
//! indexed block, with the index recording each member's byte offset.

use std::io::BufRead;

use flate2::bufread::MultiGzDecoder;

use super::member::{MemberDecoder, MemberFormat};

/// Concatenated gzip members.
#[derive(Debug, Clone, Copy, Default)]
pub struct GzipMembers;

impl MemberFormat for GzipMembers {
    const NAME: &'static str = "gzip";

    type Reader<R: BufRead> = MultiGzDecoder<R>;

    fn reader<R: BufRead>(source: R) -> Self::Reader<R> {
        MultiGzDecoder::new(source)
    }

    fn into_source<R: BufRead>(reader: Self::Reader<R>) -> R {
        reader.into_inner()
    }
}

/// Block decoder for concatenated gzip members.
pub type GzipBlockDecoder<R> = MemberDecoder<R, GzipMembers>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::BlockDecoder;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::io::{Cursor, Write};

    fn compress_members(blocks: &[&[u8]]) -> (Vec<u8>, Vec<u64>) {
        let mut data = Vec::new();
        let mut offsets = Vec::new();
        for block in blocks {
            offsets.push(data.len() as u64);
            let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(block).unwrap();
            data.extend_from_slice(&encoder.finish().unwrap());
        }
        (data, offsets)
    }

    #[test]
    fn test_gzip_seek_to_member() {
        let (data, offsets) = compress_members(&[b"one\ntwo\n", b"three\n", b"four\n"]);
        let mut decoder = GzipBlockDecoder::new(Cursor::new(data)).unwrap();

        decoder.seek_block(offsets[2]).unwrap();
        assert_eq!(decoder.read(64).unwrap(), Some(b"four\n".to_vec()));
        assert_eq!(decoder.read(64).unwrap(), None);

        decoder.seek_block(offsets[0]).unwrap();
        assert_eq!(decoder.skip(4).unwrap(), 4);
        assert_eq!(decoder.read_line(None).unwrap(), Some(b"two\n".to_vec()));
        assert_eq!(decoder.read_line(Some(2)).unwrap(), Some(b"th".to_vec()));
    }

    #[test]
    fn test_gzip_close() {
        let (data, _) = compress_members(&[b"x"]);
        let decoder = GzipBlockDecoder::new(Cursor::new(data)).unwrap();
        decoder.close().unwrap();
    }
}
