//! Data format detection.
//!
//! Picks a block decoder for a data file by examining its magic bytes.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use super::{BlockDecoder, CopyBlockDecoder};
use crate::{Error, Result};

/// Detected data format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataFormat {
    /// Concatenated bzip2 streams.
    Bzip2,
    /// Concatenated gzip members.
    Gzip,
    /// Anything else, read as uncompressed bytes.
    Raw,
}

impl DataFormat {
    /// Returns a human-readable name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            DataFormat::Bzip2 => "bzip2",
            DataFormat::Gzip => "gzip",
            DataFormat::Raw => "raw",
        }
    }

    /// Returns whether this build can decode the format.
    pub fn is_supported(&self) -> bool {
        match self {
            DataFormat::Bzip2 => cfg!(feature = "bzip2"),
            DataFormat::Gzip => cfg!(feature = "deflate"),
            DataFormat::Raw => true,
        }
    }
}

impl std::fmt::Display for DataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

const SIGNATURES: &[(&[u8], DataFormat)] = &[
    // bzip2: 'B' 'Z' 'h' followed by the block size digit
    (&[0x42, 0x5A, 0x68], DataFormat::Bzip2),
    // gzip: 0x1F 0x8B
    (&[0x1F, 0x8B], DataFormat::Gzip),
];

/// Detects the data format from the first bytes of a reader.
///
/// The reader's position is restored before returning.
pub fn detect_format<R: Read + Seek>(reader: &mut R) -> Result<DataFormat> {
    let start_pos = reader.stream_position()?;

    let mut header = [0u8; 4];
    let mut filled = 0;
    while filled < header.len() {
        let n = reader.read(&mut header[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    reader.seek(SeekFrom::Start(start_pos))?;

    let format = SIGNATURES
        .iter()
        .find(|(signature, _)| header[..filled].starts_with(signature))
        .map_or(DataFormat::Raw, |(_, format)| *format);
    Ok(format)
}

/// Opens a data file with the decoder matching its detected format.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`] if the file is compressed with a
/// codec whose feature is disabled in this build.
pub fn open_detected(path: impl AsRef<Path>) -> Result<Box<dyn BlockDecoder>> {
    let mut source = BufReader::new(File::open(path.as_ref())?);
    let format = detect_format(&mut source)?;
    log::debug!("Detected {} data in {}", format, path.as_ref().display());

    match format {
        #[cfg(feature = "bzip2")]
        DataFormat::Bzip2 => Ok(Box::new(super::Bzip2BlockDecoder::new(source)?)),
        #[cfg(feature = "deflate")]
        DataFormat::Gzip => Ok(Box::new(super::GzipBlockDecoder::new(source)?)),
        DataFormat::Raw => Ok(Box::new(CopyBlockDecoder::new(source)?)),
        #[allow(unreachable_patterns)]
        other => Err(Error::UnsupportedFormat {
            format: other.name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_detect_signatures() {
        let mut bz = Cursor::new(b"BZh91AY&SY".to_vec());
        assert_eq!(detect_format(&mut bz).unwrap(), DataFormat::Bzip2);
        assert_eq!(bz.position(), 0);

        let mut gz = Cursor::new(vec![0x1F, 0x8B, 0x08, 0x00, 0x00]);
        assert_eq!(detect_format(&mut gz).unwrap(), DataFormat::Gzip);

        let mut raw = Cursor::new(b"plain text".to_vec());
        assert_eq!(detect_format(&mut raw).unwrap(), DataFormat::Raw);

        let mut short = Cursor::new(b"B".to_vec());
        assert_eq!(detect_format(&mut short).unwrap(), DataFormat::Raw);
    }

    #[test]
    fn test_detect_restores_position() {
        let mut reader = Cursor::new(b"xxBZh9".to_vec());
        reader.set_position(2);
        assert_eq!(detect_format(&mut reader).unwrap(), DataFormat::Bzip2);
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn test_open_detected_raw() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.txt");
        std::fs::write(&path, b"line one\nline two\n").unwrap();

        let mut decoder = open_detected(&path).unwrap();
        decoder.seek_block(9).unwrap();
        assert_eq!(decoder.read_line(None).unwrap(), Some(b"line two\n".to_vec()));
    }

    #[test]
    fn test_format_names() {
        assert_eq!(DataFormat::Bzip2.to_string(), "bzip2");
        assert_eq!(DataFormat::Gzip.name(), "gzip");
        assert!(DataFormat::Raw.is_supported());
    }
}
