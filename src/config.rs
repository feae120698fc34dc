//! Configuration for seekable streams.
//!
//! This module provides [`StreamConfig`] for controlling how a
//! [`SeekableStream`](crate::SeekableStream) pulls data from its decoder.

/// Default chunk size for unbounded reads (1 MiB).
pub const DEFAULT_READ_CHUNK_SIZE: usize = 1024 * 1024;

/// Configuration for a seekable stream.
///
/// # Example
///
/// ```rust
/// use blockseek::StreamConfig;
///
/// // Default configuration (1 MiB chunks, always reposition from block start)
/// let config = StreamConfig::default();
///
/// // Skip forward inside the current block instead of repositioning
/// let config = StreamConfig::new()
///     .read_chunk_size(256 * 1024)
///     .forward_skip(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Size of each chunk requested from the decoder when reading to the
    /// end of the stream.
    ///
    /// Default: 1 MiB.
    pub read_chunk_size: usize,

    /// Skip forward from the decoder's current position when a seek lands
    /// later in the same block.
    ///
    /// When disabled, every resynchronization repositions the decoder at the
    /// start of the containing block and discards bytes up to the target.
    /// Default: false.
    pub forward_skip: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            forward_skip: false,
        }
    }
}

impl StreamConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the chunk size for unbounded reads.
    pub fn read_chunk_size(mut self, bytes: usize) -> Self {
        self.read_chunk_size = bytes;
        self
    }

    /// Enables or disables the same-block forward skip.
    pub fn forward_skip(mut self, enabled: bool) -> Self {
        self.forward_skip = enabled;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> crate::Result<()> {
        if self.read_chunk_size == 0 {
            return Err(crate::Error::InvalidConfig(
                "read_chunk_size must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StreamConfig::default();
        assert_eq!(config.read_chunk_size, 1024 * 1024);
        assert!(!config.forward_skip);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = StreamConfig::new().read_chunk_size(4096).forward_skip(true);
        assert_eq!(config.read_chunk_size, 4096);
        assert!(config.forward_skip);
    }

    #[test]
    fn test_validation_zero_chunk() {
        let config = StreamConfig::new().read_chunk_size(0);
        assert!(matches!(
            config.validate(),
            Err(crate::Error::InvalidConfig(_))
        ));
    }
}
