//! Counters describing how a seekable stream used its decoder.
//!
//! Useful for checking that seeks stay lazy and for spotting workloads that
//! resynchronize more often than they should.

/// Aggregated stream statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Seeks that moved the cursor (no-op seeks are not counted).
    pub seeks: u64,
    /// Times the decoder was repositioned at a block start.
    pub resyncs: u64,
    /// Resynchronizations served by skipping forward inside the current
    /// block instead of repositioning.
    pub forward_skips: u64,
    /// Bytes decoded and thrown away to reach a target inside a block.
    pub bytes_discarded: u64,
    /// Bytes returned to the caller by reads.
    pub bytes_delivered: u64,
    /// Reads that observed end of stream.
    pub eof_hits: u64,
}

impl StreamStats {
    /// Returns the number of bytes the decoder produced, delivered or not.
    pub fn bytes_decoded(&self) -> u64 {
        self.bytes_delivered + self.bytes_discarded
    }

    /// Returns the fraction of decoded bytes that were discarded.
    pub fn discard_ratio(&self) -> f64 {
        let decoded = self.bytes_decoded();
        if decoded == 0 {
            0.0
        } else {
            self.bytes_discarded as f64 / decoded as f64
        }
    }

    /// Clears all statistics.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
