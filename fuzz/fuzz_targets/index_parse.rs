//! Fuzz target for BlockIndex::parse with arbitrary index text.
//!
//! Run with: cargo +nightly fuzz run index_parse
//!
//! Properties checked on every successfully parsed index:
//! - Block starts are the running sum of block lengths
//! - Every position below the total size locates inside its block

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(index) = blockseek::BlockIndex::parse(data) else {
        return;
    };

    let mut expected_start = 0u64;
    for block in index.blocks() {
        assert_eq!(block.start, expected_start, "block {} start", block.number);
        expected_start += block.length;
    }
    assert_eq!(expected_start, index.total_size());

    let size = index.total_size();
    for position in [0, size / 3, size / 2, size.saturating_sub(1)] {
        if position >= size {
            assert!(index.locate(position).is_err());
            continue;
        }
        let (block, offset) = index.locate(position).expect("position is in range");
        assert!(offset < index.block_len(block), "offset past block end");
        assert_eq!(index.block_start(block) + offset, position);
    }
    assert!(index.locate(size).is_err());
});
