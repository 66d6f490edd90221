//! Noise fill: every block of a fresh volume gets random bytes.
//!
//! Blocks holding real data are encrypted and look random, so unused blocks
//! must look the same. The fill runs in batches of one size unit so memory
//! use stays flat however large the target is.

use crate::config::{BLOCKS_PER_UNIT, BLOCK_SIZE, UNITS_PER_GB};
use crate::error::Result;
use crate::storage::Device;
use crate::volume::Block;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// Source of the bytes written into unused blocks.
pub trait RandomSource {
    /// Fill `buf` entirely with random bytes.
    fn fill(&mut self, buf: &mut [u8]);
}

impl<R: RngCore + ?Sized> RandomSource for R {
    fn fill(&mut self, buf: &mut [u8]) {
        self.fill_bytes(buf);
    }
}

/// Cryptographically secure generator freshly seeded from the OS.
///
/// Call once per format run. Never substitute a fixed seed outside tests.
pub fn entropy_source() -> StdRng {
    StdRng::from_entropy()
}

/// Write noise into blocks `0..total_blocks` of `device`.
///
/// Block zero is filled too; the superblock overwrites it afterwards.
pub fn fill_noise<S: RandomSource + ?Sized>(
    device: &Device,
    total_blocks: u64,
    source: &mut S,
) -> Result<()> {
    log::info!("writing noise to {} blocks", total_blocks);

    let mut batch = Vec::with_capacity(BLOCKS_PER_UNIT as usize * BLOCK_SIZE);
    let mut index = 0;
    while index < total_blocks {
        let count = (total_blocks - index).min(BLOCKS_PER_UNIT);
        batch.resize(count as usize * BLOCK_SIZE, 0);

        for chunk in batch.chunks_exact_mut(BLOCK_SIZE) {
            Block::noise(source).encode_into(chunk);
        }
        device.write_at(Block::offset(index), &batch)?;

        index += count;
        if (index / BLOCKS_PER_UNIT) % UNITS_PER_GB == 0 {
            log::debug!("{index}/{total_blocks} blocks written");
        }
    }

    Ok(())
}
