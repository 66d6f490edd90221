//! On-disk block layout.

use crate::config::{ADDRESS_SIZE, BLOCK_SIZE, CHAIN_SIZE, INTEGRITY_SIZE, PAYLOAD_SIZE};
use crate::storage::RandomSource;

const PAYLOAD_OFFSET: usize = ADDRESS_SIZE;
const INTEGRITY_OFFSET: usize = PAYLOAD_OFFSET + PAYLOAD_SIZE;
const CHAIN_OFFSET: usize = INTEGRITY_OFFSET + INTEGRITY_SIZE;

/// One fixed-size block, split into its four fields.
///
/// Encoded as the fields back to back in declaration order with no padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Content-derived address, or the superblock marker.
    pub address: [u8; ADDRESS_SIZE],
    /// Encrypted data.
    pub payload: [u8; PAYLOAD_SIZE],
    /// Integrity hash, or the superblock magic.
    pub integrity: [u8; INTEGRITY_SIZE],
    /// Link to the next block, or the superblock block count.
    pub chain: [u8; CHAIN_SIZE],
}

impl Block {
    /// A block with every field zeroed.
    pub fn zeroed() -> Self {
        Self {
            address: [0; ADDRESS_SIZE],
            payload: [0; PAYLOAD_SIZE],
            integrity: [0; INTEGRITY_SIZE],
            chain: [0; CHAIN_SIZE],
        }
    }

    /// A block with every field drawn independently from `source`.
    pub fn noise<S: RandomSource + ?Sized>(source: &mut S) -> Self {
        let mut block = Self::zeroed();
        source.fill(&mut block.address);
        source.fill(&mut block.payload);
        source.fill(&mut block.integrity);
        source.fill(&mut block.chain);
        block
    }

    /// Encode into `buf`, which must be exactly one block long.
    pub fn encode_into(&self, buf: &mut [u8]) {
        assert_eq!(buf.len(), BLOCK_SIZE);
        buf[..PAYLOAD_OFFSET].copy_from_slice(&self.address);
        buf[PAYLOAD_OFFSET..INTEGRITY_OFFSET].copy_from_slice(&self.payload);
        buf[INTEGRITY_OFFSET..CHAIN_OFFSET].copy_from_slice(&self.integrity);
        buf[CHAIN_OFFSET..].copy_from_slice(&self.chain);
    }

    /// Encode to a freshly allocated buffer.
    pub fn to_bytes(&self) -> [u8; BLOCK_SIZE] {
        let mut buf = [0u8; BLOCK_SIZE];
        self.encode_into(&mut buf);
        buf
    }

    /// Decode one block from exactly `BLOCK_SIZE` bytes.
    pub fn from_bytes(buf: &[u8; BLOCK_SIZE]) -> Self {
        let mut block = Self::zeroed();
        block.address.copy_from_slice(&buf[..PAYLOAD_OFFSET]);
        block.payload.copy_from_slice(&buf[PAYLOAD_OFFSET..INTEGRITY_OFFSET]);
        block.integrity.copy_from_slice(&buf[INTEGRITY_OFFSET..CHAIN_OFFSET]);
        block.chain.copy_from_slice(&buf[CHAIN_OFFSET..]);
        block
    }

    /// Byte offset of block `index` from the start of the volume.
    ///
    /// Saturates at `u64::MAX`; no I/O can succeed at that offset.
    pub fn offset(index: u64) -> u64 {
        index.saturating_mul(BLOCK_SIZE as u64)
    }
}
