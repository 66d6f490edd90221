//! Superblock - the one recognisable block of a volume.
//!
//! Block zero carries fixed markers and the total block count so the driver
//! can size the volume without scanning it. Every other block is noise.

use crate::config::superblock_params::{
    ADDRESS_END, ADDRESS_START, IDENTIFIER, MAGIC, PAYLOAD_FILL,
};
use crate::config::{ADDRESS_SIZE, BLOCK_SIZE, INTEGRITY_SIZE, PAYLOAD_SIZE};
use crate::error::{Error, Result};
use crate::storage::Device;
use crate::volume::Block;
use std::fs::File;
use std::os::unix::fs::FileExt;
use std::path::Path;

/// Decoded superblock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Superblock {
    /// Number of blocks in the volume, superblock included.
    pub total_blocks: u64,
}

impl Superblock {
    /// Create a superblock for a volume of `total_blocks` blocks.
    pub fn new(total_blocks: u64) -> Self {
        Self { total_blocks }
    }

    /// The address field marker: sentinels around the zero padded identifier.
    pub fn address_marker() -> [u8; ADDRESS_SIZE] {
        let mut address = [0u8; ADDRESS_SIZE];
        address[0] = ADDRESS_START;
        address[1..1 + IDENTIFIER.len()].copy_from_slice(IDENTIFIER);
        address[ADDRESS_SIZE - 1] = ADDRESS_END;
        address
    }

    /// Build the on-disk block.
    pub fn to_block(&self) -> Block {
        let mut integrity = [0u8; INTEGRITY_SIZE];
        integrity[..MAGIC.len()].copy_from_slice(&MAGIC);

        Block {
            address: Self::address_marker(),
            payload: [PAYLOAD_FILL; PAYLOAD_SIZE],
            integrity,
            chain: self.total_blocks.to_le_bytes(),
        }
    }

    /// Decode and validate block zero.
    pub fn from_block(block: &Block) -> Result<Self> {
        if block.address != Self::address_marker() {
            return Err(Error::InvalidSuperblock("address marker mismatch".to_string()));
        }
        if block.integrity[..MAGIC.len()] != MAGIC {
            return Err(Error::InvalidSuperblock(format!(
                "bad magic {}",
                hex::encode(&block.integrity[..MAGIC.len()])
            )));
        }
        Ok(Self::new(u64::from_le_bytes(block.chain)))
    }

    /// Write the superblock at offset zero of `device` and flush it.
    pub fn write_to(&self, device: &Device) -> Result<()> {
        let block = self.to_block();
        log::debug!("superblock address {}", hex::encode(block.address));
        device.write_at(0, &block.to_bytes())?;
        device.sync()
    }

    /// Read and validate block zero of `device`.
    pub fn read_from(device: &Device) -> Result<Self> {
        Self::from_block(&device.read_block(0)?)
    }

    /// Read and validate block zero of the image at `path`.
    pub fn read(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::OpenFailure {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut buf = [0u8; BLOCK_SIZE];
        file.read_exact_at(&mut buf, 0).map_err(Error::ReadFailure)?;
        Self::from_block(&Block::from_bytes(&buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_marker_layout() {
        let address = Superblock::address_marker();
        assert_eq!(address[0], 0x02);
        assert_eq!(address[15], 0x03);
        assert_eq!(&address[1..8], b"vstegfs");
        assert!(address[8..15].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_block_layout() {
        let block = Superblock::new(8192).to_block();

        assert!(block.payload.iter().all(|&b| b == 0xFF));
        assert_eq!(&block.integrity[..3], &MAGIC);
        assert!(block.integrity[3..].iter().all(|&b| b == 0));
        assert_eq!(block.chain, [0x00, 0x20, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_to_block_is_deterministic() {
        let sb = Superblock::new(123_456);
        assert_eq!(sb.to_block().to_bytes(), sb.to_block().to_bytes());
    }

    #[test]
    fn test_from_block() {
        let sb = Superblock::new(u64::MAX - 1);
        assert_eq!(Superblock::from_block(&sb.to_block()).unwrap(), sb);
    }

    #[test]
    fn test_from_block_rejects_noise() {
        let block = Block::zeroed();
        assert!(matches!(
            Superblock::from_block(&block),
            Err(Error::InvalidSuperblock(_))
        ));
    }

    #[test]
    fn test_from_block_rejects_bad_magic() {
        let mut block = Superblock::new(1).to_block();
        block.integrity[2] ^= 0xFF;
        assert!(matches!(
            Superblock::from_block(&block),
            Err(Error::InvalidSuperblock(_))
        ));
    }
}
