//! Protocol constants and formatter options.
//!
//! The block geometry and superblock markers below are shared with the
//! filesystem driver. Changing any of them produces images the driver
//! cannot read.

use crate::error::{Error, Result};
use std::path::PathBuf;

/// Width of the address field (bytes).
pub const ADDRESS_SIZE: usize = 16;

/// Width of the payload field (bytes).
pub const PAYLOAD_SIZE: usize = 80;

/// Width of the integrity field (bytes).
pub const INTEGRITY_SIZE: usize = 24;

/// Width of the chain field (bytes).
pub const CHAIN_SIZE: usize = 8;

/// Total size of one block.
pub const BLOCK_SIZE: usize = ADDRESS_SIZE + PAYLOAD_SIZE + INTEGRITY_SIZE + CHAIN_SIZE;

/// One size unit (1 MiB). Sizes given on the command line count these.
pub const UNIT_BYTES: u64 = 1 << 20;

/// Blocks per size unit; also the noise-fill batch length.
pub const BLOCKS_PER_UNIT: u64 = UNIT_BYTES / BLOCK_SIZE as u64;

/// Size units per gigabyte.
pub const UNITS_PER_GB: u64 = 1 << 10;

/// Size units per terabyte.
pub const UNITS_PER_TB: u64 = 1 << 20;

/// Copies the driver stores of every logical block.
pub const REPLICATION_FACTOR: u64 = 8;

/// Superblock markers.
pub mod superblock_params {
    /// First byte of the superblock address field.
    pub const ADDRESS_START: u8 = 0x02;

    /// Last byte of the superblock address field.
    pub const ADDRESS_END: u8 = 0x03;

    /// Identifier stored between the two address sentinels, zero padded.
    pub const IDENTIFIER: &[u8] = b"vstegfs";

    /// Fill byte for the superblock payload.
    pub const PAYLOAD_FILL: u8 = 0xFF;

    /// Leading bytes of the superblock integrity field.
    pub const MAGIC: [u8; 3] = [0x9E, 0x3A, 0x71];
}

/// Options for one formatter run.
#[derive(Debug, Clone, Default)]
pub struct FormatOptions {
    /// Target file or block device.
    pub path: PathBuf,
    /// Requested size in units. Ignored for block devices and restores.
    pub size_units: u64,
    /// Overwrite an existing regular file.
    pub force: bool,
    /// Only rewrite the superblock of an existing image.
    pub restore: bool,
}

impl FormatOptions {
    /// Options for a full format of `size_units` units at `path`.
    pub fn new(path: impl Into<PathBuf>, size_units: u64) -> Self {
        Self {
            path: path.into(),
            size_units,
            force: false,
            restore: false,
        }
    }

    /// Options for rewriting only the superblock at `path`.
    ///
    /// A restore always targets an existing image, so it implies force.
    pub fn restore(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            size_units: 0,
            force: true,
            restore: true,
        }
    }

    /// Set the force flag.
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Check the requested size of a full format onto a file.
    ///
    /// Block devices are sized from the device itself and checked after
    /// opening.
    pub fn validate_size(&self) -> Result<()> {
        if !self.restore && self.size_units < 1 {
            return Err(Error::TooSmall {
                units: self.size_units,
            });
        }
        Ok(())
    }

    /// Force is in effect, either given or implied by restore.
    pub fn overwrite_allowed(&self) -> bool {
        self.force || self.restore
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_geometry() {
        assert_eq!(BLOCK_SIZE, 128);
        assert_eq!(BLOCKS_PER_UNIT, 8192);
        assert_eq!(BLOCKS_PER_UNIT * BLOCK_SIZE as u64, UNIT_BYTES);
    }

    #[test]
    fn test_identifier_fits_between_sentinels() {
        assert!(superblock_params::IDENTIFIER.len() <= ADDRESS_SIZE - 2);
        assert!(superblock_params::MAGIC.len() <= INTEGRITY_SIZE);
    }

    #[test]
    fn test_validate_rejects_zero_size() {
        let opts = FormatOptions::new("/tmp/vol", 0);
        assert!(matches!(opts.validate_size(), Err(Error::TooSmall { units: 0 })));
    }

    #[test]
    fn test_restore_ignores_size_and_implies_force() {
        let opts = FormatOptions::restore("/tmp/vol");
        assert!(opts.validate_size().is_ok());
        assert!(opts.overwrite_allowed());
    }
}
