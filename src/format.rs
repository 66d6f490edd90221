//! Full format and superblock restore.
//!
//! ```text
//! probe target → open + lock → [noise fill] → superblock → close
//! ```
//!
//! Restore skips the noise fill and sizes the volume from the image as it
//! is on disk. The superblock is always the last write to block zero.

use crate::config::{FormatOptions, BLOCKS_PER_UNIT};
use crate::error::{Error, Result};
use crate::storage::{fill_noise, Device, RandomSource, TargetKind};
use crate::units::blocks_for_units;
use crate::volume::{Capacity, Superblock};
use std::path::Path;

/// An opened, locked target with its block count settled.
///
/// Nothing has been written yet beyond truncating a forced file.
#[derive(Debug)]
pub struct FormatJob {
    device: Device,
    total_blocks: u64,
    restore: bool,
}

impl FormatJob {
    /// Resolve the target and block count for `opts`.
    pub fn prepare(opts: &FormatOptions) -> Result<Self> {
        let kind = TargetKind::probe(&opts.path)?;

        if kind == TargetKind::RegularFile && !opts.overwrite_allowed() {
            return Err(Error::AlreadyExists(opts.path.clone()));
        }

        // Sized from the options: settle the block count before anything is
        // created or truncated.
        let requested_blocks = if kind != TargetKind::BlockDevice && !opts.restore {
            opts.validate_size()?;
            Some(blocks_for_units(opts.size_units)?)
        } else {
            None
        };

        let device = Device::open(opts, kind)?;

        let total_blocks = if opts.restore {
            log::info!("restoring superblock on {}", opts.path.display());
            device.block_count()?
        } else if let Some(blocks) = requested_blocks {
            blocks
        } else {
            let blocks = device.block_count()?;
            if blocks < BLOCKS_PER_UNIT {
                return Err(Error::TooSmall { units: 0 });
            }
            blocks
        };

        Ok(Self {
            device,
            total_blocks,
            restore: opts.restore,
        })
    }

    /// Target path.
    pub fn path(&self) -> &Path {
        self.device.path()
    }

    /// Blocks the finished volume will hold.
    pub fn total_blocks(&self) -> u64 {
        self.total_blocks
    }

    /// Whether this job only rewrites the superblock.
    pub fn is_restore(&self) -> bool {
        self.restore
    }

    /// Capacity figures for the finished volume.
    pub fn capacity(&self) -> Capacity {
        Capacity::new(self.total_blocks)
    }

    /// Write the volume and release the target.
    ///
    /// `source` supplies the noise and is not touched on restore.
    pub fn run<S: RandomSource + ?Sized>(self, source: &mut S) -> Result<Superblock> {
        if self.restore {
            match Superblock::read_from(&self.device) {
                Ok(old) if old.total_blocks == self.total_blocks => {
                    log::info!("existing superblock already records {} blocks", old.total_blocks);
                }
                Ok(old) => {
                    log::info!(
                        "replacing superblock recording {} blocks with {}",
                        old.total_blocks,
                        self.total_blocks
                    );
                }
                Err(e) => log::warn!("no valid superblock to replace: {e}"),
            }
        } else {
            fill_noise(&self.device, self.total_blocks, source)?;
        }

        let superblock = Superblock::new(self.total_blocks);
        superblock.write_to(&self.device)?;
        log::info!(
            "superblock written to {} ({} blocks)",
            self.device.path().display(),
            self.total_blocks
        );

        Ok(superblock)
    }
}

/// Prepare and run in one step.
pub fn format<S: RandomSource + ?Sized>(
    opts: &FormatOptions,
    source: &mut S,
) -> Result<Superblock> {
    FormatJob::prepare(opts)?.run(source)
}
