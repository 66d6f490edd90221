//! Capacity figures reported before a full format.

use crate::config::{
    BLOCK_SIZE, PAYLOAD_SIZE, REPLICATION_FACTOR, UNITS_PER_GB, UNITS_PER_TB, UNIT_BYTES,
};
use serde::Serialize;
use std::fmt;

/// Byte count rendered in the largest of MB/GB/TB it fills at least once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HumanSize(pub u64);

impl HumanSize {
    /// Scaled value and its unit label.
    pub fn scaled(&self) -> (f64, &'static str) {
        let units = self.0 as f64 / UNIT_BYTES as f64;
        if units >= UNITS_PER_TB as f64 {
            (units / UNITS_PER_TB as f64, "TB")
        } else if units >= UNITS_PER_GB as f64 {
            (units / UNITS_PER_GB as f64, "GB")
        } else {
            (units, "MB")
        }
    }
}

impl fmt::Display for HumanSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (value, unit) = self.scaled();
        write!(f, "{value:8.2} {unit}")
    }
}

/// Space figures for a volume of a given block count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Capacity {
    /// Blocks in the volume, superblock included.
    pub total_blocks: u64,
    /// Size of the whole image.
    pub volume: HumanSize,
    /// Payload bytes across every block except the superblock.
    pub data: HumanSize,
    /// Data capacity divided by the replication factor.
    pub usable: HumanSize,
}

impl Capacity {
    /// Compute the figures for `total_blocks` blocks.
    pub fn new(total_blocks: u64) -> Self {
        let data = total_blocks
            .saturating_sub(1)
            .saturating_mul(PAYLOAD_SIZE as u64);
        Self {
            total_blocks,
            volume: HumanSize(total_blocks.saturating_mul(BLOCK_SIZE as u64)),
            data: HumanSize(data),
            usable: HumanSize(data / REPLICATION_FACTOR),
        }
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "total blocks  : {:8}", self.total_blocks)?;
        writeln!(f, "volume        : {}", self.volume)?;
        writeln!(f, "data capacity : {}", self.data)?;
        write!(f, "usable space  : {}", self.usable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BLOCKS_PER_UNIT;

    #[test]
    fn test_one_unit() {
        let cap = Capacity::new(BLOCKS_PER_UNIT);

        assert_eq!(cap.volume.0, UNIT_BYTES);
        assert_eq!(cap.data.0, (BLOCKS_PER_UNIT - 1) * 80);
        assert_eq!(cap.usable.0, cap.data.0 / 8);
    }

    #[test]
    fn test_empty_volume() {
        let cap = Capacity::new(0);
        assert_eq!(cap.volume.0, 0);
        assert_eq!(cap.data.0, 0);
        assert_eq!(cap.usable.0, 0);
    }

    #[test]
    fn test_huge_block_count_saturates() {
        let cap = Capacity::new(u64::MAX);
        assert_eq!(cap.volume.0, u64::MAX);
        assert_eq!(cap.volume.scaled().1, "TB");
    }

    #[test]
    fn test_unit_selection() {
        assert_eq!(HumanSize(UNIT_BYTES).scaled().1, "MB");
        assert_eq!(HumanSize(UNIT_BYTES * 1023).scaled().1, "MB");
        assert_eq!(HumanSize(UNIT_BYTES * 1024).scaled(), (1.0, "GB"));
        assert_eq!(HumanSize(UNIT_BYTES * 1024 * 1024 * 3).scaled(), (3.0, "TB"));
        assert_eq!(HumanSize(UNIT_BYTES / 2).scaled(), (0.5, "MB"));
    }

    #[test]
    fn test_display() {
        assert_eq!(HumanSize(UNIT_BYTES * 2048).to_string(), "    2.00 GB");

        let report = Capacity::new(BLOCKS_PER_UNIT).to_string();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "total blocks  :     8192");
        assert_eq!(lines[1], "volume        :     1.00 MB");
    }
}
