//! Volume layout: blocks, the superblock, and capacity figures.

mod block;
mod capacity;
mod superblock;

pub use block::Block;
pub use capacity::{Capacity, HumanSize};
pub use superblock::Superblock;
