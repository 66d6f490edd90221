//! Steganographic volume formatter
//!
//! Initialises an image (regular file or raw block device) whose every block
//! is indistinguishable from random noise, apart from one superblock that
//! lets the filesystem driver find the volume size.
//!
//! # Layout
//!
//! ```text
//! block 0       superblock: marker | 0xFF fill | magic | block count (LE)
//! block 1..N    noise:      random | random    | random | random
//! ```
//!
//! Each block is 128 bytes: a 16 byte address, 80 byte payload, 24 byte
//! integrity field and 8 byte chain field.
//!
//! # Example
//!
//! ```rust,no_run
//! use vstegfs::{entropy_source, FormatJob, FormatOptions};
//!
//! let job = FormatJob::prepare(&FormatOptions::new("volume.img", 64)).unwrap();
//! println!("{}", job.capacity());
//! let superblock = job.run(&mut entropy_source()).unwrap();
//! assert_eq!(superblock.total_blocks, 64 * 8192);
//! ```

pub mod config;
pub mod error;
pub mod format;
pub mod storage;
pub mod units;
pub mod volume;

pub use config::FormatOptions;
pub use error::{Error, Result};
pub use format::{format, FormatJob};
pub use storage::{entropy_source, RandomSource};
pub use volume::{Block, Capacity, Superblock};
