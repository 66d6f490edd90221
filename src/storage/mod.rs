//! Storage layer for the volume image.
//!
//! This module handles:
//! - Classifying and opening the target under an exclusive lock
//! - Offset-addressed block reads and writes
//! - Filling the image with noise

mod device;
mod noise;

pub use device::{Device, TargetKind};
pub use noise::{entropy_source, fill_noise, RandomSource};
