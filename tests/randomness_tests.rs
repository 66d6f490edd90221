//! Noise quality tests - formatted blocks must look like uniform random bytes.

use std::fs;
use tempfile::TempDir;
use vstegfs::config::{ADDRESS_SIZE, BLOCK_SIZE, CHAIN_SIZE, INTEGRITY_SIZE, PAYLOAD_SIZE};
use vstegfs::{entropy_source, format, FormatOptions};

/// Format a fresh one-unit image with production entropy and return its bytes.
fn format_image(temp_dir: &TempDir, name: &str) -> Vec<u8> {
    let path = temp_dir.path().join(name);
    format(&FormatOptions::new(&path, 1), &mut entropy_source()).expect("Failed to format");
    fs::read(&path).expect("Failed to read image")
}

/// Chi-square statistic of a byte histogram against the uniform distribution.
fn chi_square<'a>(bytes: impl Iterator<Item = &'a u8>) -> f64 {
    let mut counts = [0u64; 256];
    let mut n = 0u64;
    for &b in bytes {
        counts[b as usize] += 1;
        n += 1;
    }
    let expected = n as f64 / 256.0;
    counts
        .iter()
        .map(|&c| {
            let d = c as f64 - expected;
            d * d / expected
        })
        .sum()
}

/// Bytes of one field across every block after the superblock.
fn field_bytes(image: &[u8], start: usize, len: usize) -> Vec<u8> {
    image[BLOCK_SIZE..]
        .chunks_exact(BLOCK_SIZE)
        .flat_map(|block| block[start..start + len].iter().copied())
        .collect()
}

// 255 degrees of freedom: mean 255, standard deviation ~22.6. 400 is more
// than six deviations out.
const CHI_SQUARE_LIMIT: f64 = 400.0;

#[test]
fn test_every_field_is_uniform() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let image = format_image(&temp_dir, "volume.img");

    let fields = [
        ("address", 0, ADDRESS_SIZE),
        ("payload", ADDRESS_SIZE, PAYLOAD_SIZE),
        ("integrity", ADDRESS_SIZE + PAYLOAD_SIZE, INTEGRITY_SIZE),
        ("chain", BLOCK_SIZE - CHAIN_SIZE, CHAIN_SIZE),
    ];

    for (name, start, len) in fields {
        let bytes = field_bytes(&image, start, len);
        let chi = chi_square(bytes.iter());
        assert!(chi < CHI_SQUARE_LIMIT, "{name} field chi-square {chi:.1}");
    }
}

#[test]
fn test_independent_formats_are_uncorrelated() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let a = format_image(&temp_dir, "a.img");
    let b = format_image(&temp_dir, "b.img");

    // Block zero is the superblock and identical by construction
    let n = a.len() - BLOCK_SIZE;
    let matches = a[BLOCK_SIZE..]
        .iter()
        .zip(&b[BLOCK_SIZE..])
        .filter(|(x, y)| x == y)
        .count();

    // Expected n/256 ~ 4095 equal positions with a standard deviation of ~64
    let expected = n as f64 / 256.0;
    let deviation = (matches as f64 - expected).abs();
    assert!(deviation < 600.0, "{matches} equal bytes, expected ~{expected:.0}");
}

#[test]
fn test_no_block_repeats() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let image = format_image(&temp_dir, "volume.img");

    let mut blocks: Vec<&[u8]> = image[BLOCK_SIZE..].chunks_exact(BLOCK_SIZE).collect();
    let total = blocks.len();
    blocks.sort_unstable();
    blocks.dedup();
    assert_eq!(blocks.len(), total);
}
