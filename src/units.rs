//! Size parsing and block counts.

use crate::config::{BLOCKS_PER_UNIT, UNITS_PER_GB, UNITS_PER_TB, UNIT_BYTES};
use crate::error::{Error, Result};

/// Parse a volume size such as `64`, `512M`, `2G` or `1t` into size units.
///
/// A missing suffix means units. Only the first character after the number
/// is inspected, so `512MB` and `2GB` are accepted too. An empty or negative
/// magnitude parses to zero and is left for the caller to reject.
pub fn parse_size(s: &str) -> Result<u64> {
    let s = s.trim();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    let (number, suffix) = rest.split_at(digits);

    let scale = match suffix.chars().next().map(|c| c.to_ascii_uppercase()) {
        None | Some('M') => 1,
        Some('G') => UNITS_PER_GB,
        Some('T') => UNITS_PER_TB,
        Some(c) => return Err(Error::InvalidUnit(c)),
    };

    if negative || number.is_empty() {
        return Ok(0);
    }

    let magnitude = number
        .parse::<u64>()
        .map_err(|e| Error::InvalidSize(format!("{s}: {e}")))?;
    magnitude
        .checked_mul(scale)
        .ok_or_else(|| Error::InvalidSize(format!("{s}: too large")))
}

/// Number of blocks in `units` size units.
///
/// Fails if the volume's byte size does not fit in a `u64`.
pub fn blocks_for_units(units: u64) -> Result<u64> {
    units
        .checked_mul(UNIT_BYTES)
        .map(|_| units * BLOCKS_PER_UNIT)
        .ok_or_else(|| Error::InvalidSize(format!("{units} units: too large")))
}
