//! # UUID Wire Layout
//!
//! The wire order of a UUID does not match its textual big-endian layout.
//! With the canonical groups A (4 bytes), B (2), C (2), D (2), E (6), the
//! stream carries: C little-endian, B little-endian, A little-endian, then
//! D reversed, then E reversed:
//!
//! ```text
//! canonical:  a0 a1 a2 a3 b0 b1 c0 c1 d0 d1 e0 e1 e2 e3 e4 e5
//! wire:       c1 c0 b1 b0 a3 a2 a1 a0 d1 d0 e5 e4 e3 e2 e1 e0
//! ```
//!
//! The first eight bytes are a straight reversal of the canonical first
//! eight; D and E reverse within themselves. The permutation is therefore
//! its own inverse: the reader and the writer apply the same swizzle.
//!
//! Canonical text parsing follows the usual 8-4-4-4-12 form; parsing is
//! adapted from the hex handling used for literals elsewhere in the stack.

use eyre::{bail, Result};

/// Applies the wire permutation. Involutive: converts canonical byte order
/// to wire order and back.
pub fn uuid_swizzle(bytes: [u8; 16]) -> [u8; 16] {
    let mut out = [0u8; 16];
    for i in 0..8 {
        out[i] = bytes[7 - i];
    }
    out[8] = bytes[9];
    out[9] = bytes[8];
    for i in 0..6 {
        out[10 + i] = bytes[15 - i];
    }
    out
}

/// Formats canonical bytes as lowercase 8-4-4-4-12 text.
pub fn format_uuid(bytes: &[u8; 16]) -> String {
    let mut text = String::with_capacity(36);
    for (i, byte) in bytes.iter().enumerate() {
        if matches!(i, 4 | 6 | 8 | 10) {
            text.push('-');
        }
        text.push_str(&format!("{byte:02x}"));
    }
    text
}

/// Parses canonical (or dash-free compact) UUID text into canonical bytes.
pub fn parse_uuid(s: &str) -> Result<[u8; 16]> {
    let s = s.trim();
    let hex_only: String = s.chars().filter(|c| *c != '-').collect();

    if hex_only.len() != 32 {
        bail!(
            "invalid UUID format '{}': expected 32 hex chars, got {}",
            s,
            hex_only.len()
        );
    }

    let mut bytes = [0u8; 16];
    for (i, chunk) in hex_only.as_bytes().chunks(2).enumerate() {
        let high = hex_digit(chunk[0], s)?;
        let low = hex_digit(chunk[1], s)?;
        bytes[i] = (high << 4) | low;
    }

    Ok(bytes)
}

fn hex_digit(byte: u8, source: &str) -> Result<u8> {
    match byte {
        b'0'..=b'9' => Ok(byte - b'0'),
        b'a'..=b'f' => Ok(byte - b'a' + 10),
        b'A'..=b'F' => Ok(byte - b'A' + 10),
        _ => bail!("invalid hex in UUID '{}'", source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXT: &str = "61f0c404-5cb3-11e7-907b-a6006ad3dba0";

    #[test]
    fn parse_and_format_round_trip() {
        let bytes = parse_uuid(TEXT).unwrap();
        assert_eq!(format_uuid(&bytes), TEXT);
    }

    #[test]
    fn parse_accepts_compact_form() {
        let with_dashes = parse_uuid(TEXT).unwrap();
        let compact: String = TEXT.chars().filter(|c| *c != '-').collect();
        assert_eq!(parse_uuid(&compact).unwrap(), with_dashes);
    }

    #[test]
    fn parse_rejects_malformed_text() {
        assert!(parse_uuid("61f0c404").is_err());
        assert!(parse_uuid("zzf0c404-5cb3-11e7-907b-a6006ad3dba0").is_err());
        assert!(parse_uuid("").is_err());
    }

    #[test]
    fn swizzle_reorders_the_groups() {
        let canonical = parse_uuid(TEXT).unwrap();
        let wire = uuid_swizzle(canonical);

        // A=61f0c404 B=5cb3 C=11e7 D=907b E=a6006ad3dba0.
        assert_eq!(
            wire,
            [
                0xe7, 0x11, // C little-endian
                0xb3, 0x5c, // B little-endian
                0x04, 0xc4, 0xf0, 0x61, // A little-endian
                0x7b, 0x90, // D reversed
                0xa0, 0xdb, 0xd3, 0x6a, 0x00, 0xa6, // E reversed
            ]
        );
    }

    #[test]
    fn swizzle_is_its_own_inverse() {
        let canonical = parse_uuid(TEXT).unwrap();
        assert_eq!(uuid_swizzle(uuid_swizzle(canonical)), canonical);
    }
}
