//! Stable disambiguation hashes for precise symbol identifiers.

use sha2::{Digest as _, Sha256};

/// Radix of the rendered hash.
const HASH_RADIX: u32 = 36;

/// Hashes are reduced to five base-36 digits (36^5).
const HASH_SPACE: u32 = 60_466_176;

/// Compute the short hash used as a `-<hash>` link suffix for a symbol.
///
/// SHA-256 of the precise identifier, first four bytes read big-endian,
/// reduced to five base-36 digits. The result only depends on the identifier,
/// so a snapshot written by one compilation and read by another agrees on it.
pub fn stable_hash(precise_id: &str) -> String {
    let digest = Sha256::digest(precise_id.as_bytes());
    let mut prefix = [0_u8; 4];
    for (slot, byte) in prefix.iter_mut().zip(digest.iter()) {
        *slot = *byte;
    }

    let mut value = u32::from_be_bytes(prefix).wrapping_rem(HASH_SPACE);
    let mut digits = Vec::new();
    loop {
        if let Some(digit) = char::from_digit(value.wrapping_rem(HASH_RADIX), HASH_RADIX) {
            digits.push(digit);
        }
        value = value.wrapping_div(HASH_RADIX);
        if value == 0 {
            break;
        }
    }

    return digits.iter().rev().collect();
}

/// Whether `text` could have been produced by [`stable_hash`].
///
/// Authored hashes are accepted up to six characters so that links written
/// against longer legacy hashes still parse as hash suffixes.
pub fn is_valid_hash(text: &str) -> bool {
    return !text.is_empty()
        && text.len() <= 6
        && text.bytes().all(|b| return b.is_ascii_digit() || b.is_ascii_lowercase());
}
