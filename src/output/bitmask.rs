//! Visibility bitmask.
//!
//! One bit per configured index, in configured order. Bits are grouped
//! by 8 (first index being the most significant bit of the first
//! group), each group is printed as a decimal byte, groups are joined
//! by '_' and the whole string is finally reversed.
use itertools::Itertools;

/// Encodes the `used` indices that belong to `indices`.
pub fn encode(indices: &[u8], used: impl IntoIterator<Item = u8>) -> String {
    let mut bits = vec![false; indices.len()];

    for index in used {
        if let Some(pos) = indices.iter().position(|i| *i == index) {
            bits[pos] = true;
        }
    }

    bits.chunks(8)
        .map(|chunk| chunk.iter().fold(0_u8, |acc, bit| (acc << 1) | *bit as u8))
        .join("_")
        .chars()
        .rev()
        .collect()
}

/// Recovers the bits of an encoded mask covering `size` indices.
pub fn decode(encoded: &str, size: usize) -> Option<Vec<bool>> {
    let forward = encoded.chars().rev().collect::<String>();
    let bytes = forward
        .split('_')
        .map(|byte| byte.parse::<u8>().ok())
        .collect::<Option<Vec<_>>>()?;

    if bytes.len() != size.div_ceil(8) {
        return None;
    }

    let mut bits = Vec::with_capacity(size);
    for (k, byte) in bytes.iter().enumerate() {
        let width = (size - 8 * k).min(8);
        if width < 8 && (*byte >> width) != 0 {
            return None;
        }
        for j in 0..width {
            bits.push((byte >> (width - 1 - j)) & 1 == 1);
        }
    }

    Some(bits)
}

/// Column label: `max..min` for contiguous sets, otherwise
/// the indices, reversed, joined by '+'.
pub fn label(indices: &[u8]) -> String {
    let (Some(min), Some(max)) = (indices.iter().min(), indices.iter().max()) else {
        return String::new();
    };

    if (max - min) as usize == indices.len() - 1 {
        format!("{}..{}", max, min)
    } else {
        indices.iter().rev().join("+")
    }
}
