/// Returns the byte that makes the whole block sum to zero mod 256.
/// The last byte of `block` is the stored checksum and is ignored.
pub fn value(block: &[u8]) -> u8 {
    let body = &block[..block.len().saturating_sub(1)];
    0u8.wrapping_sub(sum(body))
}

/// Sum of all bytes mod 256.
pub fn sum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, byte| acc.wrapping_add(*byte))
}

/// The checksum byte currently stored at the end of `block`.
pub fn stored(block: &[u8]) -> u8 {
    block.last().copied().unwrap_or(0)
}

pub fn verify(block: &[u8]) -> bool {
    sum(block) == 0
}
