mod reader;
mod writer;

use std::fmt::Display;

pub use reader::Reader;
pub use writer::{check_blocks, LogReporter, Reporter, Writer};

use crate::util::{Error, Result};

/// Bytes needed before the block length is known.
pub const HEADER_SIZE: usize = 20;

/// Header byte selecting the block length.
const VERSION_OFFSET: usize = 18;

/// Block length for each known version byte, starting at version 1.
const BLOCK_LENGTHS: [usize; 2] = [128, 256];

/// Largest EDID accepted as write input.
pub const MAX_EDID_SIZE: usize = 256;

/// Resolves the block length from the version byte of `header`.
pub fn block_len(header: &[u8]) -> Result<usize> {
    if header.len() < HEADER_SIZE {
        return Err(Error::length_mismatch(&format!(
            "got {} bytes, need at least {} for the header",
            header.len(),
            HEADER_SIZE
        )));
    }
    let version = header[VERSION_OFFSET] as usize;
    if version == 0 || version > BLOCK_LENGTHS.len() {
        return Err(Error::unknown_version(&format!(
            "version byte {} is not one of 1..={}",
            version,
            BLOCK_LENGTHS.len()
        )));
    }
    Ok(BLOCK_LENGTHS[version - 1])
}

/// Number of extension blocks announced by the base block, which is stored
/// in its second to last byte.
pub fn extension_count(data: &[u8], block_len: usize) -> Result<usize> {
    if data.len() < block_len {
        return Err(Error::length_mismatch(&format!(
            "got {} bytes, base block alone is {}",
            data.len(),
            block_len
        )));
    }
    Ok(data[block_len - 2] as usize)
}

pub fn total_len(block_len: usize, extensions: usize) -> usize {
    block_len * (1 + extensions)
}

/// Checks that `data` is exactly as long as its own header says and returns
/// the block length.
pub fn validate_len(data: &[u8]) -> Result<usize> {
    let block_len = block_len(data)?;
    let extensions = extension_count(data, block_len)?;
    let expected = total_len(block_len, extensions);
    if data.len() != expected {
        return Err(Error::length_mismatch(&format!(
            "got {} bytes, header announces {} ({} extension block(s) of {})",
            data.len(),
            expected,
            extensions,
            block_len
        )));
    }
    Ok(block_len)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Block {
    Base,
    /// Numbered from 1.
    Extension(usize),
}

impl Block {
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Block::Base,
            n => Block::Extension(n),
        }
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Block::Base => f.write_str("EDID"),
            Block::Extension(n) => f.write_fmt(format_args!("Ext block {}", n)),
        }
    }
}
