use std::ops::Range;

use log::debug;

use super::{block_len, extension_count, total_len, HEADER_SIZE, MAX_EDID_SIZE};
use crate::{env::Device, util::Result};

/// Pulls a raw EDID off a device one byte at a time. Nothing is validated
/// beyond what is needed to know how many bytes to fetch.
pub struct Reader<'a> {
    device: &'a mut dyn Device,
}

impl<'a> Reader<'a> {
    pub fn new(device: &'a mut dyn Device) -> Self {
        Self { device }
    }

    pub fn read_edid(&mut self) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(MAX_EDID_SIZE);
        self.read_range(&mut data, 0..HEADER_SIZE)?;
        let block_len = block_len(&data)?;
        self.read_range(&mut data, HEADER_SIZE..block_len)?;

        let extensions = extension_count(&data, block_len)?;
        debug!(
            "block length {}, {} extension block(s)",
            block_len, extensions
        );
        for block in 1..=extensions {
            let start = block * block_len;
            self.read_range(&mut data, start..start + block_len)?;
        }
        debug_assert_eq!(total_len(block_len, extensions), data.len());
        Ok(data)
    }

    fn read_range(&mut self, data: &mut Vec<u8>, range: Range<usize>) -> Result<()> {
        for offset in range {
            data.push(self.device.read(offset)?);
        }
        Ok(())
    }
}
