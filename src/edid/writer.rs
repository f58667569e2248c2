use log::{debug, warn};

use super::{validate_len, Block};
use crate::{
    config::WriteConfig,
    env::{Device, Env},
    util::{checksum, Error, Result},
};

/// Told about every checksum that was repaired in fix mode.
pub trait Reporter {
    fn checksum_fixed(&mut self, block: Block, stored: u8, computed: u8);
}

/// Surfaces repairs as warnings on the log.
pub struct LogReporter;

impl Reporter for LogReporter {
    fn checksum_fixed(&mut self, block: Block, stored: u8, computed: u8) {
        warn!(
            "{} checksum is {:#04x}, should be {:#04x}; fixed",
            block, stored, computed
        );
    }
}

/// Checks the trailing checksum of every `block_len` sized block of `data`.
/// With `fix` a bad byte is overwritten and reported, otherwise the first
/// bad block is an error. Returns how many blocks were repaired.
pub fn check_blocks(
    data: &mut [u8],
    block_len: usize,
    fix: bool,
    reporter: &mut dyn Reporter,
) -> Result<usize> {
    let mut fixed = 0;
    for (index, block) in data.chunks_mut(block_len).enumerate() {
        let stored = checksum::stored(block);
        let computed = checksum::value(block);
        if stored == computed {
            continue;
        }
        let name = Block::from_index(index);
        if !fix {
            return Err(Error::checksum_invalid(&format!(
                "{} checksum is {:#04x}, should be {:#04x}",
                name, stored, computed
            )));
        }
        if let Some(last) = block.last_mut() {
            *last = computed;
        }
        reporter.checksum_fixed(name, stored, computed);
        fixed += 1;
    }
    Ok(fixed)
}

/// Validates an EDID and then writes it to a device, pausing after every
/// byte so the EEPROM can settle.
pub struct Writer<'a> {
    device: &'a mut dyn Device,
    env: &'a dyn Env,
    config: WriteConfig,
    reporter: Option<&'a mut dyn Reporter>,
}

impl<'a> Writer<'a> {
    pub fn new(
        device: &'a mut dyn Device,
        env: &'a dyn Env,
        config: WriteConfig,
        reporter: Option<&'a mut dyn Reporter>,
    ) -> Self {
        Self {
            device,
            env,
            config,
            reporter,
        }
    }

    /// Nothing reaches the device unless the whole buffer checks out.
    pub fn write_edid(&mut self, mut data: Vec<u8>) -> Result<()> {
        let block_len = validate_len(&data)?;
        let fix = self.config.fix_checksums;
        match self.reporter.as_deref_mut() {
            Some(reporter) => check_blocks(&mut data, block_len, fix, reporter)?,
            None => check_blocks(&mut data, block_len, fix, &mut LogReporter)?,
        };

        debug!(
            "writing {} bytes, {:?} between writes",
            data.len(),
            self.config.write_delay
        );
        for (offset, byte) in data.iter().enumerate() {
            self.device.write(offset, *byte)?;
            self.env.sleep_for(self.config.write_delay);
        }
        Ok(())
    }
}
