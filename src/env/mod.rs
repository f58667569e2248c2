use crate::{
    config::DeviceSource,
    edid::MAX_EDID_SIZE,
    util::{Error, Result},
};
use std::{io::Read, time::Duration};

mod posix_env;

pub use posix_env::{I2cDevice, PosixEnv, StdioDevice, EDID_ADDRESS};

/// An Env is the interface the transfer code uses to reach host
/// functionality: opening the device that holds the EDID and pacing
/// writes against it.
pub trait Env {
    /// Any privileged setup the device needs happens here, before the
    /// first read or write.
    fn open_device(&self, source: DeviceSource) -> Result<Box<dyn Device>>;

    fn sleep_for(&self, duration: Duration);
}

/// A byte addressable store. `offset` is the position inside the EDID
/// buffer, which bus implementations use as the register address.
pub trait Device {
    fn read(&mut self, offset: usize) -> Result<u8>;
    fn write(&mut self, offset: usize, byte: u8) -> Result<()>;
}

/// Reads at most one full EDID worth of bytes from `input` in one go.
pub fn read_input<R: Read>(input: R) -> Result<Vec<u8>> {
    let mut data = Vec::with_capacity(MAX_EDID_SIZE);
    input
        .take(MAX_EDID_SIZE as u64)
        .read_to_end(&mut data)
        .map_err(|error| Error::io_error(&format!("input: {}", error)))?;
    Ok(data)
}
