use std::{
    io::{self, Read, Write},
    process::Command,
    thread,
    time::Duration,
};

use i2cdev::{
    core::I2CDevice,
    linux::{LinuxI2CDevice, LinuxI2CError},
};
use log::debug;

use super::{Device, Env};
use crate::{
    config::DeviceSource,
    util::{Error, Result},
};

/// 7-bit bus address of the EDID EEPROM.
pub const EDID_ADDRESS: u16 = 0x50;

const BUS_DRIVER: &str = "i2c-dev";

pub struct PosixEnv {}

impl PosixEnv {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for PosixEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl Env for PosixEnv {
    fn open_device(&self, source: DeviceSource) -> Result<Box<dyn Device>> {
        match source {
            DeviceSource::Bus(bus) => Ok(Box::new(I2cDevice::open(bus)?)),
            DeviceSource::Stdio => Ok(Box::new(StdioDevice::new())),
        }
    }

    fn sleep_for(&self, duration: Duration) {
        thread::sleep(duration)
    }
}

fn to_edid_error(target: &str, error: io::Error) -> Error {
    let msg = format!("{}: {}", target, &error.to_string());
    match error.kind() {
        io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => Error::device_access(&msg),
        _ => Error::io_error(&msg),
    }
}

fn load_bus_driver() -> Result<()> {
    let status = Command::new("modprobe")
        .arg(BUS_DRIVER)
        .status()
        .map_err(|error| Error::device_access(&format!("modprobe {}: {}", BUS_DRIVER, error)))?;
    if !status.success() {
        return Err(Error::device_access(&format!(
            "modprobe {} failed ({})",
            BUS_DRIVER, status
        )));
    }
    Ok(())
}

/// Register offsets are a single byte on the wire.
fn register(offset: usize) -> Result<u8> {
    u8::try_from(offset).map_err(|_| {
        Error::offset_out_of_range(&format!(
            "offset {} does not fit an 8-bit register address",
            offset
        ))
    })
}

/// The EEPROM behind `/dev/i2c-N`, driven with SMBus byte transfers.
pub struct I2cDevice {
    path: String,
    dev: LinuxI2CDevice,
}

impl I2cDevice {
    pub fn open(bus: u32) -> Result<Self> {
        load_bus_driver()?;
        Self::open_path(&format!("/dev/i2c-{}", bus))
    }

    /// Opens a bus node directly, skipping the driver load.
    pub fn open_path(path: &str) -> Result<Self> {
        let dev = LinuxI2CDevice::new(path, EDID_ADDRESS).map_err(|error| {
            Error::device_access(&format!(
                "{}: cannot open address {:#04x}: {}",
                path, EDID_ADDRESS, error
            ))
        })?;
        debug!("opened {} at address {:#04x}", path, EDID_ADDRESS);
        Ok(Self {
            path: path.to_owned(),
            dev,
        })
    }
}

impl Device for I2cDevice {
    fn read(&mut self, offset: usize) -> Result<u8> {
        let register = register(offset)?;
        self.dev
            .smbus_read_byte_data(register)
            .map_err(|error| to_bus_error(&self.path, offset, error))
    }

    fn write(&mut self, offset: usize, byte: u8) -> Result<()> {
        let register = register(offset)?;
        self.dev
            .smbus_write_byte_data(register, byte)
            .map_err(|error| to_bus_error(&self.path, offset, error))
    }
}

fn to_bus_error(path: &str, offset: usize, error: LinuxI2CError) -> Error {
    Error::io_error(&format!("{}: offset {}: {}", path, offset, error))
}

/// Stands in for the bus: reads come from stdin and writes go to stdout,
/// one byte at a time and in call order. The offset is not used.
pub struct StdioDevice {
    stdin: io::Stdin,
    stdout: io::Stdout,
}

impl StdioDevice {
    pub fn new() -> Self {
        Self {
            stdin: io::stdin(),
            stdout: io::stdout(),
        }
    }
}

impl Default for StdioDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for StdioDevice {
    fn read(&mut self, offset: usize) -> Result<u8> {
        let mut byte = [0u8; 1];
        match self.stdin.lock().read_exact(&mut byte) {
            Ok(()) => Ok(byte[0]),
            Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => Err(Error::io_error(
                &format!("stdin: unexpected end of input at offset {}", offset),
            )),
            Err(error) => Err(to_edid_error("stdin", error)),
        }
    }

    fn write(&mut self, _offset: usize, byte: u8) -> Result<()> {
        let mut out = self.stdout.lock();
        out.write_all(&[byte])
            .and_then(|()| out.flush())
            .map_err(|error| to_edid_error("stdout", error))
    }
}
