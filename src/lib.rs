pub mod config;
pub mod edid;
pub mod env;
pub mod util;

use std::io::{Read, Write};

use config::WriteConfig;
use edid::{Reader, Reporter, Writer};
use env::{read_input, Device, Env};
pub use util::{Error, Result};

/// Reads the EDID held by `device` and copies it verbatim to `output`.
pub fn dump_edid<W: Write>(device: &mut dyn Device, mut output: W) -> Result<usize> {
    let data = Reader::new(device).read_edid()?;
    output
        .write_all(&data)
        .and_then(|()| output.flush())
        .map_err(|error| Error::io_error(&format!("output: {}", error)))?;
    Ok(data.len())
}

/// Reads an EDID from `input`, validates it and writes it to `device`.
pub fn program_edid<'a, R: Read>(
    device: &'a mut dyn Device,
    env: &'a dyn Env,
    config: WriteConfig,
    input: R,
    reporter: Option<&'a mut dyn Reporter>,
) -> Result<usize> {
    let data = read_input(input)?;
    let len = data.len();
    Writer::new(device, env, config, reporter).write_edid(data)?;
    Ok(len)
}
