use std::time::Duration;

/// Pause between two consecutive register writes.
pub const DEFAULT_WRITE_DELAY: Duration = Duration::from_millis(10);

/// Where EDID bytes are read from or written to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeviceSource {
    /// `/dev/i2c-N`, talking to the EEPROM at the fixed EDID address.
    Bus(u32),
    /// stdin for reads, stdout for writes.
    Stdio,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WriteConfig {
    /// Repair bad block checksums instead of refusing to write.
    pub fix_checksums: bool,
    pub write_delay: Duration,
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self {
            fix_checksums: false,
            write_delay: DEFAULT_WRITE_DELAY,
        }
    }
}
