use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Code {
    UnknownVersion = 1,
    LengthMismatch = 2,
    ChecksumInvalid = 3,
    DeviceAccess = 4,
    OffsetOutOfRange = 5,
    IOError = 6,
}

impl Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            Code::UnknownVersion => "UnknownVersion",
            Code::LengthMismatch => "LengthMismatch",
            Code::ChecksumInvalid => "ChecksumInvalid",
            Code::DeviceAccess => "DeviceAccess",
            Code::OffsetOutOfRange => "OffsetOutOfRange",
            Code::IOError => "IOError",
        };
        f.write_str(str)
    }
}

/// Every failure is terminal for the run, so an error is just a kind plus
/// a message for the operator.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{code}: {msg}")]
pub struct Error {
    code: Code,
    msg: String,
}

impl Error {
    fn new(code: Code, msg: &str) -> Self {
        Self {
            code,
            msg: msg.to_owned(),
        }
    }

    pub fn unknown_version(msg: &str) -> Self {
        Self::new(Code::UnknownVersion, msg)
    }

    pub fn length_mismatch(msg: &str) -> Self {
        Self::new(Code::LengthMismatch, msg)
    }

    pub fn checksum_invalid(msg: &str) -> Self {
        Self::new(Code::ChecksumInvalid, msg)
    }

    pub fn device_access(msg: &str) -> Self {
        Self::new(Code::DeviceAccess, msg)
    }

    pub fn offset_out_of_range(msg: &str) -> Self {
        Self::new(Code::OffsetOutOfRange, msg)
    }

    pub fn io_error(msg: &str) -> Self {
        Self::new(Code::IOError, msg)
    }

    pub fn is_unknown_version(&self) -> bool {
        self.code == Code::UnknownVersion
    }

    pub fn is_length_mismatch(&self) -> bool {
        self.code == Code::LengthMismatch
    }

    pub fn is_checksum_invalid(&self) -> bool {
        self.code == Code::ChecksumInvalid
    }

    pub fn is_device_access(&self) -> bool {
        self.code == Code::DeviceAccess
    }

    pub fn is_offset_out_of_range(&self) -> bool {
        self.code == Code::OffsetOutOfRange
    }

    pub fn is_io_error(&self) -> bool {
        self.code == Code::IOError
    }
}

pub type Result<T> = std::result::Result<T, Error>;
