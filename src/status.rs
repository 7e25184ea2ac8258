use std::fmt;

use crate::sys::RawStatus;

/// Raw status codes as the native library defines them.
pub(crate) mod raw {
    use crate::sys::RawStatus;

    pub const SUCCESS: RawStatus = 0;
    pub const NO_MEMORY: RawStatus = 1;
    pub const NULL_POINTER: RawStatus = 2;
    pub const INVALID_STRING: RawStatus = 3;
    pub const INVALID_SIZE: RawStatus = 4;
    pub const FINISHED: RawStatus = 5;
    pub const WRITE_ERROR: RawStatus = 6;
    pub const READ_ERROR: RawStatus = 7;
    pub const INVALID_CONTENT: RawStatus = 8;
}

/// Outcome the native library caches on a resource after an operation.
///
/// [`Status::Success`] is the single success sentinel. Any other value means
/// the resource is inert for drawing purposes, while lifecycle and metadata
/// operations (reference, destroy, user data) keep working. A status is never
/// cleared; it sticks until the resource is destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    NoMemory,
    NullPointer,
    InvalidString,
    InvalidSize,
    Finished,
    WriteError,
    ReadError,
    InvalidContent,
    /// A raw code this binding predates.
    Unknown(i32),
}

impl Status {
    pub fn from_raw(code: RawStatus) -> Self {
        match code {
            raw::SUCCESS => Status::Success,
            raw::NO_MEMORY => Status::NoMemory,
            raw::NULL_POINTER => Status::NullPointer,
            raw::INVALID_STRING => Status::InvalidString,
            raw::INVALID_SIZE => Status::InvalidSize,
            raw::FINISHED => Status::Finished,
            raw::WRITE_ERROR => Status::WriteError,
            raw::READ_ERROR => Status::ReadError,
            raw::INVALID_CONTENT => Status::InvalidContent,
            other => Status::Unknown(other),
        }
    }

    pub fn to_raw(self) -> RawStatus {
        match self {
            Status::Success => raw::SUCCESS,
            Status::NoMemory => raw::NO_MEMORY,
            Status::NullPointer => raw::NULL_POINTER,
            Status::InvalidString => raw::INVALID_STRING,
            Status::InvalidSize => raw::INVALID_SIZE,
            Status::Finished => raw::FINISHED,
            Status::WriteError => raw::WRITE_ERROR,
            Status::ReadError => raw::READ_ERROR,
            Status::InvalidContent => raw::INVALID_CONTENT,
            Status::Unknown(code) => code,
        }
    }

    pub fn is_success(self) -> bool {
        self == Status::Success
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => write!(f, "success"),
            Status::NoMemory => write!(f, "out of memory"),
            Status::NullPointer => write!(f, "null pointer"),
            Status::InvalidString => write!(f, "invalid string"),
            Status::InvalidSize => write!(f, "invalid size"),
            Status::Finished => write!(f, "target is finished"),
            Status::WriteError => write!(f, "error while writing"),
            Status::ReadError => write!(f, "error while reading"),
            Status::InvalidContent => write!(f, "invalid content kind"),
            Status::Unknown(code) => write!(f, "unknown status {code}"),
        }
    }
}
