//! Shared error type across tether crates.

use thiserror::Error;

/// Peer-facing result codes (stable API).
///
/// These are the codes that cross the protocol boundary: they appear in
/// error replies and in status signals delivered to pending requests.
/// `Success` is a legitimate status-signal payload and never an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Code {
    /// Operation completed.
    Success,
    /// Invalid input / malformed attribute.
    InvalidArgument,
    /// No matching object, handle, or pending transaction.
    NotFound,
    /// Peer reported an allocation failure.
    NoMemory,
    /// Operation or object type not implemented.
    NotImplemented,
    /// Exclusive create matched an existing object.
    AlreadyExists,
    /// Protocol violation with no pending transaction to notify.
    Unexpected,
}

impl Code {
    /// String representation used in logs and rendered replies.
    pub fn as_str(self) -> &'static str {
        match self {
            Code::Success => "SUCCESS",
            Code::InvalidArgument => "INVALID_ARGUMENT",
            Code::NotFound => "NOT_FOUND",
            Code::NoMemory => "NO_MEMORY",
            Code::NotImplemented => "NOT_IMPLEMENTED",
            Code::AlreadyExists => "ALREADY_EXISTS",
            Code::Unexpected => "UNEXPECTED",
        }
    }

    /// Wire-level integer (values stable).
    pub fn as_wire(self) -> u32 {
        match self {
            Code::Success => 0,
            Code::InvalidArgument => 1,
            Code::NotFound => 2,
            Code::NoMemory => 3,
            Code::NotImplemented => 4,
            Code::AlreadyExists => 5,
            Code::Unexpected => 6,
        }
    }

    /// Inverse of [`Code::as_wire`]; unknown values map to `Unexpected`.
    pub fn from_wire(v: u32) -> Self {
        match v {
            0 => Code::Success,
            1 => Code::InvalidArgument,
            2 => Code::NotFound,
            3 => Code::NoMemory,
            4 => Code::NotImplemented,
            5 => Code::AlreadyExists,
            _ => Code::Unexpected,
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, TetherError>;

/// Unified error type used by core and engine.
#[derive(Debug, Error)]
pub enum TetherError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("not found")]
    NotFound,
    #[error("out of memory")]
    NoMemory,
    #[error("not implemented: {0}")]
    NotImplemented(String),
    #[error("already exists")]
    AlreadyExists,
    #[error("unexpected")]
    Unexpected,
    #[error("reply channel closed")]
    ChannelClosed,
}

impl TetherError {
    /// Map internal error to a stable peer-facing code.
    pub fn code(&self) -> Code {
        match self {
            TetherError::InvalidArgument(_) => Code::InvalidArgument,
            TetherError::NotFound => Code::NotFound,
            TetherError::NoMemory => Code::NoMemory,
            TetherError::NotImplemented(_) => Code::NotImplemented,
            TetherError::AlreadyExists => Code::AlreadyExists,
            TetherError::Unexpected => Code::Unexpected,
            TetherError::ChannelClosed => Code::Unexpected,
        }
    }
}
