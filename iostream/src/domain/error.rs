//! Stream errors.
//!
//! A single error type is shared by backends and the stream core. Backends
//! return it from their transfer functions; the stream keeps the most recent
//! one as its last error, which is what separates `Error` from `Eof` after a
//! zero-byte read.

use crate::domain::value_objects::OpenModeError;
use core::fmt;

/// A backend capability, used to name what an unsupported call asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Query the total size.
    Size,
    /// Move the cursor.
    Seek,
    /// Read bytes.
    Read,
    /// Write bytes.
    Write,
    /// Flush buffered data.
    Flush,
    /// Match a directory listing against a pattern.
    Glob,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Size => "size",
            Self::Seek => "seek",
            Self::Read => "read",
            Self::Write => "write",
            Self::Flush => "flush",
            Self::Glob => "glob",
        };
        f.write_str(name)
    }
}

/// Errors that can occur on a stream or while creating one.
#[derive(Debug)]
#[non_exhaustive]
pub enum IoError {
    /// A required parameter was missing or empty.
    InvalidArgument(&'static str),

    /// The backend does not provide this capability.
    Unsupported(Operation),

    /// The backend would block; retry later.
    NotReady,

    /// A typed read ran out of data before the value was complete.
    UnexpectedEof,

    /// A write transferred nothing.
    WriteZero,

    /// Growing a memory buffer failed.
    OutOfMemory {
        /// Total bytes the buffer tried to hold.
        requested: usize,
    },

    /// An operating system call failed.
    Os {
        /// What the stream was doing when the call failed.
        context: &'static str,
        /// The underlying OS error.
        source: std::io::Error,
    },

    /// Free-form error reported by an external backend.
    Message(String),

    /// The fopen mode string was rejected.
    InvalidMode(OpenModeError),
}

impl IoError {
    /// Wrap an OS error with the operation that produced it.
    pub fn os(context: &'static str, source: std::io::Error) -> Self {
        Self::Os { context, source }
    }

    /// Check if this is the transient would-block condition.
    #[inline]
    pub fn is_not_ready(&self) -> bool {
        matches!(self, Self::NotReady)
    }
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(param) => write!(f, "Parameter '{}' is invalid", param),
            Self::Unsupported(op) => write!(f, "Stream does not support {}", op),
            Self::NotReady => write!(f, "Stream is not ready"),
            Self::UnexpectedEof => write!(f, "Unexpected end of stream"),
            Self::WriteZero => write!(f, "Stream accepted no data"),
            Self::OutOfMemory { requested } => {
                write!(f, "Out of memory growing buffer to {} bytes", requested)
            }
            Self::Os { context, source } => write!(f, "{}: {}", context, source),
            Self::Message(msg) => f.write_str(msg),
            Self::InvalidMode(e) => write!(f, "Invalid open mode: {}", e),
        }
    }
}

impl core::error::Error for IoError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Os { source, .. } => Some(source),
            Self::InvalidMode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<OpenModeError> for IoError {
    fn from(err: OpenModeError) -> Self {
        Self::InvalidMode(err)
    }
}

impl From<IoError> for std::io::Error {
    fn from(err: IoError) -> Self {
        use std::io::ErrorKind;

        let kind = match &err {
            IoError::InvalidArgument(_) | IoError::InvalidMode(_) => ErrorKind::InvalidInput,
            IoError::Unsupported(_) => ErrorKind::Unsupported,
            IoError::NotReady => ErrorKind::WouldBlock,
            IoError::UnexpectedEof => ErrorKind::UnexpectedEof,
            IoError::WriteZero => ErrorKind::WriteZero,
            IoError::OutOfMemory { .. } => ErrorKind::OutOfMemory,
            IoError::Os { source, .. } => source.kind(),
            IoError::Message(_) => ErrorKind::Other,
        };
        std::io::Error::new(kind, err)
    }
}
