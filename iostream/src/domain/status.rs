//! Stream status for tracking the outcome of the last transfer.

/// The state of a stream after its most recent read, write or flush.
///
/// Every read, write and flush attempt starts by resetting the status to
/// `Ready`; the outcome then moves it:
/// - `Ready`: the last call transferred data (or had nothing to do)
/// - `NotReady`: the backend has no data or room right now, retry later
/// - `Eof`: a read returned nothing and no error was recorded
/// - `Error`: a transfer returned nothing and an error was recorded
/// - `ReadOnly` / `WriteOnly`: the backend cannot perform the requested
///   direction at all
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoStatus {
    /// Everything is ready (no errors and not EOF).
    Ready,
    /// Non-blocking I/O, request would block.
    NotReady,
    /// End of data.
    Eof,
    /// Read or write I/O error.
    Error,
    /// Tried to write a read-only stream.
    ReadOnly,
    /// Tried to read a write-only stream.
    WriteOnly,
}

impl IoStatus {
    /// Check if the stream is ready for another transfer.
    #[inline]
    pub const fn is_ready(&self) -> bool {
        matches!(self, IoStatus::Ready)
    }

    /// Check if the last call hit a transient would-block condition.
    #[inline]
    pub const fn is_not_ready(&self) -> bool {
        matches!(self, IoStatus::NotReady)
    }

    /// Check if the last call failed because the direction is unsupported.
    #[inline]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, IoStatus::ReadOnly | IoStatus::WriteOnly)
    }
}

impl Default for IoStatus {
    fn default() -> Self {
        Self::Ready
    }
}

impl core::fmt::Display for IoStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Ready => "ready",
            Self::NotReady => "not ready",
            Self::Eof => "end of stream",
            Self::Error => "error",
            Self::ReadOnly => "read-only",
            Self::WriteOnly => "write-only",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_checks() {
        assert!(IoStatus::Ready.is_ready());
        assert!(!IoStatus::Eof.is_ready());

        assert!(IoStatus::NotReady.is_not_ready());
        assert!(!IoStatus::Error.is_not_ready());

        assert!(IoStatus::ReadOnly.is_unsupported());
        assert!(IoStatus::WriteOnly.is_unsupported());
        assert!(!IoStatus::Eof.is_unsupported());
    }

    #[test]
    fn test_status_default() {
        assert_eq!(IoStatus::default(), IoStatus::Ready);
    }
}
