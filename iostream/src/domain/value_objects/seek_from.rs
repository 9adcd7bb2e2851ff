//! Seek position value object.

use core::fmt;

/// Reference point for a seek, matching the C `SEEK_SET`/`SEEK_CUR`/`SEEK_END` trio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Whence {
    /// Seek from the beginning of the data.
    Set,
    /// Seek relative to the current read/write position.
    Cur,
    /// Seek relative to the end of the data.
    End,
}

/// Seek position for stream operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeekFrom {
    /// Offset from the start of the stream.
    Start(u64),
    /// Offset relative to the current position.
    Current(i64),
    /// Offset from the end of the stream.
    End(i64),
}

impl SeekFrom {
    /// The reference point this position is measured from.
    ///
    /// # Examples
    ///
    /// ```
    /// use iostream::{SeekFrom, Whence};
    ///
    /// assert_eq!(SeekFrom::Current(-4).whence(), Whence::Cur);
    /// ```
    #[inline]
    pub const fn whence(self) -> Whence {
        match self {
            Self::Start(_) => Whence::Set,
            Self::Current(_) => Whence::Cur,
            Self::End(_) => Whence::End,
        }
    }

    /// Check if this is the no-op `Current(0)` used by `tell`.
    #[inline]
    pub const fn is_tell(self) -> bool {
        matches!(self, Self::Current(0))
    }

    /// Resolve this position against a cursor and a logical length,
    /// returning the (possibly out-of-range) absolute target.
    ///
    /// The result is signed and widened so callers can clamp or reject it.
    #[inline]
    pub const fn resolve(self, current: u64, len: u64) -> i128 {
        match self {
            Self::Start(offset) => offset as i128,
            Self::Current(offset) => current as i128 + offset as i128,
            Self::End(offset) => len as i128 + offset as i128,
        }
    }
}

impl fmt::Display for SeekFrom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start(n) => write!(f, "SET+{}", n),
            Self::Current(n) => write!(f, "CUR{:+}", n),
            Self::End(n) => write!(f, "END{:+}", n),
        }
    }
}

impl From<std::io::SeekFrom> for SeekFrom {
    fn from(pos: std::io::SeekFrom) -> Self {
        match pos {
            std::io::SeekFrom::Start(n) => Self::Start(n),
            std::io::SeekFrom::Current(n) => Self::Current(n),
            std::io::SeekFrom::End(n) => Self::End(n),
        }
    }
}

impl From<SeekFrom> for std::io::SeekFrom {
    fn from(pos: SeekFrom) -> Self {
        match pos {
            SeekFrom::Start(n) => Self::Start(n),
            SeekFrom::Current(n) => Self::Current(n),
            SeekFrom::End(n) => Self::End(n),
        }
    }
}
