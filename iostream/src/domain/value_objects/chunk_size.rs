//! Growth unit for the dynamic memory backend.

use core::fmt;

/// Growth unit used when the dynamic memory backend has to reallocate.
///
/// A configured size of zero means "unset" and selects [`ChunkSize::DEFAULT`],
/// so the value held here is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkSize(usize);

impl ChunkSize {
    /// Chunk size used when none is configured (1 KiB).
    pub const DEFAULT: Self = Self(1024);

    /// Create a chunk size, substituting the default for zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use iostream::ChunkSize;
    ///
    /// assert_eq!(ChunkSize::new(4096).get(), 4096);
    /// assert_eq!(ChunkSize::new(0), ChunkSize::DEFAULT);
    /// ```
    #[inline]
    pub const fn new(bytes: usize) -> Self {
        if bytes == 0 { Self::DEFAULT } else { Self(bytes) }
    }

    /// Get the chunk size in bytes.
    #[inline]
    pub const fn get(self) -> usize {
        self.0
    }

    /// Capacity to allocate so that `capacity + additional` bytes fit with
    /// at least one spare byte behind them.
    ///
    /// The result is a whole number of chunks: one more than the number of
    /// complete chunks covering `capacity + additional`. Returns `None` on
    /// arithmetic overflow.
    ///
    /// # Examples
    ///
    /// ```
    /// use iostream::ChunkSize;
    ///
    /// let chunk = ChunkSize::new(1024);
    /// assert_eq!(chunk.grow(0, 5), Some(1024));
    /// assert_eq!(chunk.grow(1024, 1024), Some(3072));
    /// ```
    #[inline]
    pub const fn grow(self, capacity: usize, additional: usize) -> Option<usize> {
        let Some(wanted) = capacity.checked_add(additional) else {
            return None;
        };
        let chunks = wanted / self.0 + 1;
        chunks.checked_mul(self.0)
    }
}

impl Default for ChunkSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for ChunkSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes", self.0)
    }
}

impl From<usize> for ChunkSize {
    fn from(bytes: usize) -> Self {
        Self::new(bytes)
    }
}
