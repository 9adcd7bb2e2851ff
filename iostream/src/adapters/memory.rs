//! Fixed-size memory backends over caller-owned regions.

use crate::domain::{Backend, Capabilities, IoError, SeekFrom, Stream};

/// Cursor over a region of `stop` valid bytes.
///
/// Invariant: `here <= stop`. Seeks saturate into `[0, stop]` instead of
/// failing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct MemCursor {
    here: usize,
    stop: usize,
}

impl MemCursor {
    pub(crate) const fn new(stop: usize) -> Self {
        Self { here: 0, stop }
    }

    #[inline]
    pub(crate) const fn here(&self) -> usize {
        self.here
    }

    #[inline]
    pub(crate) const fn stop(&self) -> usize {
        self.stop
    }

    /// Bytes between the cursor and the logical end.
    #[inline]
    pub(crate) const fn remaining(&self) -> usize {
        self.stop - self.here
    }

    /// Move the logical end out to `stop`. Never shrinks.
    #[inline]
    pub(crate) fn extend_to(&mut self, stop: usize) {
        self.stop = self.stop.max(stop);
    }

    pub(crate) fn seek(&mut self, pos: SeekFrom) -> u64 {
        let target = pos.resolve(self.here as u64, self.stop as u64);
        self.here = target.clamp(0, self.stop as i128) as usize;
        self.here as u64
    }

    /// Copy out of `region` at the cursor, at most up to `stop`.
    pub(crate) fn read_from(&mut self, region: &[u8], buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.remaining());
        buf[..n].copy_from_slice(&region[self.here..self.here + n]);
        self.here += n;
        n
    }

    /// Copy into `region` at the cursor, at most up to `stop`.
    pub(crate) fn write_into(&mut self, region: &mut [u8], buf: &[u8]) -> usize {
        let n = buf.len().min(self.remaining());
        region[self.here..self.here + n].copy_from_slice(&buf[..n]);
        self.here += n;
        n
    }
}

/// Read-write backend over a borrowed, fixed-size memory region.
///
/// Writes never grow the region: once the cursor reaches the end, writes
/// transfer nothing. Closing the stream releases only the backend, never the
/// borrowed memory.
#[derive(Debug)]
pub struct Memory<'a> {
    region: &'a mut [u8],
    cursor: MemCursor,
}

impl<'a> Memory<'a> {
    /// Create a backend over `region`, positioned at its start.
    pub fn new(region: &'a mut [u8]) -> Self {
        let cursor = MemCursor::new(region.len());
        Self { region, cursor }
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.cursor.here()
    }
}

impl Backend for Memory<'_> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::SIZE | Capabilities::SEEK | Capabilities::READ | Capabilities::WRITE
    }

    fn size(&mut self) -> Result<u64, IoError> {
        Ok(self.cursor.stop() as u64)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64, IoError> {
        Ok(self.cursor.seek(pos))
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError> {
        Ok(self.cursor.read_from(self.region, buf))
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, IoError> {
        Ok(self.cursor.write_into(self.region, buf))
    }

    fn memory(&self) -> Option<&[u8]> {
        Some(self.region)
    }
}

/// Read-only backend over a borrowed, fixed-size memory region.
///
/// Has no write capability at all, so writes through the stream report
/// `IoStatus::ReadOnly`.
#[derive(Debug)]
pub struct ConstMemory<'a> {
    region: &'a [u8],
    cursor: MemCursor,
}

impl<'a> ConstMemory<'a> {
    /// Create a backend over `region`, positioned at its start.
    pub fn new(region: &'a [u8]) -> Self {
        Self {
            region,
            cursor: MemCursor::new(region.len()),
        }
    }

    /// Current cursor position.
    pub fn position(&self) -> usize {
        self.cursor.here()
    }
}

impl Backend for ConstMemory<'_> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::SIZE | Capabilities::SEEK | Capabilities::READ
    }

    fn size(&mut self) -> Result<u64, IoError> {
        Ok(self.cursor.stop() as u64)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64, IoError> {
        Ok(self.cursor.seek(pos))
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError> {
        Ok(self.cursor.read_from(self.region, buf))
    }

    fn memory(&self) -> Option<&[u8]> {
        Some(self.region)
    }
}

impl<'a> Stream<'a> {
    /// Open a read-write stream over a fixed memory region.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument("size")` if `mem` is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use iostream::{SeekFrom, Stream};
    ///
    /// let mut backing = [0u8; 4];
    /// let mut stream = Stream::from_mem(&mut backing).unwrap();
    /// assert_eq!(stream.write(b"abcdef"), 4);
    /// assert_eq!(stream.seek(SeekFrom::End(10)).unwrap(), 4);
    /// drop(stream);
    /// assert_eq!(&backing, b"abcd");
    /// ```
    pub fn from_mem(mem: &'a mut [u8]) -> Result<Self, IoError> {
        if mem.is_empty() {
            return Err(IoError::InvalidArgument("size"));
        }
        Ok(Self::new_unchecked(Box::new(Memory::new(mem))))
    }

    /// Open a read-only stream over a fixed memory region.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument("size")` if `mem` is empty.
    pub fn from_const_mem(mem: &'a [u8]) -> Result<Self, IoError> {
        if mem.is_empty() {
            return Err(IoError::InvalidArgument("size"));
        }
        Ok(Self::new_unchecked(Box::new(ConstMemory::new(mem))))
    }
}
