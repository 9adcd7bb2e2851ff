//! Growable memory backend.

use super::memory::MemCursor;
use crate::domain::{Backend, Capabilities, ChunkSize, IoError, SeekFrom, Stream};

/// Read-write backend over a buffer that grows on demand.
///
/// The buffer starts empty. A write past the allocated end reallocates to a
/// whole number of [`ChunkSize`] units covering the write, so `n` bytes of
/// appends cost at most `n / chunk + 1` reallocations. The logical end
/// (`stop`) only moves forward, and only by writing.
///
/// # Examples
///
/// ```
/// use iostream::{adapters::DynamicMemory, ChunkSize, Stream};
///
/// let backend = DynamicMemory::with_chunk_size(ChunkSize::new(64));
/// let mut stream = Stream::open(backend).unwrap();
/// assert_eq!(stream.write(&[9u8; 100]), 100);
/// assert_eq!(stream.memory().map(<[u8]>::len), Some(100));
/// ```
#[derive(Debug, Default)]
pub struct DynamicMemory {
    // len() is the allocated end; bytes past cursor.stop() are scratch
    buffer: Vec<u8>,
    cursor: MemCursor,
    chunk: ChunkSize,
    reallocations: usize,
}

impl DynamicMemory {
    /// Create an empty backend with the default chunk size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty backend that grows in units of `chunk`.
    pub fn with_chunk_size(chunk: ChunkSize) -> Self {
        Self {
            chunk,
            ..Self::default()
        }
    }

    /// Growth unit in use.
    pub fn chunk_size(&self) -> ChunkSize {
        self.chunk
    }

    /// Allocated bytes, including the spare tail past the logical end.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Number of reallocations so far.
    pub fn reallocations(&self) -> usize {
        self.reallocations
    }

    /// The logical contents, or `None` if nothing was ever written.
    pub fn contents(&self) -> Option<&[u8]> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(&self.buffer[..self.cursor.stop()])
        }
    }

    fn grow(&mut self, additional: usize) -> Result<(), IoError> {
        let capacity = self.buffer.len();
        let length = self
            .chunk
            .grow(capacity, additional)
            .ok_or(IoError::OutOfMemory { requested: usize::MAX })?;

        self.buffer
            .try_reserve_exact(length - capacity)
            .map_err(|_| IoError::OutOfMemory { requested: length })?;
        self.buffer.resize(length, 0);
        self.reallocations += 1;

        debug!("dynamic memory grown from {} to {} bytes", capacity, length);
        Ok(())
    }
}

impl Backend for DynamicMemory {
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
        Ok(self.cursor.read_from(&self.buffer, buf))
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, IoError> {
        let here = self.cursor.here();
        if buf.len() > self.cursor.remaining() {
            if buf.len() > self.buffer.len() - here {
                self.grow(buf.len())?;
            }
            self.cursor.extend_to(here + buf.len());
        }
        Ok(self.cursor.write_into(&mut self.buffer, buf))
    }

    fn memory(&self) -> Option<&[u8]> {
        self.contents()
    }
}

impl Stream<'static> {
    /// Open a read-write stream over a buffer that grows as it is written.
    ///
    /// The written bytes are available through [`Stream::memory`] until the
    /// stream is closed.
    pub fn from_dynamic_mem() -> Self {
        Self::new_unchecked(Box::new(DynamicMemory::new()))
    }

    /// Like [`from_dynamic_mem`](Stream::from_dynamic_mem), growing in units
    /// of `chunk`.
    pub fn from_dynamic_mem_with_chunk_size(chunk: ChunkSize) -> Self {
        Self::new_unchecked(Box::new(DynamicMemory::with_chunk_size(chunk)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IoStatus;

    #[test]
    fn test_dynamic_memory_starts_unallocated() {
        let backend = DynamicMemory::new();
        assert_eq!(backend.capacity(), 0);
        assert!(backend.contents().is_none());
        assert_eq!(backend.chunk_size(), ChunkSize::DEFAULT);
    }

    #[test]
    fn test_dynamic_memory_first_write_allocates_one_chunk() {
        let mut backend = DynamicMemory::new();
        assert_eq!(backend.write(b"hello").unwrap(), 5);
        assert_eq!(backend.capacity(), 1024);
        assert_eq!(backend.contents(), Some(&b"hello"[..]));
        assert_eq!(backend.reallocations(), 1);
    }

    #[test]
    fn test_dynamic_memory_growth_is_amortized() {
        let mut backend = DynamicMemory::with_chunk_size(ChunkSize::new(16));
        for _ in 0..64 {
            assert_eq!(backend.write(b"x").unwrap(), 1);
        }
        assert_eq!(backend.size().unwrap(), 64);
        // 64 one-byte writes into 16-byte chunks need at most 64 / 16 + 1 growths
        assert!(backend.reallocations() <= 5);
        assert!(backend.capacity() >= 64);
    }

    #[test]
    fn test_dynamic_memory_overwrite_does_not_extend() {
        let mut backend = DynamicMemory::new();
        backend.write(b"abcdef").unwrap();
        backend.seek(SeekFrom::Start(1)).unwrap();
        backend.write(b"XY").unwrap();

        assert_eq!(backend.size().unwrap(), 6);
        assert_eq!(backend.contents(), Some(&b"aXYdef"[..]));
    }

    #[test]
    fn test_dynamic_memory_seek_clamps_to_stop() {
        let mut backend = DynamicMemory::new();
        backend.write(b"abc").unwrap();

        // the spare tail past stop is not reachable by seeking
        assert_eq!(backend.seek(SeekFrom::End(100)).unwrap(), 3);
        assert_eq!(backend.seek(SeekFrom::Start(2000)).unwrap(), 3);
    }

    #[test]
    fn test_dynamic_memory_stream_roundtrip() {
        let mut stream = Stream::from_dynamic_mem_with_chunk_size(ChunkSize::new(8));
        assert_eq!(stream.write(b"0123456789"), 10);
        assert_eq!(stream.write(b"abcdefghij"), 10);
        assert_eq!(stream.size().unwrap(), 20);

        stream.seek(SeekFrom::Start(8)).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(stream.read(&mut buf), 4);
        assert_eq!(&buf, b"89ab");
        assert_eq!(stream.status(), IoStatus::Ready);
        assert_eq!(stream.memory().map(<[u8]>::len), Some(20));
    }
}
