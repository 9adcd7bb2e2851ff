//! Backend port - the contract every byte source/sink implements.
//!
//! This port defines what the stream core needs from a concrete backend.
//! Adapters implement this trait to connect the stream to memory regions,
//! file descriptors, buffered files, or anything else that moves bytes.

use crate::domain::{
    error::{IoError, Operation},
    value_objects::SeekFrom,
};
use bitflags::bitflags;

bitflags! {
    /// Operations a backend actually provides.
    ///
    /// The stream reads this set once, when it is opened, and dispatches
    /// against that snapshot for its whole lifetime. A method whose flag is
    /// absent is never called.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// `size` reports the total length directly.
        const SIZE = 1 << 0;
        /// `seek` moves the cursor.
        const SEEK = 1 << 1;
        /// `read` transfers bytes out of the backend.
        const READ = 1 << 2;
        /// `write` transfers bytes into the backend.
        const WRITE = 1 << 3;
        /// `flush` commits buffered data.
        const FLUSH = 1 << 4;
    }
}

/// Port for byte-stream backends.
///
/// Every method has a default that reports the operation as unsupported,
/// so a backend only implements what it advertises in
/// [`capabilities`](Backend::capabilities).
///
/// # Transfer results
///
/// `read` and `write` report:
/// - `Ok(n)` with `n > 0`: `n` bytes moved
/// - `Ok(0)`: nothing moved and nothing went wrong (end of data for reads)
/// - `Err(IoError::NotReady)`: nothing moved, retry later
/// - any other `Err`: nothing moved, the error is recorded on the stream
///
/// The stream never calls `read`/`write` with an empty buffer.
///
/// # Examples
///
/// ```
/// use iostream::{Backend, Capabilities, IoError, Stream};
///
/// // An endless source of zero bytes.
/// struct Zeroes;
///
/// impl Backend for Zeroes {
///     fn capabilities(&self) -> Capabilities {
///         Capabilities::READ
///     }
///
///     fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError> {
///         buf.fill(0);
///         Ok(buf.len())
///     }
/// }
///
/// let mut stream = Stream::open(Zeroes).unwrap();
/// let mut buf = [1u8; 4];
/// assert_eq!(stream.read(&mut buf), 4);
/// assert_eq!(buf, [0; 4]);
/// ```
pub trait Backend {
    /// The operations this backend provides.
    fn capabilities(&self) -> Capabilities;

    /// Total length of the data in bytes.
    fn size(&mut self) -> Result<u64, IoError> {
        Err(IoError::Unsupported(Operation::Size))
    }

    /// Move the cursor and return the new absolute position.
    fn seek(&mut self, pos: SeekFrom) -> Result<u64, IoError> {
        let _ = pos;
        Err(IoError::Unsupported(Operation::Seek))
    }

    /// Read up to `buf.len()` bytes from the cursor.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError> {
        let _ = buf;
        Err(IoError::Unsupported(Operation::Read))
    }

    /// Write up to `buf.len()` bytes at the cursor.
    fn write(&mut self, buf: &[u8]) -> Result<usize, IoError> {
        let _ = buf;
        Err(IoError::Unsupported(Operation::Write))
    }

    /// Commit any buffered data. The default is a no-op.
    fn flush(&mut self) -> Result<(), IoError> {
        Ok(())
    }

    /// Release the backend and whatever it owns.
    ///
    /// Called exactly once, when the owning stream is closed or dropped.
    fn close(self: Box<Self>) -> Result<(), IoError> {
        Ok(())
    }

    /// The memory region behind a memory-backed stream.
    fn memory(&self) -> Option<&[u8]> {
        None
    }

    /// The OS descriptor behind a descriptor- or file-backed stream.
    fn file_descriptor(&self) -> Option<i32> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct WriteOnlySink {
        written: Vec<u8>,
    }

    impl Backend for WriteOnlySink {
        fn capabilities(&self) -> Capabilities {
            Capabilities::WRITE
        }

        fn write(&mut self, buf: &[u8]) -> Result<usize, IoError> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }
    }

    #[test]
    fn test_defaults_report_unsupported() {
        let mut sink = WriteOnlySink { written: Vec::new() };

        assert!(matches!(
            sink.read(&mut [0u8; 4]),
            Err(IoError::Unsupported(Operation::Read))
        ));
        assert!(matches!(
            sink.seek(SeekFrom::Start(0)),
            Err(IoError::Unsupported(Operation::Seek))
        ));
        assert!(matches!(sink.size(), Err(IoError::Unsupported(Operation::Size))));
        assert!(sink.flush().is_ok());
        assert!(sink.memory().is_none());
        assert!(sink.file_descriptor().is_none());
    }

    #[test]
    fn test_boxed_close_default() {
        let mut sink = Box::new(WriteOnlySink { written: Vec::new() });
        assert_eq!(sink.write(b"abc").unwrap(), 3);
        assert_eq!(sink.written, b"abc");
        assert!(sink.close().is_ok());
    }

    #[test]
    fn test_capabilities_flags() {
        let caps = Capabilities::READ | Capabilities::SEEK | Capabilities::SIZE;
        assert!(caps.contains(Capabilities::READ));
        assert!(!caps.contains(Capabilities::WRITE));
        assert!(caps.intersects(Capabilities::READ | Capabilities::WRITE));
    }
}
