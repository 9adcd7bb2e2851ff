//! Raw POSIX file descriptor backend.

use crate::domain::{Backend, Capabilities, IoError, SeekFrom, Stream};
use nix::errno::Errno;
use nix::sys::stat::{SFlag, fstat};
use nix::unistd::{self, Whence};
use std::os::fd::{BorrowedFd, RawFd};

/// Backend over a raw file descriptor.
///
/// Reads, writes and flushes are retried while interrupted by a signal; a
/// descriptor that would block reports `NotReady`. Size is answered directly
/// only for regular files, anything else falls back to seeking.
#[derive(Debug)]
pub struct FdBackend {
    fd: RawFd,
    autoclose: bool,
    regular_file: bool,
}

impl FdBackend {
    /// Wrap `fd`. With `autoclose` the descriptor is closed along with the
    /// backend; otherwise it is left open for the caller.
    pub fn new(fd: RawFd, autoclose: bool) -> Self {
        Self {
            fd,
            autoclose,
            regular_file: is_regular_file(fd),
        }
    }

    /// The wrapped descriptor.
    pub fn fd(&self) -> RawFd {
        self.fd
    }

    /// Whether the descriptor referred to a regular file when wrapped.
    pub fn is_regular_file(&self) -> bool {
        self.regular_file
    }

    fn borrowed(&self) -> BorrowedFd<'_> {
        // SAFETY: the caller of `from_fd` keeps the descriptor open for the
        // life of the backend.
        unsafe { BorrowedFd::borrow_raw(self.fd) }
    }
}

fn os_error(errno: Errno) -> std::io::Error {
    std::io::Error::from_raw_os_error(errno as i32)
}

fn is_regular_file(fd: RawFd) -> bool {
    fstat(fd).is_ok_and(|st| {
        SFlag::from_bits_truncate(st.st_mode) & SFlag::S_IFMT == SFlag::S_IFREG
    })
}

/// Flush file data to stable storage, retrying on interruption.
fn sync_data(fd: RawFd) -> Result<(), Errno> {
    loop {
        #[cfg(target_vendor = "apple")]
        let result = nix::fcntl::fcntl(fd, nix::fcntl::FcntlArg::F_FULLFSYNC).map(drop);
        #[cfg(any(target_os = "linux", target_os = "android"))]
        let result = unistd::fdatasync(fd);
        #[cfg(not(any(target_vendor = "apple", target_os = "linux", target_os = "android")))]
        let result = unistd::fsync(fd);

        match result {
            Err(Errno::EINTR) => continue,
            other => return other,
        }
    }
}

impl Backend for FdBackend {
    fn capabilities(&self) -> Capabilities {
        let caps =
            Capabilities::SEEK | Capabilities::READ | Capabilities::WRITE | Capabilities::FLUSH;
        if self.regular_file {
            caps | Capabilities::SIZE
        } else {
            caps
        }
    }

    fn size(&mut self) -> Result<u64, IoError> {
        let st = fstat(self.fd).map_err(|e| IoError::os("Couldn't get stream size", os_error(e)))?;
        Ok(st.st_size as u64)
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64, IoError> {
        let (offset, whence) = match pos {
            SeekFrom::Start(n) => (
                i64::try_from(n).map_err(|_| IoError::InvalidArgument("offset"))?,
                Whence::SeekSet,
            ),
            SeekFrom::Current(n) => (n, Whence::SeekCur),
            SeekFrom::End(n) => (n, Whence::SeekEnd),
        };
        let offset = libc::off_t::try_from(offset).map_err(|_| IoError::InvalidArgument("offset"))?;

        let result = unistd::lseek(self.fd, offset, whence)
            .map_err(|e| IoError::os("Couldn't get stream offset", os_error(e)))?;
        Ok(result as u64)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError> {
        loop {
            match unistd::read(self.fd, buf) {
                Ok(n) => return Ok(n),
                Err(Errno::EINTR) => trace!("read on fd {} interrupted, retrying", self.fd),
                Err(Errno::EAGAIN) => return Err(IoError::NotReady),
                Err(errno) => {
                    return Err(IoError::os("Error reading from datastream", os_error(errno)));
                }
            }
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, IoError> {
        loop {
            match unistd::write(self.borrowed(), buf) {
                Ok(n) => return Ok(n),
                Err(Errno::EINTR) => trace!("write on fd {} interrupted, retrying", self.fd),
                Err(Errno::EAGAIN) => return Err(IoError::NotReady),
                Err(errno) => {
                    return Err(IoError::os("Error writing to datastream", os_error(errno)));
                }
            }
        }
    }

    fn flush(&mut self) -> Result<(), IoError> {
        // pipes, sockets and terminals have nothing to sync
        if !self.regular_file {
            return Ok(());
        }
        sync_data(self.fd).map_err(|e| IoError::os("Unable to flush stream", os_error(e)))
    }

    fn close(self: Box<Self>) -> Result<(), IoError> {
        if !self.autoclose {
            return Ok(());
        }
        unistd::close(self.fd).map_err(|e| IoError::os("Error closing datastream", os_error(e)))?;
        debug!("closed fd {}", self.fd);
        Ok(())
    }

    fn file_descriptor(&self) -> Option<i32> {
        Some(self.fd)
    }
}

impl Stream<'static> {
    /// Open a stream over a raw file descriptor.
    ///
    /// With `autoclose` the descriptor is closed when the stream is closed.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument("fd")` for a negative descriptor.
    pub fn from_fd(fd: RawFd, autoclose: bool) -> Result<Self, IoError> {
        if fd < 0 {
            return Err(IoError::InvalidArgument("fd"));
        }
        Ok(Self::new_unchecked(Box::new(FdBackend::new(fd, autoclose))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IoStatus;
    use nix::fcntl::{FcntlArg, OFlag, fcntl};
    use std::io::Write;
    use std::os::fd::{AsRawFd, IntoRawFd};

    /// Both ends as raw descriptors, handed over to the streams under test.
    fn pipe() -> (RawFd, RawFd) {
        let (read_end, write_end) = unistd::pipe().unwrap();
        (read_end.into_raw_fd(), write_end.into_raw_fd())
    }

    fn set_nonblocking(fd: RawFd) {
        let flags = OFlag::from_bits_truncate(fcntl(fd, FcntlArg::F_GETFL).unwrap());
        fcntl(fd, FcntlArg::F_SETFL(flags | OFlag::O_NONBLOCK)).unwrap();
    }

    #[test]
    fn test_from_fd_rejects_negative() {
        assert!(matches!(Stream::from_fd(-1, false), Err(IoError::InvalidArgument("fd"))));
    }

    #[test]
    fn test_regular_file_reports_size() {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(b"0123456789").unwrap();

        let mut stream = Stream::from_fd(file.as_raw_fd(), false).unwrap();
        assert!(stream.capabilities().contains(Capabilities::SIZE));
        assert_eq!(stream.size().unwrap(), 10);

        stream.seek(SeekFrom::Start(4)).unwrap();
        let mut buf = [0u8; 3];
        assert_eq!(stream.read(&mut buf), 3);
        assert_eq!(&buf, b"456");
        assert!(stream.flush().is_ok());
        assert_eq!(stream.file_descriptor(), Some(file.as_raw_fd()));
        stream.close().unwrap();

        // the descriptor is still usable after a non-closing stream
        file.write_all(b"!").unwrap();
    }

    #[test]
    fn test_pipe_has_no_size_and_cannot_seek() {
        let (read_end, write_end) = pipe();
        let mut reader = Stream::from_fd(read_end, true).unwrap();
        let mut writer = Stream::from_fd(write_end, true).unwrap();

        assert!(!reader.capabilities().contains(Capabilities::SIZE));
        assert!(reader.seek(SeekFrom::Start(0)).is_err());
        assert!(reader.size().is_err());

        assert_eq!(writer.write(b"ping"), 4);
        let mut buf = [0u8; 8];
        assert_eq!(reader.read(&mut buf), 4);
        assert_eq!(&buf[..4], b"ping");
    }

    #[test]
    fn test_nonblocking_empty_pipe_is_not_ready() {
        let (read_end, write_end) = pipe();
        set_nonblocking(read_end);
        let mut reader = Stream::from_fd(read_end, true).unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf), 0);
        assert_eq!(reader.status(), IoStatus::NotReady);
        assert!(reader.last_error().is_none());

        // closing the writer turns the next read into end of stream
        drop(Stream::from_fd(write_end, true).unwrap());
        assert_eq!(reader.read(&mut buf), 0);
        assert_eq!(reader.status(), IoStatus::Eof);
    }

    #[test]
    fn test_close_without_autoclose_keeps_descriptor() {
        let (read_end, write_end) = pipe();
        let mut reader = Stream::from_fd(read_end, true).unwrap();

        Stream::from_fd(write_end, false).unwrap().close().unwrap();

        let mut writer = Stream::from_fd(write_end, true).unwrap();
        assert_eq!(writer.write(b"ok"), 2);
        writer.close().unwrap();

        let mut buf = [0u8; 4];
        assert_eq!(reader.read(&mut buf), 2);
        assert_eq!(&buf[..2], b"ok");
        assert_eq!(reader.read(&mut buf), 0);
        assert_eq!(reader.status(), IoStatus::Eof);
    }
}
