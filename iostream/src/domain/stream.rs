//! Stream domain service - the handle callers hold and the dispatch layer
//! in front of a backend.
//!
//! This module contains `Stream`, which owns exactly one backend, tracks the
//! status state machine, and forwards size/seek/read/write/flush/close to the
//! backend according to the capability set captured when it was opened.

use crate::domain::{
    error::{IoError, Operation},
    ports::{Backend, Capabilities},
    status::IoStatus,
    value_objects::SeekFrom,
};
use core::fmt;

/// A byte stream over a pluggable backend.
///
/// The stream owns its backend from [`open`](Stream::open) until
/// [`close`](Stream::close) (or drop), and never changes which operations it
/// dispatches: the backend's [`Capabilities`] are read once at open.
///
/// Transfers follow a status-code discipline rather than returning errors:
/// [`read`](Stream::read) and [`write`](Stream::write) return the number of
/// bytes moved, and [`status`](Stream::status) / [`last_error`](Stream::last_error)
/// explain a short or zero-byte result.
///
/// # Examples
///
/// ```
/// use iostream::{IoStatus, SeekFrom, Stream};
///
/// let mut stream = Stream::from_dynamic_mem();
/// assert_eq!(stream.write(b"hello"), 5);
/// stream.seek(SeekFrom::Start(0)).unwrap();
///
/// let mut buf = [0u8; 5];
/// assert_eq!(stream.read(&mut buf), 5);
/// assert_eq!(&buf, b"hello");
/// assert_eq!(stream.status(), IoStatus::Ready);
///
/// // Only the next read notices the end.
/// assert_eq!(stream.read(&mut buf), 0);
/// assert_eq!(stream.status(), IoStatus::Eof);
/// ```
pub struct Stream<'a> {
    backend: Box<dyn Backend + 'a>,
    capabilities: Capabilities,
    status: IoStatus,
    last_error: Option<IoError>,
}

/// Placeholder swapped in once the real backend has been handed to `close`.
struct Closed;

impl Backend for Closed {
    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }
}

impl<'a> Stream<'a> {
    /// Create a stream that owns `backend`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the backend advertises neither read nor
    /// write. The backend is closed before the error is returned.
    pub fn open<B: Backend + 'a>(backend: B) -> Result<Self, IoError> {
        Self::open_boxed(Box::new(backend))
    }

    /// Create a stream from an already boxed backend.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Stream::open).
    pub fn open_boxed(backend: Box<dyn Backend + 'a>) -> Result<Self, IoError> {
        let capabilities = backend.capabilities();
        if !capabilities.intersects(Capabilities::READ | Capabilities::WRITE) {
            if let Err(e) = backend.close() {
                warn!("closing rejected backend failed: {}", e);
            }
            return Err(IoError::InvalidArgument("backend"));
        }

        debug!("stream opened with {:?}", capabilities);
        Ok(Self {
            backend,
            capabilities,
            status: IoStatus::Ready,
            last_error: None,
        })
    }

    /// Wrap a built-in backend that is known to read or write.
    pub(crate) fn new_unchecked(backend: Box<dyn Backend + 'a>) -> Self {
        let capabilities = backend.capabilities();
        debug_assert!(capabilities.intersects(Capabilities::READ | Capabilities::WRITE));
        debug!("stream opened with {:?}", capabilities);
        Self {
            backend,
            capabilities,
            status: IoStatus::Ready,
            last_error: None,
        }
    }

    /// Close the stream, releasing the backend.
    ///
    /// The handle is gone afterwards whatever the outcome; an error only
    /// reports that the backend failed to release its resource.
    pub fn close(mut self) -> Result<(), IoError> {
        let backend = core::mem::replace(&mut self.backend, Box::new(Closed));
        let result = backend.close();
        debug!("stream closed ({})", if result.is_ok() { "ok" } else { "failed" });
        result
    }

    /// The operations the backend provided at open time.
    #[inline]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Outcome of the most recent read, write or flush.
    #[inline]
    pub fn status(&self) -> IoStatus {
        self.status
    }

    /// The error recorded by the most recent read or write, if any.
    #[inline]
    pub fn last_error(&self) -> Option<&IoError> {
        self.last_error.as_ref()
    }

    /// Take the recorded error, leaving none behind.
    #[inline]
    pub fn take_error(&mut self) -> Option<IoError> {
        self.last_error.take()
    }

    /// Total size of the stream in bytes.
    ///
    /// Uses the backend's own size query when it has one; otherwise saves
    /// the position, seeks to the end, and seeks back.
    ///
    /// # Errors
    ///
    /// Returns the first failing seek (or the backend's size error).
    pub fn size(&mut self) -> Result<u64, IoError> {
        if self.capabilities.contains(Capabilities::SIZE) {
            return self.backend.size();
        }

        let pos = self.seek(SeekFrom::Current(0))?;
        let size = self.seek(SeekFrom::End(0))?;
        self.seek(SeekFrom::Start(pos))?;
        Ok(size)
    }

    /// Move the cursor, returning the new absolute position.
    ///
    /// # Errors
    ///
    /// Returns `Unsupported(Seek)` if the backend cannot seek, or the
    /// backend's error for a rejected position.
    pub fn seek(&mut self, pos: SeekFrom) -> Result<u64, IoError> {
        if !self.capabilities.contains(Capabilities::SEEK) {
            return Err(IoError::Unsupported(Operation::Seek));
        }
        self.backend.seek(pos)
    }

    /// Current cursor position; shorthand for `seek(SeekFrom::Current(0))`.
    ///
    /// # Errors
    ///
    /// Same as [`seek`](Stream::seek).
    #[inline]
    pub fn tell(&mut self) -> Result<u64, IoError> {
        self.seek(SeekFrom::Current(0))
    }

    /// Read up to `buf.len()` bytes, returning how many arrived.
    ///
    /// An empty `buf` returns 0 immediately and leaves the status alone.
    /// Otherwise the status is reset to `Ready` and the last error cleared,
    /// then a zero-byte result sets it to:
    /// - `WriteOnly` if the backend cannot read
    /// - `NotReady` if the backend would block
    /// - `Error` if the backend reported an error (kept in `last_error`)
    /// - `Eof` otherwise
    ///
    /// A read that returns data leaves the status `Ready`, even when it
    /// consumed the last available byte.
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        if buf.is_empty() {
            return 0;
        }
        if !self.capabilities.contains(Capabilities::READ) {
            self.status = IoStatus::WriteOnly;
            self.last_error = Some(IoError::Unsupported(Operation::Read));
            return 0;
        }

        self.status = IoStatus::Ready;
        self.last_error = None;

        match self.backend.read(buf) {
            Ok(0) => {
                self.status = IoStatus::Eof;
                0
            }
            Ok(n) => n.min(buf.len()),
            Err(e) => {
                self.fail(e);
                0
            }
        }
    }

    /// Write up to `buf.len()` bytes, returning how many were accepted.
    ///
    /// Mirrors [`read`](Stream::read) with `ReadOnly` for a backend that
    /// cannot write. Writes have no end-of-stream: a zero-byte result that
    /// is not `NotReady` always sets `Error`.
    pub fn write(&mut self, buf: &[u8]) -> usize {
        if buf.is_empty() {
            return 0;
        }
        if !self.capabilities.contains(Capabilities::WRITE) {
            self.status = IoStatus::ReadOnly;
            self.last_error = Some(IoError::Unsupported(Operation::Write));
            return 0;
        }

        self.status = IoStatus::Ready;
        self.last_error = None;

        match self.backend.write(buf) {
            Ok(0) => {
                self.fail(IoError::WriteZero);
                0
            }
            Ok(n) => n.min(buf.len()),
            Err(e) => {
                self.fail(e);
                0
            }
        }
    }

    /// Flush buffered data to the backend's destination.
    ///
    /// A backend without a flush operation succeeds trivially.
    ///
    /// # Errors
    ///
    /// Returns the backend's error; the status becomes `NotReady` for
    /// `IoError::NotReady` and `Error` for anything else.
    pub fn flush(&mut self) -> Result<(), IoError> {
        self.status = IoStatus::Ready;
        self.last_error = None;

        if !self.capabilities.contains(Capabilities::FLUSH) {
            return Ok(());
        }

        self.backend.flush().inspect_err(|e| {
            self.status = if e.is_not_ready() {
                IoStatus::NotReady
            } else {
                IoStatus::Error
            };
        })
    }

    /// The memory region of a memory-backed stream.
    ///
    /// For the dynamic memory backend this is everything written so far.
    #[inline]
    pub fn memory(&self) -> Option<&[u8]> {
        self.backend.memory()
    }

    /// The OS descriptor of a descriptor- or file-backed stream.
    #[inline]
    pub fn file_descriptor(&self) -> Option<i32> {
        self.backend.file_descriptor()
    }

    /// Turn the current status into an error for callers that need one
    /// after a short transfer.
    pub(crate) fn transfer_error(&mut self) -> IoError {
        match self.status {
            IoStatus::NotReady => IoError::NotReady,
            IoStatus::ReadOnly => IoError::Unsupported(Operation::Write),
            IoStatus::WriteOnly => IoError::Unsupported(Operation::Read),
            IoStatus::Error => self.last_error.take().unwrap_or(IoError::WriteZero),
            IoStatus::Ready | IoStatus::Eof => IoError::UnexpectedEof,
        }
    }

    fn fail(&mut self, err: IoError) {
        if err.is_not_ready() {
            self.status = IoStatus::NotReady;
        } else {
            self.status = IoStatus::Error;
            self.last_error = Some(err);
        }
    }
}

impl Drop for Stream<'_> {
    fn drop(&mut self) {
        let backend = core::mem::replace(&mut self.backend, Box::new(Closed));
        if let Err(e) = backend.close() {
            warn!("closing dropped stream failed: {}", e);
        }
    }
}

impl fmt::Debug for Stream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stream")
            .field("capabilities", &self.capabilities)
            .field("status", &self.status)
            .field("last_error", &self.last_error)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Backend that counts calls and replays scripted read and flush results.
    struct Scripted {
        caps: Capabilities,
        reads: Vec<Result<usize, IoError>>,
        flushes: Vec<Result<(), IoError>>,
        calls: Rc<Cell<usize>>,
        closed: Rc<Cell<bool>>,
        fail_close: bool,
        position: u64,
        len: u64,
    }

    impl Scripted {
        fn new(caps: Capabilities) -> Self {
            Self {
                caps,
                reads: Vec::new(),
                flushes: Vec::new(),
                calls: Rc::new(Cell::new(0)),
                closed: Rc::new(Cell::new(false)),
                fail_close: false,
                position: 0,
                len: 0,
            }
        }
    }

    impl Backend for Scripted {
        fn capabilities(&self) -> Capabilities {
            self.caps
        }

        fn seek(&mut self, pos: SeekFrom) -> Result<u64, IoError> {
            self.calls.set(self.calls.get() + 1);
            let target = pos.resolve(self.position, self.len);
            if target < 0 {
                return Err(IoError::Message("negative seek".into()));
            }
            self.position = target as u64;
            Ok(self.position)
        }

        fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError> {
            self.calls.set(self.calls.get() + 1);
            if self.reads.is_empty() {
                return Ok(0);
            }
            let next = self.reads.remove(0);
            if let Ok(n) = next {
                buf[..n].fill(7);
            }
            next
        }

        fn write(&mut self, buf: &[u8]) -> Result<usize, IoError> {
            self.calls.set(self.calls.get() + 1);
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), IoError> {
            self.calls.set(self.calls.get() + 1);
            if self.flushes.is_empty() {
                return Ok(());
            }
            self.flushes.remove(0)
        }

        fn close(self: Box<Self>) -> Result<(), IoError> {
            self.closed.set(true);
            if self.fail_close {
                Err(IoError::Message("close failed".into()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_open_rejects_backend_without_read_or_write() {
        let backend = Scripted::new(Capabilities::SEEK | Capabilities::SIZE);
        let closed = backend.closed.clone();

        let result = Stream::open(backend);
        assert!(matches!(result, Err(IoError::InvalidArgument("backend"))));
        assert!(closed.get());
    }

    #[test]
    fn test_zero_length_transfer_touches_nothing() {
        let backend = Scripted::new(Capabilities::READ | Capabilities::WRITE);
        let calls = backend.calls.clone();
        let mut stream = Stream::open(backend).unwrap();

        // put the stream into a non-ready state first
        assert_eq!(stream.read(&mut [0u8; 2]), 0);
        assert_eq!(stream.status(), IoStatus::Eof);
        let before = calls.get();

        assert_eq!(stream.read(&mut []), 0);
        assert_eq!(stream.write(&[]), 0);
        assert_eq!(stream.status(), IoStatus::Eof);
        assert_eq!(calls.get(), before);
    }

    #[test]
    fn test_read_status_transitions() {
        let mut backend = Scripted::new(Capabilities::READ);
        backend.reads = vec![
            Ok(3),
            Err(IoError::NotReady),
            Err(IoError::Message("boom".into())),
            Ok(0),
        ];
        let mut stream = Stream::open(backend).unwrap();
        let mut buf = [0u8; 3];

        assert_eq!(stream.read(&mut buf), 3);
        assert_eq!(stream.status(), IoStatus::Ready);

        assert_eq!(stream.read(&mut buf), 0);
        assert_eq!(stream.status(), IoStatus::NotReady);
        assert!(stream.last_error().is_none());

        assert_eq!(stream.read(&mut buf), 0);
        assert_eq!(stream.status(), IoStatus::Error);
        assert!(matches!(stream.last_error(), Some(IoError::Message(_))));

        // the next attempt clears the recorded error before dispatch
        assert_eq!(stream.read(&mut buf), 0);
        assert_eq!(stream.status(), IoStatus::Eof);
        assert!(stream.last_error().is_none());
    }

    #[test]
    fn test_write_on_read_only_backend() {
        let backend = Scripted::new(Capabilities::READ);
        let calls = backend.calls.clone();
        let mut stream = Stream::open(backend).unwrap();

        assert_eq!(stream.write(b"data"), 0);
        assert_eq!(stream.status(), IoStatus::ReadOnly);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_read_on_write_only_backend() {
        let mut stream = Stream::open(Scripted::new(Capabilities::WRITE)).unwrap();

        assert_eq!(stream.read(&mut [0u8; 4]), 0);
        assert_eq!(stream.status(), IoStatus::WriteOnly);
        assert!(matches!(
            stream.last_error(),
            Some(IoError::Unsupported(Operation::Read))
        ));
    }

    #[test]
    fn test_seek_unsupported() {
        let mut stream = Stream::open(Scripted::new(Capabilities::READ)).unwrap();
        assert!(matches!(
            stream.seek(SeekFrom::Start(0)),
            Err(IoError::Unsupported(Operation::Seek))
        ));
        assert!(stream.size().is_err());
    }

    #[test]
    fn test_size_emulated_with_three_seeks() {
        let mut backend = Scripted::new(Capabilities::READ | Capabilities::SEEK);
        backend.len = 40;
        backend.position = 12;
        let calls = backend.calls.clone();
        let mut stream = Stream::open(backend).unwrap();

        assert_eq!(stream.size().unwrap(), 40);
        assert_eq!(calls.get(), 3);
        assert_eq!(stream.tell().unwrap(), 12);
    }

    #[test]
    fn test_tell_is_idempotent() {
        let mut backend = Scripted::new(Capabilities::READ | Capabilities::SEEK);
        backend.len = 10;
        backend.position = 4;
        let mut stream = Stream::open(backend).unwrap();
        let status = stream.status();

        assert_eq!(stream.tell().unwrap(), 4);
        assert_eq!(stream.tell().unwrap(), 4);
        assert_eq!(stream.status(), status);
    }

    #[test]
    fn test_flush_without_capability_succeeds() {
        let mut stream = Stream::open(Scripted::new(Capabilities::WRITE)).unwrap();
        assert!(stream.flush().is_ok());
        assert_eq!(stream.status(), IoStatus::Ready);
    }

    #[test]
    fn test_close_reports_backend_failure() {
        let mut backend = Scripted::new(Capabilities::READ);
        backend.fail_close = true;
        let closed = backend.closed.clone();
        let stream = Stream::open(backend).unwrap();

        assert!(stream.close().is_err());
        assert!(closed.get());
    }

    #[test]
    fn test_drop_closes_backend_once() {
        let backend = Scripted::new(Capabilities::READ);
        let closed = backend.closed.clone();
        {
            let _stream = Stream::open(backend).unwrap();
        }
        assert!(closed.get());
    }

    #[test]
    fn test_flush_failures_set_status_and_recover() {
        let mut backend = Scripted::new(Capabilities::WRITE | Capabilities::FLUSH);
        backend.flushes = vec![
            Err(IoError::NotReady),
            Err(IoError::Message("device gone".into())),
            Ok(()),
        ];
        let mut stream = Stream::open(backend).unwrap();

        assert!(matches!(stream.flush(), Err(IoError::NotReady)));
        assert_eq!(stream.status(), IoStatus::NotReady);

        assert!(matches!(stream.flush(), Err(IoError::Message(_))));
        assert_eq!(stream.status(), IoStatus::Error);

        assert!(stream.flush().is_ok());
        assert_eq!(stream.status(), IoStatus::Ready);
    }

    #[test]
    fn test_flush_without_capability_skips_backend() {
        let mut backend = Scripted::new(Capabilities::WRITE);
        backend.flushes = vec![Err(IoError::Message("never called".into()))];
        let calls = backend.calls.clone();
        let mut stream = Stream::open(backend).unwrap();

        assert!(stream.flush().is_ok());
        assert_eq!(stream.status(), IoStatus::Ready);
        assert_eq!(calls.get(), 0);
    }
}
