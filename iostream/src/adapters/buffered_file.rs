//! User-space buffering over `std::fs::File`.
//!
//! One buffer serves both directions. It holds either read-ahead or pending
//! writes, never both: switching direction first drains the other side
//! (writes go out, unread read-ahead is given back by seeking).

use std::fs::File;
use std::io::{self, Read, Seek, Write};

/// Default buffer size (POSIX `BUFSIZ`).
pub(crate) const BUFSIZ: usize = 8192;

/// What the shared buffer currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Idle,
    /// `buf[pos..filled]` is read-ahead not yet handed out.
    Reading { pos: usize, filled: usize },
    /// `buf[..len]` is written data not yet sent to the file.
    Writing { len: usize },
}

/// The file behind the buffer, either owned or lent by the caller.
#[derive(Debug)]
pub(crate) enum FileHandle<'a> {
    Owned(File),
    Borrowed(&'a File),
}

impl FileHandle<'_> {
    fn get(&self) -> &File {
        match self {
            Self::Owned(file) => file,
            Self::Borrowed(file) => file,
        }
    }
}

impl From<File> for FileHandle<'_> {
    fn from(file: File) -> Self {
        Self::Owned(file)
    }
}

impl<'a> From<&'a File> for FileHandle<'a> {
    fn from(file: &'a File) -> Self {
        Self::Borrowed(file)
    }
}

/// A `File` with a stdio-style buffer in front of it.
///
/// All I/O goes through `&File`, so an owned and a borrowed file behave the
/// same.
#[derive(Debug)]
pub(crate) struct BufferedFile<'a> {
    file: FileHandle<'a>,
    buf: Box<[u8]>,
    pending: Pending,
}

fn retry<T>(mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
    loop {
        match op() {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}

fn invalid_offset() -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, "seek offset out of range")
}

impl<'a> BufferedFile<'a> {
    pub(crate) fn new(file: impl Into<FileHandle<'a>>) -> Self {
        Self::with_capacity(file, BUFSIZ)
    }

    pub(crate) fn with_capacity(file: impl Into<FileHandle<'a>>, capacity: usize) -> Self {
        Self {
            file: file.into(),
            buf: vec![0u8; capacity.max(1)].into_boxed_slice(),
            pending: Pending::Idle,
        }
    }

    pub(crate) fn get_ref(&self) -> &File {
        self.file.get()
    }

    pub(crate) fn into_inner(self) -> FileHandle<'a> {
        self.file
    }

    pub(crate) fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        self.flush_buffer()?;

        if let Pending::Reading { pos, filled } = &mut self.pending {
            if *pos < *filled {
                let n = out.len().min(*filled - *pos);
                out[..n].copy_from_slice(&self.buf[*pos..*pos + n]);
                *pos += n;
                return Ok(n);
            }
        }
        self.pending = Pending::Idle;

        if out.len() >= self.buf.len() {
            return retry(|| self.file.get().read(out));
        }

        let filled = retry(|| self.file.get().read(&mut self.buf))?;
        let n = out.len().min(filled);
        out[..n].copy_from_slice(&self.buf[..n]);
        self.pending = Pending::Reading { pos: n, filled };
        Ok(n)
    }

    pub(crate) fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.discard_read_ahead()?;

        if self.pending_writes() + data.len() > self.buf.len() {
            self.flush_buffer()?;
            if data.len() >= self.buf.len() {
                return retry(|| self.file.get().write(data));
            }
        }

        let len = self.pending_writes();
        self.buf[len..len + data.len()].copy_from_slice(data);
        self.pending = Pending::Writing { len: len + data.len() };
        Ok(data.len())
    }

    pub(crate) fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        if pos == io::SeekFrom::Current(0) {
            return self.position();
        }

        self.flush_buffer()?;
        let target = match (pos, self.pending) {
            (io::SeekFrom::Current(offset), Pending::Reading { pos, filled }) => {
                let unread = i64::try_from(filled - pos).map_err(|_| invalid_offset())?;
                io::SeekFrom::Current(offset.checked_sub(unread).ok_or_else(invalid_offset)?)
            }
            (other, _) => other,
        };
        // read-ahead stays valid until the OS accepts the new offset
        let new_pos = self.file.get().seek(target)?;
        self.pending = Pending::Idle;
        Ok(new_pos)
    }

    /// Logical position: the file offset adjusted for whatever the buffer holds.
    pub(crate) fn position(&mut self) -> io::Result<u64> {
        let raw = self.file.get().stream_position()?;
        Ok(match self.pending {
            Pending::Idle => raw,
            Pending::Reading { pos, filled } => raw
                .checked_sub((filled - pos) as u64)
                .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidData))?,
            Pending::Writing { len } => raw
                .checked_add(len as u64)
                .ok_or_else(|| io::Error::from(io::ErrorKind::InvalidData))?,
        })
    }

    pub(crate) fn len(&mut self) -> io::Result<u64> {
        self.flush_buffer()?;
        Ok(self.file.get().metadata()?.len())
    }

    /// Send pending writes to the file. On failure the unsent tail stays
    /// buffered so a later flush can finish the job.
    pub(crate) fn flush_buffer(&mut self) -> io::Result<()> {
        let Pending::Writing { len } = self.pending else {
            return Ok(());
        };

        let mut sent = 0;
        let result = loop {
            if sent == len {
                break Ok(());
            }
            match self.file.get().write(&self.buf[sent..len]) {
                Ok(0) => break Err(io::Error::from(io::ErrorKind::WriteZero)),
                Ok(n) => sent += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => break Err(e),
            }
        };

        if result.is_err() {
            self.buf.copy_within(sent..len, 0);
            self.pending = Pending::Writing { len: len - sent };
        } else {
            self.pending = Pending::Idle;
        }
        result
    }

    pub(crate) fn sync_data(&mut self) -> io::Result<()> {
        self.flush_buffer()?;
        retry(|| self.file.get().sync_data())
    }

    fn pending_writes(&self) -> usize {
        match self.pending {
            Pending::Writing { len } => len,
            _ => 0,
        }
    }

    /// Give unread read-ahead back to the file so the OS offset matches the
    /// logical position again.
    fn discard_read_ahead(&mut self) -> io::Result<()> {
        if let Pending::Reading { pos, filled } = self.pending {
            let unread = i64::try_from(filled - pos).map_err(|_| invalid_offset())?;
            if unread > 0 {
                self.file.get().seek(io::SeekFrom::Current(-unread))?;
            }
            self.pending = Pending::Idle;
        }
        Ok(())
    }
}
