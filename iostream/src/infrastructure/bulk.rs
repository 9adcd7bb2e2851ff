//! Whole-stream load and save.
//!
//! Both directions keep going while the stream reports `NotReady`, sleeping
//! briefly between attempts, and stop on anything else. There is no retry
//! limit: a stream that never becomes ready stalls the call.

use crate::domain::{IoError, IoStatus, Stream};
use core::ops::Deref;
use std::path::Path;
use std::time::Duration;

/// Growth step when the stream cannot report its size.
const FILE_CHUNK_SIZE: usize = 1024;

/// Pause between attempts on a not-ready stream.
const NOT_READY_DELAY: Duration = Duration::from_millis(1);

/// Bytes produced by [`load_all`].
///
/// The storage always carries one zero byte past the loaded data, so the
/// contents can be handed to code expecting a NUL-terminated string. That
/// byte is not part of [`len`](LoadedBuffer::len).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedBuffer {
    // invariant: non-empty, last byte is 0
    data: Vec<u8>,
}

impl LoadedBuffer {
    /// Number of bytes loaded, excluding the terminator.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len() - 1
    }

    /// Whether nothing was loaded.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The loaded bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len()]
    }

    /// The loaded bytes followed by the zero terminator.
    #[inline]
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.data
    }

    /// Take the loaded bytes, dropping the terminator.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.data.pop();
        self.data
    }
}

impl Deref for LoadedBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for LoadedBuffer {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

fn resize(data: &mut Vec<u8>, len: usize) -> Result<(), IoError> {
    data.try_reserve_exact(len.saturating_sub(data.len()))
        .map_err(|_| IoError::OutOfMemory { requested: len })?;
    data.resize(len, 0);
    Ok(())
}

/// Read everything from the cursor to the end of the stream.
///
/// A stream that knows its size is read into one allocation of exactly
/// `size + 1` bytes; otherwise the buffer grows in 1 KiB steps. Reading stops
/// at the first zero-byte result that is not `NotReady`. That includes
/// errors: whatever arrived before is returned, and
/// [`Stream::status`] / [`Stream::last_error`] say why it stopped.
///
/// # Errors
///
/// Only if the buffer cannot be allocated.
///
/// # Examples
///
/// ```
/// use iostream::{load_all, Stream};
///
/// let mut stream = Stream::from_const_mem(b"level data").unwrap();
/// let loaded = load_all(&mut stream).unwrap();
/// assert_eq!(&*loaded, b"level data");
/// assert_eq!(loaded.as_bytes_with_nul().last(), Some(&0));
/// ```
pub fn load_all(stream: &mut Stream<'_>) -> Result<LoadedBuffer, IoError> {
    let (mut size, loading_chunks) = match stream.size() {
        Ok(size) => {
            let size = usize::try_from(size)
                .map_err(|_| IoError::OutOfMemory { requested: usize::MAX })?;
            (size, false)
        }
        Err(_) => (FILE_CHUNK_SIZE, true),
    };

    let mut data = Vec::new();
    let capacity = size
        .checked_add(1)
        .ok_or(IoError::OutOfMemory { requested: usize::MAX })?;
    resize(&mut data, capacity)?;

    let mut total = 0;
    loop {
        if !loading_chunks && total == size {
            break;
        }
        if loading_chunks && total + FILE_CHUNK_SIZE > size {
            size = total + FILE_CHUNK_SIZE;
            resize(&mut data, size + 1)?;
        }

        let n = stream.read(&mut data[total..size]);
        if n > 0 {
            total += n;
            continue;
        }
        if stream.status() == IoStatus::NotReady {
            trace!("load: stream not ready after {} bytes, retrying", total);
            std::thread::sleep(NOT_READY_DELAY);
            continue;
        }
        break;
    }

    data.truncate(total + 1);
    data[total] = 0;
    Ok(LoadedBuffer { data })
}

/// [`load_all`], then close the stream.
///
/// A failure to close is logged, not returned; the data has been read.
pub fn load_all_and_close(mut stream: Stream<'_>) -> Result<LoadedBuffer, IoError> {
    let loaded = load_all(&mut stream);
    if let Err(e) = stream.close() {
        warn!("closing stream after load failed: {}", e);
    }
    loaded
}

/// Write all of `data` to the stream.
///
/// Empty `data` succeeds without touching the stream.
///
/// # Errors
///
/// Stops at the first zero-byte write that is not `NotReady` and returns
/// its error; the stream keeps the status.
pub fn save_all(stream: &mut Stream<'_>, data: &[u8]) -> Result<(), IoError> {
    let mut total = 0;
    while total < data.len() {
        let n = stream.write(&data[total..]);
        if n > 0 {
            total += n;
            continue;
        }
        if stream.status() == IoStatus::NotReady {
            trace!("save: stream not ready after {} bytes, retrying", total);
            std::thread::sleep(NOT_READY_DELAY);
            continue;
        }
        return Err(stream.transfer_error());
    }
    Ok(())
}

/// [`save_all`], then close the stream whatever the outcome.
///
/// # Errors
///
/// The write error if there was one, otherwise the close error: a
/// buffering backend may only fail once it is closed.
pub fn save_all_and_close(mut stream: Stream<'_>, data: &[u8]) -> Result<(), IoError> {
    let saved = save_all(&mut stream, data);
    let closed = stream.close();
    saved.and(closed)
}

/// Load a whole file.
///
/// # Errors
///
/// Any error from [`Stream::from_file`] or [`load_all`].
pub fn load_file<P: AsRef<Path>>(path: P) -> Result<LoadedBuffer, IoError> {
    load_all_and_close(Stream::from_file(path, "rb")?)
}

/// Create or truncate a file and write `data` to it.
///
/// # Errors
///
/// Any error from [`Stream::from_file`] or [`save_all_and_close`].
pub fn save_file<P: AsRef<Path>>(path: P, data: &[u8]) -> Result<(), IoError> {
    save_all_and_close(Stream::from_file(path, "wb")?, data)
}
