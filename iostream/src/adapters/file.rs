//! Buffered file backend.

use super::buffered_file::{BufferedFile, FileHandle};
use crate::domain::{Backend, Capabilities, IoError, OpenMode, SeekFrom, Stream};
use std::fs::File;
use std::io;
use std::path::Path;

/// Backend over a [`File`] with stdio-style buffering.
///
/// Read and write capability follow the [`OpenMode`] the file was opened
/// with. Flushing drains the buffer and, for regular files, syncs the data
/// to storage. An owned file is closed with the backend; a borrowed one is
/// only flushed and stays with its owner.
#[derive(Debug)]
pub struct FileBackend<'a> {
    file: BufferedFile<'a>,
    mode: OpenMode,
    regular_file: bool,
}

impl FileBackend<'static> {
    /// Take ownership of an open file, closing it along with the backend.
    pub fn new(file: File, mode: OpenMode) -> Self {
        Self::with_handle(FileHandle::Owned(file), mode)
    }
}

impl<'a> FileBackend<'a> {
    /// Use a file owned elsewhere. Closing the backend leaves it open.
    pub fn borrowed(file: &'a File, mode: OpenMode) -> Self {
        Self::with_handle(FileHandle::Borrowed(file), mode)
    }

    fn with_handle(file: FileHandle<'a>, mode: OpenMode) -> Self {
        let file = BufferedFile::new(file);
        let regular_file = file.get_ref().metadata().is_ok_and(|m| m.is_file());
        Self {
            file,
            mode,
            regular_file,
        }
    }

    /// The mode the file was opened with.
    pub fn mode(&self) -> OpenMode {
        self.mode
    }
}

fn transfer_error(context: &'static str, err: io::Error) -> IoError {
    if err.kind() == io::ErrorKind::WouldBlock {
        IoError::NotReady
    } else {
        IoError::os(context, err)
    }
}

#[cfg(unix)]
fn close_file(file: File) -> io::Result<()> {
    use std::os::fd::IntoRawFd;

    nix::unistd::close(file.into_raw_fd())
        .map_err(|errno| io::Error::from_raw_os_error(errno as i32))
}

#[cfg(not(unix))]
fn close_file(file: File) -> io::Result<()> {
    drop(file);
    Ok(())
}

impl Backend for FileBackend<'_> {
    fn capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::SEEK | Capabilities::FLUSH;
        caps.set(Capabilities::READ, self.mode.is_readable());
        caps.set(Capabilities::WRITE, self.mode.is_writable());
        caps.set(Capabilities::SIZE, self.regular_file);
        caps
    }

    fn size(&mut self) -> Result<u64, IoError> {
        self.file
            .len()
            .map_err(|e| IoError::os("Couldn't get stream size", e))
    }

    fn seek(&mut self, pos: SeekFrom) -> Result<u64, IoError> {
        self.file
            .seek(pos.into())
            .map_err(|e| IoError::os("Couldn't seek in stream", e))
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, IoError> {
        self.file
            .read(buf)
            .map_err(|e| transfer_error("Error reading from datastream", e))
    }

    fn write(&mut self, buf: &[u8]) -> Result<usize, IoError> {
        self.file
            .write(buf)
            .map_err(|e| transfer_error("Error writing to datastream", e))
    }

    fn flush(&mut self) -> Result<(), IoError> {
        if !self.regular_file {
            return self
                .file
                .flush_buffer()
                .map_err(|e| transfer_error("Error flushing datastream", e));
        }
        self.file
            .sync_data()
            .map_err(|e| transfer_error("Unable to flush stream", e))
    }

    fn close(mut self: Box<Self>) -> Result<(), IoError> {
        let flushed = self
            .file
            .flush_buffer()
            .map_err(|e| IoError::os("Error flushing datastream", e));
        if let FileHandle::Owned(file) = self.file.into_inner() {
            close_file(file).map_err(|e| IoError::os("Error closing datastream", e))?;
        }
        flushed
    }

    fn file_descriptor(&self) -> Option<i32> {
        #[cfg(unix)]
        {
            use std::os::fd::AsRawFd;
            Some(self.file.get_ref().as_raw_fd())
        }
        #[cfg(not(unix))]
        {
            None
        }
    }
}

impl Stream<'static> {
    /// Open the file at `path` with an fopen-style `mode` (`"rb"`, `"w+"`, ...).
    ///
    /// Only regular files and named pipes are accepted.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument("file")` / `InvalidArgument("mode")` for an empty path or mode
    /// - `InvalidMode` for a malformed mode string
    /// - `Os` if the file cannot be opened
    /// - `Message` if the path names something other than a file or pipe
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use iostream::Stream;
    ///
    /// let mut stream = Stream::from_file("save.dat", "wb").unwrap();
    /// stream.write(b"progress");
    /// stream.close().unwrap();
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P, mode: &str) -> Result<Self, IoError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(IoError::InvalidArgument("file"));
        }
        if mode.is_empty() {
            return Err(IoError::InvalidArgument("mode"));
        }
        let mode = OpenMode::parse(mode)?;

        let file = mode
            .to_open_options()
            .open(path)
            .map_err(|e| IoError::os("Couldn't open file", e))?;
        let file_type = file
            .metadata()
            .map_err(|e| IoError::os("Couldn't open file", e))?
            .file_type();
        if !is_file_or_pipe(&file_type) {
            return Err(IoError::Message(format!(
                "{} is not a regular file or pipe",
                path.display()
            )));
        }

        debug!("opened {} as {:?}", path.display(), mode);
        Ok(Self::new_unchecked(Box::new(FileBackend::new(file, mode))))
    }

    /// Open a stream that takes over an already open file and closes it.
    ///
    /// `mode` states what the file was opened for.
    pub fn from_std_file(file: File, mode: OpenMode) -> Self {
        Self::new_unchecked(Box::new(FileBackend::new(file, mode)))
    }
}

impl<'a> Stream<'a> {
    /// Open a stream over a file that stays open, and usable, after the
    /// stream is closed.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use iostream::{OpenMode, Stream};
    ///
    /// let log = std::fs::OpenOptions::new().append(true).open("game.log").unwrap();
    /// let mut stream = Stream::from_borrowed_file(&log, OpenMode::parse("a").unwrap());
    /// stream.write(b"level 2\n");
    /// stream.close().unwrap();
    /// log.sync_all().unwrap();
    /// ```
    pub fn from_borrowed_file(file: &'a File, mode: OpenMode) -> Self {
        Self::new_unchecked(Box::new(FileBackend::borrowed(file, mode)))
    }
}

#[cfg(unix)]
fn is_file_or_pipe(file_type: &std::fs::FileType) -> bool {
    use std::os::unix::fs::FileTypeExt;
    file_type.is_file() || file_type.is_fifo()
}

#[cfg(not(unix))]
fn is_file_or_pipe(file_type: &std::fs::FileType) -> bool {
    file_type.is_file()
}
