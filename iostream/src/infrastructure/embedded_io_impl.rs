//! Implementations of `embedded_io` traits for [`Stream`].
//!
//! These bridge the stream to drivers and codecs written against the
//! `embedded-io` ecosystem.

use crate::domain::{IoError, IoStatus, Stream};
use embedded_io::{ErrorKind, ErrorType, Read, Seek, Write};

impl embedded_io::Error for IoError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) | Self::InvalidMode(_) => ErrorKind::InvalidInput,
            Self::Unsupported(_) => ErrorKind::Unsupported,
            Self::OutOfMemory { .. } => ErrorKind::OutOfMemory,
            Self::WriteZero => ErrorKind::WriteZero,
            Self::Os { source, .. } => embedded_io::Error::kind(source),
            Self::NotReady | Self::UnexpectedEof | Self::Message(_) => ErrorKind::Other,
        }
    }
}

impl ErrorType for Stream<'_> {
    type Error = IoError;
}

impl Read for Stream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = Stream::read(self, buf);
        if n > 0 || buf.is_empty() || self.status() == IoStatus::Eof {
            return Ok(n);
        }
        Err(self.transfer_error())
    }
}

impl Write for Stream<'_> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let n = Stream::write(self, buf);
        if n > 0 || buf.is_empty() {
            return Ok(n);
        }
        Err(self.transfer_error())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Stream::flush(self)
    }
}

impl Seek for Stream<'_> {
    fn seek(&mut self, pos: embedded_io::SeekFrom) -> Result<u64, Self::Error> {
        let pos = match pos {
            embedded_io::SeekFrom::Start(n) => crate::domain::SeekFrom::Start(n),
            embedded_io::SeekFrom::End(n) => crate::domain::SeekFrom::End(n),
            embedded_io::SeekFrom::Current(n) => crate::domain::SeekFrom::Current(n),
        };
        Stream::seek(self, pos)
    }
}
