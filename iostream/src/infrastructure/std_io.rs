//! `std::io` traits for [`Stream`].
//!
//! The stream's status discipline is folded back into `io::Result`: a
//! zero-byte read is `Ok(0)` only at end of stream, every other zero-byte
//! transfer becomes the matching `io::Error` (`WouldBlock` for `NotReady`).

use crate::domain::{IoStatus, Stream};
use std::io;

impl io::Read for Stream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = Stream::read(self, buf);
        if n > 0 || buf.is_empty() || self.status() == IoStatus::Eof {
            return Ok(n);
        }
        Err(self.transfer_error().into())
    }
}

impl io::Write for Stream<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = Stream::write(self, buf);
        if n > 0 || buf.is_empty() {
            return Ok(n);
        }
        Err(self.transfer_error().into())
    }

    fn flush(&mut self) -> io::Result<()> {
        Stream::flush(self).map_err(Into::into)
    }
}

impl io::Seek for Stream<'_> {
    fn seek(&mut self, pos: io::SeekFrom) -> io::Result<u64> {
        Stream::seek(self, pos.into()).map_err(Into::into)
    }
}
