//! Endian-aware fixed-width reads and writes on a [`Stream`].
//!
//! Every helper moves the whole value in exactly one stream transfer. A
//! short transfer is an error: the value is not returned, and the stream's
//! status tells why (`Eof`, `NotReady`, `Error`, ...).

use crate::domain::{IoError, Stream};

macro_rules! read_methods {
    ($($(#[$doc:meta])* $name:ident -> $ty:ty = $from:ident;)*) => {
        $(
            $(#[$doc])*
            fn $name(&mut self) -> Result<$ty, IoError> {
                self.read_array().map(<$ty>::$from)
            }
        )*
    };
}

macro_rules! write_methods {
    ($($(#[$doc:meta])* $name:ident($ty:ty) = $to:ident;)*) => {
        $(
            $(#[$doc])*
            fn $name(&mut self, value: $ty) -> Result<(), IoError> {
                self.write_array(value.$to())
            }
        )*
    };
}

/// Typed reads.
///
/// # Examples
///
/// ```
/// use iostream::{ReadEndian, Stream};
///
/// let data = [0x34, 0x12, 0xde, 0xad];
/// let mut stream = Stream::from_const_mem(&data).unwrap();
/// assert_eq!(stream.read_u16_le().unwrap(), 0x1234);
/// assert_eq!(stream.read_u16_be().unwrap(), 0xdead);
/// assert!(stream.read_u8().is_err());
/// ```
pub trait ReadEndian {
    /// Read exactly `N` bytes in a single transfer.
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], IoError>;

    read_methods! {
        /// Read an unsigned byte.
        read_u8 -> u8 = from_le_bytes;
        /// Read a signed byte.
        read_i8 -> i8 = from_le_bytes;
        /// Read a little-endian `u16`.
        read_u16_le -> u16 = from_le_bytes;
        /// Read a big-endian `u16`.
        read_u16_be -> u16 = from_be_bytes;
        /// Read a little-endian `i16`.
        read_i16_le -> i16 = from_le_bytes;
        /// Read a big-endian `i16`.
        read_i16_be -> i16 = from_be_bytes;
        /// Read a little-endian `u32`.
        read_u32_le -> u32 = from_le_bytes;
        /// Read a big-endian `u32`.
        read_u32_be -> u32 = from_be_bytes;
        /// Read a little-endian `i32`.
        read_i32_le -> i32 = from_le_bytes;
        /// Read a big-endian `i32`.
        read_i32_be -> i32 = from_be_bytes;
        /// Read a little-endian `u64`.
        read_u64_le -> u64 = from_le_bytes;
        /// Read a big-endian `u64`.
        read_u64_be -> u64 = from_be_bytes;
        /// Read a little-endian `i64`.
        read_i64_le -> i64 = from_le_bytes;
        /// Read a big-endian `i64`.
        read_i64_be -> i64 = from_be_bytes;
    }
}

/// Typed writes.
pub trait WriteEndian {
    /// Write all `N` bytes in a single transfer.
    fn write_array<const N: usize>(&mut self, bytes: [u8; N]) -> Result<(), IoError>;

    write_methods! {
        /// Write an unsigned byte.
        write_u8(u8) = to_le_bytes;
        /// Write a signed byte.
        write_i8(i8) = to_le_bytes;
        /// Write a little-endian `u16`.
        write_u16_le(u16) = to_le_bytes;
        /// Write a big-endian `u16`.
        write_u16_be(u16) = to_be_bytes;
        /// Write a little-endian `i16`.
        write_i16_le(i16) = to_le_bytes;
        /// Write a big-endian `i16`.
        write_i16_be(i16) = to_be_bytes;
        /// Write a little-endian `u32`.
        write_u32_le(u32) = to_le_bytes;
        /// Write a big-endian `u32`.
        write_u32_be(u32) = to_be_bytes;
        /// Write a little-endian `i32`.
        write_i32_le(i32) = to_le_bytes;
        /// Write a big-endian `i32`.
        write_i32_be(i32) = to_be_bytes;
        /// Write a little-endian `u64`.
        write_u64_le(u64) = to_le_bytes;
        /// Write a big-endian `u64`.
        write_u64_be(u64) = to_be_bytes;
        /// Write a little-endian `i64`.
        write_i64_le(i64) = to_le_bytes;
        /// Write a big-endian `i64`.
        write_i64_be(i64) = to_be_bytes;
    }
}

impl ReadEndian for Stream<'_> {
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], IoError> {
        let mut buf = [0u8; N];
        if self.read(&mut buf) == N {
            Ok(buf)
        } else {
            Err(self.transfer_error())
        }
    }
}

impl WriteEndian for Stream<'_> {
    fn write_array<const N: usize>(&mut self, bytes: [u8; N]) -> Result<(), IoError> {
        if self.write(&bytes) == N {
            return Ok(());
        }
        match self.transfer_error() {
            IoError::UnexpectedEof => Err(IoError::WriteZero),
            other => Err(other),
        }
    }
}
