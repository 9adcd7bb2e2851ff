//! Byte streams over pluggable backends, with hexagonal architecture.
//!
//! This crate provides a single stream handle that reads, writes, seeks and
//! flushes through whichever backend it was opened on (memory regions, a
//! growable buffer, raw descriptors, buffered files or your own), plus
//! endian-aware typed helpers and whole-stream load/save built on top.
//!
//! # Architecture
//!
//! The crate is organized into three layers:
//!
//! ## Domain Layer (`domain`)
//! Pure stream logic with no OS dependencies:
//! - **Service**: `Stream` with its status state machine
//! - **Value Objects**: `SeekFrom`, `OpenMode`, `ChunkSize`
//! - **Ports**: `Backend` interface and its `Capabilities`
//!
//! ## Adapter Layer (`adapters`)
//! Concrete backends implementing the port:
//! - **`Memory`** / **`ConstMemory`**: caller-owned fixed regions
//! - **`DynamicMemory`**: owned buffer growing in chunks
//! - **`FdBackend`**: raw POSIX descriptor (unix)
//! - **`FileBackend`**: buffered `std::fs::File`
//!
//! ## Infrastructure Layer (`infrastructure`)
//! Utilities built on the stream contract:
//! - Typed reads/writes (`ReadEndian`, `WriteEndian`)
//! - Bulk transfer (`load_all`, `save_all`, `load_file`, `save_file`)
//! - `std::io` and `embedded-io` trait implementations
//! - Directory listing (`glob_directory`, `path_exists`)
//!
//! # Quick Start
//!
//! ## Growable memory
//!
//! ```
//! use iostream::{ReadEndian, SeekFrom, Stream, WriteEndian};
//!
//! let mut stream = Stream::from_dynamic_mem();
//! stream.write_u32_le(0x1234_5678).unwrap();
//! stream.write(b"payload");
//!
//! stream.seek(SeekFrom::Start(0)).unwrap();
//! assert_eq!(stream.read_u32_le().unwrap(), 0x1234_5678);
//! ```
//!
//! ## Files
//!
//! ```no_run
//! use iostream::{load_file, save_file};
//!
//! save_file("settings.ini", b"[video]\nfullscreen=1\n").unwrap();
//! let loaded = load_file("settings.ini").unwrap();
//! assert_eq!(loaded.len(), 22);
//! ```
//!
//! # Status discipline
//!
//! `read` and `write` return a byte count, never an error. After a short
//! or zero-byte transfer, `Stream::status` tells whether the stream hit the
//! end, would block, failed (see `Stream::last_error`), or lacks the
//! capability altogether.
//!
//! # Features
//!
//! - `log` (default): Enable logging through the `log` facade
//! - `embedded-io`: Implement `embedded_io::{Read, Write, Seek}` for `Stream`

#![warn(missing_docs)]

#[macro_use]
mod log_macros;

// Core layers
pub mod adapters;
pub mod domain;
pub mod infrastructure;

pub use domain::{
    Backend, Capabilities, ChunkSize, IoError, IoStatus, OpenMode, OpenModeError, Operation,
    SeekFrom, Stream, Whence,
};

pub use infrastructure::{
    glob_directory, load_all, load_all_and_close, load_file, path_exists, save_all,
    save_all_and_close, save_file, GlobFlags, LoadedBuffer, ReadEndian, WriteEndian,
};

#[cfg(feature = "embedded-io")]
pub use embedded_io;
