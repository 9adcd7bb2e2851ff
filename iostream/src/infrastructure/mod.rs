//! Infrastructure layer - high-level I/O utilities built on the domain.
//!
//! Everything here is a consumer of the `Stream` read/write/status contract
//! and works the same whichever backend is active: typed endian helpers,
//! whole-stream load/save, interop with the `std::io` and `embedded-io`
//! trait families, plus directory listing.

mod bulk;
mod directory;
mod endian;
mod std_io;

#[cfg(feature = "embedded-io")]
mod embedded_io_impl;

pub use bulk::{
    load_all, load_all_and_close, load_file, save_all, save_all_and_close, save_file, LoadedBuffer,
};
pub use directory::{glob_directory, path_exists, GlobFlags};
pub use endian::{ReadEndian, WriteEndian};
