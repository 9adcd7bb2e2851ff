//! Value objects for the domain layer.
//!
//! Value objects are immutable, validated data types that represent
//! concepts in the domain model. They provide type safety and encapsulate
//! validation logic.

mod chunk_size;
mod open_mode;
mod seek_from;

pub use chunk_size::ChunkSize;
pub use open_mode::{OpenMode, OpenModeError};
pub use seek_from::{SeekFrom, Whence};
