//! Domain layer - the stream core with no knowledge of concrete backends.
//!
//! The domain layer contains:
//! - **Status**: the `IoStatus` state machine
//! - **Value Objects**: `SeekFrom`, `ChunkSize`, `OpenMode`
//! - **Ports**: the `Backend` trait every byte source/sink implements
//! - **Domain Service**: `Stream`, the handle that dispatches to a backend
//! - **Errors**: `IoError`
//!
//! # Hexagonal Architecture
//!
//! ```text
//!     ┌──────────────────────────────────┐
//!     │      Domain Layer (Core)         │
//!     │                                  │
//!     │  ┌────────────────────────────┐  │
//!     │  │  Status & Value Objects    │  │
//!     │  │  - IoStatus, SeekFrom      │  │
//!     │  └────────────────────────────┘  │
//!     │              ▲                   │
//!     │              │                   │
//!     │  ┌────────────────────────────┐  │
//!     │  │    Domain Service          │  │
//!     │  │    - Stream                │  │
//!     │  └────────────────────────────┘  │
//!     │              │                   │
//!     │              ▼                   │
//!     │  ┌────────────────────────────┐  │
//!     │  │    Ports (Interfaces)      │  │
//!     │  │    - Backend               │  │
//!     │  └────────────────────────────┘  │
//!     └──────────────────────────────────┘
//!                    ▲
//!                    │ implemented by
//!                    │
//!     ┌──────────────────────────────────┐
//!     │      Adapter Layer               │
//!     │  - Memory / ConstMemory          │
//!     │  - DynamicMemory                 │
//!     │  - FdBackend / FileBackend       │
//!     └──────────────────────────────────┘
//! ```

pub mod error;
pub mod ports;
pub mod status;
pub mod value_objects;

mod stream;

pub use error::{IoError, Operation};
pub use ports::{Backend, Capabilities};
pub use status::IoStatus;
pub use stream::Stream;
pub use value_objects::{ChunkSize, OpenMode, OpenModeError, SeekFrom, Whence};
