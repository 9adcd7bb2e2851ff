//! Adapter layer - Concrete backends implementing the domain's `Backend` port.
//!
//! # Hexagonal Architecture
//!
//! ```text
//!     ┌──────────────────────────────────┐
//!     │      Domain Layer                │
//!     │  - Stream (service)              │
//!     │  - Backend (port)                │
//!     └────────────┬─────────────────────┘
//!                  │
//!                  │ implements
//!                  ▼
//!     ┌──────────────────────────────────┐
//!     │      Adapter Layer               │  ◄── This module
//!     │  - Memory / ConstMemory          │
//!     │  - DynamicMemory                 │
//!     │  - FdBackend                     │
//!     │  - FileBackend                   │
//!     └────────────┬─────────────────────┘
//!                  │
//!                  │ uses
//!                  ▼
//!     ┌──────────────────────────────────┐
//!     │  Memory, descriptors, std::fs    │
//!     └──────────────────────────────────┘
//! ```
//!
//! # Available Adapters
//!
//! - **`Memory`**: Fixed caller-owned region, read-write (`Stream::from_mem`)
//! - **`ConstMemory`**: Fixed caller-owned region, read-only (`Stream::from_const_mem`)
//! - **`DynamicMemory`**: Growable owned buffer (`Stream::from_dynamic_mem`)
//! - **`FdBackend`**: Raw POSIX descriptor (`Stream::from_fd`, unix only)
//! - **`FileBackend`**: Buffered `std::fs::File` (`Stream::from_file`, `Stream::from_std_file`, `Stream::from_borrowed_file`)

mod buffered_file;
mod dynamic_memory;
mod file;
mod memory;

#[cfg(unix)]
mod fd;

pub use dynamic_memory::DynamicMemory;
pub use file::FileBackend;
pub use memory::{ConstMemory, Memory};

#[cfg(unix)]
pub use fd::FdBackend;
