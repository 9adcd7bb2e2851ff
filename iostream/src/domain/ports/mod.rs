//! Ports define the interfaces between the domain and the outside world.
//!
//! In hexagonal architecture, ports are the boundaries of the application:
//! - **Primary (Driving) Ports**: What the domain exposes to the outside world
//! - **Secondary (Driven) Ports**: What the domain needs from the outside world
//!
//! This module contains the **secondary (driven) port** the stream core
//! dispatches to: the byte-moving backend.

mod backend;

pub use backend::{Backend, Capabilities};
