//! Shared data model for the huddle message composition pipeline.
//!
//! Everything in here crosses a process boundary at some point (the send
//! interface, the upload interface, or the progress stream observed by a UI),
//! so all types are serde-serializable with camelCase field names.

// Prevent accidental direct writes to stdout/stderr in library code.
#![deny(clippy::print_stdout, clippy::print_stderr)]

pub mod delta;
pub mod protocol;

pub use delta::Delta;
pub use delta::DeltaInsert;
pub use delta::DeltaOp;
pub use protocol::*;
