//! Generic utility primitives with zero domain knowledge.
//!
//! - `command` - External process execution with captured output
//! - `io` - File I/O with consistent error handling

pub mod command;
pub mod io;
