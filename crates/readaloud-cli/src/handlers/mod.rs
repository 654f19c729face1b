//! Command handlers.
//!
//! Handlers are thin wrappers that:
//! 1. Validate CLI-specific input
//! 2. Drive the composed `ReaderSession`
//! 3. Format output for the terminal

pub mod read;
