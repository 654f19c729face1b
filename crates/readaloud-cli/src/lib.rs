//! Command-line reader: reads a text aloud with the console speech engine
//! and prints each sentence, marked inside its paragraph, as it is spoken.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Dependencies used only by the main.rs binary
use anyhow as _;
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod parser;
pub mod presentation;
pub mod utils;

// Re-export primary types for convenient access
pub use bootstrap::{bootstrap, resolve_settings};
pub use error::CliError;
pub use parser::Cli;
