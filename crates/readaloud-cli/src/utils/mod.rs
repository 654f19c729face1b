//! Terminal input helpers.

pub mod input;
