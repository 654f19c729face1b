//! Core domain types.
//!
//! These types represent the pure domain model, independent of any speech
//! engine or UI concerns.
//!
//! # Structure
//!
//! - `utterance` - Jobs, correlation ids and char spans
//! - `read_position` - What the UI highlights
//! - `locale` - Normalized language tags used for engine negotiation

mod locale;
mod read_position;
mod utterance;

pub use locale::{InvalidLocale, Locale};
pub use read_position::ReadPosition;
pub use utterance::{CharSpan, UtteranceId, UtteranceJob, UtterancePosition};
