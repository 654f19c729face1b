//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from
//! infrastructure. They contain no implementation details and use only
//! domain types.
//!
//! # Design Rules
//!
//! - No engine-binding types in any signature
//! - Commands are fire-and-forget; results come back as events

pub mod speech_engine;

pub use speech_engine::{
    EngineEventSender, EngineStartup, SpeechEngine, SpeechEngineFactory, UtteranceEvent,
};
