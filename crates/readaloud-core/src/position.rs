//! Utterance id codec and position translation.
//!
//! An [`UtteranceId`] is the JSON form of an [`UtterancePosition`]:
//!
//! ```text
//! {"paragraphIndex":0,"range":{"start":0,"endInclusive":5}}
//! ```
//!
//! [`encode_position`] and [`decode_position`] are the only two places that
//! know this. Everything else treats ids as opaque and compares them by
//! equality.

use thiserror::Error;

use crate::domain::{ReadPosition, UtteranceId, UtteranceJob, UtterancePosition};

/// An utterance id could not be turned back into a position.
#[derive(Debug, Error)]
#[error("Malformed utterance id {id:?}: {source}")]
pub struct DecodeError {
    pub id: String,
    #[source]
    pub source: serde_json::Error,
}

/// Encode a position as an utterance id.
#[must_use]
pub fn encode_position(position: UtterancePosition) -> UtteranceId {
    // A struct of plain integers always serializes.
    let raw = serde_json::to_string(&position).unwrap_or_default();
    UtteranceId::from_encoded(raw)
}

/// Decode an utterance id back into the position it was encoded from.
pub fn decode_position(id: &UtteranceId) -> Result<UtterancePosition, DecodeError> {
    serde_json::from_str(id.as_str()).map_err(|source| DecodeError {
        id: id.as_str().to_string(),
        source,
    })
}

/// Translate a finished (or failed) job into the position the UI highlights.
pub fn translate(job: &UtteranceJob, is_error: bool) -> Result<ReadPosition, DecodeError> {
    let position = decode_position(&job.id)?;
    Ok(ReadPosition::Position {
        paragraph: position.paragraph_index,
        char_span: position.range,
        is_error,
    })
}
