//! Utterance domain types: jobs submitted to a speech engine and the
//! character spans they were cut from.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Opaque correlation token attached to every utterance submitted to a
/// speech engine.
///
/// The engine echoes the id verbatim in its started/done/error callbacks.
/// Playback coordination relies on equality only; the structure behind the
/// id is readable exclusively through [`crate::position::decode_position`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UtteranceId(String);

impl UtteranceId {
    /// Wrap an already-encoded id. Only the position codec mints new ids.
    pub(crate) const fn from_encoded(raw: String) -> Self {
        Self(raw)
    }

    /// Rebuild an id that an engine binding carried through a foreign API
    /// as a plain string and is now reporting back in a callback.
    #[must_use]
    pub fn echoed(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw string form, for engine bindings that need to hand the id to
    /// a foreign API.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One unit of speech: the text to speak and the id the engine reports it by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtteranceJob {
    /// Correlation id, unique among pending jobs.
    pub id: UtteranceId,

    /// Trimmed text handed to the engine.
    pub text: String,
}

impl UtteranceJob {
    #[must_use]
    pub const fn new(id: UtteranceId, text: String) -> Self {
        Self { id, text }
    }
}

/// Inclusive range of char indices inside a paragraph.
///
/// A span with `start > end_inclusive` is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharSpan {
    pub start: usize,
    pub end_inclusive: usize,
}

impl CharSpan {
    /// The canonical empty span.
    pub const EMPTY: Self = Self {
        start: 1,
        end_inclusive: 0,
    };

    #[must_use]
    pub const fn new(start: usize, end_inclusive: usize) -> Self {
        Self {
            start,
            end_inclusive,
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start > self.end_inclusive
    }

    /// Number of chars covered by the span.
    #[must_use]
    pub const fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.end_inclusive - self.start + 1
        }
    }

    #[must_use]
    pub const fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end_inclusive
    }

    #[must_use]
    pub const fn to_range(self) -> RangeInclusive<usize> {
        self.start..=self.end_inclusive
    }
}

impl From<RangeInclusive<usize>> for CharSpan {
    fn from(range: RangeInclusive<usize>) -> Self {
        Self::new(*range.start(), *range.end())
    }
}

impl fmt::Display for CharSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end_inclusive)
    }
}

/// Where a job sits in the submitted text. This is what an [`UtteranceId`]
/// encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UtterancePosition {
    pub paragraph_index: usize,
    pub range: CharSpan,
}

impl UtterancePosition {
    #[must_use]
    pub const fn new(paragraph_index: usize, range: CharSpan) -> Self {
        Self {
            paragraph_index,
            range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_span_len_and_emptiness() {
        let span = CharSpan::new(6, 29);
        assert_eq!(span.len(), 24);
        assert!(!span.is_empty());
        assert!(span.contains(6));
        assert!(span.contains(29));
        assert!(!span.contains(30));

        assert!(CharSpan::EMPTY.is_empty());
        assert_eq!(CharSpan::EMPTY.len(), 0);
        assert!(!CharSpan::EMPTY.contains(0));
    }

    #[test]
    fn char_span_from_range() {
        let span: CharSpan = (0..=5).into();
        assert_eq!(span, CharSpan::new(0, 5));
        assert_eq!(span.to_range(), 0..=5);
        assert_eq!(span.to_string(), "0..=5");
    }

    #[test]
    fn echoed_id_equals_encoded() {
        let id = UtteranceId::from_encoded("abc".to_string());
        assert_eq!(UtteranceId::echoed(id.as_str()), id);
    }
}
