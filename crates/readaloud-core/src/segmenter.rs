//! Text segmentation: text → paragraphs → sentence units → utterance jobs.
//!
//! Every sentence unit remembers the exact char span it occupies in its
//! (untrimmed) paragraph so that a finished job can be mapped back onto the
//! text for highlighting.

use crate::domain::{CharSpan, UtteranceJob, UtterancePosition};
use crate::position::{self, DecodeError};

/// Paragraph delimiter.
const PARAGRAPH_DELIMITER: char = '\n';

/// Sentence delimiter. It belongs to the unit it closes.
const SENTENCE_DELIMITER: char = '.';

/// A slice of a paragraph produced by [`split_to_ranges`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentenceUnit<'a> {
    /// Char span inside the paragraph, inclusive on both ends.
    pub span: CharSpan,

    /// The untrimmed text covered by `span`.
    pub text: &'a str,
}

/// Split text into paragraphs on newlines.
///
/// Empty lines are kept, including a trailing one: `"a\n"` yields `["a", ""]`.
#[must_use]
pub fn text_to_paragraphs(text: &str) -> Vec<String> {
    text.split(PARAGRAPH_DELIMITER).map(str::to_owned).collect()
}

/// Split a paragraph into `.`-terminated units plus an unterminated remainder.
///
/// The units are contiguous and together reconstruct the paragraph exactly.
/// Nothing is filtered here, so a whitespace-only paragraph yields one unit.
#[must_use]
pub fn split_to_ranges(paragraph: &str) -> Vec<SentenceUnit<'_>> {
    let mut units = Vec::new();
    let mut sentence_start = 0usize;
    let mut byte_start = 0usize;
    let mut char_count = 0usize;

    for (char_index, (byte_index, ch)) in paragraph.char_indices().enumerate() {
        char_count = char_index + 1;
        if ch == SENTENCE_DELIMITER {
            let byte_end = byte_index + ch.len_utf8();
            units.push(SentenceUnit {
                span: CharSpan::new(sentence_start, char_index),
                text: &paragraph[byte_start..byte_end],
            });
            sentence_start = char_index + 1;
            byte_start = byte_end;
        }
    }

    if sentence_start < char_count {
        units.push(SentenceUnit {
            span: CharSpan::new(sentence_start, char_count - 1),
            text: &paragraph[byte_start..],
        });
    }

    units
}

/// Turn paragraphs into utterance jobs, in paragraph then reading order.
#[must_use]
pub fn paragraphs_to_jobs<S: AsRef<str>>(paragraphs: &[S]) -> Vec<UtteranceJob> {
    paragraphs_to_jobs_from(paragraphs, 0)
}

/// Like [`paragraphs_to_jobs`] for a tail of the paragraph list: `paragraphs[0]`
/// is paragraph number `first_index` of the full text.
#[must_use]
pub fn paragraphs_to_jobs_from<S: AsRef<str>>(
    paragraphs: &[S],
    first_index: usize,
) -> Vec<UtteranceJob> {
    paragraphs
        .iter()
        .enumerate()
        .flat_map(|(offset, paragraph)| {
            let paragraph_index = first_index + offset;
            split_to_ranges(paragraph.as_ref())
                .into_iter()
                .filter(|unit| is_speakable(unit.text))
                .map(move |unit| {
                    let id = position::encode_position(UtterancePosition::new(
                        paragraph_index,
                        unit.span,
                    ));
                    UtteranceJob::new(id, unit.text.trim().to_string())
                })
        })
        .collect()
}

/// Decode where a job came from.
pub fn parse_position(job: &UtteranceJob) -> Result<UtterancePosition, DecodeError> {
    position::decode_position(&job.id)
}

/// Units without a single letter or digit (punctuation runs, whitespace) are
/// not spoken.
fn is_speakable(text: &str) -> bool {
    text.chars().any(char::is_alphanumeric)
}
