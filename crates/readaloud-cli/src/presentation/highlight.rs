//! Marks the sentence being read inside its paragraph.

use readaloud_core::{CharSpan, ReadPosition};

/// Brackets around the sentence being spoken.
pub const SPEAKING_MARKERS: (&str, &str) = ("[", "]");

/// Brackets around a sentence the engine failed to speak.
pub const ERROR_MARKERS: (&str, &str) = ("[!", "!]");

/// Wrap the chars of `paragraph` covered by `span` in `markers`.
///
/// The span is clamped to the paragraph; an empty span leaves it unchanged.
pub fn highlight_span(paragraph: &str, span: CharSpan, markers: (&str, &str)) -> String {
    if span.is_empty() {
        return paragraph.to_string();
    }

    let (open, close) = markers;
    let mut out = String::with_capacity(paragraph.len() + open.len() + close.len());
    let mut opened = false;
    for (index, ch) in paragraph.chars().enumerate() {
        if index == span.start {
            out.push_str(open);
            opened = true;
        }
        out.push(ch);
        if index == span.end_inclusive && opened {
            out.push_str(close);
            opened = false;
        }
    }
    if opened {
        out.push_str(close);
    }
    out
}

/// One line for the current read position: the paragraph number and the
/// paragraph with the sentence marked.
///
/// `None` before reading starts, or when the position points past the
/// paragraphs on display.
pub fn render_position(paragraphs: &[String], position: &ReadPosition) -> Option<String> {
    match position {
        ReadPosition::NotStarted => None,
        ReadPosition::Position {
            paragraph,
            char_span,
            is_error,
        } => {
            let text = paragraphs.get(*paragraph)?;
            let markers = if *is_error {
                ERROR_MARKERS
            } else {
                SPEAKING_MARKERS
            };
            Some(format!(
                "{:>4} | {}",
                paragraph + 1,
                highlight_span(text, *char_span, markers)
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_middle_sentence() {
        let out = highlight_span("One. Two. Three.", CharSpan::new(4, 8), SPEAKING_MARKERS);
        assert_eq!(out, "One.[ Two.] Three.");
    }

    #[test]
    fn test_highlight_counts_chars_not_bytes() {
        let out = highlight_span("שלום. עולם.", CharSpan::new(5, 10), ERROR_MARKERS);
        assert_eq!(out, "שלום.[! עולם.!]");
    }

    #[test]
    fn test_highlight_clamps_overlong_span() {
        let out = highlight_span("Short", CharSpan::new(2, 40), SPEAKING_MARKERS);
        assert_eq!(out, "Sh[ort]");
        assert_eq!(
            highlight_span("Short", CharSpan::EMPTY, SPEAKING_MARKERS),
            "Short"
        );
    }

    #[test]
    fn test_render_position() {
        let paragraphs = vec!["Intro.".to_string(), "Body one. Body two.".to_string()];
        assert_eq!(render_position(&paragraphs, &ReadPosition::NotStarted), None);

        let position = ReadPosition::Position {
            paragraph: 1,
            char_span: CharSpan::new(9, 18),
            is_error: false,
        };
        assert_eq!(
            render_position(&paragraphs, &position).as_deref(),
            Some("   2 | Body one.[ Body two.]")
        );

        let stale = ReadPosition::Position {
            paragraph: 7,
            char_span: CharSpan::new(0, 1),
            is_error: true,
        };
        assert_eq!(render_position(&paragraphs, &stale), None);
    }
}
