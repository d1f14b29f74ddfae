//! Shared utility functions.

use std::borrow::Cow;

/// One-line preview of free text for log messages.
///
/// Newlines and runs of whitespace collapse to a single space. Text longer
/// than `max_chars` characters is cut on a character boundary and suffixed
/// with `...`. Short single-line text is returned borrowed.
pub fn log_preview(text: &str, max_chars: usize) -> Cow<'_, str> {
    let single_line = !text.contains(['\n', '\r', '\t']) && !text.contains("  ");
    if single_line && text.chars().count() <= max_chars {
        return Cow::Borrowed(text);
    }

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        return Cow::Owned(collapsed);
    }

    let mut cut: String = collapsed.chars().take(max_chars).collect();
    cut.push_str("...");
    Cow::Owned(cut)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_borrowed() {
        assert!(matches!(log_preview("Ship it.", 80), Cow::Borrowed("Ship it.")));
    }

    #[test]
    fn newlines_collapse() {
        assert_eq!(log_preview("Focus on\n\n  reliability.", 80), "Focus on reliability.");
    }

    #[test]
    fn long_text_is_cut_with_marker() {
        assert_eq!(log_preview("hello world", 5), "hello...");
    }

    #[test]
    fn cut_respects_multibyte_chars() {
        assert_eq!(log_preview("あのねあのね", 2), "あの...");
    }

    #[test]
    fn empty_text() {
        assert_eq!(log_preview("", 10), "");
    }
}
