//! Completion post-processing.
//!
//! Raw model output arrives as loosely formatted prose: emphasis markup
//! despite instructions, a TITEL: line somewhere near the top, trailing
//! content after the ENDE marker. These helpers normalize it into a clean
//! title and body.

use lazy_static::lazy_static;
use regex::Regex;

/// Title used when the completion carries no TITEL: line.
pub const UNTITLED: &str = "Ohne Titel";

/// Banner appended where the ENDE marker was truncated.
pub const END_BANNER: &str = "✨ ENDE ✨";

lazy_static! {
    static ref BOLD: Regex = Regex::new(r"\*\*(.+?)\*\*").unwrap();
    static ref ITALIC: Regex = Regex::new(r"\*(.+?)\*").unwrap();
    static ref TRAILING_MARKERS: Regex = Regex::new(r"[ \t]*\*+\s*$").unwrap();
    static ref TITLE_MARKER: Regex = Regex::new(r"(?i)TITEL:").unwrap();
    static ref END_MARKER_LINE: Regex = Regex::new(r"(?im)^[ \t]*ENDE[ \t]*$").unwrap();
}

/// Remove markdown emphasis, keeping the inner text.
///
/// Paired `**bold**` markers go first, then paired `*italic*` markers, then
/// a dangling marker run at the very end of the text. Idempotent.
pub fn strip_markdown_emphasis(text: &str) -> String {
    let text = BOLD.replace_all(text, "$1");
    let text = ITALIC.replace_all(&text, "$1");
    TRAILING_MARKERS.replace(&text, "").into_owned()
}

/// Split a completion into title and body.
///
/// The title marker is located case-insensitively; everything before it is
/// discarded, the first line after it is the title and the rest the body.
/// Without a marker the whole text is the body and the title is a
/// placeholder.
pub fn parse_title(text: &str) -> (String, String) {
    let Some(marker) = TITLE_MARKER.find(text) else {
        return (UNTITLED.to_string(), text.trim().to_string());
    };

    let rest = &text[marker.end()..];
    match rest.find('\n') {
        Some(idx) => (
            rest[..idx].trim().to_string(),
            rest[idx + 1..].trim().to_string(),
        ),
        None => (rest.trim().to_string(), String::new()),
    }
}

/// Cut the story off at the end-of-story marker.
///
/// The marker counts only when a line consists solely of it, ignoring
/// surrounding whitespace and case. That line and everything after it are
/// dropped and the decorative banner is appended. Without a marker the
/// text passes through unchanged.
pub fn truncate_at_end_marker(text: &str) -> String {
    let Some(marker) = END_MARKER_LINE.find(text) else {
        return text.to_string();
    };

    let kept = text[..marker.start()].trim();
    format!("{kept}\n\n{END_BANNER}")
}
