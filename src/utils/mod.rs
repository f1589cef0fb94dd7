//! Utility functions and helpers.

pub mod http;
pub mod log;

use unicode_segmentation::UnicodeSegmentation;

/// Shorten `text` to at most `max` grapheme clusters for console messages.
pub fn preview(text: &str, max: usize) -> String {
    let mut graphemes = text.graphemes(true);
    let head: String = graphemes.by_ref().take(max).collect();
    if graphemes.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
