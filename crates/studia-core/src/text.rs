//! Post-processing applied to extracted text before it is persisted.
//!
//! Lengths are counted in Unicode scalar values, never bytes, so a cut
//! always lands on a character boundary.

use crate::defaults::{PREVIEW_ELLIPSIS, TRUNCATION_MARKER};
use crate::{Error, Result};

/// Reject text that trims to fewer than `min_chars` characters.
pub fn ensure_usable(text: &str, min_chars: usize) -> Result<()> {
    let length = text.trim().chars().count();
    if length < min_chars {
        return Err(Error::EmptyResult { length });
    }
    Ok(())
}

/// Cut `text` to `max_chars` characters, appending [`TRUNCATION_MARKER`] when
/// anything was removed. Returns the text and whether it was cut.
pub fn truncate_content(mut text: String, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => {
            text.truncate(byte_idx);
            text.push_str(TRUNCATION_MARKER);
            (text, true)
        }
        None => (text, false),
    }
}

/// First `chars` characters of `content` followed by an ellipsis.
pub fn preview(content: &str, chars: usize) -> String {
    let mut out: String = content.chars().take(chars).collect();
    out.push_str(PREVIEW_ELLIPSIS);
    out
}
