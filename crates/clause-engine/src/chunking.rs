//! Fixed-size character windows for oversized documents
//!
//! Windows are contiguous and cut at character counts only. No sentence or
//! clause boundaries are respected and windows do not overlap.

/// Default window size in characters
pub const DEFAULT_WINDOW_CHARS: usize = 16_000;

/// True when `text` is longer than one window
pub fn needs_chunking(text: &str, window_chars: usize) -> bool {
    window_chars > 0 && text.chars().count() > window_chars
}

/// Number of windows `text` is split into, `ceil(chars / window_chars)`
pub fn window_count(text: &str, window_chars: usize) -> usize {
    let chars = text.chars().count();
    if window_chars == 0 {
        return usize::from(chars > 0);
    }
    chars.div_ceil(window_chars)
}

/// Split `text` into consecutive windows of at most `window_chars` characters.
///
/// Concatenating the windows gives back `text`. Empty text has no windows;
/// a zero window size keeps the text whole.
pub fn split_windows(text: &str, window_chars: usize) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    if window_chars == 0 {
        return vec![text];
    }

    let mut windows = Vec::with_capacity(window_count(text, window_chars));
    let mut start = 0;
    let mut count = 0;
    for (offset, _) in text.char_indices() {
        if count == window_chars {
            windows.push(&text[start..offset]);
            start = offset;
            count = 0;
        }
        count += 1;
    }
    windows.push(&text[start..]);
    windows
}
