// src/name_key.rs

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const MAX_KEY_LEN: usize = 120;

/// Derives a storage-safe partition key from a student's display name.
///
/// The transform is deterministic and total: NFD-decompose, drop combining
/// marks, collapse every run of characters outside `[A-Za-z0-9]` into a
/// single `_`, trim leading/trailing `_`, cap at 120 characters, lowercase.
/// Empty input maps to `"unknown"` before normalization.
///
/// The result names the student's submission partition and prefixes the
/// assignment partition (`"<key>_odevler"`), so it must stay stable across
/// releases.
pub fn name_key(display: &str) -> String {
    let display = if display.trim().is_empty() {
        "unknown"
    } else {
        display
    };

    let mut key = String::new();
    let mut pending_separator = false;
    for c in display.nfd() {
        if is_combining_mark(c) {
            continue;
        }
        if c.is_ascii_alphanumeric() {
            if pending_separator && !key.is_empty() {
                key.push('_');
            }
            pending_separator = false;
            key.push(c.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    key.truncate(MAX_KEY_LEN);
    while key.ends_with('_') {
        key.pop();
    }
    key
}
