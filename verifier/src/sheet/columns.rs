//! Spreadsheet column addressing.
//!
//! Column letters use the conventional bijective base-26 scheme:
//! `A` is column 0, `Z` is 25, `AA` follows `Z` at 26, `ZZ` is 701 and
//! `AAA` is 702.

/// Convert a column letter sequence (`"A"`, `"AB"`, ...) to a zero-based index.
///
/// Returns `None` for an empty string, any character outside `A-Z`, or a
/// sequence too long to address.
pub fn letters_to_index(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }

    let mut value: usize = 0;
    for c in letters.chars() {
        if !c.is_ascii_uppercase() {
            return None;
        }
        let digit = (c as u8 - b'A') as usize + 1;
        value = value.checked_mul(26)?.checked_add(digit)?;
    }

    Some(value - 1)
}

/// Convert a zero-based column index to its letter sequence.
pub fn index_to_letters(index: usize) -> String {
    let mut remaining = index + 1;
    let mut letters = Vec::new();

    while remaining > 0 {
        let digit = (remaining - 1) % 26;
        letters.push((b'A' + digit as u8) as char);
        remaining = (remaining - 1) / 26;
    }

    letters.iter().rev().collect()
}

/// Whether `text` is a syntactically valid column letter sequence.
pub fn is_column_letters(text: &str) -> bool {
    letters_to_index(text).is_some()
}
