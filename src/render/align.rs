//! Word-by-word column alignment of interlinear fields.
//!
//! Fields are split on single spaces. The k-th word of every field is padded to
//! the widest k-th word, and words are joined with two spaces, so morphemes and
//! their glosses line up vertically.

use crate::text::visible_width;

/// Separator placed between padded words.
pub const WORD_GAP: &str = "  ";

/// Widest visible width at each word position across `fields`.
pub fn column_widths<S: AsRef<str>>(fields: &[S]) -> Vec<usize> {
    let mut widths: Vec<usize> = Vec::new();
    for field in fields {
        for (k, word) in field.as_ref().split(' ').enumerate() {
            let width = visible_width(word);
            match widths.get_mut(k) {
                Some(current) => *current = (*current).max(width),
                None => widths.push(width),
            }
        }
    }
    widths
}

/// Pad every word of `field` to its column width and join with [`WORD_GAP`].
pub fn pad_words(field: &str, widths: &[usize]) -> String {
    field
        .split(' ')
        .enumerate()
        .map(|(k, word)| {
            let width = widths.get(k).copied().unwrap_or(0);
            let fill = width.saturating_sub(visible_width(word));
            format!("{word}{}", " ".repeat(fill))
        })
        .collect::<Vec<_>>()
        .join(WORD_GAP)
}

/// Align a group of fields against each other.
pub fn align_fields<S: AsRef<str>>(fields: &[S]) -> Vec<String> {
    let widths = column_widths(fields);
    fields
        .iter()
        .map(|field| pad_words(field.as_ref(), &widths))
        .collect()
}
