//! ANSI-aware text helpers.
//!
//! Highlighted report text carries terminal escape sequences. They take no room
//! on screen, so width calculations and regex matching look only at the visible
//! characters between them.

use unicode_width::UnicodeWidthStr;

const ESC: u8 = 0x1b;

/// A run of either visible text or a single escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Visible(&'a str),
    Escape(&'a str),
}

/// Iterator over the [`Segment`]s of a string.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.text.as_bytes();
        let start = self.pos;
        if start >= bytes.len() {
            return None;
        }

        if bytes[start] == ESC {
            self.pos = start + escape_len(&bytes[start..]);
            return Some(Segment::Escape(&self.text[start..self.pos]));
        }

        self.pos = bytes[start..]
            .iter()
            .position(|&b| b == ESC)
            .map_or(bytes.len(), |offset| start + offset);
        Some(Segment::Visible(&self.text[start..self.pos]))
    }
}

/// Length of the escape sequence at the start of `bytes` (which begins with ESC).
///
/// CSI sequences (`ESC [ params final`) run to their final byte; any other
/// escape is taken as ESC plus one character.
fn escape_len(bytes: &[u8]) -> usize {
    match bytes.get(1) {
        Some(b'[') => bytes[2..]
            .iter()
            .position(|b| (0x40..=0x7e).contains(b))
            .map_or(bytes.len(), |offset| offset + 3),
        Some(&b) if b.is_ascii() => 2,
        // Non-ASCII after ESC: leave the character to the visible run.
        Some(_) | None => 1,
    }
}

pub fn segments(text: &str) -> Segments<'_> {
    Segments { text, pos: 0 }
}

/// Display width of `text` with escape sequences counted as zero-width.
pub fn visible_width(text: &str) -> usize {
    segments(text)
        .map(|segment| match segment {
            Segment::Visible(run) => run.width(),
            Segment::Escape(_) => 0,
        })
        .sum()
}

/// `text` without its escape sequences.
pub fn strip_escapes(text: &str) -> String {
    segments(text)
        .filter_map(|segment| match segment {
            Segment::Visible(run) => Some(run),
            Segment::Escape(_) => None,
        })
        .collect()
}

/// Visible text plus, for each visible byte, its offset in the original string.
pub(crate) fn visible_projection(text: &str) -> (String, Vec<usize>) {
    let mut visible = String::with_capacity(text.len());
    let mut offsets = Vec::with_capacity(text.len());
    let mut pos = 0;
    for segment in segments(text) {
        match segment {
            Segment::Visible(run) => {
                visible.push_str(run);
                offsets.extend(pos..pos + run.len());
                pos += run.len();
            }
            Segment::Escape(run) => pos += run.len(),
        }
    }
    (visible, offsets)
}
