//! Highlight rules derived from a query's regex leaves.
//!
//! Each attribute searched with a `regex` relation gets a transform that wraps
//! every match in the highlight marker. Patterns for the same attribute are
//! kept in leaf order and matched against the visible text only, so escape
//! sequences already in the text are never matched or split. Overlapping
//! matches are merged before wrapping.

use super::expr::{LeafPredicate, QueryExpression};
use crate::text::visible_projection;
use grep_matcher::Matcher;
use grep_regex::RegexMatcher;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

/// Strings inserted around highlighted text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightMarker {
    open: String,
    close: String,
}

impl HighlightMarker {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }

    pub fn wrap(&self, text: &str) -> String {
        format!("{}{}{}", self.open, text, self.close)
    }
}

/// One compiled regex leaf.
struct PatternStep {
    pattern: String,
    matcher: RegexMatcher,
}

impl PatternStep {
    fn compile(leaf: &LeafPredicate) -> Option<Self> {
        let pattern = leaf.regex_pattern()?;
        match RegexMatcher::new(pattern) {
            Ok(matcher) => Some(Self {
                pattern: pattern.to_string(),
                matcher,
            }),
            Err(err) => {
                log::warn!(
                    "not highlighting {}: cannot compile {pattern:?}: {err}",
                    leaf.attribute
                );
                None
            }
        }
    }

    /// Non-empty match ranges over `haystack`, in order.
    ///
    /// Byte-level patterns such as `(?-u:\xC3)` can match inside a multibyte
    /// character; those ranges cannot be wrapped and are dropped.
    fn matches(&self, haystack: &str) -> Vec<(usize, usize)> {
        let mut ranges = Vec::new();
        // RegexMatcher's error type is NoError.
        let _ = self.matcher.find_iter(haystack.as_bytes(), |m| {
            let (start, end) = (m.start(), m.end());
            if start < end && haystack.is_char_boundary(start) && haystack.is_char_boundary(end) {
                ranges.push((start, end));
            }
            true
        });
        ranges
    }
}

/// Sort `ranges` and merge those that overlap or touch.
fn merge_ranges(mut ranges: Vec<(usize, usize)>) -> Vec<(usize, usize)> {
    ranges.sort_unstable();
    let mut merged: Vec<(usize, usize)> = Vec::with_capacity(ranges.len());
    for (start, end) in ranges {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

/// Composed highlight transform for one attribute.
pub struct Transform {
    steps: Vec<PatternStep>,
    marker: HighlightMarker,
}

impl Transform {
    /// Wrap every match of every step in the marker.
    ///
    /// Matches from all steps are merged first, so overlapping matches get one
    /// marker pair and a close never ends an enclosing highlight early.
    pub fn apply(&self, text: &str) -> String {
        let (visible, offsets) = visible_projection(text);
        let ranges = merge_ranges(
            self.steps
                .iter()
                .flat_map(|step| step.matches(&visible))
                .collect(),
        );
        if ranges.is_empty() {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len() + ranges.len() * 16);
        let mut cursor = 0;
        for (start, end) in ranges {
            let open_at = offsets[start];
            let close_at = offsets[end - 1] + 1;
            out.push_str(&text[cursor..open_at]);
            out.push_str(&self.marker.open);
            out.push_str(&text[open_at..close_at]);
            out.push_str(&self.marker.close);
            cursor = close_at;
        }
        out.push_str(&text[cursor..]);
        out
    }

    /// Source patterns, in application order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|step| step.pattern.as_str())
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Transform")
            .field("patterns", &self.patterns().collect::<Vec<_>>())
            .finish()
    }
}

/// Per-attribute transforms for one query.
#[derive(Debug, Default)]
pub struct HighlightRules {
    rules: BTreeMap<String, Transform>,
}

impl HighlightRules {
    /// Build transforms from the query's regex leaves.
    ///
    /// Rules are keyed by the leaf's attribute, also for five-element leaves:
    /// a `translations`/`transcription` leaf highlights the `translations` field.
    /// Leaves under `not` and non-regex relations contribute nothing.
    pub fn build(query: &QueryExpression, marker: &HighlightMarker) -> Self {
        let mut rules: BTreeMap<String, Transform> = BTreeMap::new();
        for leaf in query.leaves() {
            let Some(step) = PatternStep::compile(&leaf) else {
                continue;
            };
            rules
                .entry(leaf.attribute)
                .or_insert_with(|| Transform {
                    steps: Vec::new(),
                    marker: marker.clone(),
                })
                .steps
                .push(step);
        }
        log::debug!("highlight rules for: {:?}", rules.keys().collect::<Vec<_>>());
        Self { rules }
    }

    pub fn get(&self, attribute: &str) -> Option<&Transform> {
        self.rules.get(attribute)
    }

    /// Run the attribute's transform over `text`, or return it untouched.
    pub fn apply<'a>(&self, attribute: &str, text: &'a str) -> Cow<'a, str> {
        match self.rules.get(attribute) {
            Some(transform) => Cow::Owned(transform.apply(text)),
            None => Cow::Borrowed(text),
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
