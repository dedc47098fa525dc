//! Text report over the results of one search cycle.
//!
//! Layout:
//!
//! ```text
//! Blackfoot (2 forms)
//! ================================================================================
//!
//! 1)     nitsspiyi   oki
//!        nit-ihpiyi  oki
//!        1-dance     hello
//!        `I danced`
//! ```
//!
//! followed by a summary with the query and per-backend counts.

use super::align::align_fields;
use super::theme::ReportTheme;
use crate::query::{HighlightRules, QueryExpression};
use crate::search::{BackendResults, Form, SearchResults, TRANSLATIONS_ATTRIBUTE};

/// Width of the `=` and `-` rules.
pub const RULE_WIDTH: usize = 80;

/// Columns reserved for the `N)` tag in front of a form.
const TAG_WIDTH: usize = 6;

/// Formats search results as aligned, highlighted text.
#[derive(Debug, Clone, Default)]
pub struct ReportRenderer {
    theme: ReportTheme,
}

impl ReportRenderer {
    pub fn new(theme: ReportTheme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> &ReportTheme {
        &self.theme
    }

    /// Render the full report. Pure: the same inputs give byte-identical output.
    pub fn render(
        &self,
        query: &QueryExpression,
        results: &SearchResults,
        rules: &HighlightRules,
    ) -> String {
        let mut out = String::new();
        for backend in results.non_empty() {
            self.render_section(&mut out, backend, rules);
        }
        self.render_summary(&mut out, query, results);
        out
    }

    fn render_section(&self, out: &mut String, backend: &BackendResults, rules: &HighlightRules) {
        let count = backend.forms.len();
        let noun = if count == 1 { "form" } else { "forms" };

        blank(out);
        blank(out);
        line(
            out,
            &self
                .theme
                .paint_header(&format!("{} ({count} {noun})", backend.label)),
        );
        line(out, &self.theme.paint_header(&"=".repeat(RULE_WIDTH)));
        blank(out);

        for (index, form) in backend.forms.iter().enumerate() {
            render_form(out, index + 1, form, rules);
            blank(out);
        }
    }

    fn render_summary(&self, out: &mut String, query: &QueryExpression, results: &SearchResults) {
        let banner = "=".repeat(RULE_WIDTH);
        let rule = "-".repeat(RULE_WIDTH);

        blank(out);
        blank(out);
        line(out, &self.theme.paint_header(&banner));
        line(out, &self.theme.paint_header("  Summary"));
        line(out, &self.theme.paint_header(&banner));
        blank(out);

        line(out, "Search");
        line(out, &rule);
        blank(out);
        line(out, &query.pretty());
        blank(out);

        line(out, "Counts by OLD");
        line(out, &rule);
        blank(out);
        let mut any = false;
        for backend in results.non_empty() {
            any = true;
            line(out, &format!("{}: {}", backend.label, backend.forms.len()));
        }
        if !any {
            line(out, "No matches.");
        }
        blank(out);
        line(out, &banner);
    }
}

/// One numbered entry: aligned interlinear block, then translations.
fn render_form(out: &mut String, index: usize, form: &Form, rules: &HighlightRules) {
    let tag = format!("{index})");
    let highlighted: Vec<String> = form
        .present_fields()
        .into_iter()
        .map(|(field, text)| rules.apply(field.attribute(), text).into_owned())
        .collect();

    if highlighted.is_empty() {
        line(out, &tag);
    }
    for (i, text) in align_fields(&highlighted).iter().enumerate() {
        if i == 0 {
            line(out, &format!("{tag:<TAG_WIDTH$} {text}"));
        } else {
            line(out, &format!("{:TAG_WIDTH$} {text}", ""));
        }
    }

    for translation in &form.translations {
        let transcription = rules.apply(TRANSLATIONS_ATTRIBUTE, &translation.transcription);
        line(
            out,
            &format!(
                "{:TAG_WIDTH$} `{}{}`",
                "", translation.grammaticality, transcription
            ),
        );
    }
}

fn line(out: &mut String, text: &str) {
    out.push_str(text);
    out.push('\n');
}

fn blank(out: &mut String) {
    out.push('\n');
}
