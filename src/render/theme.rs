//! Color theme for the text report, using crossterm's ANSI styling
//!
//! Colors are emitted as escape sequences directly into the report string, so
//! the theme decides what the highlight marker and section headers look like.

use crate::query::HighlightMarker;
use ratatui::crossterm::style::{Attribute, Color, ResetColor, SetAttribute, SetForegroundColor};

/// Color theme for the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTheme {
    /// Section header and summary banner color (None prints plain headers)
    pub header: Option<Color>,

    /// Color for regex matches (None disables highlighting)
    pub highlight: Option<Color>,

    /// Render highlights bold as well as colored
    pub bold_highlight: bool,
}

impl Default for ReportTheme {
    /// Bright magenta headers and bright green matches
    fn default() -> Self {
        Self {
            header: Some(Color::Magenta),
            highlight: Some(Color::Green),
            bold_highlight: false,
        }
    }
}

impl ReportTheme {
    /// No escape sequences at all, for pipes and files
    pub fn plain() -> Self {
        Self {
            header: None,
            highlight: None,
            bold_highlight: false,
        }
    }

    /// Create a high-contrast theme for accessibility
    pub fn high_contrast() -> Self {
        Self {
            header: Some(Color::White),
            highlight: Some(Color::Yellow),
            bold_highlight: true,
        }
    }

    pub fn is_plain(&self) -> bool {
        self.header.is_none() && self.highlight.is_none()
    }

    /// Marker used by highlight transforms.
    pub fn highlight_marker(&self) -> HighlightMarker {
        match self.highlight {
            Some(color) => {
                let mut open = SetForegroundColor(color).to_string();
                if self.bold_highlight {
                    open.push_str(&SetAttribute(Attribute::Bold).to_string());
                }
                HighlightMarker::new(open, reset())
            }
            None => HighlightMarker::new("", ""),
        }
    }

    /// Wrap a header line in the header color.
    pub fn paint_header(&self, text: &str) -> String {
        match self.header {
            Some(color) => format!("{}{}{}", SetForegroundColor(color), text, reset()),
            None => text.to_string(),
        }
    }
}

fn reset() -> String {
    format!("{}{}", SetAttribute(Attribute::Reset), ResetColor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::{strip_escapes, visible_width};

    #[test]
    fn test_default_theme() {
        let theme = ReportTheme::default();
        assert_eq!(theme.header, Some(Color::Magenta));
        assert_eq!(theme.highlight, Some(Color::Green));
        assert!(!theme.is_plain());
    }

    #[test]
    fn test_plain_theme_emits_no_escapes() {
        let theme = ReportTheme::plain();
        assert!(theme.is_plain());
        assert_eq!(theme.paint_header("Summary"), "Summary");

        let marker = theme.highlight_marker();
        assert_eq!(marker.wrap("quickly"), "quickly");
    }

    #[test]
    fn test_marker_is_zero_width() {
        for theme in [ReportTheme::default(), ReportTheme::high_contrast()] {
            let wrapped = theme.highlight_marker().wrap("quickly");
            assert_ne!(wrapped, "quickly");
            assert_eq!(visible_width(&wrapped), 7);
            assert_eq!(strip_escapes(&wrapped), "quickly");
        }
    }

    #[test]
    fn test_header_paint_is_zero_width() {
        let painted = ReportTheme::default().paint_header("Blackfoot OLD 3");
        assert!(painted.starts_with('\x1b'));
        assert_eq!(strip_escapes(&painted), "Blackfoot OLD 3");
    }
}
