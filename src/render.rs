//! Rendering of search results as a text report.
//!
//! The report is built as a single `String` with ANSI styling embedded, so the
//! same renderer serves terminals and pipes (via [`ReportTheme::plain`]).

pub mod align;
pub mod report;
pub mod theme;

pub use align::{align_fields, column_widths, WORD_GAP};
pub use report::{ReportRenderer, RULE_WIDTH};
pub use theme::ReportTheme;
