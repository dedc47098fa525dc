//! Search expressions: parsing, traversal and highlight rules.

pub mod expr;
pub mod highlight;
pub mod literal;

pub use expr::{extract_leaves, BoolOp, LeafPredicate, QueryExpression, QueryNode};
pub use highlight::{HighlightMarker, HighlightRules, Transform};
pub use literal::parse_query_literal;
