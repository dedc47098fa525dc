//! Query expressions and the leaf walker.
//!
//! The OLD accepts filters as nested lists. Compound nodes look like
//! `["and", [child, ...]]`; leaves are `[entity, attribute, relation, pattern]`
//! or `[entity, attribute, subattribute, relation, pattern]`. The expression is
//! kept as the JSON value the caller supplied and sent to the backends verbatim;
//! only the walker interprets its shape.

use crate::error::{CrossOldError, Result};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Line width the pretty printer tries to stay within.
const PRETTY_WIDTH: usize = 80;

/// Boolean combinator of a compound node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
    Not,
}

impl BoolOp {
    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "and" => Some(Self::And),
            "or" => Some(Self::Or),
            "not" => Some(Self::Not),
            _ => None,
        }
    }
}

/// Non-boolean predicate comparing one field to one pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafPredicate {
    pub entity: String,
    pub attribute: String,
    /// Present on five-element leaves, e.g. `translations` -> `transcription`
    pub subattribute: Option<String>,
    pub relation: String,
    pub pattern: Value,
}

impl LeafPredicate {
    /// Interpret a four- or five-element list as a leaf.
    fn from_items(items: &[Value]) -> Option<Self> {
        let text = |index: usize| items.get(index).and_then(Value::as_str).map(str::to_string);
        match items.len() {
            4 => Some(Self {
                entity: text(0)?,
                attribute: text(1)?,
                subattribute: None,
                relation: text(2)?,
                pattern: items[3].clone(),
            }),
            5 => Some(Self {
                entity: text(0)?,
                attribute: text(1)?,
                subattribute: Some(text(2)?),
                relation: text(3)?,
                pattern: items[4].clone(),
            }),
            _ => None,
        }
    }

    pub fn is_regex(&self) -> bool {
        self.relation == "regex"
    }

    /// The pattern, when this is a regex leaf with a string pattern.
    pub fn regex_pattern(&self) -> Option<&str> {
        if self.is_regex() {
            self.pattern.as_str()
        } else {
            None
        }
    }
}

/// Shape of a single node, as far as the walker is concerned.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode<'a> {
    Leaf(LeafPredicate),
    Compound { op: BoolOp, children: &'a [Value] },
    /// Anything else; judged by the backend, ignored here
    Unrecognized,
}

impl<'a> QueryNode<'a> {
    pub fn classify(node: &'a Value) -> Self {
        let Some(items) = node.as_array() else {
            return Self::Unrecognized;
        };
        // Arity decides leaves first: no compound node has four or five elements.
        if items.len() == 4 || items.len() == 5 {
            return LeafPredicate::from_items(items).map_or(Self::Unrecognized, Self::Leaf);
        }
        let op = items.first().and_then(Value::as_str).and_then(BoolOp::from_keyword);
        match (op, items.get(1)) {
            (Some(BoolOp::Not), _) => Self::Compound {
                op: BoolOp::Not,
                children: &[],
            },
            (Some(op), Some(Value::Array(children))) => Self::Compound { op, children },
            _ => Self::Unrecognized,
        }
    }
}

/// Collect the leaf predicates of `node`, depth-first and left-to-right.
///
/// Leaves under `not` are never returned: a negated condition must not be shown
/// as a match.
pub fn extract_leaves(node: &Value) -> Vec<LeafPredicate> {
    match QueryNode::classify(node) {
        QueryNode::Leaf(leaf) => vec![leaf],
        QueryNode::Compound {
            op: BoolOp::Not, ..
        } => Vec::new(),
        QueryNode::Compound { children, .. } => children.iter().flat_map(extract_leaves).collect(),
        QueryNode::Unrecognized => Vec::new(),
    }
}

/// A caller-supplied search expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct QueryExpression(Value);

impl QueryExpression {
    /// Wrap a JSON value; the top level must be a list.
    pub fn from_value(value: Value) -> Result<Self> {
        if value.is_array() {
            Ok(Self(value))
        } else {
            Err(CrossOldError::malformed_input(
                "a search expression must be a list",
            ))
        }
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn leaves(&self) -> Vec<LeafPredicate> {
        extract_leaves(&self.0)
    }

    /// Multi-line rendering that keeps short sublists on one line.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        write_pretty(&self.0, 0, &mut out);
        out
    }
}

impl FromStr for QueryExpression {
    type Err = CrossOldError;

    fn from_str(s: &str) -> Result<Self> {
        super::literal::parse_query_literal(s)
    }
}

impl fmt::Display for QueryExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&compact(&self.0))
    }
}

fn compact(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(compact).collect();
            format!("[{}]", inner.join(", "))
        }
        other => other.to_string(),
    }
}

fn write_pretty(value: &Value, indent: usize, out: &mut String) {
    let flat = compact(value);
    let items = match value {
        Value::Array(items) if !items.is_empty() && indent + flat.len() > PRETTY_WIDTH => items,
        _ => {
            out.push_str(&flat);
            return;
        }
    };

    out.push_str("[\n");
    for (i, item) in items.iter().enumerate() {
        out.push_str(&" ".repeat(indent + 2));
        write_pretty(item, indent + 2, out);
        if i + 1 < items.len() {
            out.push(',');
        }
        out.push('\n');
    }
    out.push_str(&" ".repeat(indent));
    out.push(']');
}
