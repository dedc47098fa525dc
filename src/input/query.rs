//! Reading multi-line query submissions from a line-oriented reader.
//!
//! A submission is every line up to the first empty one, so long expressions
//! can be pasted across several lines. An empty submission ends the session.

use crate::error::Result;
use crate::query::{parse_query_literal, QueryExpression};
use std::io::BufRead;

/// Outcome of reading one submission.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// A well-formed query expression.
    Query(QueryExpression),
    /// Text that is not a query literal; carries the parser's message.
    Invalid(String),
    /// Empty submission or end of input.
    Finished,
}

/// Read lines until an empty line or EOF and parse them as one literal.
pub fn read_submission<R: BufRead>(reader: &mut R) -> Result<Submission> {
    let mut text = String::new();
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        let content = line.trim_end_matches(['\n', '\r']);
        if content.trim().is_empty() {
            break;
        }
        text.push_str(content);
        text.push('\n');
    }

    if text.trim().is_empty() {
        return Ok(Submission::Finished);
    }

    Ok(match parse_query_literal(&text) {
        Ok(query) => Submission::Query(query),
        Err(e) => {
            log::debug!("rejected submission {text:?}: {e}");
            Submission::Invalid(e.to_string())
        }
    })
}
