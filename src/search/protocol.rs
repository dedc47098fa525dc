//! Wire format of the OLD form search.

use super::record::Form;
use crate::error::{CrossOldError, Result};
use crate::query::QueryExpression;
use serde_json::{json, Value};

/// Search route, relative to a backend endpoint.
pub const SEARCH_ROUTE: &str = "forms/search";

/// Body of a count-only request: one item per page, so the reply is small but
/// still carries the paginator's total.
pub fn count_payload(query: &QueryExpression) -> Value {
    json!({
        "query": { "filter": query.as_value() },
        "paginator": { "page": 1, "items_per_page": 1 },
    })
}

/// Body of an unrestricted request returning every matching form.
pub fn fetch_payload(query: &QueryExpression) -> Value {
    json!({
        "query": { "filter": query.as_value() },
    })
}

/// Extract `paginator.count` from a count reply.
///
/// Anything other than a non-negative integer means the backend rejected the
/// filter.
pub fn parse_count(backend: &str, reply: &Value) -> Result<u64> {
    reply
        .get("paginator")
        .and_then(|paginator| paginator.get("count"))
        .and_then(Value::as_u64)
        .ok_or_else(|| {
            log::debug!("{backend}: no count in reply: {reply}");
            CrossOldError::invalid_query(backend)
        })
}

/// Decode an unrestricted reply into forms, preserving the backend's order.
pub fn parse_forms(backend: &str, reply: Value) -> Result<Vec<Form>> {
    if !reply.is_array() {
        return Err(CrossOldError::unexpected_response(
            backend,
            "expected a list of forms",
        ));
    }
    serde_json::from_value(reply)
        .map_err(|e| CrossOldError::unexpected_response(backend, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parse_query_literal;

    fn query() -> QueryExpression {
        parse_query_literal("['Form', 'transcription', 'regex', 'a']").unwrap()
    }

    #[test]
    fn test_count_payload_limits_page() {
        assert_eq!(
            count_payload(&query()),
            json!({
                "query": { "filter": ["Form", "transcription", "regex", "a"] },
                "paginator": { "page": 1, "items_per_page": 1 }
            })
        );
    }

    #[test]
    fn test_fetch_payload_has_no_paginator() {
        let payload = fetch_payload(&query());
        assert!(payload.get("paginator").is_none());
        assert_eq!(
            payload["query"]["filter"],
            json!(["Form", "transcription", "regex", "a"])
        );
    }

    #[test]
    fn test_parse_count() {
        let reply = json!({ "paginator": { "count": 17, "page": 1 }, "items": [{}] });
        assert_eq!(parse_count("a", &reply).unwrap(), 17);
        assert_eq!(parse_count("a", &json!({ "paginator": { "count": 0 } })).unwrap(), 0);
    }

    #[test]
    fn test_parse_count_rejects_missing_or_odd_counts() {
        for reply in [
            json!({ "paginator": {} }),
            json!({ "errors": { "Malformed OLD query error": "..." } }),
            json!({ "paginator": { "count": "3" } }),
            json!({ "paginator": { "count": 2.5 } }),
            json!({ "paginator": { "count": -1 } }),
            json!({ "paginator": { "count": true } }),
            json!([]),
        ] {
            match parse_count("kab", &reply) {
                Err(CrossOldError::InvalidQuery { backend }) => assert_eq!(backend, "kab"),
                other => panic!("expected InvalidQuery for {reply}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_parse_forms() {
        let forms = parse_forms(
            "a",
            json!([{ "transcription": "one" }, { "transcription": "two" }]),
        )
        .unwrap();
        assert_eq!(forms.len(), 2);
        assert_eq!(forms[1].transcription.as_deref(), Some("two"));
    }

    #[test]
    fn test_parse_forms_rejects_objects() {
        assert!(matches!(
            parse_forms("a", json!({ "paginator": { "count": 1 } })),
            Err(CrossOldError::UnexpectedResponse { .. })
        ));
        assert!(matches!(
            parse_forms("a", json!([{ "transcription": 5 }])),
            Err(CrossOldError::UnexpectedResponse { .. })
        ));
    }
}
