//! Search query document construction
//!
//! Translates a [`SessionFilter`] plus a page cursor into the JSON body for
//! the index `_search` endpoint. Construction is pure and deterministic: the
//! same inputs always yield a structurally identical document, which is what
//! makes filter-keyed caching and idempotent retries sound.

use flowscope_core::{fields, SessionFilter};
use serde_json::{json, Map, Value};

/// Build the `_search` request body for one page of sessions.
///
/// The filter contributes one `term` clause per supplied equality field and
/// one `range` clause for the time bound; an empty filter produces an empty
/// clause list, matching all sessions. Sorting is always by timestamp
/// descending. Filter values are forwarded verbatim, with no validation.
pub fn build_search_query(filter: &SessionFilter, page: usize, page_size: usize) -> Value {
    let mut clauses: Vec<Value> = Vec::new();

    if let Some(id) = &filter.session_id {
        clauses.push(term_clause(fields::SESSION_ID, id.as_str()));
    }

    if let Some(address) = &filter.address {
        clauses.push(term_clause(fields::ADDRESS, address.as_str()));
    }

    if let Some(since) = &filter.since {
        clauses.push(range_gte_clause(fields::TIMESTAMP, since));
    }

    json!({
        "query": { "bool": { "filter": clauses } },
        "sort": [sort_clause()],
        "from": page * page_size,
        "size": page_size,
    })
}

/// Term-equality clause on a single field
fn term_clause(field: &str, value: &str) -> Value {
    let mut term = Map::new();
    term.insert(field.to_string(), Value::String(value.to_string()));
    json!({ "term": term })
}

/// Lower-bound range clause on a single field
fn range_gte_clause(field: &str, gte: &str) -> Value {
    let mut range = Map::new();
    range.insert(field.to_string(), json!({ "gte": gte }));
    json!({ "range": range })
}

/// Descending-timestamp sort clause
fn sort_clause() -> Value {
    let mut sort = Map::new();
    sort.insert(fields::TIMESTAMP.to_string(), json!({ "order": "desc" }));
    Value::Object(sort)
}
