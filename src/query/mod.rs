//! Initial query construction
//!
//! Builds the opaque query body submitted on the first scroll request:
//! either a simple search term over a time range, or a raw query object
//! supplied verbatim (typically piped in via stdin). The query is built
//! once and never mutated afterwards; subsequent scroll requests carry only
//! the cursor.

use serde_json::{Value, json};

use crate::error::{ConfigError, Result};

/// Records requested per scroll page.
pub const PAGE_SIZE: u64 = 1000;

/// Base request body shared by both query modes. Ascending timestamp sort
/// keeps the output order deterministic across pages.
fn base() -> Value {
    json!({
        "sort": [{"@timestamp": {"order": "asc"}}],
        "size": PAGE_SIZE,
    })
}

/// Restrict returned record fields when an extraction list was given.
fn apply_extract(query: &mut Value, extract: &[String]) {
    if !extract.is_empty() {
        query["_source"] = json!({ "includes": extract });
    }
}

/// Build the query body for a simple search term over a time range.
pub fn from_term(term: &str, start: &str, end: &str, extract: &[String]) -> Value {
    let mut query = base();
    query["query"] = json!({
        "bool": {
            "must": [
                {"query_string": {"query": term}},
                {"range": {"@timestamp": {"gte": start, "lte": end}}},
            ]
        }
    });
    apply_extract(&mut query, extract);
    query
}

/// Build the query body from a raw query clause.
///
/// The input must be a JSON document; it becomes the `query` member of the
/// request body unchanged.
pub fn from_raw(raw: &str, extract: &[String]) -> Result<Value> {
    let clause: Value =
        serde_json::from_str(raw).map_err(|e| ConfigError::InvalidQuery(e.to_string()))?;
    let mut query = base();
    query["query"] = clause;
    apply_extract(&mut query, extract);
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_term_query_structure() {
        let query = from_term("error", "now-1h", "now", &[]);
        assert_eq!(query["size"], PAGE_SIZE);
        assert_eq!(query["sort"][0]["@timestamp"]["order"], "asc");

        let must = query["query"]["bool"]["must"].as_array().unwrap();
        assert_eq!(must.len(), 2);
        assert_eq!(must[0]["query_string"]["query"], "error");
        assert_eq!(must[1]["range"]["@timestamp"]["gte"], "now-1h");
        assert_eq!(must[1]["range"]["@timestamp"]["lte"], "now");
    }

    #[test]
    fn test_extract_sets_source_includes() {
        let fields = vec!["message".to_string(), "host".to_string()];
        let query = from_term("error", "now-5m", "now", &fields);
        assert_eq!(query["_source"]["includes"][0], "message");
        assert_eq!(query["_source"]["includes"][1], "host");
    }

    #[test]
    fn test_no_extract_leaves_source_unset() {
        let query = from_term("error", "now-5m", "now", &[]);
        assert!(query.get("_source").is_none());
    }

    #[test]
    fn test_raw_query_becomes_query_clause() {
        let query = from_raw(r#"{"match_all": {}}"#, &[]).unwrap();
        assert_eq!(query["size"], PAGE_SIZE);
        assert!(query["query"]["match_all"].is_object());
    }

    #[test]
    fn test_malformed_raw_query_is_fatal() {
        let result = from_raw("not json at all", &[]);
        assert!(matches!(
            result,
            Err(crate::error::ExportError::Config(ConfigError::InvalidQuery(_)))
        ));
    }
}
