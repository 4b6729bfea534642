//! Pure URL/selector mechanics used both by the Driver (when executing a
//! `Navigate` step directly) and by `vulcn-payload`'s substitution function
//! (spec.md §4.1, §4.2). Kept as free functions with no driver state so both
//! crates can call the exact same implementation instead of duplicating it.

use url::Url;

use crate::error::DriverError;

/// Rewrite `param`'s value in `url`'s query string, preserving the order of
/// existing parameters and appending `param` at the end if it is absent.
/// Percent-encoding happens exactly once, when the new query string is
/// serialized.
pub fn inject_query_param(url: &str, param: &str, value: &str) -> Result<String, DriverError> {
    let parsed = Url::parse(url).map_err(|e| DriverError::Internal(format!("invalid url '{url}': {e}")))?;

    let mut found = false;
    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| {
            if k == param {
                found = true;
                (k.into_owned(), value.to_string())
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();

    let mut rewritten = parsed;
    {
        let mut qp = rewritten.query_pairs_mut();
        qp.clear();
        for (k, v) in &pairs {
            qp.append_pair(k, v);
        }
        if !found {
            qp.append_pair(param, value);
        }
    }
    Ok(rewritten.to_string())
}

/// Selector candidates tried in order when resolving an injectable form field
/// by logical name (spec.md §4.1): `input[name=X]` -> `input[id=X]` ->
/// `textarea[name=X]`.
pub fn input_selector_candidates(field: &str) -> Vec<String> {
    vec![
        format!("input[name='{field}']"),
        format!("input[id='{field}']"),
        format!("textarea[name='{field}']"),
    ]
}

/// A single CSS selector matching any of the common submit-control shapes,
/// used when a `Navigate` step without a query parameter is promoted to
/// input+submit-click (spec.md §4.2).
pub fn submit_selector() -> &'static str {
    "button[type='submit'], input[type='submit'], button:not([type])"
}

/// Priority candidates are joined with this separator rather than a plain
/// CSS comma, because CSS's comma-group has no notion of priority (it
/// matches whichever candidate appears first in document order); resolving
/// a field by name needs `input[name=X]` tried strictly before
/// `input[id=X]`, so the Driver splits on this separator and tries each
/// candidate in turn (spec.md §4.1).
pub const SELECTOR_PRIORITY_SEPARATOR: &str = " || ";

/// Build the ordered-candidate selector string for `field`.
pub fn ordered_field_selector(field: &str) -> String {
    input_selector_candidates(field).join(SELECTOR_PRIORITY_SEPARATOR)
}

/// Split a selector built by `ordered_field_selector` back into its ordered
/// candidates. Selectors that were never joined (a single plain CSS
/// selector) come back as a one-element vector, so callers can treat every
/// selector uniformly.
pub fn split_ordered_selector(selector: &str) -> Vec<&str> {
    selector.split(SELECTOR_PRIORITY_SEPARATOR).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_param_order_and_rewrites_value() {
        let out = inject_query_param("https://example.com/search?q=a&page=1&sort=asc", "q", "<script>")
            .unwrap();
        assert!(out.starts_with("https://example.com/search?q=%3Cscript%3E&page=1&sort=asc"));
    }

    #[test]
    fn appends_missing_param_at_end() {
        let out = inject_query_param("https://example.com/search?q=a", "debug", "1").unwrap();
        assert_eq!(out, "https://example.com/search?q=a&debug=1");
    }

    #[test]
    fn rejects_malformed_url() {
        assert!(inject_query_param("not a url", "q", "x").is_err());
    }
}
