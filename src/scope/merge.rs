//! Merge precedence between request options and matched defaults.
//!
//! Two distinct mechanisms apply:
//!
//! - **Key-wise category merging** for the categories listed in a
//!   [`MergeSet`]: default entries first, request entries override by key,
//!   request-only keys appended. Categories not listed are left exactly as
//!   the request supplied them — defaults for them are silently ignored.
//! - **Base-default headers**: header defaults are always applied underneath
//!   the request's own headers, regardless of the merge set.
//!
//! `query` goes through the same key-wise path as `body` and `json`; it is
//! called out separately in the docs only because the wrapped transport never
//! auto-applies default queries on its own.

use crate::options::{BodyValue, MergeSet, OptionSet, Params};
use serde_json::Value;

/// Produce the effective options for a request, given the matched rule's
/// defaults and the configured merge categories.
pub fn merge_default_options(
    request: &OptionSet,
    defaults: &OptionSet,
    merge: MergeSet,
) -> OptionSet {
    let mut effective = request.clone();

    if merge.query {
        if let Some(default_query) = &defaults.query {
            effective.query = Some(match &request.query {
                Some(query) => Params::merged(default_query, query),
                None => default_query.clone(),
            });
        }
    }

    if merge.body {
        if let Some(default_body) = &defaults.body {
            effective.body = Some(merge_body(request.body.as_ref(), default_body));
        }
    }

    if merge.json {
        if let Some(default_json) = &defaults.json {
            effective.json = Some(match &request.json {
                Some(json) => merge_json(default_json, json),
                None => default_json.clone(),
            });
        }
    }

    effective.headers = merge_headers(request.headers.as_ref(), defaults.headers.as_ref());

    effective
}

/// Apply header defaults underneath the request's own headers.
///
/// Defaults come first, the request overrides by name. This is the
/// base-default mechanism an HTTP client applies to headers on every
/// request; it is independent of the merge-category set.
pub fn merge_headers(request: Option<&Params>, defaults: Option<&Params>) -> Option<Params> {
    match (defaults, request) {
        (Some(defaults), Some(request)) => Some(Params::merged(defaults, request)),
        (Some(defaults), None) => Some(defaults.clone()),
        (None, request) => request.cloned(),
    }
}

fn merge_body(request: Option<&BodyValue>, default: &BodyValue) -> BodyValue {
    match (default, request) {
        (BodyValue::Form(default_fields), Some(BodyValue::Form(fields))) => {
            BodyValue::Form(Params::merged(default_fields, fields))
        }
        // A raw request body is opaque; it always wins verbatim.
        (_, Some(raw @ BodyValue::Raw(_))) => raw.clone(),
        // Mismatched shapes cannot be merged key-wise; the request wins.
        (BodyValue::Raw(_), Some(form @ BodyValue::Form(_))) => form.clone(),
        (_, None) => default.clone(),
    }
}

fn merge_json(default: &Value, request: &Value) -> Value {
    match (default, request) {
        (Value::Object(default_map), Value::Object(request_map)) => {
            let mut out = default_map.clone();
            for (key, value) in request_map {
                out.insert(key.clone(), value.clone());
            }
            Value::Object(out)
        }
        // Non-object payloads have no keys to merge; the request wins.
        _ => request.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> Params {
        Params::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn test_query_merge_request_wins_per_key() {
        let defaults = OptionSet::new().with_query(params(&[
            ("abc", "def"),
            ("ghi", "jkl"),
            ("sdf", "s1"),
        ]));
        let request = OptionSet::new().with_query(params(&[("ffff", "gg"), ("ghi", "dddd")]));

        let effective = merge_default_options(&request, &defaults, MergeSet::query());
        let pairs: Vec<(&str, &str)> = effective.query.as_ref().unwrap().iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("abc", "def"),
                ("ghi", "dddd"),
                ("sdf", "s1"),
                ("ffff", "gg"),
            ]
        );
    }

    #[test]
    fn test_default_copied_verbatim_when_request_lacks_category() {
        let defaults = OptionSet::new().with_query(params(&[("abc", "def")]));
        let request = OptionSet::new();
        let effective = merge_default_options(&request, &defaults, MergeSet::query());
        assert_eq!(effective.query.as_ref().unwrap().get("abc"), Some("def"));
    }

    #[test]
    fn test_unlisted_categories_ignore_defaults() {
        let defaults = OptionSet::new()
            .with_query(params(&[("abc", "def")]))
            .with_json(json!({"qqq": "rrr"}))
            .with_form_body(params(&[("f", "1")]));
        let request = OptionSet::new().with_json(json!({"url": "http://example.com"}));

        let effective = merge_default_options(&request, &defaults, MergeSet::query());
        // json is not in the merge set: request value verbatim.
        assert_eq!(effective.json, Some(json!({"url": "http://example.com"})));
        // body is not in the merge set and the request has none: stays absent.
        assert!(effective.body.is_none());
    }

    #[test]
    fn test_form_body_merge() {
        let defaults = OptionSet::new().with_form_body(params(&[("qqq", "rrr")]));
        let request = OptionSet::new().with_form_body(params(&[("url", "http://example.com")]));
        let effective =
            merge_default_options(&request, &defaults, MergeSet::none().with_body());
        let pairs: Vec<(&str, &str)> = match effective.body.as_ref().unwrap() {
            BodyValue::Form(fields) => fields.iter().collect(),
            BodyValue::Raw(_) => panic!("expected form body"),
        };
        assert_eq!(pairs, vec![("qqq", "rrr"), ("url", "http://example.com")]);
    }

    #[test]
    fn test_raw_request_body_wins_over_form_default() {
        let defaults = OptionSet::new().with_form_body(params(&[("qqq", "rrr")]));
        let request = OptionSet::new().with_raw_body("opaque");
        let effective =
            merge_default_options(&request, &defaults, MergeSet::none().with_body());
        assert_eq!(effective.body, Some(BodyValue::Raw("opaque".into())));
    }

    #[test]
    fn test_json_object_merge_request_wins_per_key() {
        let defaults = OptionSet::new().with_json(json!({"a": 1, "b": 2}));
        let request = OptionSet::new().with_json(json!({"b": 9, "c": 3}));
        let effective =
            merge_default_options(&request, &defaults, MergeSet::none().with_json());
        assert_eq!(effective.json, Some(json!({"a": 1, "b": 9, "c": 3})));
    }

    #[test]
    fn test_headers_always_base_default_merged() {
        let defaults = OptionSet::new().with_headers(params(&[("Content-Type", "text/html")]));
        let request = OptionSet::new().with_headers(params(&[("X-FooBar", "unit-test")]));
        let effective = merge_default_options(&request, &defaults, MergeSet::none());
        let headers = effective.headers.as_ref().unwrap();
        assert_eq!(headers.get("Content-Type"), Some("text/html"));
        assert_eq!(headers.get("X-FooBar"), Some("unit-test"));
    }

    #[test]
    fn test_request_header_overrides_default() {
        let defaults = OptionSet::new().with_headers(params(&[("X-FooBar", "default")]));
        let request = OptionSet::new().with_headers(params(&[("X-FooBar", "unit-test")]));
        let effective = merge_default_options(&request, &defaults, MergeSet::none());
        assert_eq!(
            effective.headers.as_ref().unwrap().get("X-FooBar"),
            Some("unit-test")
        );
    }
}
