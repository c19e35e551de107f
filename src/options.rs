//! Request option categories and the ordered string map they share.
//!
//! Options are grouped into named categories (`query`, `body`, `json`,
//! `headers`, `base_uri`). Scoping rules carry a default [`OptionSet`] per
//! URL pattern; callers pass a per-request [`OptionSet`] with the same shape.
//! Which categories are key-wise merged from defaults into the request is
//! controlled by a [`MergeSet`].
//!
//! # Ordering
//!
//! Merge results are deterministic: default keys keep their configured
//! insertion order, request-only keys are appended after them. [`Params`]
//! preserves insertion order to make that guarantee explicit.
//!
//! # Examples
//!
//! ```
//! use scoped_http::{OptionSet, Params};
//!
//! let defaults = OptionSet::new()
//!     .with_query(Params::from_pairs([("abc", "def"), ("ghi", "jkl")]))
//!     .with_base_uri("https://api.example.com/");
//! assert!(defaults.query.is_some());
//! ```

use serde::{Deserialize, Serialize};

/// An insertion-ordered `String -> String` mapping.
///
/// Backed by a pair vector: lookups are linear, which is fine for the
/// handful of query parameters or headers a request carries. Inserting an
/// existing key replaces its value in place, keeping the key's position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(Vec<(String, String)>);

impl Params {
    /// Create an empty map.
    pub fn new() -> Self {
        Params(Vec::new())
    }

    /// Build from an array or iterator of string pairs.
    ///
    /// # Examples
    ///
    /// ```
    /// use scoped_http::Params;
    ///
    /// let params = Params::from_pairs([("a", "1"), ("b", "2")]);
    /// assert_eq!(params.get("a"), Some("1"));
    /// ```
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = Params::new();
        for (k, v) in pairs {
            params.insert(k.into(), v.into());
        }
        params
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up a value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Insert a key/value pair.
    ///
    /// An existing key keeps its position and gets the new value;
    /// a new key is appended at the end.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Merge `overrides` on top of `defaults`.
    ///
    /// Default keys keep their insertion order; overriding values replace
    /// them in place; override-only keys are appended.
    ///
    /// # Examples
    ///
    /// ```
    /// use scoped_http::Params;
    ///
    /// let defaults = Params::from_pairs([("abc", "def"), ("ghi", "jkl")]);
    /// let request = Params::from_pairs([("ghi", "xyz"), ("new", "1")]);
    /// let merged = Params::merged(&defaults, &request);
    /// let keys: Vec<&str> = merged.iter().map(|(k, _)| k).collect();
    /// assert_eq!(keys, vec!["abc", "ghi", "new"]);
    /// assert_eq!(merged.get("ghi"), Some("xyz"));
    /// ```
    pub fn merged(defaults: &Params, overrides: &Params) -> Params {
        let mut out = defaults.clone();
        for (k, v) in overrides.iter() {
            out.insert(k, v);
        }
        out
    }
}

/// A request or default body.
///
/// Form bodies participate in key-wise merging; a raw body always wins
/// verbatim over any default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BodyValue {
    /// URL-encoded form fields.
    Form(Params),
    /// An opaque body string sent as-is.
    Raw(String),
}

/// One named bundle of default or per-request options.
///
/// All fields are optional; an empty set is valid. The same type serves as
/// the defaults attached to a scoping rule and as the caller's per-request
/// overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionSet {
    /// Query-string parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Params>,
    /// Request body (form fields or raw string).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<BodyValue>,
    /// JSON payload, serialized with `Content-Type: application/json`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<serde_json::Value>,
    /// Request headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<Params>,
    /// Base URI for resolving relative request URLs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_uri: Option<String>,
}

impl OptionSet {
    /// Create an empty option set.
    pub fn new() -> Self {
        OptionSet::default()
    }

    /// Set the query parameters.
    pub fn with_query(mut self, query: Params) -> Self {
        self.query = Some(query);
        self
    }

    /// Set a form body.
    pub fn with_form_body(mut self, body: Params) -> Self {
        self.body = Some(BodyValue::Form(body));
        self
    }

    /// Set a raw string body.
    pub fn with_raw_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(BodyValue::Raw(body.into()));
        self
    }

    /// Set the JSON payload.
    pub fn with_json(mut self, json: serde_json::Value) -> Self {
        self.json = Some(json);
        self
    }

    /// Set the headers.
    pub fn with_headers(mut self, headers: Params) -> Self {
        self.headers = Some(headers);
        self
    }

    /// Set the base URI.
    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = Some(base_uri.into());
        self
    }
}

/// The option categories key-wise merged from matched defaults.
///
/// Categories left out are passed through exactly as the request supplied
/// them, even when the matched rule defines defaults for them. Headers are
/// not listed here: they always follow base-default semantics (defaults
/// applied, request overrides by key).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeSet {
    /// Merge default query parameters into the request query.
    #[serde(default)]
    pub query: bool,
    /// Merge default form-body fields into the request body.
    #[serde(default)]
    pub body: bool,
    /// Merge default JSON object keys into the request JSON payload.
    #[serde(default)]
    pub json: bool,
}

impl MergeSet {
    /// Merge nothing; every category is request-only.
    pub fn none() -> Self {
        MergeSet::default()
    }

    /// Merge only `query`.
    pub fn query() -> Self {
        MergeSet {
            query: true,
            ..MergeSet::default()
        }
    }

    /// Merge all supported categories.
    pub fn all() -> Self {
        MergeSet {
            query: true,
            body: true,
            json: true,
        }
    }

    /// Enable query merging.
    pub fn with_query(mut self) -> Self {
        self.query = true;
        self
    }

    /// Enable body merging.
    pub fn with_body(mut self) -> Self {
        self.body = true;
        self
    }

    /// Enable JSON merging.
    pub fn with_json(mut self) -> Self {
        self.json = true;
        self
    }
}
