//! URL-scoped default options.
//!
//! Scoping applies URL-pattern-keyed default options to otherwise generic
//! requests: an ordered list of `(regex pattern, default options)` rules is
//! scanned per request, the first matching rule's defaults are merged into
//! the request per a configurable merge policy, and the shaped request is
//! handed to the wrapped transport.
//!
//! # Module Organization
//!
//! ```text
//! scope/
//! ├── rules  - PatternRule and the ordered, first-match RuleSet
//! ├── merge  - merge precedence between request options and defaults
//! └── client - ScopingClient orchestration
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PatternRule`] | One compiled `pattern -> defaults` entry |
//! | [`RuleSet`] | Ordered rules with first-match-wins lookup and a fallback |
//! | [`ScopingClient`] | Transport wrapper applying scoped defaults |
//!
//! # Examples
//!
//! ```
//! use scoped_http::{MergeSet, OptionSet, Params, RuleSet, ScopingClient};
//!
//! let rules = RuleSet::new(vec![
//!     (".*/foo-bar".to_string(),
//!      OptionSet::new().with_query(Params::from_pairs([("abc", "def")]))),
//!     (".*".to_string(),
//!      OptionSet::new().with_query(Params::from_pairs([("abc", "ydp")]))),
//! ]).unwrap();
//!
//! // `()` stands in for a transport here; `prepare` shapes without sending.
//! let client = ScopingClient::new((), rules, MergeSet::query());
//! let (url, _options) = client
//!     .prepare("http://example.com/foo-bar", OptionSet::new())
//!     .unwrap();
//! assert_eq!(url.query(), Some("abc=def"));
//! ```

mod client;
mod merge;
mod rules;

pub use client::ScopingClient;
pub use merge::{merge_default_options, merge_headers};
pub use rules::{PatternRule, RuleSet};
