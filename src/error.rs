//! Error types for the scoped-http policy layer.
//!
//! The crate distinguishes three failure classes:
//!
//! - **Configuration errors** — invalid rule patterns, out-of-range retry
//!   tunables, or a fallback pattern that references no rule. Raised at
//!   construction time and never recovered.
//! - **URL resolution errors** — a relative request URL with no usable base
//!   and no fallback rule. Raised per request.
//! - **Transport errors** — opaque network-level failures reported by the
//!   wrapped transport. The policy layer only ever checks *whether* one
//!   occurred; it never inspects or wraps its internals.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the scoping client and retry policy.
#[derive(Debug, Error)]
pub enum Error {
    /// One or more configuration values were out of range.
    ///
    /// All violations found during construction are collected into a single
    /// error rather than failing on the first one.
    #[error("invalid configuration: {}", violations.join("; "))]
    Config {
        /// Human-readable description of each violation.
        violations: Vec<String>,
    },

    /// A rule pattern failed to compile as a regular expression.
    #[error("invalid rule pattern '{pattern}': {source}")]
    Pattern {
        /// The offending pattern as configured.
        pattern: String,
        /// The underlying regex compilation error.
        #[source]
        source: regex::Error,
    },

    /// A URL could not be parsed at all.
    #[error("invalid URL '{url}': {source}")]
    UrlParse {
        /// The offending URL.
        url: String,
        /// The underlying parse error.
        #[source]
        source: url::ParseError,
    },

    /// A relative URL could not be resolved: no explicit base, and no
    /// fallback rule carrying one.
    #[error("cannot resolve relative URL '{url}': no usable base URI")]
    UrlResolve {
        /// The unresolvable URL.
        url: String,
    },

    /// Network-level failure reported by the wrapped transport.
    #[error("transport error: {0}")]
    Transport(String),
}

impl Error {
    /// Build a configuration error from a list of violations.
    pub fn config(violations: Vec<String>) -> Self {
        Error::Config { violations }
    }

    /// True when this is a network-level transport failure.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_joins_violations() {
        let err = Error::config(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "invalid configuration: a; b");
    }

    #[test]
    fn test_is_transport() {
        assert!(Error::Transport("reset".into()).is_transport());
        assert!(!Error::UrlResolve { url: "/x".into() }.is_transport());
    }
}
