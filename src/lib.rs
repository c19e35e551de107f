#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

//! # Scoped-HTTP: request-shaping policy for HTTP clients
//!
//! This crate augments a generic asynchronous HTTP transport with two
//! orthogonal, composable policies:
//!
//! 1. **Scoping** — per-request default-option injection keyed by URL
//!    pattern, with configurable merge semantics for query parameters,
//!    request bodies, and JSON payloads.
//! 2. **Retry** — a pluggable strategy deciding, per failed or rate-limited
//!    attempt, whether to retry and how long to wait: exponential backoff
//!    with a multiplier, a ceiling, jitter, and a specialized 429 path.
//!
//! The crate is a policy layer, not a transport: connection handling, TLS,
//! and socket I/O live behind the [`Transport`] trait. A thin
//! [`ReqwestTransport`] binding is provided; tests and embedders can supply
//! their own.
//!
//! ## Key Features
//!
//! - **First-match-wins rules**: ordered regex patterns, anchored at the
//!   start of the URL, select the default options for each request
//! - **Deterministic merging**: default keys keep their configured order,
//!   request values win per key, request-only keys are appended
//! - **Base-URI scoping**: one constructor call scopes all defaults to the
//!   URLs under a literal base, and lets relative request URLs adopt it
//! - **Method-aware retry rules**: a status code can be retryable for
//!   idempotent methods only
//! - **Rate-limit extension point**: 429 waits are delegated to an injected
//!   [`RateLimitDelay`], e.g. [`RetryAfterDelay`]
//! - **Stateless policies**: one configured client/strategy instance serves
//!   concurrent requests with no coordination
//!
//! ## Layering
//!
//! ```text
//! ScopingClient          - resolves URLs, matches rules, merges options
//!   └── RetryTransport   - drives the retry loop, sleeps out delays
//!         └── Transport  - e.g. ReqwestTransport, owns all actual I/O
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use scoped_http::{
//!     ApiRetryStrategy, MergeSet, OptionSet, Params, ReqwestTransport,
//!     RetryAfterDelay, RetryConfig, RetryTransport, RuleSet, ScopingClient,
//! };
//! use http::Method;
//!
//! let strategy = ApiRetryStrategy::new(
//!     RetryConfig::builder().max_retries(4).build()?,
//!     RetryAfterDelay::new(1000),
//! );
//! let transport = RetryTransport::new(ReqwestTransport::new(), strategy);
//!
//! let client = ScopingClient::for_base_uri(
//!     transport,
//!     "https://api.example.com/v2/",
//!     OptionSet::new().with_query(Params::from_pairs([("apikey", "k")])),
//! )?
//! .with_merge(MergeSet::query());
//!
//! // Relative URL adopts the scoped base; the default apikey is merged in.
//! let response = client.request(Method::GET, "users/42", OptionSet::new()).await?;
//! ```

pub mod error;
pub mod options;
pub mod retry;
pub mod scope;
pub mod transport;

pub use error::{Error, Result};
pub use options::{BodyValue, MergeSet, OptionSet, Params};
pub use retry::{
    ApiRetryStrategy, AttemptContext, RateLimitDelay, RetryAfterDelay, RetryConfig,
    RetryConfigBuilder, RetryStrategy, RetryTransport, StatusRule,
};
pub use scope::{PatternRule, RuleSet, ScopingClient};
pub use transport::{ByteStream, ReqwestTransport, Transport, TransportResponse};
