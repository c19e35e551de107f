//! Pluggable retry/backoff policy.
//!
//! A retry policy answers two questions per failed or rate-limited attempt:
//! *retry?* and *how long to wait?*. The policy itself is stateless and
//! side-effect-free; the driving loop ([`RetryTransport`]) owns the actual
//! waiting, resubmission, and the retry ceiling.
//!
//! # Module Organization
//!
//! ```text
//! retry/
//! ├── config   - RetryConfig tunables and their validating builder
//! ├── context  - per-attempt AttemptContext
//! ├── strategy - RetryStrategy trait, ApiRetryStrategy, RateLimitDelay
//! └── driver   - RetryTransport, the retry-driving loop
//! ```
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`RetryConfig`] | Immutable tunables: status set, delay, multiplier, ceiling, jitter, retries |
//! | [`AttemptContext`] | Transient per-attempt data consumed by the policy |
//! | [`RetryStrategy`] | The `should_retry` / `delay` decision pair |
//! | [`ApiRetryStrategy`] | Status-driven strategy with backoff, jitter, and a 429 path |
//! | [`RateLimitDelay`] | Required extension point supplying the 429 wait |
//! | [`RetryTransport`] | Transport wrapper driving the retry loop |
//!
//! # Examples
//!
//! ```
//! use scoped_http::{ApiRetryStrategy, RetryAfterDelay, RetryConfig};
//!
//! let config = RetryConfig::builder()
//!     .delay_ms(250)
//!     .max_delay_ms(10_000)
//!     .max_retries(4)
//!     .build()
//!     .unwrap();
//! let strategy = ApiRetryStrategy::new(config, RetryAfterDelay::new(1000));
//! assert_eq!(strategy.config().max_retries(), 4);
//! ```

mod config;
mod context;
mod driver;
mod strategy;

pub use config::{
    default_status_rules, idempotent_methods, RetryConfig, RetryConfigBuilder, StatusRule,
    TRANSPORT_ERROR_CODE,
};
pub use context::AttemptContext;
pub use driver::RetryTransport;
pub use strategy::{ApiRetryStrategy, RateLimitDelay, RetryAfterDelay, RetryStrategy};
