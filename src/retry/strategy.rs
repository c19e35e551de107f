//! Retry decision and delay computation.

use crate::error::Error;
use crate::retry::config::{RetryConfig, TRANSPORT_ERROR_CODE};
use crate::retry::context::AttemptContext;
use http::StatusCode;
use rand::Rng;

/// A pluggable retry policy: decides whether a failed attempt is retried
/// and how long to wait first.
///
/// Both functions are pure with respect to shared state: they read the
/// immutable configuration and the per-attempt context, perform no I/O, and
/// may be called concurrently. The actual waiting and resubmission belong to
/// the retry-driving loop (see [`RetryTransport`](crate::RetryTransport)).
pub trait RetryStrategy: Send + Sync {
    /// Should the attempt described by `ctx` be retried?
    ///
    /// `body` is a snapshot of the response body when one exists; `error` is
    /// the transport error when the attempt failed at the network level.
    fn should_retry(&self, ctx: &AttemptContext, body: Option<&str>, error: Option<&Error>)
        -> bool;

    /// Milliseconds to wait before the next attempt.
    fn delay(&self, ctx: &AttemptContext, body: Option<&str>, error: Option<&Error>) -> u64;

    /// The retry ceiling the driving loop must enforce.
    fn max_retries(&self) -> u32;
}

/// Supplies the wait for rate-limited (429) responses.
///
/// This is the one required extension point of [`ApiRetryStrategy`]: there
/// is no default, because the right answer depends on how the particular API
/// communicates its limits. [`RetryAfterDelay`] covers the common
/// integral-seconds `Retry-After` header.
pub trait RateLimitDelay: Send + Sync {
    /// Raw delay in milliseconds for a 429 attempt, before jitter and
    /// clamping are applied.
    fn rate_limit_delay(&self, ctx: &AttemptContext, error: Option<&Error>) -> u64;
}

/// Status-code-driven retry strategy with exponential backoff, jitter, and
/// a delay ceiling.
///
/// Mirrors the shape of a generic HTTP retry strategy, with two additions:
/// status codes may be restricted to specific HTTP methods, and 429
/// responses are delegated to an injected [`RateLimitDelay`].
///
/// # Examples
///
/// ```
/// use scoped_http::{ApiRetryStrategy, AttemptContext, RetryConfig, RetryStrategy};
/// use scoped_http::retry::RateLimitDelay;
///
/// struct Flat;
/// impl RateLimitDelay for Flat {
///     fn rate_limit_delay(&self, _: &AttemptContext, _: Option<&scoped_http::Error>) -> u64 {
///         10_000
///     }
/// }
///
/// let config = RetryConfig::builder().jitter(0.0).build().unwrap();
/// let strategy = ApiRetryStrategy::new(config, Flat);
/// let ctx = AttemptContext::new(http::Method::GET)
///     .with_status(503)
///     .with_retry_count(2);
/// assert!(strategy.should_retry(&ctx, None, None));
/// assert_eq!(strategy.delay(&ctx, None, None), 4000); // 1000 * 2^2
/// ```
pub struct ApiRetryStrategy<R> {
    config: RetryConfig,
    rate_limit: R,
}

impl<R> ApiRetryStrategy<R> {
    /// Build a strategy from validated tunables and a rate-limit policy.
    pub fn new(config: RetryConfig, rate_limit: R) -> Self {
        ApiRetryStrategy { config, rate_limit }
    }

    /// The configured tunables.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    fn backoff_delay(&self, ctx: &AttemptContext) -> u64 {
        let retries = ctx.retry_count().unwrap_or(1);
        (self.config.delay_ms() as f64 * self.config.multiplier().powi(retries as i32)) as u64
    }

    fn apply_jitter(&self, delay: u64) -> u64 {
        let jitter = self.config.jitter();
        if jitter <= 0.0 {
            return delay;
        }
        let spread = delay as f64 * jitter;
        if delay > 1000 {
            let spread = spread as i64;
            let offset = rand::thread_rng().gen_range(-spread..=spread);
            (delay as i64 + offset).max(0) as u64
        } else {
            // Below the one-second floor jitter only grows the delay, so a
            // short wait never shrinks further.
            delay + spread as u64
        }
    }

    fn standardize(&self, delay: u64) -> u64 {
        let delay = self.apply_jitter(delay);
        let max = self.config.max_delay_ms();
        if max != 0 && delay > max {
            max
        } else {
            delay
        }
    }
}

impl<R: RateLimitDelay> RetryStrategy for ApiRetryStrategy<R> {
    /// Decision order: bare status match, method-restricted status match,
    /// then (only when a transport error occurred) the same two checks for
    /// the transport-error sentinel code 0.
    ///
    /// The retry ceiling is deliberately not consulted here; the driving
    /// loop enforces it against the attempt's retry count.
    fn should_retry(
        &self,
        ctx: &AttemptContext,
        _body: Option<&str>,
        error: Option<&Error>,
    ) -> bool {
        if let Some(status) = ctx.status() {
            if self.config.has_bare_status(status) {
                return true;
            }
            if let Some(methods) = self.config.methods_for_status(status) {
                return methods.contains(ctx.method());
            }
        }

        if error.is_none() {
            return false;
        }

        if self.config.has_bare_status(TRANSPORT_ERROR_CODE) {
            return true;
        }
        if let Some(methods) = self.config.methods_for_status(TRANSPORT_ERROR_CODE) {
            return methods.contains(ctx.method());
        }

        false
    }

    fn delay(&self, ctx: &AttemptContext, _body: Option<&str>, error: Option<&Error>) -> u64 {
        let raw = match ctx.status() {
            Some(status) if status == StatusCode::TOO_MANY_REQUESTS.as_u16() => {
                self.rate_limit.rate_limit_delay(ctx, error)
            }
            _ => self.backoff_delay(ctx),
        };
        self.standardize(raw)
    }

    fn max_retries(&self) -> u32 {
        self.config.max_retries()
    }
}

/// [`RateLimitDelay`] honoring an integral-seconds `Retry-After` header.
///
/// Falls back to a fixed delay when the header is absent or not a plain
/// number of seconds.
#[derive(Debug, Clone)]
pub struct RetryAfterDelay {
    default_ms: u64,
}

impl RetryAfterDelay {
    /// `default_ms` is used when no usable `Retry-After` value is present.
    pub fn new(default_ms: u64) -> Self {
        RetryAfterDelay { default_ms }
    }
}

impl RateLimitDelay for RetryAfterDelay {
    fn rate_limit_delay(&self, ctx: &AttemptContext, _error: Option<&Error>) -> u64 {
        ctx.headers()
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("retry-after"))
            .and_then(|(_, value)| value.trim().parse::<u64>().ok())
            .map(|seconds| seconds * 1000)
            .unwrap_or(self.default_ms)
    }
}
