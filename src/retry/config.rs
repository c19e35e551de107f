//! Retry tunables and their validating builder.

use crate::error::{Error, Result};
use http::Method;
use serde::{Deserialize, Serialize};

/// Status code standing in for "any transport-level error".
pub const TRANSPORT_ERROR_CODE: u16 = 0;

/// One entry of the retryable status-code set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusRule {
    /// Retry this status for any HTTP method.
    Status(u16),
    /// Retry this status only for the listed methods.
    StatusForMethods(
        u16,
        #[serde(with = "http_serde_methods")] Vec<Method>,
    ),
}

impl StatusRule {
    /// The status code this rule covers.
    pub fn code(&self) -> u16 {
        match self {
            StatusRule::Status(code) => *code,
            StatusRule::StatusForMethods(code, _) => *code,
        }
    }
}

/// Methods HTTP considers safe to blindly resubmit.
pub fn idempotent_methods() -> Vec<Method> {
    vec![
        Method::GET,
        Method::HEAD,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
        Method::TRACE,
    ]
}

/// The stock retryable status set: transport errors and 5xx/throttling
/// statuses, with the ambiguous ones restricted to idempotent methods.
pub fn default_status_rules() -> Vec<StatusRule> {
    vec![
        StatusRule::StatusForMethods(TRANSPORT_ERROR_CODE, idempotent_methods()),
        StatusRule::Status(423),
        StatusRule::Status(425),
        StatusRule::Status(429),
        StatusRule::StatusForMethods(500, idempotent_methods()),
        StatusRule::Status(502),
        StatusRule::Status(503),
        StatusRule::StatusForMethods(504, idempotent_methods()),
        StatusRule::StatusForMethods(507, idempotent_methods()),
        StatusRule::Status(510),
    ]
}

/// Immutable retry/backoff tunables.
///
/// Constructed once through [`RetryConfig::builder`] and shared by every
/// request a policy instance handles. All range validation happens at build
/// time; a built config is always internally consistent.
///
/// # Examples
///
/// ```
/// use scoped_http::RetryConfig;
///
/// let config = RetryConfig::builder()
///     .delay_ms(500)
///     .multiplier(3.0)
///     .max_delay_ms(30_000)
///     .jitter(0.0)
///     .max_retries(5)
///     .build()
///     .unwrap();
/// assert_eq!(config.delay_ms(), 500);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    status_codes: Vec<StatusRule>,
    delay_ms: u64,
    multiplier: f64,
    max_delay_ms: u64,
    jitter: f64,
    max_retries: u32,
}

impl RetryConfig {
    /// Start a builder seeded with the stock defaults: the
    /// [`default_status_rules`] set, 1000 ms initial delay, multiplier 2,
    /// unbounded max delay, 10% jitter, 3 retries.
    pub fn builder() -> RetryConfigBuilder {
        RetryConfigBuilder::default()
    }

    /// Retryable status-code rules.
    pub fn status_codes(&self) -> &[StatusRule] {
        &self.status_codes
    }

    /// Initial delay in milliseconds (the base when a multiplier applies).
    pub fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// Multiplier applied to the delay per retry.
    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Delay ceiling in milliseconds; 0 means unbounded.
    pub fn max_delay_ms(&self) -> u64 {
        self.max_delay_ms
    }

    /// Jitter fraction in `[0, 1]`.
    pub fn jitter(&self) -> f64 {
        self.jitter
    }

    /// Retry ceiling enforced by the retry-driving loop.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// True when `code` is listed as a bare (method-unrestricted) entry.
    pub fn has_bare_status(&self, code: u16) -> bool {
        self.status_codes
            .iter()
            .any(|rule| matches!(rule, StatusRule::Status(c) if *c == code))
    }

    /// The allowed methods for `code`, when it is listed method-restricted.
    pub fn methods_for_status(&self, code: u16) -> Option<&[Method]> {
        self.status_codes.iter().find_map(|rule| match rule {
            StatusRule::StatusForMethods(c, methods) if *c == code => Some(methods.as_slice()),
            _ => None,
        })
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            status_codes: default_status_rules(),
            delay_ms: 1000,
            multiplier: 2.0,
            max_delay_ms: 0,
            jitter: 0.1,
            max_retries: 3,
        }
    }
}

/// Builder collecting every range violation into one configuration error.
///
/// Signed inputs are accepted so that out-of-range values (e.g. `-1`) are
/// reported as violations instead of being unrepresentable.
#[derive(Debug, Clone)]
pub struct RetryConfigBuilder {
    status_codes: Vec<StatusRule>,
    delay_ms: i64,
    multiplier: f64,
    max_delay_ms: i64,
    jitter: f64,
    max_retries: i64,
}

impl Default for RetryConfigBuilder {
    fn default() -> Self {
        RetryConfigBuilder {
            status_codes: default_status_rules(),
            delay_ms: 1000,
            multiplier: 2.0,
            max_delay_ms: 0,
            jitter: 0.1,
            max_retries: 3,
        }
    }
}

impl RetryConfigBuilder {
    /// Replace the retryable status-code rules.
    pub fn status_codes(mut self, status_codes: Vec<StatusRule>) -> Self {
        self.status_codes = status_codes;
        self
    }

    /// Set the initial delay in milliseconds. Must be >= 0.
    pub fn delay_ms(mut self, delay_ms: i64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Set the per-retry multiplier. Must be >= 1.
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Set the delay ceiling in milliseconds. Must be >= 0; 0 disables it.
    pub fn max_delay_ms(mut self, max_delay_ms: i64) -> Self {
        self.max_delay_ms = max_delay_ms;
        self
    }

    /// Set the jitter fraction. Must be within `[0, 1]`.
    pub fn jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter;
        self
    }

    /// Set the retry ceiling. Must be >= 0.
    pub fn max_retries(mut self, max_retries: i64) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Validate and build. All violations are reported together in a single
    /// [`Error::Config`].
    pub fn build(self) -> Result<RetryConfig> {
        let mut violations = Vec::new();

        if self.max_retries < 0 {
            violations.push(format!(
                "max retries must be greater than or equal to zero: {} given",
                self.max_retries
            ));
        }
        if self.delay_ms < 0 {
            violations.push(format!(
                "delay must be greater than or equal to zero: {} given",
                self.delay_ms
            ));
        }
        if self.multiplier < 1.0 {
            violations.push(format!(
                "multiplier must be greater than or equal to one: {} given",
                self.multiplier
            ));
        }
        if self.max_delay_ms < 0 {
            violations.push(format!(
                "max delay must be greater than or equal to zero: {} given",
                self.max_delay_ms
            ));
        }
        if !(0.0..=1.0).contains(&self.jitter) {
            violations.push(format!(
                "jitter must be between 0 and 1: {} given",
                self.jitter
            ));
        }

        if !violations.is_empty() {
            return Err(Error::config(violations));
        }

        Ok(RetryConfig {
            status_codes: self.status_codes,
            delay_ms: self.delay_ms as u64,
            multiplier: self.multiplier,
            max_delay_ms: self.max_delay_ms as u64,
            jitter: self.jitter,
            max_retries: self.max_retries as u32,
        })
    }
}

mod http_serde_methods {
    use http::Method;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(methods: &[Method], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(methods.iter().map(|m| m.as_str()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Method>, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        names
            .into_iter()
            .map(|name| name.parse::<Method>().map_err(D::Error::custom))
            .collect()
    }
}
