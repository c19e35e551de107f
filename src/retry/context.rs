//! Per-attempt context consumed by retry strategies.

use crate::options::Params;
use http::Method;

/// Transient data describing one completed or failed HTTP attempt.
///
/// Built fresh by the retry-driving loop for every attempt and discarded
/// once the retry decision for that attempt is made. Strategies read it,
/// never mutate it.
#[derive(Debug, Clone)]
pub struct AttemptContext {
    method: Method,
    status: Option<u16>,
    retry_count: Option<u32>,
    headers: Params,
    info: Params,
}

impl AttemptContext {
    /// Start a context for an attempt with the given HTTP method.
    pub fn new(method: Method) -> Self {
        AttemptContext {
            method,
            status: None,
            retry_count: None,
            headers: Params::new(),
            info: Params::new(),
        }
    }

    /// Record the response status code. Leave unset for a network-level
    /// failure that produced no response.
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Record how many retries have already happened (0 for the first
    /// attempt).
    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = Some(retry_count);
        self
    }

    /// Attach a snapshot of the response headers (e.g. `Retry-After`).
    pub fn with_headers(mut self, headers: Params) -> Self {
        self.headers = headers;
        self
    }

    /// Attach an arbitrary extra info entry.
    pub fn with_info(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.info.insert(key, value);
        self
    }

    /// The HTTP method of the attempt.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The response status, or `None` when the attempt never produced one.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// The retry counter, when the driver recorded one.
    pub fn retry_count(&self) -> Option<u32> {
        self.retry_count
    }

    /// Response header snapshot.
    pub fn headers(&self) -> &Params {
        &self.headers
    }

    /// Extra info entries.
    pub fn info(&self) -> &Params {
        &self.info
    }
}
