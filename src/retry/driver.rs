//! The retry-driving loop.
//!
//! [`RetryTransport`] is itself a [`Transport`], so it can sit between a
//! [`ScopingClient`](crate::ScopingClient) and the real transport: the
//! scoping layer shapes requests, this layer resubmits failed attempts
//! according to a [`RetryStrategy`].

use crate::error::Result;
use crate::options::OptionSet;
use crate::retry::context::AttemptContext;
use crate::retry::strategy::RetryStrategy;
use crate::transport::{ByteStream, Transport, TransportResponse};
use async_trait::async_trait;
use http::Method;
use std::time::Duration;
use tokio::time::sleep;
use url::Url;

/// Transport wrapper that retries failed attempts.
///
/// The loop owns everything the strategy deliberately does not: building a
/// fresh [`AttemptContext`] per attempt, enforcing the strategy's retry
/// ceiling, sleeping out the computed delay, and surfacing the final
/// outcome. A response that exhausts its retries is returned as-is; a
/// transport error that exhausts its retries is propagated as the error of
/// the last attempt.
pub struct RetryTransport<T, S> {
    inner: T,
    strategy: S,
}

impl<T, S> RetryTransport<T, S> {
    /// Wrap a transport with a retry strategy.
    pub fn new(inner: T, strategy: S) -> Self {
        RetryTransport { inner, strategy }
    }
}

#[async_trait]
impl<T, S> Transport for RetryTransport<T, S>
where
    T: Transport,
    S: RetryStrategy,
{
    async fn send(
        &self,
        method: Method,
        url: Url,
        options: &OptionSet,
    ) -> Result<TransportResponse> {
        let mut retry_count: u32 = 0;

        loop {
            match self.inner.send(method.clone(), url.clone(), options).await {
                Ok(response) => {
                    let ctx = AttemptContext::new(method.clone())
                        .with_status(response.status)
                        .with_retry_count(retry_count)
                        .with_headers(response.headers.clone());
                    let body = std::str::from_utf8(&response.body).ok();

                    if !self.strategy.should_retry(&ctx, body, None)
                        || retry_count >= self.strategy.max_retries()
                    {
                        return Ok(response);
                    }

                    retry_count += 1;
                    let ctx = ctx.with_retry_count(retry_count);
                    let delay = self.strategy.delay(&ctx, body, None);
                    tracing::warn!(
                        status = response.status,
                        retry_count,
                        delay_ms = delay,
                        url = %url,
                        "retrying request"
                    );
                    sleep(Duration::from_millis(delay)).await;
                }
                Err(error) => {
                    let ctx = AttemptContext::new(method.clone()).with_retry_count(retry_count);

                    if !self.strategy.should_retry(&ctx, None, Some(&error))
                        || retry_count >= self.strategy.max_retries()
                    {
                        return Err(error);
                    }

                    retry_count += 1;
                    let ctx = ctx.with_retry_count(retry_count);
                    let delay = self.strategy.delay(&ctx, None, Some(&error));
                    tracing::warn!(
                        retry_count,
                        delay_ms = delay,
                        url = %url,
                        error = %error,
                        "retrying request after transport error"
                    );
                    sleep(Duration::from_millis(delay)).await;
                }
            }
        }
    }

    /// Streaming requests are not retried; a consumer may already have
    /// observed part of the body.
    async fn stream(&self, method: Method, url: Url, options: &OptionSet) -> Result<ByteStream> {
        self.inner.stream(method, url, options).await
    }

    fn reset(&self) {
        self.inner.reset();
    }
}
