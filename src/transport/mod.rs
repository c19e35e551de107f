//! The abstract HTTP transport the policy layer wraps.
//!
//! The scoping client and retry driver are transport-agnostic: they only
//! need a capability that can send a shaped request and report either a
//! response or an opaque network-level failure. [`ReqwestTransport`] binds
//! that capability to `reqwest`; tests supply in-memory implementations.
//!
//! # Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Transport`] | Async send/stream capability consumed by the policy layer |
//! | [`TransportResponse`] | Status, headers, and buffered body of one attempt |
//! | [`ByteStream`] | Boxed stream of body chunks for the streaming variant |

mod reqwest;

pub use self::reqwest::ReqwestTransport;

use crate::error::Result;
use crate::options::{OptionSet, Params};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use http::Method;
use url::Url;

/// A stream of response body chunks.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// The response of a single completed HTTP attempt.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers in arrival order.
    pub headers: Params,
    /// Fully buffered response body.
    pub body: Bytes,
}

impl TransportResponse {
    /// True for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Abstract HTTP send capability.
///
/// Implementations own all actual I/O: connection handling, TLS, timeouts,
/// and cancellation. The policy layer hands them an absolute URL and the
/// effective (already merged) options, and treats any returned error as
/// opaque.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and buffer the full response.
    async fn send(
        &self,
        method: Method,
        url: Url,
        options: &OptionSet,
    ) -> Result<TransportResponse>;

    /// Send a request and expose the response body as a chunk stream.
    async fn stream(&self, method: Method, url: Url, options: &OptionSet) -> Result<ByteStream>;

    /// Drop any per-connection state the transport may hold.
    ///
    /// Default is a no-op; wrappers forward this unchanged.
    fn reset(&self) {}
}
