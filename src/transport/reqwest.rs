//! `reqwest`-backed [`Transport`] implementation.
//!
//! A thin binding: headers and bodies from the effective [`OptionSet`] are
//! applied to a `reqwest::RequestBuilder`, network failures are mapped to
//! [`Error::Transport`], and nothing else is interpreted. Query parameters
//! are not applied here; the scoping client folds the effective query into
//! the URL before delegating.

use crate::error::{Error, Result};
use crate::options::{BodyValue, OptionSet, Params};
use crate::transport::{ByteStream, Transport, TransportResponse};
use async_trait::async_trait;
use futures::StreamExt;
use http::Method;
use url::Url;

/// [`Transport`] adapter over a shared `reqwest::Client`.
///
/// Cloning is cheap; the underlying connection pool is shared.
///
/// # Examples
///
/// ```
/// use scoped_http::ReqwestTransport;
///
/// let transport = ReqwestTransport::new();
/// let _custom = ReqwestTransport::with_client(reqwest::Client::new());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create an adapter with a default `reqwest::Client`.
    pub fn new() -> Self {
        ReqwestTransport {
            client: reqwest::Client::new(),
        }
    }

    /// Create an adapter over an existing client (shared pool, custom TLS,
    /// proxies, timeouts).
    pub fn with_client(client: reqwest::Client) -> Self {
        ReqwestTransport { client }
    }

    fn build(&self, method: Method, url: Url, options: &OptionSet) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, url);

        if let Some(headers) = &options.headers {
            for (name, value) in headers.iter() {
                builder = builder.header(name, value);
            }
        }

        // JSON payload takes precedence over a plain body, mirroring the
        // upstream client option semantics.
        if let Some(json) = &options.json {
            builder = builder.json(json);
        } else if let Some(body) = &options.body {
            builder = match body {
                BodyValue::Form(fields) => builder.form(fields),
                BodyValue::Raw(raw) => builder.body(raw.clone()),
            };
        }

        builder
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        method: Method,
        url: Url,
        options: &OptionSet,
    ) -> Result<TransportResponse> {
        let response = self
            .build(method, url, options)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let mut headers = Params::new();
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str(), value);
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }

    async fn stream(&self, method: Method, url: Url, options: &OptionSet) -> Result<ByteStream> {
        let response = self
            .build(method, url, options)
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| Error::Transport(e.to_string())));

        Ok(stream.boxed())
    }
}
