//! The scoping client: URL resolution, rule lookup, option merging, and
//! delegation to the wrapped transport.

use crate::error::{Error, Result};
use crate::options::{MergeSet, OptionSet, Params};
use crate::scope::merge::{merge_default_options, merge_headers};
use crate::scope::rules::RuleSet;
use crate::transport::{ByteStream, Transport, TransportResponse};
use http::Method;
use url::Url;

/// An HTTP client wrapper that injects URL-scoped default options.
///
/// Per request, the client:
///
/// 1. resolves the request URL to an absolute one (joining against an
///    explicit `base_uri` option, or against the fallback rule's base when
///    the URL is relative and no base exists),
/// 2. folds the caller's explicit query into the URL,
/// 3. finds the first matching pattern rule,
/// 4. merges the matched defaults into the request options per the
///    configured [`MergeSet`],
/// 5. delegates the send to the wrapped [`Transport`].
///
/// The client holds no mutable state; one instance can serve concurrent
/// requests.
///
/// # Examples
///
/// ```ignore
/// use scoped_http::{MergeSet, OptionSet, Params, ReqwestTransport, RuleSet, ScopingClient};
/// use http::Method;
///
/// let rules = RuleSet::new(vec![
///     (".*/admin/".to_string(), OptionSet::new()
///         .with_headers(Params::from_pairs([("X-Role", "admin")]))),
/// ])?;
/// let client = ScopingClient::new(ReqwestTransport::new(), rules, MergeSet::query());
/// let response = client
///     .request(Method::GET, "https://example.com/admin/users", OptionSet::new())
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct ScopingClient<T> {
    transport: T,
    rules: RuleSet,
    merge: MergeSet,
}

impl<T> ScopingClient<T> {
    /// Wrap a transport with an ordered rule set and merge configuration.
    pub fn new(transport: T, rules: RuleSet, merge: MergeSet) -> Self {
        ScopingClient {
            transport,
            rules,
            merge,
        }
    }

    /// Convenience constructor scoping all defaults to one literal base URL.
    ///
    /// Derives an escaped prefix pattern from `base_uri` (see
    /// [`RuleSet::for_base_uri`]) and designates the single rule as the
    /// fallback for relative request URLs. Merging starts at
    /// [`MergeSet::none`]; use [`with_merge`](Self::with_merge) to widen it.
    pub fn for_base_uri(transport: T, base_uri: &str, defaults: OptionSet) -> Result<Self> {
        Ok(ScopingClient {
            transport,
            rules: RuleSet::for_base_uri(base_uri, defaults)?,
            merge: MergeSet::none(),
        })
    }

    /// Replace the merge-category configuration.
    pub fn with_merge(mut self, merge: MergeSet) -> Self {
        self.merge = merge;
        self
    }

    /// The configured rule set.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// The wrapped transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolve, match, and merge without sending.
    ///
    /// Returns the absolute URL (with the effective query folded in) and the
    /// effective option set that would be handed to the transport.
    pub fn prepare(&self, url: &str, mut options: OptionSet) -> Result<(Url, OptionSet)> {
        let resolved = self.resolve(url, &mut options)?;

        // Working query: pairs already in the URL literal, overridden by the
        // caller's explicit query option. Explicit query always lands in the
        // URL, independent of the merge configuration.
        let mut working = Params::new();
        for (key, value) in resolved.query_pairs() {
            working.insert(key.as_ref(), value.as_ref());
        }
        if let Some(query) = &options.query {
            for (key, value) in query.iter() {
                working.insert(key, value);
            }
        }

        let mut url = resolved;
        set_query(&mut url, &working);
        options.query = if working.is_empty() {
            None
        } else {
            Some(working)
        };

        let effective = match self.rules.first_match(url.as_str()) {
            Some(rule) => {
                tracing::debug!(pattern = rule.pattern(), url = %url, "scoping rule matched");
                merge_default_options(&options, rule.options(), self.merge)
            }
            None => {
                tracing::debug!(url = %url, "no scoping rule matched");
                options
            }
        };

        if let Some(query) = &effective.query {
            set_query(&mut url, query);
        }

        Ok((url, effective))
    }

    fn resolve(&self, url: &str, options: &mut OptionSet) -> Result<Url> {
        if let Some(base) = options.base_uri.clone() {
            let base = parse_url(&base)?;
            return base.join(url).map_err(|source| Error::UrlParse {
                url: url.to_string(),
                source,
            });
        }

        match Url::parse(url) {
            Ok(absolute) => Ok(absolute),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let fallback = self.rules.fallback().ok_or_else(|| Error::UrlResolve {
                    url: url.to_string(),
                })?;
                // A relative URL with no base adopts the fallback rule's
                // options wholesale (query excluded, as always for
                // base defaults).
                *options = adopt_defaults(options, fallback.options());
                let base = options.base_uri.clone().ok_or_else(|| Error::UrlResolve {
                    url: url.to_string(),
                })?;
                parse_url(&base)?.join(url).map_err(|source| Error::UrlParse {
                    url: url.to_string(),
                    source,
                })
            }
            Err(source) => Err(Error::UrlParse {
                url: url.to_string(),
                source,
            }),
        }
    }
}

impl<T: Transport> ScopingClient<T> {
    /// Shape and send a request through the wrapped transport.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        options: OptionSet,
    ) -> Result<TransportResponse> {
        let (url, options) = self.prepare(url, options)?;
        self.transport.send(method, url, &options).await
    }

    /// Streaming variant of [`request`](Self::request); forwarded to the
    /// transport unchanged after option shaping.
    pub async fn stream(
        &self,
        method: Method,
        url: &str,
        options: OptionSet,
    ) -> Result<ByteStream> {
        let (url, options) = self.prepare(url, options)?;
        self.transport.stream(method, url, &options).await
    }

    /// Forward a reset to the wrapped transport.
    pub fn reset(&self) {
        self.transport.reset();
    }
}

/// Base-default application of a full option set: the request wins wherever
/// it defines a category, headers are merged name-wise, and `query` is never
/// inherited.
fn adopt_defaults(request: &OptionSet, defaults: &OptionSet) -> OptionSet {
    OptionSet {
        query: request.query.clone(),
        body: request.body.clone().or_else(|| defaults.body.clone()),
        json: request.json.clone().or_else(|| defaults.json.clone()),
        headers: merge_headers(request.headers.as_ref(), defaults.headers.as_ref()),
        base_uri: request
            .base_uri
            .clone()
            .or_else(|| defaults.base_uri.clone()),
    }
}

fn parse_url(url: &str) -> Result<Url> {
    Url::parse(url).map_err(|source| Error::UrlParse {
        url: url.to_string(),
        source,
    })
}

fn set_query(url: &mut Url, params: &Params) {
    if params.is_empty() {
        url.set_query(None);
        return;
    }
    let mut pairs = url.query_pairs_mut();
    pairs.clear();
    for (key, value) in params.iter() {
        pairs.append_pair(key, value);
    }
}
