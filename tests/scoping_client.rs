//! End-to-end scoping behavior against an in-memory transport.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{stream, StreamExt};
use http::Method;
use scoped_http::{
    ByteStream, Error, MergeSet, OptionSet, Params, Result, RuleSet, ScopingClient, Transport,
    TransportResponse,
};
use serde_json::json;
use std::sync::Mutex;
use url::Url;

/// Records every request it receives and answers 200 with an empty body.
#[derive(Default)]
struct RecordingTransport {
    requests: Mutex<Vec<(Method, Url, OptionSet)>>,
    resets: Mutex<u32>,
}

impl RecordingTransport {
    fn last_request(&self) -> (Method, Url, OptionSet) {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn send(
        &self,
        method: Method,
        url: Url,
        options: &OptionSet,
    ) -> Result<TransportResponse> {
        self.requests
            .lock()
            .unwrap()
            .push((method, url, options.clone()));
        Ok(TransportResponse {
            status: 200,
            headers: Params::new(),
            body: Bytes::new(),
        })
    }

    async fn stream(&self, method: Method, url: Url, options: &OptionSet) -> Result<ByteStream> {
        self.requests
            .lock()
            .unwrap()
            .push((method, url, options.clone()));
        Ok(stream::iter(vec![Ok(Bytes::from_static(b"chunk"))]).boxed())
    }

    fn reset(&self) {
        *self.resets.lock().unwrap() += 1;
    }
}

fn default_rules() -> RuleSet {
    RuleSet::new(vec![
        (
            ".*/foo-bar".to_string(),
            OptionSet::new()
                .with_headers(Params::from_pairs([("X-FooBar", "unit-test-foo-bar")]))
                .with_query(Params::from_pairs([
                    ("abc", "def"),
                    ("ghi", "jkl"),
                    ("sdf", "s1"),
                ]))
                .with_json(json!({"qqq": "rrr"})),
        ),
        (
            ".*".to_string(),
            OptionSet::new()
                .with_headers(Params::from_pairs([("Content-Type", "text/html")]))
                .with_query(Params::from_pairs([
                    ("abc", "ydp"),
                    ("ghi", "jkl"),
                    ("sdf", "fgo"),
                ])),
        ),
    ])
    .unwrap()
}

fn request_query() -> Params {
    Params::from_pairs([("ffff", "gg"), ("ghi", "dddd")])
}

fn query_pairs(options: &OptionSet) -> Vec<(&str, &str)> {
    options.query.as_ref().unwrap().iter().collect()
}

#[tokio::test]
async fn specific_rule_query_merged_with_request_winning_per_key() {
    let client = ScopingClient::new(
        RecordingTransport::default(),
        default_rules(),
        MergeSet::query(),
    );

    client
        .request(
            Method::GET,
            "http://example.com/foo-bar",
            OptionSet::new().with_query(request_query()),
        )
        .await
        .unwrap();

    let (_, url, options) = client_transport(&client).last_request();
    assert_eq!(
        query_pairs(&options),
        vec![
            ("abc", "def"),
            ("ghi", "dddd"),
            ("sdf", "s1"),
            ("ffff", "gg"),
        ]
    );
    assert_eq!(url.query(), Some("abc=def&ghi=dddd&sdf=s1&ffff=gg"));
}

#[tokio::test]
async fn general_rule_applies_when_specific_does_not_match() {
    let client = ScopingClient::new(
        RecordingTransport::default(),
        default_rules(),
        MergeSet::query(),
    );

    client
        .request(
            Method::GET,
            "http://example.com/bar-foo",
            OptionSet::new().with_query(request_query()),
        )
        .await
        .unwrap();

    let (_, url, options) = client_transport(&client).last_request();
    assert_eq!(
        query_pairs(&options),
        vec![
            ("abc", "ydp"),
            ("ghi", "dddd"),
            ("sdf", "fgo"),
            ("ffff", "gg"),
        ]
    );
    assert_eq!(url.query(), Some("abc=ydp&ghi=dddd&sdf=fgo&ffff=gg"));
}

#[tokio::test]
async fn unlisted_json_category_is_request_verbatim() {
    let client = ScopingClient::new(
        RecordingTransport::default(),
        default_rules(),
        MergeSet::query(),
    );

    client
        .request(
            Method::GET,
            "http://example.com/foo-bar",
            OptionSet::new()
                .with_json(json!({"url": "http://example.com"}))
                .with_query(request_query()),
        )
        .await
        .unwrap();

    let (_, _, options) = client_transport(&client).last_request();
    // The matched rule defines a json default, but json is not merged.
    assert_eq!(options.json, Some(json!({"url": "http://example.com"})));
}

#[tokio::test]
async fn headers_base_defaulted_and_overridable() {
    let client = ScopingClient::new(
        RecordingTransport::default(),
        default_rules(),
        MergeSet::query(),
    );

    client
        .request(
            Method::GET,
            "http://example.com/bar-foo",
            OptionSet::new().with_headers(Params::from_pairs([("X-FooBar", "unit-test")])),
        )
        .await
        .unwrap();

    let (_, _, options) = client_transport(&client).last_request();
    let headers = options.headers.as_ref().unwrap();
    assert_eq!(headers.get("Content-Type"), Some("text/html"));
    assert_eq!(headers.get("X-FooBar"), Some("unit-test"));
}

#[tokio::test]
async fn base_uri_scoping_resolves_relative_urls_and_merges_defaults() {
    let client = ScopingClient::for_base_uri(
        RecordingTransport::default(),
        "https://api.example.com/v2/",
        OptionSet::new().with_query(Params::from_pairs([("apikey", "k")])),
    )
    .unwrap()
    .with_merge(MergeSet::query());

    client
        .request(Method::GET, "users/42", OptionSet::new())
        .await
        .unwrap();

    let (_, url, options) = client_transport(&client).last_request();
    assert_eq!(url.as_str(), "https://api.example.com/v2/users/42?apikey=k");
    assert_eq!(options.query.as_ref().unwrap().get("apikey"), Some("k"));
}

#[tokio::test]
async fn absolute_url_outside_base_gets_no_defaults() {
    let client = ScopingClient::for_base_uri(
        RecordingTransport::default(),
        "https://api.example.com/v2/",
        OptionSet::new().with_query(Params::from_pairs([("apikey", "k")])),
    )
    .unwrap()
    .with_merge(MergeSet::query());

    client
        .request(Method::GET, "https://other.example.com/x", OptionSet::new())
        .await
        .unwrap();

    let (_, url, options) = client_transport(&client).last_request();
    assert_eq!(url.as_str(), "https://other.example.com/x");
    assert!(options.query.is_none());
}

#[tokio::test]
async fn relative_url_without_fallback_is_an_error() {
    let client = ScopingClient::new(
        RecordingTransport::default(),
        default_rules(),
        MergeSet::query(),
    );

    let err = client
        .request(Method::GET, "users/42", OptionSet::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UrlResolve { .. }));
}

#[tokio::test]
async fn stream_and_reset_are_forwarded() {
    let client = ScopingClient::new(
        RecordingTransport::default(),
        default_rules(),
        MergeSet::query(),
    );

    let mut body = client
        .stream(Method::GET, "http://example.com/foo-bar", OptionSet::new())
        .await
        .unwrap();
    let chunk = body.next().await.unwrap().unwrap();
    assert_eq!(&chunk[..], b"chunk");

    client.reset();
    assert_eq!(*client_transport(&client).resets.lock().unwrap(), 1);

    // Streaming requests are shaped like buffered ones.
    let (_, url, _) = client_transport(&client).last_request();
    assert_eq!(url.query(), Some("abc=def&ghi=jkl&sdf=s1"));
}

/// The transports above are owned by the client; tests reach back in through
/// this helper to assert on what was recorded.
fn client_transport<'a>(
    client: &'a ScopingClient<RecordingTransport>,
) -> &'a RecordingTransport {
    client.transport()
}
