//! HTTP pipeline behavior against scripted transports.

mod common;

use std::time::Duration;

use futures_util::TryStreamExt;
use http::Method;
use pulith_net::core::jitter_ceiling;
use pulith_net::{
    Backoff, ContentType, HttpError, HttpPipeline, Opaque, RequestConfig, RetryPolicy,
};
use serde::Deserialize;

use common::{Reply, ScriptedClient};

#[derive(Debug, Deserialize, PartialEq)]
struct Release {
    name: String,
    version: u32,
}

fn quick(client: &ScriptedClient) -> HttpPipeline<&ScriptedClient> {
    HttpPipeline::with_policy(client, RetryPolicy::fixed().backoff(Backoff::Fixed(Duration::from_millis(10))))
}

#[tokio::test(start_paused = true)]
async fn succeeds_after_transient_failures() {
    let client = ScriptedClient::new(vec![
        Reply::fail("connection reset"),
        Reply::status(503),
        Reply::ok(r#"{"name":"tool","version":3}"#),
    ]);
    let pipeline = HttpPipeline::new(&client);

    let response = pipeline.send::<Release>(&RequestConfig::new("https://example.com/release")).await;

    assert!(response.is_success());
    assert_eq!(client.calls(), 3);
    assert_eq!(response.status(), Some(200));
    assert_eq!(response.body(), Some(&Release { name: "tool".into(), version: 3 }));
}

#[tokio::test(start_paused = true)]
async fn server_faults_exhaust_the_http_policy() {
    let client = ScriptedClient::always(Reply::status(503));
    let pipeline = HttpPipeline::new(&client);

    let response = pipeline.send::<Opaque>(&RequestConfig::new("https://example.com/busy")).await;

    assert!(!response.is_success());
    assert_eq!(client.calls(), 6);
    assert_eq!(response.status(), Some(503));
    assert_eq!(response.error().and_then(HttpError::status), Some(503));

    let median = Duration::from_secs(1);
    let gaps = client.gaps();
    assert_eq!(gaps.len(), 5);
    for (i, gap) in gaps.iter().enumerate() {
        let n = i as u32 + 1;
        let step = jitter_ceiling(median, n).saturating_sub(jitter_ceiling(median, n - 1));
        assert!(*gap <= step + Duration::from_millis(5), "gap {n} of {gap:?} exceeds {step:?}");
    }

    let waited: Duration = gaps.iter().sum();
    assert!(waited > Duration::ZERO);
    assert!(waited <= jitter_ceiling(median, 5) + Duration::from_millis(10));
}

#[tokio::test(start_paused = true)]
async fn body_cut_off_mid_transfer_is_retried() {
    let client = ScriptedClient::new(vec![
        Reply::interrupted(r#"{"name":"#, "connection reset by peer"),
        Reply::ok(r#"{"name":"tool","version":1}"#),
    ]);
    let pipeline = quick(&client);

    let response = pipeline.send::<Release>(&RequestConfig::new("https://example.com/release")).await;

    assert_eq!(client.calls(), 2);
    assert!(response.is_success());
    assert_eq!(response.body(), Some(&Release { name: "tool".into(), version: 1 }));
}

#[tokio::test(start_paused = true)]
async fn body_failures_exhaust_the_policy() {
    let client = ScriptedClient::always(Reply::interrupted("partial", "connection reset by peer"));
    let pipeline = quick(&client);

    let response = pipeline.send::<Opaque>(&RequestConfig::new("https://example.com")).await;

    assert_eq!(client.calls(), 4);
    assert!(!response.is_success());
    assert_eq!(response.status(), Some(200));
    assert!(matches!(response.error(), Some(HttpError::Body(_))));
    assert!(response.raw().is_none());
}

#[tokio::test(start_paused = true)]
async fn client_faults_are_final() {
    let client = ScriptedClient::always(Reply::status(404).body("missing"));
    let pipeline = HttpPipeline::new(&client);

    let response = pipeline.send::<Opaque>(&RequestConfig::new("https://example.com/nope")).await;

    assert_eq!(client.calls(), 1);
    assert!(!response.is_success());
    assert!(response.raw().is_none());
    assert!(matches!(response.error(), Some(HttpError::Status { status: 404, reason }) if reason == "Not Found"));
}

#[tokio::test(start_paused = true)]
async fn request_timeout_is_retried() {
    let client = ScriptedClient::new(vec![Reply::status(408), Reply::ok("done")]);
    let pipeline = quick(&client);

    let response = pipeline.send::<Opaque>(&RequestConfig::new("https://example.com/slow")).await;

    assert_eq!(client.calls(), 2);
    assert_eq!(response.body().map(|b| &**b), Some("done"));
}

#[tokio::test(start_paused = true)]
async fn transport_failure_is_captured_not_raised() {
    let client = ScriptedClient::always(Reply::fail("dns lookup failed"));
    let pipeline = quick(&client);

    let response = pipeline.send::<Opaque>(&RequestConfig::new("https://example.com")).await;

    assert_eq!(client.calls(), 4);
    assert!(response.head().is_none());
    assert!(response.request().is_some());
    assert!(matches!(response.error(), Some(HttpError::Transport(_))));
    assert!(response.error().unwrap().to_string().contains("dns lookup failed"));
}

#[tokio::test(start_paused = true)]
async fn every_attempt_sends_an_identical_request() {
    let client = ScriptedClient::new(vec![Reply::status(500), Reply::status(502), Reply::ok("{}")]);
    let pipeline = quick(&client);
    let config = RequestConfig::new("https://example.com/items")
        .method(Method::POST)
        .content_type(ContentType::ApplicationJson)
        .body(r#"{"id":1}"#)
        .auth_token("abc");

    let response = pipeline.send::<Opaque>(&config).await;
    assert!(response.is_success());

    let requests = client.requests();
    assert_eq!(requests.len(), 3);
    for request in &requests {
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.body.as_deref(), Some(&br#"{"id":1}"#[..]));
        assert_eq!(request.header("authorization"), Some("Bearer abc"));
        assert_eq!(request.header("content-type"), Some("application/json"));
    }
}

#[tokio::test]
async fn typed_body_matches_raw_text() {
    let raw = r#"{"name":"tool","version":7}"#;
    let client = ScriptedClient::always(Reply::ok(raw));
    let pipeline = quick(&client);

    let response = pipeline.send::<Release>(&RequestConfig::new("https://example.com")).await;

    let expected: Release = serde_json::from_str(response.raw().unwrap()).unwrap();
    assert_eq!(response.body(), Some(&expected));
    assert_eq!(response.raw(), Some(raw));
    assert_eq!(response.bytes().map(|b| b.len()), Some(raw.len()));
}

#[tokio::test]
async fn malformed_body_is_still_a_success() {
    let client = ScriptedClient::always(Reply::ok("<html>maintenance</html>"));
    let pipeline = quick(&client);

    let response = pipeline.send::<Release>(&RequestConfig::new("https://example.com")).await;

    assert!(response.is_success());
    assert!(response.body().is_none());
    assert_eq!(response.raw(), Some("<html>maintenance</html>"));
    assert_eq!(client.calls(), 1);
}

#[tokio::test]
async fn opaque_body_returns_text_unchanged() {
    let client = ScriptedClient::always(Reply::ok("plain text, not json"));
    let pipeline = quick(&client);

    let response = pipeline.send::<Opaque>(&RequestConfig::new("https://example.com")).await;

    assert_eq!(response.into_body().map(Opaque::into_inner).as_deref(), Some("plain text, not json"));
}

#[tokio::test]
async fn body_stream_can_be_reread() {
    use std::io::Read;

    let client = ScriptedClient::always(Reply::ok("abc"));
    let pipeline = quick(&client);
    let response = pipeline.send::<Opaque>(&RequestConfig::new("https://example.com")).await;

    for _ in 0..2 {
        let mut text = String::new();
        response.stream().unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "abc");
    }
}

#[tokio::test]
async fn invalid_config_never_reaches_the_transport() {
    let client = ScriptedClient::always(Reply::ok(""));
    let pipeline = quick(&client);

    let response = pipeline.send::<Opaque>(&RequestConfig::new("not a url")).await;
    assert!(matches!(response.error(), Some(HttpError::InvalidUrl(_))));
    assert!(response.request().is_none());

    let config = RequestConfig::new("https://example.com").referer("relative/path");
    let response = pipeline.send::<Opaque>(&config).await;
    assert!(matches!(response.error(), Some(HttpError::InvalidHeader { .. })));

    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn get_string_returns_text_on_success() {
    let client = ScriptedClient::always(Reply::ok("hello"));
    let pipeline = quick(&client);

    assert_eq!(pipeline.get_string("https://example.com/greeting").await.as_deref(), Some("hello"));
}

#[tokio::test]
async fn get_string_is_empty_on_failure_without_retrying() {
    let client = ScriptedClient::always(Reply::status(500).body("boom"));
    let pipeline = quick(&client);
    assert_eq!(pipeline.get_string("https://example.com").await, None);
    assert_eq!(client.calls(), 1);

    let refused = ScriptedClient::always(Reply::fail("refused"));
    assert_eq!(quick(&refused).get_string("https://example.com").await, None);
    assert_eq!(quick(&refused).get_string("::").await, None);
}

#[tokio::test]
async fn get_stream_hands_back_the_body() {
    let client = ScriptedClient::always(Reply::ok("streamed"));
    let pipeline = quick(&client);

    let result = pipeline.get_stream("https://example.com/file").await;
    assert!(result.is_success());

    let chunks: Vec<_> = result.result.unwrap().try_collect().await.unwrap();
    assert_eq!(chunks.concat(), b"streamed");
}

#[tokio::test]
async fn get_stream_captures_failures() {
    let client = ScriptedClient::always(Reply::status(403));
    let result = quick(&client).get_stream("https://example.com/secret").await;
    assert!(result.result.is_none());
    assert_eq!(result.error.as_ref().and_then(HttpError::status), Some(403));
    assert!(result.request.is_some());

    let refused = ScriptedClient::always(Reply::fail("refused"));
    let result = quick(&refused).get_stream("https://example.com").await;
    assert!(matches!(result.error, Some(HttpError::Transport(_))));
}

#[tokio::test]
async fn content_length_from_head_request() {
    let client = ScriptedClient::always(Reply::status(200).content_length(1000));
    let pipeline = quick(&client);

    assert_eq!(pipeline.content_length("https://example.com/file").await.unwrap(), Some(1000));
    assert_eq!(client.requests()[0].method, Method::HEAD);

    let unknown = ScriptedClient::always(Reply::status(200));
    assert_eq!(quick(&unknown).content_length("https://example.com").await.unwrap(), None);

    let missing = ScriptedClient::always(Reply::status(404));
    assert!(quick(&missing).content_length("https://example.com").await.is_err());
}
