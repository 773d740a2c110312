//! Mock transports shared by the integration tests.

#![allow(dead_code)]

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;
use futures_util::{StreamExt, stream};
use http::Method;
use http::header::{CONTENT_LENGTH, HeaderValue};
use pulith_net::{ClientResponse, HttpClient, HttpRequest, ResponseHead};
use tokio::time::Instant;

#[derive(Debug)]
pub struct TestError(pub String);

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

impl std::error::Error for TestError {}

/// One scripted outcome of [`ScriptedClient::execute`].
#[derive(Debug, Clone)]
pub enum Reply {
    Respond { status: u16, body: Bytes, content_length: Option<u64> },
    /// 200 head, then `partial` and a body error carrying `message`.
    Interrupted { partial: Bytes, message: String },
    Fail(String),
}

impl Reply {
    pub fn ok(body: &str) -> Self { Self::status(200).body(body) }

    pub fn status(status: u16) -> Self {
        Reply::Respond { status, body: Bytes::new(), content_length: None }
    }

    pub fn fail(message: &str) -> Self { Reply::Fail(message.to_owned()) }

    pub fn interrupted(partial: &str, message: &str) -> Self {
        Reply::Interrupted { partial: Bytes::copy_from_slice(partial.as_bytes()), message: message.to_owned() }
    }

    pub fn body(self, text: &str) -> Self {
        match self {
            Reply::Respond { status, content_length, .. } => {
                Reply::Respond { status, body: Bytes::copy_from_slice(text.as_bytes()), content_length }
            }
            fail => fail,
        }
    }

    pub fn content_length(self, len: u64) -> Self {
        match self {
            Reply::Respond { status, body, .. } => Reply::Respond { status, body, content_length: Some(len) },
            fail => fail,
        }
    }
}

/// Replays a script of replies in order; the last one repeats forever.
pub struct ScriptedClient {
    script: Vec<Reply>,
    calls: AtomicUsize,
    requests: Mutex<Vec<(Instant, HttpRequest)>>,
}

impl ScriptedClient {
    pub fn new(script: Vec<Reply>) -> Self {
        assert!(!script.is_empty(), "script needs at least one reply");
        Self { script, calls: AtomicUsize::new(0), requests: Mutex::new(Vec::new()) }
    }

    pub fn always(reply: Reply) -> Self { Self::new(vec![reply]) }

    pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().iter().map(|(_, r)| r.clone()).collect()
    }

    /// Time between consecutive attempts.
    pub fn gaps(&self) -> Vec<Duration> {
        let requests = self.requests.lock().unwrap();
        requests.windows(2).map(|w| w[1].0 - w[0].0).collect()
    }
}

impl HttpClient for ScriptedClient {
    type Error = TestError;

    async fn execute(&self, request: HttpRequest) -> Result<ClientResponse<TestError>, TestError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push((Instant::now(), request));

        match self.script[n.min(self.script.len() - 1)].clone() {
            Reply::Respond { status, body, content_length } => {
                let mut head = ResponseHead::new(status);
                if let Some(len) = content_length {
                    head.headers.insert(CONTENT_LENGTH, HeaderValue::from(len));
                }
                let chunks = stream::iter(vec![Ok::<_, TestError>(body)]);
                Ok(ClientResponse::new(head, Box::pin(chunks)))
            }
            Reply::Interrupted { partial, message } => {
                let chunks = stream::iter(vec![Ok(partial), Err(TestError(message))]);
                Ok(ClientResponse::new(ResponseHead::new(200), Box::pin(chunks)))
            }
            Reply::Fail(message) => Err(TestError(message)),
        }
    }
}

/// Serves a file in fixed-size chunks with a pause before each one.
///
/// HEAD requests report the full size unless `report_length` is off.
pub struct ChunkedFileClient {
    pub chunks: usize,
    pub chunk_size: usize,
    pub delay: Duration,
    pub status: u16,
    pub report_length: bool,
    /// Fail the body when this chunk index is reached.
    pub fail_at: Option<usize>,
    /// Refuse the GET with a transport error.
    pub refuse: bool,
    pub head_calls: AtomicUsize,
}

impl ChunkedFileClient {
    pub fn new(chunks: usize, chunk_size: usize, delay: Duration) -> Self {
        Self {
            chunks,
            chunk_size,
            delay,
            status: 200,
            report_length: true,
            fail_at: None,
            refuse: false,
            head_calls: AtomicUsize::new(0),
        }
    }

    pub fn total(&self) -> u64 { (self.chunks * self.chunk_size) as u64 }
}

impl HttpClient for ChunkedFileClient {
    type Error = TestError;

    async fn execute(&self, request: HttpRequest) -> Result<ClientResponse<TestError>, TestError> {
        if request.method == Method::HEAD {
            self.head_calls.fetch_add(1, Ordering::SeqCst);
            let mut head = ResponseHead::new(self.status);
            if self.report_length {
                head.headers.insert(CONTENT_LENGTH, HeaderValue::from(self.total()));
            }
            return Ok(ClientResponse::new(head, Box::pin(stream::empty())));
        }

        if self.refuse {
            return Err(TestError("connection refused".into()));
        }

        let (size, delay, fail_at) = (self.chunk_size, self.delay, self.fail_at);
        let body = stream::iter(0..self.chunks).then(move |i| async move {
            tokio::time::sleep(delay).await;
            if fail_at == Some(i) {
                Err(TestError("connection reset".into()))
            } else {
                Ok(Bytes::from(vec![b'x'; size]))
            }
        });

        Ok(ClientResponse::new(ResponseHead::new(self.status), Box::pin(body)))
    }
}
