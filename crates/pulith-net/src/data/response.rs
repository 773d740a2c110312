use std::io::Cursor;

use bytes::Bytes;
use http::header::CONTENT_LENGTH;
use http::{HeaderMap, StatusCode, Version};

use crate::core::is_success;
use crate::data::HttpRequest;
use crate::error::HttpError;

/// Status line and headers of a response, without the body.
#[derive(Debug, Clone)]
pub struct ResponseHead {
    pub status: u16,
    /// Reason phrase; the canonical one for the status when the transport
    /// does not expose the server's own.
    pub reason: String,
    pub version: Version,
    pub headers: HeaderMap,
}

impl ResponseHead {
    pub fn new(status: u16) -> Self {
        let reason = StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_owned();

        Self { status, reason, version: Version::default(), headers: HeaderMap::new() }
    }

    pub fn is_success(&self) -> bool { is_success(self.status) }

    /// Parse `Content-Length` from the headers.
    ///
    /// The header is read directly because transports report a zero size
    /// hint for bodiless HEAD responses.
    pub fn content_length(&self) -> Option<u64> {
        self.headers
            .get(CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
    }

    pub(crate) fn status_error(&self) -> HttpError {
        HttpError::Status { status: self.status, reason: self.reason.clone() }
    }
}

/// Materialized body of a successful response.
#[derive(Debug, Clone)]
pub struct Payload<T> {
    /// Typed body. `None` when the text did not deserialize into `T`.
    pub body: Option<T>,
    /// Body decoded as UTF-8 text.
    pub raw: String,
    /// Body bytes as received.
    pub bytes: Bytes,
}

/// Outcome of [`HttpPipeline::send`](crate::HttpPipeline::send).
///
/// Exactly one of the two shapes holds once returned:
/// - success: head with a 2xx status and a [`Payload`]
/// - failure: an [`HttpError`], with the head present only if the server
///   answered
#[derive(Debug)]
pub struct HttpResponse<T> {
    pub(crate) request: Option<HttpRequest>,
    pub(crate) head: Option<ResponseHead>,
    pub(crate) outcome: Result<Payload<T>, HttpError>,
}

impl<T> HttpResponse<T> {
    pub(crate) fn succeeded(request: HttpRequest, head: ResponseHead, payload: Payload<T>) -> Self {
        Self { request: Some(request), head: Some(head), outcome: Ok(payload) }
    }

    pub(crate) fn failed(request: Option<HttpRequest>, head: Option<ResponseHead>, error: HttpError) -> Self {
        Self { request, head, outcome: Err(error) }
    }

    /// The request as built from the config. `None` if the config itself was invalid.
    pub fn request(&self) -> Option<&HttpRequest> { self.request.as_ref() }

    /// The final response head. `None` when no response was received.
    pub fn head(&self) -> Option<&ResponseHead> { self.head.as_ref() }

    pub fn status(&self) -> Option<u16> { self.head.as_ref().map(|h| h.status) }

    pub fn reason(&self) -> Option<&str> { self.head.as_ref().map(|h| h.reason.as_str()) }

    pub fn is_success(&self) -> bool { self.outcome.is_ok() }

    pub fn body(&self) -> Option<&T> { self.outcome.as_ref().ok().and_then(|p| p.body.as_ref()) }

    pub fn raw(&self) -> Option<&str> { self.outcome.as_ref().ok().map(|p| p.raw.as_str()) }

    pub fn bytes(&self) -> Option<&Bytes> { self.outcome.as_ref().ok().map(|p| &p.bytes) }

    /// A fresh reader over the body. Can be taken any number of times.
    pub fn stream(&self) -> Option<Cursor<Bytes>> { self.bytes().map(|b| Cursor::new(b.clone())) }

    pub fn error(&self) -> Option<&HttpError> { self.outcome.as_ref().err() }

    pub fn into_body(self) -> Option<T> { self.outcome.ok().and_then(|p| p.body) }

    pub fn into_result(self) -> Result<Payload<T>, HttpError> { self.outcome }
}

/// Best-effort result: a value that may be empty, plus the captured failure.
pub struct HttpResult<T> {
    pub request: Option<HttpRequest>,
    pub result: T,
    pub error: Option<HttpError>,
}

impl<T> HttpResult<T> {
    pub fn is_success(&self) -> bool { self.error.is_none() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn request() -> HttpRequest { HttpRequest::get(Url::parse("https://example.com").unwrap()) }

    #[test]
    fn head_uses_canonical_reason() {
        assert_eq!(ResponseHead::new(503).reason, "Service Unavailable");
        assert_eq!(ResponseHead::new(404).reason, "Not Found");
        assert_eq!(ResponseHead::new(299).reason, "");
    }

    #[test]
    fn content_length_from_header() {
        let mut head = ResponseHead::new(200);
        assert_eq!(head.content_length(), None);

        head.headers.insert(CONTENT_LENGTH, "1000".parse().unwrap());
        assert_eq!(head.content_length(), Some(1000));
    }

    #[test]
    fn success_exposes_payload() {
        let payload = Payload { body: Some(5_u32), raw: "5".into(), bytes: Bytes::from_static(b"5") };
        let response = HttpResponse::succeeded(request(), ResponseHead::new(200), payload);

        assert!(response.is_success());
        assert_eq!(response.status(), Some(200));
        assert_eq!(response.body(), Some(&5));
        assert_eq!(response.raw(), Some("5"));
        assert!(response.error().is_none());
        assert_eq!(response.stream().unwrap().into_inner(), Bytes::from_static(b"5"));
    }

    #[test]
    fn failure_exposes_error_only() {
        let head = ResponseHead::new(500);
        let err = head.status_error();
        let response: HttpResponse<u32> = HttpResponse::failed(Some(request()), Some(head), err);

        assert!(!response.is_success());
        assert_eq!(response.status(), Some(500));
        assert_eq!(response.reason(), Some("Internal Server Error"));
        assert!(response.body().is_none());
        assert!(response.raw().is_none());
        assert!(response.stream().is_none());
        assert_eq!(response.error().and_then(HttpError::status), Some(500));
    }
}
