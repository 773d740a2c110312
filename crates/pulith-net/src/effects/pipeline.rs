use bytes::Bytes;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::core::{FromBody, build_request, decode_text, is_retryable_status};
use crate::data::{
    HttpRequest, HttpResponse, HttpResult, Payload, RequestConfig, ResponseHead, RetryPolicy,
};
use crate::effects::http::{BodyStream, HttpClient};
use crate::effects::retry::retry_if;
use crate::effects::DownloadManager;
use crate::error::HttpError;

/// Retrying HTTP front-end over an [`HttpClient`].
///
/// Failures never escape as faults: they are captured in the returned
/// [`HttpResponse`] / [`HttpResult`].
pub struct HttpPipeline<C: HttpClient> {
    client: C,
    policy: RetryPolicy,
}

impl<C: HttpClient> HttpPipeline<C> {
    /// Pipeline using [`RetryPolicy::http`].
    pub fn new(client: C) -> Self { Self::with_policy(client, RetryPolicy::http()) }

    pub fn with_policy(client: C, policy: RetryPolicy) -> Self { Self { client, policy } }

    pub fn client(&self) -> &C { &self.client }

    pub fn policy(&self) -> &RetryPolicy { &self.policy }

    /// Download manager sharing this pipeline's transport.
    pub fn downloader(&self) -> DownloadManager<&C> { DownloadManager::new(&self.client) }

    /// Send the request described by `config`, retrying transient failures.
    ///
    /// Transport faults, 5xx and 408 responses are retried under the
    /// pipeline's policy, each attempt with a fresh copy of the request.
    /// The body is read within the attempt, so a connection lost mid-body
    /// is retried too. Any other non-2xx status is final on the first attempt.
    ///
    /// On success the body is materialized once: `raw` holds the text and
    /// `body` the value decoded from it. A body that does not decode leaves
    /// `body` empty and the response successful.
    #[instrument(skip_all, fields(method = %config.method, url = %config.url))]
    pub async fn send<T: FromBody>(&self, config: &RequestConfig) -> HttpResponse<T> {
        let request = match build_request(config) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "request rejected before sending");
                return HttpResponse::failed(None, None, e);
            }
        };

        let outcome = retry_if(
            &self.policy,
            || exchange(&self.client, request.clone()),
            |outcome| match outcome {
                Ok(Exchange::Complete(..)) => false,
                Ok(Exchange::Status(head)) => is_retryable_status(head.status),
                Ok(Exchange::Interrupted(..)) | Err(_) => true,
            },
        )
        .await;

        match outcome {
            Ok(Exchange::Complete(head, bytes)) => {
                let raw = decode_text(&bytes);
                let body = T::from_body(&raw);
                debug!(status = head.status, len = bytes.len(), "request succeeded");
                HttpResponse::succeeded(request, head, Payload { body, raw, bytes })
            }
            Ok(Exchange::Status(head)) => {
                debug!(status = head.status, "request answered with failure status");
                let error = head.status_error();
                HttpResponse::failed(Some(request), Some(head), error)
            }
            Ok(Exchange::Interrupted(head, e)) => {
                warn!(error = %e, "response body failed after retries");
                HttpResponse::failed(Some(request), Some(head), HttpError::Body(Box::new(e)))
            }
            Err(e) => {
                warn!(error = %e, "request failed after retries");
                HttpResponse::failed(Some(request), None, HttpError::transport(e))
            }
        }
    }

    /// GET `url` once and return the body as text.
    ///
    /// Returns `None` on any failure, including non-2xx statuses.
    pub async fn get_string(&self, url: &str) -> Option<String> {
        let request = parse_get(url).ok()?;

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                debug!(url, error = %e, "get_string transport failure");
                return None;
            }
        };

        if !response.head.is_success() {
            debug!(url, status = response.head.status, "get_string failure status");
            return None;
        }

        match response.collect().await {
            Ok((_, bytes)) => Some(decode_text(&bytes)),
            Err(e) => {
                debug!(url, error = %e, "get_string body failure");
                None
            }
        }
    }

    /// GET `url` once and hand back the unread body.
    ///
    /// The stream is present only for 2xx responses; otherwise `error`
    /// holds the failure.
    pub async fn get_stream(&self, url: &str) -> HttpResult<Option<BodyStream>> {
        let request = match parse_get(url) {
            Ok(request) => request,
            Err(e) => return HttpResult { request: None, result: None, error: Some(e) },
        };

        match self.client.execute(request.clone()).await {
            Ok(response) if response.head.is_success() => HttpResult {
                request: Some(request),
                result: Some(response.into_body_stream()),
                error: None,
            },
            Ok(response) => HttpResult {
                request: Some(request),
                result: None,
                error: Some(response.head.status_error()),
            },
            Err(e) => HttpResult {
                request: Some(request),
                result: None,
                error: Some(HttpError::transport(e)),
            },
        }
    }

    /// Size of the resource at `url` according to a HEAD request.
    ///
    /// `Ok(None)` when the server does not report a length.
    pub async fn content_length(&self, url: &str) -> Result<Option<u64>, HttpError> {
        content_length(&self.client, url).await
    }
}

/// One attempt of [`HttpPipeline::send`], with the body read to the end.
enum Exchange<E> {
    Complete(ResponseHead, Bytes),
    /// Non-2xx status; the body is not read.
    Status(ResponseHead),
    /// The connection failed while the body was arriving.
    Interrupted(ResponseHead, E),
}

async fn exchange<C: HttpClient>(client: &C, request: HttpRequest) -> Result<Exchange<C::Error>, C::Error> {
    let response = client.execute(request).await?;
    if !response.head.is_success() {
        return Ok(Exchange::Status(response.head));
    }

    let head = response.head.clone();
    Ok(match response.collect().await {
        Ok((head, bytes)) => Exchange::Complete(head, bytes),
        Err(e) => {
            debug!(error = %e, "response body interrupted");
            Exchange::Interrupted(head, e)
        }
    })
}

pub(crate) fn parse_url(url: &str) -> Result<Url, HttpError> {
    Url::parse(url).map_err(|e| HttpError::InvalidUrl(format!("{url}: {e}")))
}

fn parse_get(url: &str) -> Result<HttpRequest, HttpError> { parse_url(url).map(HttpRequest::get) }

pub(crate) async fn content_length<C: HttpClient>(client: &C, url: &str) -> Result<Option<u64>, HttpError> {
    let request = HttpRequest::head(parse_url(url)?);
    let response = client.execute(request).await.map_err(HttpError::transport)?;

    if !response.head.is_success() {
        return Err(response.head.status_error());
    }
    Ok(response.head.content_length())
}
