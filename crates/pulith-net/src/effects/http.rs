use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::{Stream, TryStreamExt};

use crate::data::{HttpRequest, ResponseHead};
use crate::error::HttpError;

/// A boxed stream type for HTTP response bodies.
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// Response body handed to callers, with transport errors mapped to [`HttpError`].
pub type BodyStream = BoxStream<'static, Result<Bytes, HttpError>>;

/// A response as produced by an [`HttpClient`]: head plus an unread body.
pub struct ClientResponse<E> {
    pub head: ResponseHead,
    pub body: BoxStream<'static, Result<Bytes, E>>,
}

impl<E> ClientResponse<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    pub fn new(head: ResponseHead, body: BoxStream<'static, Result<Bytes, E>>) -> Self {
        Self { head, body }
    }

    /// Detach the body, mapping chunk errors to [`HttpError::Body`].
    pub fn into_body_stream(self) -> BodyStream {
        Box::pin(self.body.map_err(|e| HttpError::Body(Box::new(e))))
    }

    /// Read the remaining body into memory.
    pub async fn collect(self) -> Result<(ResponseHead, Bytes), E> {
        let mut body = self.body;
        let mut buf = Vec::new();
        while let Some(chunk) = body.try_next().await? {
            buf.extend_from_slice(&chunk);
        }
        Ok((self.head, Bytes::from(buf)))
    }
}

/// Asynchronous HTTP transport.
///
/// This trait provides the minimal interface the pipeline needs: send one
/// request, get back the head and a body stream. Implementations handle their
/// own connection management, redirects, TLS and timeouts.
///
/// Every call receives its own [`HttpRequest`]; implementations may consume it.
///
/// # Implementations
///
/// - [`ReqwestClient`]: Production implementation using `reqwest`
/// - Mock implementations for testing
pub trait HttpClient: Send + Sync {
    /// Transport-level failure (connection refused, DNS, TLS, reset).
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send `request` and return once the response head has arrived.
    ///
    /// A non-2xx status is a successful call; only transport failures are
    /// reported as errors.
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<ClientResponse<Self::Error>, Self::Error>> + Send;
}

impl<C: HttpClient> HttpClient for &C {
    type Error = C::Error;

    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<ClientResponse<Self::Error>, Self::Error>> + Send {
        (**self).execute(request)
    }
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::time::Duration;

    use hyper::ext::ReasonPhrase;
    use reqwest::{Client, ClientBuilder, Proxy};
    use url::Url;

    use super::*;
    use crate::error::ClientSettingsError;

    /// Transport-wide client configuration.
    #[derive(Debug, Clone, Default)]
    pub struct ClientSettings {
        /// Proxies for every request. `https` proxies handle HTTPS traffic,
        /// the rest handle plain HTTP.
        pub proxies: Option<Vec<Url>>,
        /// Total time allowed per request.
        pub timeout: Option<Duration>,
        pub connect_timeout: Option<Duration>,
        pub user_agent: Option<String>,
    }

    impl ClientSettings {
        #[must_use]
        pub fn proxy(mut self, proxy: Url) -> Self {
            self.proxies.get_or_insert_with(Vec::new).push(proxy);
            self
        }

        #[must_use]
        pub fn timeout(mut self, timeout: Duration) -> Self {
            self.timeout = Some(timeout);
            self
        }

        #[must_use]
        pub fn connect_timeout(mut self, timeout: Duration) -> Self {
            self.connect_timeout = Some(timeout);
            self
        }

        #[must_use]
        pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
            self.user_agent = Some(agent.into());
            self
        }

        pub fn build(&self) -> Result<Client, ClientSettingsError> {
            let mut cb = self.builder();

            if let Some(proxies) = &self.proxies {
                let (secure, insecure): (Vec<&Url>, Vec<&Url>) =
                    proxies.iter().partition(|u| u.scheme() == "https");

                for u in secure {
                    cb = cb.proxy(Proxy::https(u.as_str()).map_err(|source| {
                        ClientSettingsError::Proxy { url: u.to_string(), source }
                    })?);
                }

                for u in insecure {
                    cb = cb.proxy(Proxy::http(u.as_str()).map_err(|source| {
                        ClientSettingsError::Proxy { url: u.to_string(), source }
                    })?);
                }
            }

            cb.build().map_err(ClientSettingsError::Build)
        }

        /// Client routing every request through `proxy`, for per-request proxies.
        fn build_proxied(&self, proxy: &Url) -> Result<Client, reqwest::Error> {
            self.builder().proxy(Proxy::all(proxy.as_str())?).build()
        }

        fn builder(&self) -> ClientBuilder {
            let mut cb = Client::builder();
            if let Some(timeout) = self.timeout {
                cb = cb.timeout(timeout);
            }
            if let Some(timeout) = self.connect_timeout {
                cb = cb.connect_timeout(timeout);
            }
            if let Some(agent) = &self.user_agent {
                cb = cb.user_agent(agent.clone());
            }
            cb
        }
    }

    /// Production HTTP client implementation using reqwest.
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client: Client,
        settings: ClientSettings,
    }

    impl ReqwestClient {
        /// Create a new ReqwestClient with default configuration.
        pub fn new() -> Result<Self, ClientSettingsError> { Self::with_settings(ClientSettings::default()) }

        pub fn with_settings(settings: ClientSettings) -> Result<Self, ClientSettingsError> {
            let client = settings.build()?;
            Ok(Self { client, settings })
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn execute(
            &self,
            request: HttpRequest,
        ) -> Result<ClientResponse<Self::Error>, Self::Error> {
            let proxied;
            let client = match &request.proxy {
                Some(proxy) => {
                    proxied = self.settings.build_proxied(proxy)?;
                    &proxied
                }
                None => &self.client,
            };

            let mut builder = client
                .request(request.method, request.url)
                .version(request.version)
                .headers(request.headers);

            if let Some(body) = request.body {
                builder = builder.body(body);
            }

            let response = builder.send().await?;

            let mut head = ResponseHead::new(response.status().as_u16());
            head.version = response.version();
            head.headers = response.headers().clone();
            // Only present when the server's phrase differs from the canonical one.
            if let Some(reason) = response.extensions().get::<ReasonPhrase>() {
                head.reason = String::from_utf8_lossy(reason.as_bytes()).into_owned();
            }

            Ok(ClientResponse::new(head, Box::pin(response.bytes_stream())))
        }
    }

}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::{ClientSettings, ReqwestClient};
