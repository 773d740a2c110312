use std::collections::BTreeMap;
use std::fmt;

use bytes::Bytes;
use http::{HeaderMap, Method, Version};
use serde::Serialize;
use url::Url;

/// Well-known media types for the `Content-Type` header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentType {
    ApplicationJson,
    ApplicationXml,
    ApplicationXProtobuffer,
    ApplicationFormUrlEncoded,
    TextPlain,
    TextXml,
    TextHtml,
    ImageJpeg,
    ImagePng,
    ImageGif,
    ImageBmp,
    ImageTiff,
    ImageSvg,
    ImageVndWapWbmp,
    ImageWebp,
    MultipartFormData,
    TextCss,
    TextJavaScript,
    Custom(String),
}

impl ContentType {
    pub fn as_str(&self) -> &str {
        match self {
            ContentType::ApplicationJson => "application/json",
            ContentType::ApplicationXml => "application/xml",
            ContentType::ApplicationXProtobuffer => "application/x-protobuffer",
            ContentType::ApplicationFormUrlEncoded => "application/x-www-form-urlencoded",
            ContentType::TextPlain => "text/plain",
            ContentType::TextXml => "text/xml",
            ContentType::TextHtml => "text/html",
            ContentType::ImageJpeg => "image/jpeg",
            ContentType::ImagePng => "image/png",
            ContentType::ImageGif => "image/gif",
            ContentType::ImageBmp => "image/bmp",
            ContentType::ImageTiff => "image/tiff",
            ContentType::ImageSvg => "image/svg+xml",
            ContentType::ImageVndWapWbmp => "image/vnd.wap.wbmp",
            ContentType::ImageWebp => "image/webp",
            ContentType::MultipartFormData => "multipart/form-data",
            ContentType::TextCss => "text/css",
            ContentType::TextJavaScript => "text/javascript",
            ContentType::Custom(value) => value,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Caller-side description of one HTTP call.
///
/// # Examples
///
/// ```
/// use pulith_net::{ContentType, RequestConfig};
/// use http::Method;
///
/// let config = RequestConfig::new("https://api.example.com/items")
///     .method(Method::POST)
///     .auth_token("secret")
///     .content_type(ContentType::ApplicationJson)
///     .body(r#"{"name":"demo"}"#);
/// ```
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Absolute URL of the resource.
    pub url: String,

    /// HTTP method.
    ///
    /// Default: GET
    pub method: Method,

    /// Credential sent as `Authorization: <auth_type> <auth_token>`.
    pub auth_token: Option<String>,

    /// Authorization scheme. `Bearer` when absent.
    pub auth_type: Option<String>,

    pub referer: Option<String>,

    pub accept: Option<String>,

    pub accept_encoding: Option<String>,

    pub user_agent: Option<String>,

    /// Only sent when `body` is present.
    pub content_type: Option<ContentType>,

    pub body: Option<Bytes>,

    /// Route this request through a proxy.
    pub proxy: Option<Url>,

    /// Per-request options carried on the request but never sent on the wire.
    pub properties: BTreeMap<String, String>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: Method::GET,
            auth_token: None,
            auth_type: None,
            referer: None,
            accept: None,
            accept_encoding: None,
            user_agent: None,
            content_type: None,
            body: None,
            proxy: None,
            properties: BTreeMap::new(),
        }
    }
}

impl RequestConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), ..Self::default() }
    }

    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    #[must_use]
    pub fn auth_type(mut self, scheme: impl Into<String>) -> Self {
        self.auth_type = Some(scheme.into());
        self
    }

    #[must_use]
    pub fn referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    #[must_use]
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    #[must_use]
    pub fn accept_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.accept_encoding = Some(encoding.into());
        self
    }

    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    #[must_use]
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `value` as the JSON body and mark it `application/json`.
    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        Ok(self.body(body).content_type(ContentType::ApplicationJson))
    }

    #[must_use]
    pub fn proxy(mut self, proxy: Url) -> Self {
        self.proxy = Some(proxy);
        self
    }

    #[must_use]
    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// A fully assembled request, independent of the transport.
///
/// Requests are single-use per attempt: the pipeline sends a clone for every
/// attempt, carrying the same method, URL, version, headers, body and
/// properties. The body is reference counted, so cloning never copies it.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub version: Version,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
    pub proxy: Option<Url>,
    pub properties: BTreeMap<String, String>,
}

impl HttpRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            version: Version::default(),
            headers: HeaderMap::new(),
            body: None,
            proxy: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn get(url: Url) -> Self { Self::new(Method::GET, url) }

    pub fn head(url: Url) -> Self { Self::new(Method::HEAD, url) }

    /// Header value as text, if present and visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}
