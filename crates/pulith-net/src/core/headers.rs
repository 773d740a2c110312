use http::header::{
    ACCEPT, ACCEPT_ENCODING, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue,
    REFERER, USER_AGENT,
};
use url::Url;

use crate::data::{HttpRequest, RequestConfig};
use crate::error::HttpError;

const DEFAULT_AUTH_TYPE: &str = "Bearer";

/// Assemble the request described by `config`.
///
/// Headers are attached only for fields that are present. `Content-Type` is
/// only attached when there is a body to describe.
///
/// # Examples
///
/// ```
/// use pulith_net::RequestConfig;
/// use pulith_net::core::build_request;
///
/// let config = RequestConfig::new("https://example.com/api").auth_token("abc");
/// let request = build_request(&config).unwrap();
///
/// assert_eq!(request.header("authorization"), Some("Bearer abc"));
/// ```
pub fn build_request(config: &RequestConfig) -> Result<HttpRequest, HttpError> {
    let url = Url::parse(&config.url)
        .map_err(|e| HttpError::InvalidUrl(format!("{}: {e}", config.url)))?;

    let mut headers = HeaderMap::new();

    if let Some(token) = &config.auth_token {
        let scheme = config.auth_type.as_deref().unwrap_or(DEFAULT_AUTH_TYPE);
        insert(&mut headers, AUTHORIZATION, &format!("{scheme} {token}"))?;
    }

    if let (Some(content_type), Some(_)) = (&config.content_type, &config.body) {
        insert(&mut headers, CONTENT_TYPE, content_type.as_str())?;
    }

    if let Some(referer) = &config.referer {
        Url::parse(referer)
            .map_err(|e| HttpError::InvalidHeader { name: REFERER.to_string(), reason: e.to_string() })?;
        insert(&mut headers, REFERER, referer)?;
    }

    if let Some(accept) = &config.accept {
        insert(&mut headers, ACCEPT, accept)?;
    }

    if let Some(encoding) = &config.accept_encoding {
        insert(&mut headers, ACCEPT_ENCODING, encoding)?;
    }

    if let Some(agent) = &config.user_agent {
        insert(&mut headers, USER_AGENT, agent)?;
    }

    Ok(HttpRequest {
        method: config.method.clone(),
        url,
        version: http::Version::default(),
        headers,
        body: config.body.clone(),
        proxy: config.proxy.clone(),
        properties: config.properties.clone(),
    })
}

fn insert(headers: &mut HeaderMap, name: HeaderName, value: &str) -> Result<(), HttpError> {
    let value = HeaderValue::from_str(value)
        .map_err(|e| HttpError::InvalidHeader { name: name.to_string(), reason: e.to_string() })?;
    headers.insert(name, value);
    Ok(())
}
