//! Outbound HTTP requests for functions that call other services.

use crate::http::{LambdoResponse, StatusCode};
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::Request;
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Outbound request failure.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    #[error("Invalid URI '{uri}': {source}")]
    InvalidUri {
        uri: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Failed to encode JSON body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Failed to build request: {0}")]
    Build(String),

    #[error("Transport error: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),

    #[error("Failed to read response body: {0}")]
    Body(#[from] hyper::Error),
}

/// Description of an outbound request.
#[derive(Debug, Clone, Default)]
pub struct OutboundRequest {
    /// HTTP method, case-insensitive (e.g. "GET").
    pub method: String,
    /// Absolute URI.
    pub uri: String,
    /// Query parameters appended to the URI.
    pub query: Option<HashMap<String, String>>,
    /// JSON body.
    pub json: Option<serde_json::Value>,
    /// Request headers. Applied last, so they override `Content-Type`.
    pub headers: Option<HashMap<String, String>>,
}

impl OutboundRequest {
    /// Create a request with no query, body, or headers.
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            ..Default::default()
        }
    }

    /// Add a query parameter.
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Set the JSON body.
    pub fn json(mut self, json: serde_json::Value) -> Self {
        self.json = Some(json);
        self
    }

    /// Add a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Assemble the hyper request without sending it.
    pub fn build(&self) -> Result<Request<Full<Bytes>>, ClientError> {
        let method = hyper::Method::from_bytes(self.method.to_ascii_uppercase().as_bytes())
            .map_err(|_| ClientError::InvalidMethod(self.method.clone()))?;

        let mut url = Url::parse(&self.uri).map_err(|source| ClientError::InvalidUri {
            uri: self.uri.clone(),
            source,
        })?;

        if let Some(query) = self.query.as_ref().filter(|q| !q.is_empty()) {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        let body = match &self.json {
            Some(json) => Bytes::from(serde_json::to_vec(json)?),
            None => Bytes::new(),
        };

        let mut request = Request::builder()
            .method(method)
            .uri(url.as_str())
            .body(Full::new(body))
            .map_err(|e| ClientError::Build(e.to_string()))?;

        if self.json.is_some() {
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        if let Some(headers) = &self.headers {
            for (key, value) in headers {
                let name = HeaderName::from_bytes(key.as_bytes())
                    .map_err(|_| ClientError::InvalidHeader(key.clone()))?;
                let value = HeaderValue::from_str(value)
                    .map_err(|_| ClientError::InvalidHeader(key.clone()))?;
                request.headers_mut().insert(name, value);
            }
        }

        Ok(request)
    }
}

/// HTTP client for outbound calls. Cheap to clone; clones share a pool.
///
/// Speaks both `http://` and `https://`; TLS certificates are checked against
/// the bundled webpki roots.
#[derive(Clone)]
pub struct HttpClient {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl HttpClient {
    /// Create a new client.
    pub fn new() -> Self {
        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .build();

        Self {
            inner: Client::builder(TokioExecutor::new()).build(connector),
        }
    }

    /// Build and send a request, returning the full response.
    pub async fn request(
        &self,
        uri: &str,
        method: &str,
        query: Option<HashMap<String, String>>,
        json: Option<serde_json::Value>,
        headers: Option<HashMap<String, String>>,
    ) -> Result<LambdoResponse, ClientError> {
        self.send(OutboundRequest {
            method: method.to_string(),
            uri: uri.to_string(),
            query,
            json,
            headers,
        })
        .await
    }

    /// Send a prepared request, returning the full response.
    pub async fn send(&self, outbound: OutboundRequest) -> Result<LambdoResponse, ClientError> {
        let request = outbound.build()?;
        debug!("Outbound {} {}", request.method(), request.uri());

        let response = self.inner.request(request).await?;
        let (parts, body) = response.into_parts();
        let body = body.collect().await?.to_bytes();

        let mut headers = HashMap::new();
        for (name, value) in &parts.headers {
            if let Ok(v) = value.to_str() {
                headers.insert(name.as_str().to_string(), v.to_string());
            }
        }

        debug!("Outbound response: {}", parts.status);

        Ok(LambdoResponse {
            status: StatusCode(parts.status.as_u16()),
            headers,
            body: if body.is_empty() { None } else { Some(body) },
        })
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_of(request: Request<Full<Bytes>>) -> Bytes {
        request.into_body().collect().await.unwrap().to_bytes()
    }

    #[tokio::test]
    async fn test_build_with_query() {
        let request = OutboundRequest::new("GET", "http://x/y")
            .query_param("k", "v")
            .build()
            .unwrap();

        assert_eq!(request.method(), hyper::Method::GET);
        assert_eq!(request.uri().path(), "/y");
        assert!(request.uri().query().unwrap().contains("k=v"));
        assert!(body_of(request).await.is_empty());
    }

    #[tokio::test]
    async fn test_build_with_json_body() {
        let json = serde_json::json!({ "name": "lambdo", "tags": [1, 2] });
        let request = OutboundRequest::new("post", "http://x/y")
            .json(json.clone())
            .build()
            .unwrap();

        assert_eq!(request.method(), hyper::Method::POST);
        assert_eq!(
            request.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let sent: serde_json::Value = serde_json::from_slice(&body_of(request).await).unwrap();
        assert_eq!(sent, json);
    }

    #[test]
    fn test_build_keeps_existing_query_and_encodes() {
        let request = OutboundRequest::new("GET", "http://x/y?a=1")
            .query_param("q", "a b&c")
            .build()
            .unwrap();

        let query = request.uri().query().unwrap();
        assert!(query.starts_with("a=1&"));
        assert!(query.contains("q=a+b%26c"));
    }

    #[test]
    fn test_build_headers_override_content_type() {
        let request = OutboundRequest::new("PUT", "http://x/y")
            .json(serde_json::json!({}))
            .header("Content-Type", "application/vnd.api+json")
            .header("X-Trace", "abc")
            .build()
            .unwrap();

        assert_eq!(
            request.headers().get(CONTENT_TYPE).unwrap(),
            "application/vnd.api+json"
        );
        assert_eq!(request.headers().get("x-trace").unwrap(), "abc");
    }

    #[test]
    fn test_build_errors() {
        assert!(matches!(
            OutboundRequest::new("NOT A METHOD", "http://x/y").build(),
            Err(ClientError::InvalidMethod(_))
        ));
        assert!(matches!(
            OutboundRequest::new("GET", "not a uri").build(),
            Err(ClientError::InvalidUri { .. })
        ));
        assert!(matches!(
            OutboundRequest::new("GET", "http://x/y")
                .header("bad header", "v")
                .build(),
            Err(ClientError::InvalidHeader(_))
        ));
    }

    #[tokio::test]
    async fn test_https_uri_reaches_connect() {
        // Nothing listens on port 1; the failure must come from connecting,
        // not from the scheme being refused.
        let err = HttpClient::new()
            .send(OutboundRequest::new("GET", "https://127.0.0.1:1/"))
            .await
            .unwrap_err();

        let ClientError::Transport(transport) = err else {
            panic!("expected a transport error, got {:?}", err);
        };
        assert!(transport.is_connect());
        assert!(!format!("{:?}", transport).contains("scheme is not http"));
    }
}
