//! Inbound request type handed to lambdo functions.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// HTTP method enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    /// Any other method (`TRACE`, `CONNECT`, extensions), kept verbatim.
    Other(String),
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
            Method::Patch => write!(f, "PATCH"),
            Method::Head => write!(f, "HEAD"),
            Method::Options => write!(f, "OPTIONS"),
            Method::Other(method) => f.write_str(method),
        }
    }
}

impl From<&hyper::Method> for Method {
    fn from(method: &hyper::Method) -> Self {
        match *method {
            hyper::Method::GET => Method::Get,
            hyper::Method::POST => Method::Post,
            hyper::Method::PUT => Method::Put,
            hyper::Method::DELETE => Method::Delete,
            hyper::Method::PATCH => Method::Patch,
            hyper::Method::HEAD => Method::Head,
            hyper::Method::OPTIONS => Method::Options,
            _ => Method::Other(method.as_str().to_string()),
        }
    }
}

/// Request context for a single function invocation.
///
/// Built by the server from the inbound HTTP request. `params` carries the
/// path parameters captured by the route (the function `name`), `query` the
/// decoded query string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LambdoRequest {
    /// HTTP method.
    pub method: Method,
    /// Request path, without the query string.
    pub path: String,
    /// Decoded query parameters. Repeated keys keep the last value.
    pub query: HashMap<String, String>,
    /// HTTP headers, keyed by lowercase name.
    pub headers: HashMap<String, String>,
    /// Path parameters captured by the router.
    pub params: HashMap<String, String>,
    /// Request body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Bytes>,
}

impl LambdoRequest {
    /// Create a new request.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: HashMap::new(),
            headers: HashMap::new(),
            params: HashMap::new(),
            body: None,
        }
    }

    /// Add a header. Names are stored lowercase.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key: String = key.into();
        self.headers.insert(key.to_ascii_lowercase(), value.into());
        self
    }

    /// Add a query parameter.
    pub fn query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Add a path parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set the request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Get a header value (case-insensitive).
    pub fn get_header(&self, key: &str) -> Option<&String> {
        self.headers.get(&key.to_ascii_lowercase())
    }

    /// Get a query parameter.
    pub fn get_query(&self, key: &str) -> Option<&String> {
        self.query.get(key)
    }

    /// Get a path parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Get the body as text if present.
    pub fn text(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).to_string())
    }

    /// Parse the body as JSON if present.
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T, serde_json::Error>> {
        self.body
            .as_ref()
            .map(|b| serde_json::from_slice(b))
    }
}

impl Default for LambdoRequest {
    fn default() -> Self {
        Self::new(Method::Get, "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_are_case_insensitive() {
        let request = LambdoRequest::new(Method::Post, "/functions/echo")
            .header("X-Name", "lambdo");

        assert_eq!(request.get_header("x-name"), Some(&"lambdo".to_string()));
        assert_eq!(request.get_header("X-NAME"), Some(&"lambdo".to_string()));
    }

    #[test]
    fn test_params_and_query() {
        let request = LambdoRequest::new(Method::Post, "/functions/echo")
            .with_param("name", "echo")
            .query_param("k", "v");

        assert_eq!(request.param("name"), Some("echo"));
        assert_eq!(request.param("other"), None);
        assert_eq!(request.get_query("k"), Some(&"v".to_string()));
    }

    #[test]
    fn test_json_body() {
        let request = LambdoRequest::default().body(r#"{"count": 3}"#);
        let value: serde_json::Value = request.json().unwrap().unwrap();
        assert_eq!(value["count"], 3);

        assert!(LambdoRequest::default().json::<serde_json::Value>().is_none());
    }

    #[test]
    fn test_method_from_hyper() {
        assert_eq!(Method::from(&hyper::Method::DELETE), Method::Delete);
        assert_eq!(
            Method::from(&hyper::Method::TRACE),
            Method::Other("TRACE".to_string())
        );

        let custom = hyper::Method::from_bytes(b"PURGE").unwrap();
        let method = Method::from(&custom);
        assert_eq!(method, Method::Other("PURGE".to_string()));
        assert_eq!(method.to_string(), "PURGE");
    }
}
