//! Function handler trait and error type.

use crate::http::{LambdoRequest, LambdoResponse, Responder, StatusCode};
use async_trait::async_trait;
use std::future::Future;

/// A named request handler that can be registered with a
/// [`FunctionRegistry`](crate::function::FunctionRegistry).
///
/// Any `async fn(LambdoRequest) -> Result<R, LambdoError>` (or closure with
/// the same shape) implements this trait as long as `R` is a [`Responder`].
/// Types that carry state, such as a shared [`HttpClient`](crate::client::HttpClient),
/// can implement it directly.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Handle one invocation.
    async fn handle(&self, request: LambdoRequest) -> Result<LambdoResponse, LambdoError>;
}

#[async_trait]
impl<F, Fut, R> Handler for F
where
    F: Fn(LambdoRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<R, LambdoError>> + Send + 'static,
    R: Responder + Send + 'static,
{
    async fn handle(&self, request: LambdoRequest) -> Result<LambdoResponse, LambdoError> {
        (self)(request).await.map(Responder::into_response)
    }
}

/// Error returned by a function, or by the dispatcher on its behalf.
///
/// The server renders it as a plain-text response carrying `code`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LambdoError {
    /// Error message.
    pub message: String,
    /// HTTP status code.
    pub code: u16,
}

impl LambdoError {
    /// Create a new internal error (500).
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: 500,
        }
    }

    /// Create an error with a specific code.
    pub fn with_code(code: u16, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }

    /// Create a bad request error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_code(400, message)
    }

    /// Create a bad gateway error, for failed outbound calls.
    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self::with_code(502, message)
    }
}

impl std::fmt::Display for LambdoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for LambdoError {}

impl From<LambdoError> for LambdoResponse {
    fn from(err: LambdoError) -> Self {
        LambdoResponse::error(StatusCode(err.code), err.message)
    }
}

impl From<std::io::Error> for LambdoError {
    fn from(err: std::io::Error) -> Self {
        LambdoError::new(err.to_string())
    }
}

impl From<serde_json::Error> for LambdoError {
    fn from(err: serde_json::Error) -> Self {
        LambdoError::bad_request(err.to_string())
    }
}

impl From<crate::client::ClientError> for LambdoError {
    fn from(err: crate::client::ClientError) -> Self {
        LambdoError::bad_gateway(err.to_string())
    }
}
