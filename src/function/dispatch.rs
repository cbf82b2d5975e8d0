//! Dispatch of a request to the function named in its path.

use crate::function::handler::LambdoError;
use crate::function::registry::FunctionRegistry;
use crate::http::{LambdoRequest, LambdoResponse};
use tracing::debug;

/// Path parameter carrying the target function name.
pub const FUNCTION_NAME_PARAM: &str = "name";

/// Invoke the function named by the request's `name` path parameter.
///
/// An unknown (or missing) name is a bad request. Otherwise the handler's
/// result is returned as-is, errors included.
pub async fn perform_function(
    registry: &FunctionRegistry,
    request: LambdoRequest,
) -> Result<LambdoResponse, LambdoError> {
    let name = request
        .param(FUNCTION_NAME_PARAM)
        .ok_or_else(|| LambdoError::bad_request("No function specified"))?
        .to_string();

    let Some(handler) = registry.lookup(&name) else {
        debug!("No function named '{}'", name);
        return Err(LambdoError::bad_request(format!(
            "Function '{}' is not defined",
            name
        )));
    };

    debug!("Invoking function '{}'", name);
    handler.handle(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::handler::Handler;
    use crate::http::{Method, StatusCode};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counting {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Handler for Counting {
        async fn handle(&self, request: LambdoRequest) -> Result<LambdoResponse, LambdoError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(LambdoResponse::text(request.text().unwrap_or_default()))
        }
    }

    async fn failing(_request: LambdoRequest) -> Result<LambdoResponse, LambdoError> {
        Err(LambdoError::with_code(418, "short and stout"))
    }

    fn invoke(name: &str) -> LambdoRequest {
        LambdoRequest::new(Method::Post, format!("/functions/{}", name))
            .with_param(FUNCTION_NAME_PARAM, name)
    }

    #[tokio::test]
    async fn test_dispatch_returns_handler_result() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = FunctionRegistry::new();
        registry
            .define("echo", Counting { calls: calls.clone() })
            .unwrap();

        let response = perform_function(&registry, invoke("echo").body("ping"))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.text_body(), Some("ping".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dispatch_propagates_handler_error() {
        let mut registry = FunctionRegistry::new();
        registry.define("teapot", failing).unwrap();

        let err = perform_function(&registry, invoke("teapot"))
            .await
            .unwrap_err();

        assert_eq!(err, LambdoError::with_code(418, "short and stout"));
    }

    #[tokio::test]
    async fn test_dispatch_unknown_function() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = FunctionRegistry::new();
        registry
            .define("echo", Counting { calls: calls.clone() })
            .unwrap();

        let err = perform_function(&registry, invoke("missing"))
            .await
            .unwrap_err();

        assert_eq!(err.code, 400);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(registry.names(), vec!["echo".to_string()]);
    }

    #[tokio::test]
    async fn test_dispatch_without_name_param() {
        let registry = FunctionRegistry::new();

        let err = perform_function(&registry, LambdoRequest::new(Method::Post, "/functions"))
            .await
            .unwrap_err();

        assert_eq!(err.code, 400);
    }
}
