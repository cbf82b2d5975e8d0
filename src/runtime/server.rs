//! lambdo HTTP server: health check, function listing, and invocation routes.

use crate::function::{perform_function, FunctionRegistry, LambdoError, FUNCTION_NAME_PARAM};
use crate::http::{LambdoRequest, LambdoResponse, Method, Responder, StatusCode};
use crate::runtime::config::{load_config_file, ConfigError};
use crate::runtime::LambdoConfig;
use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use percent_encoding::percent_decode_str;
use std::borrow::Cow;
use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::str::Utf8Error;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// The lambdo server.
///
/// Owns the registry built during startup. Routes:
///
/// - `GET /health`: always 200 with an empty body
/// - `GET /functions`: `{"functions": [...]}`
/// - `POST /functions/{name}`: invokes the named function
pub struct LambdoServer {
    /// Server configuration.
    config: LambdoConfig,
    /// Function registry, read-only once the server exists.
    registry: Arc<FunctionRegistry>,
}

impl LambdoServer {
    /// Create a server for an already populated registry.
    pub fn new(config: LambdoConfig, registry: FunctionRegistry) -> Self {
        Self {
            config,
            registry: Arc::new(registry),
        }
    }

    /// Create a server with default configuration.
    pub fn with_defaults(registry: FunctionRegistry) -> Self {
        Self::new(LambdoConfig::default(), registry)
    }

    /// Get the function registry.
    pub fn registry(&self) -> Arc<FunctionRegistry> {
        self.registry.clone()
    }

    /// Get the server settings.
    pub fn settings(&self) -> &LambdoConfig {
        &self.config
    }

    /// Read the JSON config file, or an empty object if there is none.
    pub fn config(&self) -> Result<serde_json::Value, ConfigError> {
        load_config_file(&self.config.config_file)
    }

    /// Bind to the configured address and serve until an accept error.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr: SocketAddr = self.config.bind_addr().parse()?;
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener.
    pub async fn serve(
        self,
        listener: TcpListener,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!(
            "lambdo server listening on {} with {} function(s)",
            listener.local_addr()?,
            self.registry.len()
        );

        let registry = self.registry.clone();
        let config = Arc::new(self.config);

        loop {
            let (stream, remote_addr) = listener.accept().await?;
            let io = TokioIo::new(stream);

            let registry = registry.clone();
            let config = config.clone();

            tokio::task::spawn(async move {
                let service = service_fn(move |req| {
                    let registry = registry.clone();
                    let config = config.clone();
                    async move { handle_request(req, registry, config, remote_addr).await }
                });

                if let Err(err) = http1::Builder::new()
                    .serve_connection(io, service)
                    .await
                {
                    error!("Error serving connection: {:?}", err);
                }
            });
        }
    }
}

/// Route an incoming HTTP request.
async fn handle_request(
    req: Request<Incoming>,
    registry: Arc<FunctionRegistry>,
    config: Arc<LambdoConfig>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let path = req.uri().path().to_string();
    let method = req.method().clone();
    let request_id = generate_request_id();

    debug!(
        "Handling request: {} {} from {} [{}]",
        method, path, remote_addr, request_id
    );

    let decoded = match decode_segments(&path) {
        Ok(decoded) => decoded,
        Err(e) => {
            warn!("Undecodable path {}: {} [{}]", path, e, request_id);
            return Ok(build_response(LambdoResponse::error(
                StatusCode::BAD_REQUEST,
                "Path is not valid UTF-8",
            )));
        }
    };
    let segments: Vec<&str> = decoded.iter().map(|s| s.as_ref()).collect();

    let response = match (segments.as_slice(), &method) {
        (["health"], &hyper::Method::GET) => LambdoResponse::ok(),
        (["functions"], &hyper::Method::GET) => list_functions(&registry),
        (["functions", name], &hyper::Method::POST) => {
            invoke_function(req, name, &registry, &config, &request_id).await
        }
        (["health"] | ["functions"] | ["functions", _], _) => {
            LambdoResponse::error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
        }
        _ => LambdoResponse::error(StatusCode::NOT_FOUND, "Not found"),
    };

    debug!("Responding {} [{}]", response.status.0, request_id);
    Ok(build_response(response))
}

/// Split a request path into percent-decoded, non-empty segments.
fn decode_segments(path: &str) -> Result<Vec<Cow<'_, str>>, Utf8Error> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| percent_decode_str(s).decode_utf8())
        .collect()
}

/// `GET /functions`.
fn list_functions(registry: &FunctionRegistry) -> LambdoResponse {
    serde_json::json!({ "functions": registry.names() }).into_response()
}

/// `POST /functions/{name}`.
async fn invoke_function(
    req: Request<Incoming>,
    name: &str,
    registry: &FunctionRegistry,
    config: &LambdoConfig,
    request_id: &str,
) -> LambdoResponse {
    // Unknown names are rejected before the body is read.
    if !registry.contains(name) {
        debug!("No function named '{}' [{}]", name, request_id);
        return LambdoError::bad_request(format!("Function '{}' is not defined", name)).into();
    }

    let request = match convert_request(req, config).await {
        Ok(request) => request.with_param(FUNCTION_NAME_PARAM, name),
        Err(e) => {
            warn!("Failed to read request for '{}': {} [{}]", name, e, request_id);
            return e.into();
        }
    };

    match perform_function(registry, request).await {
        Ok(response) => response,
        Err(e) => {
            warn!("Function '{}' error: {} [{}]", name, e, request_id);
            e.into()
        }
    }
}

/// Convert a hyper request into a [`LambdoRequest`], enforcing the body limit.
async fn convert_request(
    req: Request<Incoming>,
    config: &LambdoConfig,
) -> Result<LambdoRequest, LambdoError> {
    let (parts, body) = req.into_parts();

    let mut request = LambdoRequest::new(Method::from(&parts.method), parts.uri.path());

    if let Some(query) = parts.uri.query() {
        request.query = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();
    }

    let mut headers = HashMap::new();
    for (name, value) in &parts.headers {
        if let Ok(v) = value.to_str() {
            headers.insert(name.as_str().to_string(), v.to_string());
        }
    }
    request.headers = headers;

    let body_bytes = match Limited::new(body, config.max_body_size).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            return Err(LambdoError::with_code(
                StatusCode::PAYLOAD_TOO_LARGE.0,
                "Request body too large",
            ));
        }
        Err(e) => {
            return Err(LambdoError::bad_request(format!(
                "Failed to read request body: {}",
                e
            )));
        }
    };

    if !body_bytes.is_empty() {
        request.body = Some(body_bytes);
    }

    Ok(request)
}

/// Build a hyper response from a [`LambdoResponse`].
fn build_response(response: LambdoResponse) -> Response<Full<Bytes>> {
    let status = hyper::StatusCode::from_u16(response.status.0).unwrap_or_else(|_| {
        warn!(
            "Invalid status code {}, falling back to 500 Internal Server Error",
            response.status.0
        );
        hyper::StatusCode::INTERNAL_SERVER_ERROR
    });

    let mut builder = Response::builder().status(status);

    for (name, value) in response.headers {
        builder = builder.header(name, value);
    }

    let body = response.body.unwrap_or_default();
    match builder.body(Full::new(body)) {
        Ok(response) => response,
        Err(e) => {
            error!("Failed to build response: {}", e);
            let mut fallback = Response::new(Full::new(Bytes::new()));
            *fallback.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        }
    }
}

/// Generate a request ID for log correlation.
fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{:x}", timestamp)
}
