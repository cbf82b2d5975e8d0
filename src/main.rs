//! lambdo demo server.
//!
//! Registers a few sample functions and serves them on port 8080.

use lambdo::prelude::*;
use std::collections::HashMap;
use tracing_subscriber::EnvFilter;

/// Greets the caller named in the `name` query parameter or `X-Name` header.
#[lambdo_function]
async fn hello(request: LambdoRequest) -> Result<serde_json::Value, LambdoError> {
    let name = request
        .get_query("name")
        .or_else(|| request.get_header("X-Name"))
        .cloned()
        .unwrap_or_else(|| "World".to_string());

    Ok(serde_json::json!({ "message": format!("Hello, {}!", name) }))
}

/// Echoes back the request body.
#[lambdo_function(name = "echo")]
async fn echo_body(request: LambdoRequest) -> Result<LambdoResponse, LambdoError> {
    let content_type = request
        .get_header("Content-Type")
        .cloned()
        .unwrap_or_else(|| "application/octet-stream".to_string());

    Ok(LambdoResponse::ok()
        .header("Content-Type", content_type)
        .body(request.body.unwrap_or_default()))
}

/// Forwards a JSON description of a request to another service.
///
/// Body: `{"uri": "...", "method": "GET", "query": {...}, "json": ..., "headers": {...}}`
struct ForwardFunction {
    client: HttpClient,
}

#[derive(serde::Deserialize)]
struct ForwardSpec {
    uri: String,
    #[serde(default = "default_method")]
    method: String,
    query: Option<HashMap<String, String>>,
    json: Option<serde_json::Value>,
    headers: Option<HashMap<String, String>>,
}

fn default_method() -> String {
    "GET".to_string()
}

#[async_trait]
impl Handler for ForwardFunction {
    async fn handle(&self, request: LambdoRequest) -> Result<LambdoResponse, LambdoError> {
        let spec = request
            .json::<ForwardSpec>()
            .ok_or_else(|| LambdoError::bad_request("Missing request body"))??;

        let response = self
            .client
            .request(&spec.uri, &spec.method, spec.query, spec.json, spec.headers)
            .await?;

        Ok(response)
    }
}

/// Defines the sample functions.
fn demo_controller(registry: &mut FunctionRegistry) -> Result<(), RegistryError> {
    HelloFunction::define(registry)?;
    EchoBodyFunction::define(registry)?;
    registry.define(
        "forward",
        ForwardFunction {
            client: HttpClient::new(),
        },
    )
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting lambdo server...");

    let mut registry = FunctionRegistry::new();
    registry.register(demo_controller)?;

    let config = LambdoConfig::new().host("0.0.0.0").port(8080);
    let server = LambdoServer::new(config, registry);

    match server.config() {
        Ok(settings) => tracing::info!(
            "Loaded {}: {}",
            server.settings().config_file.display(),
            settings
        ),
        Err(e) => tracing::warn!("Ignoring config file: {}", e),
    }

    tracing::info!("Try: curl http://localhost:8080/functions");
    tracing::info!("Try: curl -X POST 'http://localhost:8080/functions/hello?name=lambdo'");
    tracing::info!("Try: curl -X POST -d 'test' http://localhost:8080/functions/echo");
    tracing::info!("Health check: curl http://localhost:8080/health");

    server.run().await
}
