//! # lambdo - a minimal function-as-a-service facade
//!
//! lambdo keeps a registry of named request handlers and serves them over
//! HTTP. Functions are registered at startup; the server then dispatches
//! `POST /functions/{name}` to the handler registered under `name`.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        LambdoServer                          │
//! │   GET /health     GET /functions     POST /functions/{name}  │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ perform_function
//!                                ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      FunctionRegistry                        │
//! │   ┌──────────┐   ┌──────────┐   ┌──────────┐                 │
//! │   │ "hello"  │   │  "echo"  │   │   ...    │                 │
//! │   └──────────┘   └──────────┘   └──────────┘                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use lambdo::prelude::*;
//!
//! async fn hello(request: LambdoRequest) -> Result<String, LambdoError> {
//!     let name = request.get_query("name").cloned().unwrap_or_else(|| "World".into());
//!     Ok(format!("Hello, {}!", name))
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let mut registry = FunctionRegistry::new();
//!     registry.define("hello", hello)?;
//!
//!     LambdoServer::with_defaults(registry).run().await
//! }
//! ```
//!
//! Related functions can be grouped in a controller, a closure that receives
//! the registry:
//!
//! ```rust
//! use lambdo::prelude::*;
//!
//! async fn ping(_request: LambdoRequest) -> Result<&'static str, LambdoError> {
//!     Ok("pong")
//! }
//!
//! fn status_controller(registry: &mut FunctionRegistry) -> Result<(), RegistryError> {
//!     registry.define("ping", ping)
//! }
//!
//! let mut registry = FunctionRegistry::new();
//! registry.register(status_controller).unwrap();
//! assert!(registry.contains("ping"));
//! ```

pub mod client;
pub mod function;
pub mod http;
pub mod runtime;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::client::{ClientError, HttpClient, OutboundRequest};
    pub use crate::function::{FunctionRegistry, Handler, LambdoError, RegistryError};
    pub use crate::http::{LambdoRequest, LambdoResponse, Method, Responder, StatusCode};
    pub use crate::runtime::{LambdoConfig, LambdoServer};
    pub use async_trait::async_trait;
    pub use lambdo_macro::lambdo_function;
}

// Re-export for convenience
pub use client::{ClientError, HttpClient, OutboundRequest};
pub use function::{perform_function, FunctionRegistry, Handler, LambdoError, RegistryError};
pub use http::{LambdoRequest, LambdoResponse, Responder};
pub use lambdo_macro::lambdo_function;
pub use runtime::{LambdoConfig, LambdoServer};
