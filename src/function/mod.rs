//! Functions: the handler trait, the registry, and dispatch by name.

pub mod dispatch;
pub mod handler;
pub mod registry;

pub use dispatch::{perform_function, FUNCTION_NAME_PARAM};
pub use handler::{Handler, LambdoError};
pub use registry::{FunctionRegistry, RegistryError};
