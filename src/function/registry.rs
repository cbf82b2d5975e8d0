//! Function registry: the name → handler map built at startup.

use crate::function::handler::Handler;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

/// Registration failure. These are startup-time configuration mistakes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Function already defined: {0}")]
    DuplicateFunction(String),

    #[error("Invalid function name: {0:?}")]
    InvalidName(String),
}

/// Registry of named functions.
///
/// Built once during startup with [`define`](Self::define) and
/// [`register`](Self::register), then handed to the server, which only reads
/// it. There is no removal or replacement.
#[derive(Default)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn Handler>>,
}

impl FunctionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`.
    ///
    /// Fails if the name is already taken, empty, or contains `/` (such a
    /// name could never be addressed as `/functions/{name}`). The registry is
    /// left unchanged on failure.
    pub fn define<H>(&mut self, name: impl Into<String>, handler: H) -> Result<(), RegistryError>
    where
        H: Handler + 'static,
    {
        let name = name.into();

        if name.is_empty() || name.contains('/') {
            error!("Rejected function name {:?}", name);
            return Err(RegistryError::InvalidName(name));
        }

        if self.functions.contains_key(&name) {
            error!("Function already defined: {}", name);
            return Err(RegistryError::DuplicateFunction(name));
        }

        self.functions.insert(name.clone(), Arc::new(handler));
        info!("Defined function: {}", name);
        Ok(())
    }

    /// Run a controller: a closure that defines a related batch of functions.
    pub fn register<C>(&mut self, controller: C) -> Result<(), RegistryError>
    where
        C: FnOnce(&mut FunctionRegistry) -> Result<(), RegistryError>,
    {
        controller(self)
    }

    /// Look up the handler registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.functions.get(name).cloned()
    }

    /// Whether `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Names of all registered functions, in no particular order.
    pub fn names(&self) -> Vec<String> {
        self.functions.keys().cloned().collect()
    }

    /// Number of registered functions.
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Whether no function is registered.
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::function::handler::LambdoError;
    use crate::http::{LambdoRequest, Method};
    use std::collections::HashSet;

    async fn alpha(_request: LambdoRequest) -> Result<&'static str, LambdoError> {
        Ok("alpha")
    }

    async fn beta(_request: LambdoRequest) -> Result<&'static str, LambdoError> {
        Ok("beta")
    }

    #[test]
    fn test_define_distinct_names() {
        let mut registry = FunctionRegistry::new();
        assert!(registry.is_empty());

        registry.define("a", alpha).unwrap();
        registry.define("b", beta).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("a"));
        assert!(registry.contains("b"));
    }

    #[test]
    fn test_define_duplicate_fails() {
        let mut registry = FunctionRegistry::new();
        registry.define("a", alpha).unwrap();

        let result = registry.define("a", beta);
        assert_eq!(result, Err(RegistryError::DuplicateFunction("a".to_string())));

        // The original handler stays in place.
        let handler = registry.lookup("a").unwrap();
        let response =
            tokio_test::block_on(handler.handle(LambdoRequest::new(Method::Post, "/"))).unwrap();
        assert_eq!(response.text_body(), Some("alpha".to_string()));
    }

    #[test]
    fn test_define_invalid_names() {
        let mut registry = FunctionRegistry::new();

        assert_eq!(
            registry.define("", alpha),
            Err(RegistryError::InvalidName(String::new()))
        );
        assert!(matches!(
            registry.define("a/b", alpha),
            Err(RegistryError::InvalidName(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_lookup() {
        let mut registry = FunctionRegistry::new();
        registry.define("b", beta).unwrap();

        let handler = registry.lookup("b").unwrap();
        let response =
            tokio_test::block_on(handler.handle(LambdoRequest::new(Method::Post, "/"))).unwrap();
        assert_eq!(response.text_body(), Some("beta".to_string()));

        assert!(registry.lookup("never-defined").is_none());
    }

    #[test]
    fn test_register_controller() {
        let mut registry = FunctionRegistry::new();

        registry
            .register(|registry| {
                registry.define("a", alpha)?;
                registry.define("b", beta)
            })
            .unwrap();

        let names: HashSet<String> = registry.names().into_iter().collect();
        assert_eq!(names, HashSet::from(["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_register_controller_propagates_error() {
        let mut registry = FunctionRegistry::new();
        registry.define("a", alpha).unwrap();

        let result = registry.register(|registry| registry.define("a", beta));
        assert!(matches!(result, Err(RegistryError::DuplicateFunction(name)) if name == "a"));
    }
}
