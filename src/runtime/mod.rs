//! Server runtime: HTTP routes and configuration.

mod config;
mod server;

pub use config::{load_config_file, ConfigError, LambdoConfig, DEFAULT_CONFIG_FILE};
pub use server::LambdoServer;
