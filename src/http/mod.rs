//! HTTP value types shared by functions, the server, and the outbound client.

mod request;
mod response;

pub use request::{LambdoRequest, Method};
pub use response::{LambdoResponse, Responder, StatusCode};
