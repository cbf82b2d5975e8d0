//! Outbound HTTP client helper.

mod outbound;

pub use outbound::{ClientError, HttpClient, OutboundRequest};
