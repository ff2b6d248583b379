//! Wire transport: HTTP requests and SSE decoding.

mod http;
mod sse;

pub use http::HttpInteractionClient;
