//! Request size limits.
//!
//! The body cap is enforced by the HTTP layer before JSON parsing, so an
//! oversized payload is rejected without ever being buffered past the
//! limit. Requests carrying an honest `Content-Length` are refused with
//! 413 up front.

use tower_http::limit::RequestBodyLimitLayer;

/// Build the request body cap layer.
pub fn body_limit_layer(max_body_size: usize) -> RequestBodyLimitLayer {
    RequestBodyLimitLayer::new(max_body_size)
}
