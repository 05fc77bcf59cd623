//! Response inspection helpers.

use axum::body::to_bytes;
use axum::http::header::LOCATION;
use axum::response::Response;
use serde_json::Value;

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&bytes).expect("response body is not JSON")
}

/// `Location` header of a redirect response.
pub fn location(response: &Response) -> Option<&str> {
    response.headers().get(LOCATION).and_then(|v| v.to_str().ok())
}
