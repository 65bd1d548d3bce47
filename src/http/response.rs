//! Response envelope and result shaping.
//!
//! Every JSON reply, success or failure, uses the same `{data, message}`
//! envelope so clients can treat any non-success uniformly. Binary results
//! are the one exception: raw bytes under `application/octet-stream`, plus
//! whatever headers the engine asked to pass through.

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::queue::job::{ExecOutput, JobError};

/// Render a failure into the standard envelope.
pub fn failure(status: u16, message: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "data": "none", "message": message }))).into_response()
}

impl IntoResponse for JobError {
    fn into_response(self) -> Response {
        failure(self.status(), &self.to_string())
    }
}

/// Render a successful execution result according to its shape.
pub fn success(output: ExecOutput) -> Response {
    match output {
        ExecOutput::Structured { mesh, message } => (
            StatusCode::OK,
            Json(json!({ "data": mesh, "message": message })),
        )
            .into_response(),
        ExecOutput::Binary { bytes, headers } => {
            let mut response = (StatusCode::OK, bytes).into_response();
            response.headers_mut().insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            );
            for (name, value) in headers {
                let parsed = (
                    HeaderName::try_from(name.as_str()),
                    HeaderValue::try_from(value.as_str()),
                );
                if let (Ok(name), Ok(value)) = parsed {
                    response.headers_mut().insert(name, value);
                }
            }
            response
        }
    }
}
