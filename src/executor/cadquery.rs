//! HTTP adapter for the CadQuery execution engine.
//!
//! The engine exposes one route per output kind (`POST /preview`,
//! `POST /stl`, `POST /step`), accepts `{"code": "..."}` and wraps JSON
//! replies in a `{data, message}` envelope. Binary kinds come back as raw
//! bytes with an optional filename suggestion in `Content-Disposition`.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::ExecutorConfig;
use crate::queue::job::{ExecOutput, MeshData, OutputKind};

use super::{CadExecutor, ExecError};

/// Headers passed through to the client on binary results.
const FORWARDED_HEADERS: [&str; 1] = ["content-disposition"];

/// Request body understood by the engine.
#[derive(Debug, Serialize)]
struct EngineRequest<'a> {
    code: &'a str,
}

/// Envelope the engine wraps JSON replies in.
#[derive(Debug, Deserialize)]
struct EngineEnvelope {
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default)]
    message: String,
}

/// Client for the real CadQuery engine.
pub struct CadQueryEngine {
    client: reqwest::Client,
    base_url: String,
}

impl CadQueryEngine {
    /// Build a client for the engine at `config.base_url`.
    ///
    /// Only the connection timeout is set here; the overall execution
    /// deadline belongs to the queue worker.
    pub fn new(config: &ExecutorConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CadExecutor for CadQueryEngine {
    async fn execute(&self, kind: OutputKind, code: String) -> Result<ExecOutput, ExecError> {
        let url = format!("{}/{}", self.base_url, kind);
        let response = self
            .client
            .post(&url)
            .json(&EngineRequest { code: &code })
            .send()
            .await
            .map_err(|e| ExecError::Connect(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = read_error_message(response).await;
            return Err(ExecError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        if kind.is_structured() {
            let envelope: EngineEnvelope = response
                .json()
                .await
                .map_err(|e| ExecError::Malformed(e.to_string()))?;
            let mesh: MeshData = serde_json::from_value(envelope.data)
                .map_err(|e| ExecError::Malformed(format!("bad mesh payload: {}", e)))?;
            Ok(ExecOutput::Structured {
                mesh,
                message: envelope.message,
            })
        } else {
            let headers = forwarded_headers(response.headers());
            let bytes = response
                .bytes()
                .await
                .map_err(|e| ExecError::Connect(e.to_string()))?;
            Ok(ExecOutput::Binary {
                bytes: bytes.to_vec(),
                headers,
            })
        }
    }
}

fn forwarded_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, String> {
    FORWARDED_HEADERS
        .iter()
        .filter_map(|name| {
            headers
                .get(*name)
                .and_then(|v| v.to_str().ok())
                .map(|v| (name.to_string(), v.to_string()))
        })
        .collect()
}

/// Extract a human-readable message from an engine error reply.
///
/// The engine usually answers with its `{data, message}` envelope, but a
/// crashed engine (or a proxy in front of it) may send anything; fall back
/// to the body text, then to the bare status.
async fn read_error_message(response: reqwest::Response) -> String {
    let status = response.status();
    match response.text().await {
        Ok(body) => match serde_json::from_str::<EngineEnvelope>(&body) {
            Ok(envelope) if !envelope.message.is_empty() => envelope.message,
            _ if !body.is_empty() => body,
            _ => format!("engine returned status {}", status.as_u16()),
        },
        Err(_) => format!("engine returned status {}", status.as_u16()),
    }
}
