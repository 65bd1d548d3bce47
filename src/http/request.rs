//! Request types for the submission endpoint.

use serde::Deserialize;

/// JSON body accepted by `POST /{kind}`.
///
/// Size is already bounded by the body-cap layer before this is parsed.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratePayload {
    /// CAD code to execute.
    pub code: String,
}
