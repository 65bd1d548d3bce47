//! Backend executor seam.
//!
//! # Responsibilities
//! - Define the capability contract the queue requires of an engine
//! - Normalize engine-reported failures into HTTP-mappable statuses
//! - Provide the HTTP adapter for the real CadQuery engine
//!
//! # Design Decisions
//! - The engine has single logical capacity and is unsafe to call
//!   concurrently with itself; serialization is the queue's job, never the
//!   adapter's
//! - Injected as a trait object so tests can substitute fakes

pub mod cadquery;

pub use cadquery::CadQueryEngine;

use async_trait::async_trait;
use thiserror::Error;

use crate::queue::job::{ExecOutput, OutputKind};

/// Errors reported by an executor implementation.
#[derive(Debug, Clone, Error)]
pub enum ExecError {
    /// The engine processed the job and reported a failure. A 4xx status
    /// means the user's code is at fault; 5xx means the engine itself.
    #[error("{message}")]
    Backend { status: u16, message: String },

    /// The engine could not be reached.
    #[error("engine unreachable: {0}")]
    Connect(String),

    /// The engine replied with something this adapter cannot interpret.
    #[error("invalid engine response: {0}")]
    Malformed(String),
}

impl ExecError {
    /// HTTP-mappable status, normalized so callers never have to guess.
    pub fn status(&self) -> u16 {
        match self {
            ExecError::Backend { status, .. } if (400..=599).contains(status) => *status,
            ExecError::Backend { .. } => 500,
            ExecError::Connect(_) | ExecError::Malformed(_) => 502,
        }
    }
}

/// A CAD execution backend.
///
/// Given a kind and a code snippet, produce a result or fail with a
/// distinguishable status. Calls are slow (seconds, not microseconds) and
/// are issued strictly one at a time by the queue worker.
#[async_trait]
pub trait CadExecutor: Send + Sync {
    async fn execute(&self, kind: OutputKind, code: String) -> Result<ExecOutput, ExecError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_status_passthrough_in_range() {
        let err = ExecError::Backend { status: 400, message: "bad code".into() };
        assert_eq!(err.status(), 400);
        let err = ExecError::Backend { status: 503, message: "busy".into() };
        assert_eq!(err.status(), 503);
    }

    #[test]
    fn test_backend_status_defaults_to_server_error() {
        for odd in [0, 200, 302, 600] {
            let err = ExecError::Backend { status: odd, message: "?".into() };
            assert_eq!(err.status(), 500, "status {} should normalize to 500", odd);
        }
    }

    #[test]
    fn test_transport_errors_are_bad_gateway() {
        assert_eq!(ExecError::Connect("refused".into()).status(), 502);
        assert_eq!(ExecError::Malformed("not json".into()).status(), 502);
    }
}
