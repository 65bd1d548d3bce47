//! Job types and result shapes for the serialization queue.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::executor::ExecError;

/// Output kind requested by a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputKind {
    /// JSON mesh geometry for in-browser rendering.
    Preview,
    /// Binary STL file.
    Stl,
    /// Binary STEP file.
    Step,
}

impl OutputKind {
    /// Lowercase name, matching the URL path segment and engine route.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputKind::Preview => "preview",
            OutputKind::Stl => "stl",
            OutputKind::Step => "step",
        }
    }

    /// Whether results of this kind are structured JSON rather than bytes.
    pub fn is_structured(&self) -> bool {
        matches!(self, OutputKind::Preview)
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputKind {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "preview" => Ok(OutputKind::Preview),
            "stl" => Ok(OutputKind::Stl),
            "step" => Ok(OutputKind::Step),
            other => Err(JobError::UnknownKind {
                requested: other.to_string(),
            }),
        }
    }
}

/// Unique job identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JobId(Uuid);

impl JobId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle of a job inside the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Waiting in the queue.
    Pending,
    /// Currently executing against the engine.
    Running,
    /// Result delivered (or failure recorded); the job is finished.
    Settled,
}

/// One submitted CAD-generation request.
///
/// Owned exclusively by the queue from submission until settlement.
#[derive(Debug)]
pub struct Job {
    pub id: JobId,
    pub kind: OutputKind,
    pub code: String,
    pub submitted_at: Instant,
    pub state: JobState,
}

impl Job {
    pub fn new(kind: OutputKind, code: String) -> Self {
        Self {
            id: JobId::new(),
            kind,
            code,
            submitted_at: Instant::now(),
            state: JobState::Pending,
        }
    }
}

/// Mesh geometry returned for preview jobs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub faces: Vec<u32>,
}

/// Successful execution result, shaped by the requested kind.
#[derive(Debug, Clone)]
pub enum ExecOutput {
    /// JSON geometry payload (preview).
    Structured { mesh: MeshData, message: String },
    /// Opaque file payload (stl/step) plus pass-through headers from the
    /// engine, e.g. a suggested filename.
    Binary {
        bytes: Vec<u8>,
        headers: HashMap<String, String>,
    },
}

/// Terminal failure of a job. Every variant maps to exactly one HTTP status.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JobError {
    /// The requested kind is not one the queue recognizes.
    #[error("Invalid endpoint")]
    UnknownKind { requested: String },

    /// The engine reported a failure; `status` is already normalized.
    #[error("{message}")]
    Execution { status: u16, message: String },

    /// Execution exceeded the configured deadline.
    #[error("execution timed out")]
    Timeout { limit: Duration },

    /// The executor adapter crashed; the job still settles.
    #[error("executor failure: {message}")]
    ExecutorPanic { message: String },

    /// The queue worker is gone (process shutting down).
    #[error("queue is shut down")]
    Shutdown,
}

impl JobError {
    /// HTTP status this failure maps to.
    pub fn status(&self) -> u16 {
        match self {
            JobError::UnknownKind { .. } => 400,
            JobError::Execution { status, .. } => *status,
            JobError::Timeout { .. } => 504,
            JobError::ExecutorPanic { .. } => 500,
            JobError::Shutdown => 503,
        }
    }
}

impl From<ExecError> for JobError {
    fn from(err: ExecError) -> Self {
        JobError::Execution {
            status: err.status(),
            message: err.to_string(),
        }
    }
}
