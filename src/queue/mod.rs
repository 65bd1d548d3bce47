//! Request serialization queue.
//!
//! # Data Flow
//! ```text
//! handler tasks ──submit()──▶ mpsc channel ──▶ worker loop ──▶ executor
//!       ▲                                          │
//!       └──────────── per-job oneshot ◀────────────┘
//! ```
//!
//! # Design Decisions
//! - One worker task per queue instance: at most one job executes at a
//!   time, and jobs settle strictly in submission order
//! - Per-job oneshot settlement: the result reaches exactly the submitter,
//!   exactly once
//! - Kind re-checked on submit: the queue never trusts its caller, even
//!   though the dispatcher validates first
//! - No retries: execution is assumed deterministic, and a retry would let
//!   one job consume backend time twice

pub mod job;
pub mod worker;

pub use job::{ExecOutput, Job, JobError, JobId, JobState, MeshData, OutputKind};

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::executor::CadExecutor;
use crate::observability::metrics;

/// A job paired with the channel its result is delivered on.
pub(crate) struct QueuedJob {
    pub(crate) job: Job,
    pub(crate) reply: oneshot::Sender<Result<ExecOutput, JobError>>,
}

/// Handle to the serialization queue.
///
/// Cheap to clone; all clones feed the same worker. Any number of tasks may
/// call [`JobQueue::submit`] concurrently without extra locking: the channel
/// sender is the only shared surface, and the single worker task is the only
/// consumer.
#[derive(Clone)]
pub struct JobQueue {
    tx: mpsc::UnboundedSender<QueuedJob>,
}

impl JobQueue {
    /// Create a queue draining into `executor` and spawn its worker task.
    pub fn new(executor: Arc<dyn CadExecutor>, execution_timeout: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(worker::run(rx, executor, execution_timeout));
        Self { tx }
    }

    /// Submit a job and wait for its result.
    ///
    /// The returned future resolves exactly once, with the job's output or
    /// its failure. Jobs settle strictly in submission order; a job never
    /// starts executing before every earlier job has settled.
    pub async fn submit(&self, kind: &str, code: String) -> Result<ExecOutput, JobError> {
        let kind: OutputKind = kind.parse()?;
        let job = Job::new(kind, code);
        let (reply_tx, reply_rx) = oneshot::channel();

        tracing::debug!(job_id = %job.id, kind = kind.as_str(), "Job enqueued");
        metrics::record_job_enqueued(kind.as_str());

        self.tx
            .send(QueuedJob { job, reply: reply_tx })
            .map_err(|_| JobError::Shutdown)?;

        reply_rx.await.map_err(|_| JobError::Shutdown)?
    }
}
