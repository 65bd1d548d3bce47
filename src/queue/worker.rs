//! Single-consumer worker loop.
//!
//! The worker is the only task that calls into the executor, which is what
//! guarantees the backend never sees two jobs at once. Each job runs under a
//! hard deadline and with panic isolation, so one bad job can never wedge
//! the loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::JoinError;

use crate::executor::CadExecutor;
use crate::observability::metrics;
use crate::queue::job::{ExecOutput, JobError, JobState, OutputKind};
use crate::queue::QueuedJob;

pub(crate) async fn run(
    mut rx: mpsc::UnboundedReceiver<QueuedJob>,
    executor: Arc<dyn CadExecutor>,
    execution_timeout: Duration,
) {
    while let Some(QueuedJob { mut job, reply }) = rx.recv().await {
        let queue_wait = job.submitted_at.elapsed();
        job.state = JobState::Running;

        tracing::debug!(
            job_id = %job.id,
            kind = job.kind.as_str(),
            queue_wait_ms = queue_wait.as_millis() as u64,
            "Job started"
        );

        let started = Instant::now();
        let code = std::mem::take(&mut job.code);
        let outcome = execute_one(&executor, job.kind, code, execution_timeout).await;
        let elapsed = started.elapsed();
        job.state = JobState::Settled;

        let outcome_label = match &outcome {
            Ok(_) => {
                tracing::info!(
                    job_id = %job.id,
                    kind = job.kind.as_str(),
                    duration_ms = elapsed.as_millis() as u64,
                    "Job completed"
                );
                "ok"
            }
            Err(JobError::Timeout { limit }) => {
                tracing::warn!(
                    job_id = %job.id,
                    kind = job.kind.as_str(),
                    limit_secs = limit.as_secs(),
                    "Job timed out"
                );
                "timeout"
            }
            Err(err) => {
                tracing::warn!(
                    job_id = %job.id,
                    kind = job.kind.as_str(),
                    status = err.status(),
                    error = %err,
                    duration_ms = elapsed.as_millis() as u64,
                    "Job failed"
                );
                "error"
            }
        };
        metrics::record_job_settled(job.kind.as_str(), outcome_label, queue_wait, elapsed);

        if reply.send(outcome).is_err() {
            // Submitter went away while waiting; the work is already done.
            tracing::debug!(job_id = %job.id, "Submitter disconnected before settlement");
        }
    }

    tracing::debug!("Job queue closed, worker exiting");
}

/// Run a single job with panic isolation and a hard deadline.
///
/// The executor call is spawned so that a panic inside the adapter surfaces
/// as a [`JoinError`] instead of tearing down the worker loop.
async fn execute_one(
    executor: &Arc<dyn CadExecutor>,
    kind: OutputKind,
    code: String,
    limit: Duration,
) -> Result<ExecOutput, JobError> {
    let executor = Arc::clone(executor);
    let mut handle = tokio::spawn(async move { executor.execute(kind, code).await });

    match tokio::time::timeout(limit, &mut handle).await {
        Err(_) => {
            // Deadline passed: drop the in-flight call. The engine may keep
            // computing on its side; the queue does not wait for it.
            handle.abort();
            Err(JobError::Timeout { limit })
        }
        Ok(Ok(result)) => result.map_err(JobError::from),
        Ok(Err(join_err)) => Err(panic_failure(join_err)),
    }
}

fn panic_failure(err: JoinError) -> JobError {
    let message = if err.is_panic() {
        let payload = err.into_panic();
        payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "executor panicked".to_string())
    } else {
        "executor task cancelled".to_string()
    };
    JobError::ExecutorPanic { message }
}
